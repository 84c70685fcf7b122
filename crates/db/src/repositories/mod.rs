//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod currency;
pub mod price;
pub mod product;
pub mod rate;

pub use currency::{CreateCurrencyInput, CurrencyError, CurrencyRepository, UpdateCurrencyInput};
pub use price::{PriceError, PriceQuote, PriceRepository, PriceSource};
pub use product::{CreateProductInput, ProductError, ProductRepository, UpdatePricingInput};
pub use rate::{RateError, RateRepository, RateWrite};
