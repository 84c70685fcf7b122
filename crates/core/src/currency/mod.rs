//! Price rounding and amount formatting.

pub mod convert;
pub mod format;

pub use convert::{convert_price, round_to_places};
pub use format::{CurrencyStyle, SymbolPosition, format_amount};
