//! External rate provider client and payload normalization.

pub mod error;
pub mod normalize;
pub mod provider;

pub use error::ProviderError;
pub use normalize::{Normalized, RateEntry, RatesDocument, anchor_map, pair_rates};
pub use provider::{FetchedRates, RateProvider};
