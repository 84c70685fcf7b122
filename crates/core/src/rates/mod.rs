//! Rate observations, resolution, and cross-rate rebuilds.

pub mod rebuild;
pub mod resolve;
pub mod types;

pub use rebuild::{CrossRate, RebuildError, cross_rates};
pub use resolve::{latest_for, resolve};
pub use types::{DerivedRate, Provenance, Resolved, StoredRate, is_valid_rate, provider};
