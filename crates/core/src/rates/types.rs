//! Rate observation types.
//!
//! A rate states how many quote units equal one base unit. Observations the
//! store persisted are `StoredRate`s and carry a row id; values the resolver
//! computes on the fly (identity, inversion, pivot chaining) are
//! `DerivedRate`s and carry provenance instead. The two are distinct
//! variants of [`Resolved`] - a derived value never pretends to have an
//! identity in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known provider labels for persisted observations.
pub mod provider {
    /// Operator-entered rate.
    pub const MANUAL: &str = "manual";
    /// Self-rate (base == quote, rate 1.0) maintained by the system.
    pub const SYSTEM: &str = "system";
    /// Cross-rate computed during a default-currency rebuild.
    pub const CROSS: &str = "cross";
}

/// Returns true when a rate value is acceptable for storage or arithmetic.
#[must_use]
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// A persisted rate observation (an edge in the rate graph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRate {
    /// Row id.
    pub id: i32,
    /// Base currency id (converted from).
    pub base_id: i32,
    /// Quote currency id (converted to).
    pub quote_id: i32,
    /// Quote units per one base unit.
    pub rate: f64,
    /// Origin label: `manual`, `system`, `cross`, or an external source name.
    pub provider: String,
    /// Whether an operator entered this observation by hand.
    pub is_manual: bool,
    /// When the observation was fetched or created.
    pub fetched_at: DateTime<Utc>,
}

/// How a derived (non-persisted) rate was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Provenance {
    /// base == quote, rate is 1.0 by definition.
    Identity,
    /// Reciprocal of a stored observation.
    Inverse {
        /// Id of the stored observation that was inverted.
        source_id: i32,
    },
    /// Product of two legs through the default currency.
    ViaDefault,
}

/// A rate the resolver computed on the fly; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRate {
    /// Base currency id.
    pub base_id: i32,
    /// Quote currency id.
    pub quote_id: i32,
    /// Quote units per one base unit.
    pub rate: f64,
    /// How the value was computed.
    pub provenance: Provenance,
    /// Carried over from the source observation where one exists.
    pub is_manual: bool,
    /// Timestamp of the source observation, or of the computation.
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of a successful rate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "origin")]
pub enum Resolved {
    /// An observation straight from the store.
    Stored(StoredRate),
    /// A value computed by inversion or chaining.
    Derived(DerivedRate),
}

impl Resolved {
    /// The resolved rate value.
    #[must_use]
    pub fn rate(&self) -> f64 {
        match self {
            Self::Stored(s) => s.rate,
            Self::Derived(d) => d.rate,
        }
    }

    /// Id of the underlying stored observation, if the value came from one
    /// directly.
    #[must_use]
    pub fn stored_id(&self) -> Option<i32> {
        match self {
            Self::Stored(s) => Some(s.id),
            Self::Derived(_) => None,
        }
    }

    /// Whether the value traces back to a manual entry.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        match self {
            Self::Stored(s) => s.is_manual,
            Self::Derived(d) => d.is_manual,
        }
    }

    /// Observation or computation timestamp.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        match self {
            Self::Stored(s) => s.fetched_at,
            Self::Derived(d) => d.fetched_at,
        }
    }

    /// Human-readable origin label for responses and logs.
    #[must_use]
    pub fn provider_label(&self) -> String {
        match self {
            Self::Stored(s) => s.provider.clone(),
            Self::Derived(d) => match d.provenance {
                Provenance::Identity => "synthetic".to_string(),
                Provenance::Inverse { source_id } => format!("inverse:{source_id}"),
                Provenance::ViaDefault => "via-default".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_rate() {
        assert!(is_valid_rate(0.92));
        assert!(is_valid_rate(1.0));
        assert!(!is_valid_rate(0.0));
        assert!(!is_valid_rate(-1.5));
        assert!(!is_valid_rate(f64::NAN));
        assert!(!is_valid_rate(f64::INFINITY));
    }

    #[test]
    fn test_provider_labels() {
        let derived = Resolved::Derived(DerivedRate {
            base_id: 1,
            quote_id: 2,
            rate: 1.25,
            provenance: Provenance::Inverse { source_id: 17 },
            is_manual: true,
            fetched_at: Utc::now(),
        });
        assert_eq!(derived.provider_label(), "inverse:17");
        assert_eq!(derived.stored_id(), None);
        assert!(derived.is_manual());
    }
}
