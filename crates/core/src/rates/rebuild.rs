//! Cross-rate arithmetic for default-currency switches.
//!
//! When the default currency moves from `old_base` to `new_base`, every
//! quote the old base had a rate for gets an equivalent rate relative to the
//! new base: `rate(new -> X) = rate(old -> X) / rate(old -> new)`. The
//! arithmetic here is pure; the transactional write-back lives with the
//! store.

use std::collections::BTreeMap;

use thiserror::Error;

use super::types::is_valid_rate;

/// A computed cross-rate for one quote currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossRate {
    /// Quote currency id.
    pub quote_id: i32,
    /// New-base units converted: quote units per one new-base unit.
    pub rate: f64,
}

/// Why a rebuild cannot proceed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RebuildError {
    /// The old base has no rate to the new base at all.
    #[error("no rate from the old default to currency {new_base} exists")]
    MissingPivotRate {
        /// The currency being promoted.
        new_base: i32,
    },
    /// The old-to-new rate exists but cannot be divided by.
    #[error("rate from the old default to currency {new_base} is unusable ({rate})")]
    InvalidPivotRate {
        /// The currency being promoted.
        new_base: i32,
        /// The offending stored value.
        rate: f64,
    },
}

/// Computes the cross-rates for promoting `new_base`, given the old base's
/// latest rate per quote currency.
///
/// Quotes whose computed rate comes out non-finite or non-positive are
/// skipped - corrupted source data is not an instruction to delete a rate.
/// The `new_base` entry itself is excluded; its self-rate is maintained
/// separately.
///
/// # Errors
///
/// Fails when the old base has no usable rate to `new_base`; callers must
/// abort the enclosing switch in that case rather than leave a default
/// without rebuilt rates.
pub fn cross_rates(
    old_base_rates: &BTreeMap<i32, f64>,
    new_base: i32,
) -> Result<Vec<CrossRate>, RebuildError> {
    let old_to_new = *old_base_rates
        .get(&new_base)
        .ok_or(RebuildError::MissingPivotRate { new_base })?;
    if !is_valid_rate(old_to_new) {
        return Err(RebuildError::InvalidPivotRate {
            new_base,
            rate: old_to_new,
        });
    }

    Ok(old_base_rates
        .iter()
        .filter(|(quote_id, _)| **quote_id != new_base)
        .filter_map(|(quote_id, old_rate)| {
            let rate = old_rate / old_to_new;
            is_valid_rate(rate).then_some(CrossRate {
                quote_id: *quote_id,
                rate,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const USD: i32 = 1;
    const EUR: i32 = 2;
    const KZT: i32 = 3;

    #[test]
    fn test_rebuild_divides_by_pivot_rate() {
        // USD was default: USD -> EUR = 0.92, USD -> KZT = 450. Promote EUR.
        let mut old = BTreeMap::new();
        old.insert(EUR, 0.92);
        old.insert(KZT, 450.0);

        let rebuilt = cross_rates(&old, EUR).unwrap();
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].quote_id, KZT);
        // EUR -> KZT = 450 / 0.92
        assert!((rebuilt[0].rate - 450.0 / 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_rebuild_produces_inverse_of_old_to_new() {
        // USD -> EUR = 0.92 and USD -> USD = 1.0 gives EUR -> USD = 1/0.92
        let mut old = BTreeMap::new();
        old.insert(USD, 1.0);
        old.insert(EUR, 0.92);

        let rebuilt = cross_rates(&old, EUR).unwrap();
        let usd = rebuilt.iter().find(|c| c.quote_id == USD).unwrap();
        assert!((usd.rate - 1.086_956_521_739_13).abs() < 1e-4);
    }

    #[test]
    fn test_rebuild_missing_pivot_rate() {
        let mut old = BTreeMap::new();
        old.insert(KZT, 450.0);

        assert_eq!(
            cross_rates(&old, EUR),
            Err(RebuildError::MissingPivotRate { new_base: EUR })
        );
    }

    #[test]
    fn test_rebuild_invalid_pivot_rate() {
        let mut old = BTreeMap::new();
        old.insert(EUR, 0.0);
        old.insert(KZT, 450.0);

        assert!(matches!(
            cross_rates(&old, EUR),
            Err(RebuildError::InvalidPivotRate { .. })
        ));
    }

    #[test]
    fn test_rebuild_skips_corrupt_quotes() {
        let mut old = BTreeMap::new();
        old.insert(EUR, 0.92);
        old.insert(KZT, f64::NAN);

        let rebuilt = cross_rates(&old, EUR).unwrap();
        assert!(rebuilt.is_empty());
    }

    proptest! {
        /// Every rebuilt rate equals old -> X divided by old -> new.
        #[test]
        fn prop_rebuild_consistency(
            to_new in 0.0001f64..10_000.0,
            to_other in 0.0001f64..10_000.0,
        ) {
            let mut old = BTreeMap::new();
            old.insert(EUR, to_new);
            old.insert(KZT, to_other);

            let rebuilt = cross_rates(&old, EUR).unwrap();
            let kzt = rebuilt.iter().find(|c| c.quote_id == KZT).unwrap();
            let expected = to_other / to_new;
            prop_assert!((kzt.rate - expected).abs() / expected < 1e-12);
        }
    }
}
