//! Rate resolution between arbitrary currency pairs.
//!
//! Resolution order, first match wins:
//! 1. Identity - base == quote yields 1.0 without touching the store.
//! 2. Direct - the latest stored observation for (base, quote).
//! 3. Inverse - the reciprocal of the latest (quote, base) observation.
//! 4. Pivot chaining - base -> default times default -> quote, each leg
//!    resolved by direct/inverse lookup only.
//!
//! Absence of a path is a normal outcome (`None`), not a fault. Direct and
//! inverse data win over chained values because they are observed, not
//! derived.

use chrono::{DateTime, Utc};

use super::types::{DerivedRate, Provenance, Resolved, StoredRate};

/// Picks the latest observation for an exact pair: `fetched_at` descending,
/// ties broken by highest id so resolution stays deterministic.
#[must_use]
pub fn latest_for(observations: &[StoredRate], base_id: i32, quote_id: i32) -> Option<&StoredRate> {
    observations
        .iter()
        .filter(|o| o.base_id == base_id && o.quote_id == quote_id)
        .max_by(|a, b| a.fetched_at.cmp(&b.fetched_at).then(a.id.cmp(&b.id)))
}

/// Resolves a rate leg by direct lookup, falling back to inversion.
fn direct_or_inverse(observations: &[StoredRate], base_id: i32, quote_id: i32) -> Option<f64> {
    if let Some(direct) = latest_for(observations, base_id, quote_id) {
        return Some(direct.rate);
    }
    latest_for(observations, quote_id, base_id)
        .filter(|o| o.rate > 0.0)
        .map(|o| 1.0 / o.rate)
}

/// Resolves the rate from `base_id` to `quote_id` against the given
/// observations, using `default_id` as the pivot when direct and inverse
/// lookups fail.
///
/// `observations` only needs to contain the candidate pairs for this
/// resolution; callers with a backing store fetch those first.
#[must_use]
pub fn resolve(
    observations: &[StoredRate],
    base_id: i32,
    quote_id: i32,
    default_id: Option<i32>,
    now: DateTime<Utc>,
) -> Option<Resolved> {
    // Identity
    if base_id == quote_id {
        return Some(Resolved::Derived(DerivedRate {
            base_id,
            quote_id,
            rate: 1.0,
            provenance: Provenance::Identity,
            is_manual: false,
            fetched_at: now,
        }));
    }

    // Direct
    if let Some(direct) = latest_for(observations, base_id, quote_id) {
        return Some(Resolved::Stored(direct.clone()));
    }

    // Inverse
    if let Some(inverse) = latest_for(observations, quote_id, base_id) {
        if inverse.rate > 0.0 {
            return Some(Resolved::Derived(DerivedRate {
                base_id,
                quote_id,
                rate: 1.0 / inverse.rate,
                provenance: Provenance::Inverse {
                    source_id: inverse.id,
                },
                is_manual: inverse.is_manual,
                fetched_at: inverse.fetched_at,
            }));
        }
    }

    // Pivot chaining through the default currency
    let pivot = default_id.filter(|d| *d != base_id && *d != quote_id)?;
    let to_pivot = direct_or_inverse(observations, base_id, pivot)?;
    let from_pivot = direct_or_inverse(observations, pivot, quote_id)?;

    Some(Resolved::Derived(DerivedRate {
        base_id,
        quote_id,
        rate: to_pivot * from_pivot,
        provenance: Provenance::ViaDefault,
        is_manual: false,
        fetched_at: now,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    const USD: i32 = 1;
    const EUR: i32 = 2;
    const KZT: i32 = 3;
    const GBP: i32 = 4;

    fn obs(id: i32, base_id: i32, quote_id: i32, rate: f64, at_secs: i64) -> StoredRate {
        StoredRate {
            id,
            base_id,
            quote_id,
            rate,
            provider: "manual".to_string(),
            is_manual: true,
            fetched_at: Utc.timestamp_opt(1_700_000_000 + at_secs, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_100_000, 0).unwrap()
    }

    #[test]
    fn test_identity_ignores_stored_data() {
        // A stored self-rate must not shadow the synthetic identity
        let store = vec![obs(1, USD, USD, 42.0, 0)];
        let resolved = resolve(&store, USD, USD, None, now()).unwrap();
        assert!((resolved.rate() - 1.0).abs() < 1e-12);
        assert_eq!(resolved.stored_id(), None);
    }

    #[test]
    fn test_direct_lookup() {
        let store = vec![obs(1, USD, EUR, 0.92, 0)];
        let resolved = resolve(&store, USD, EUR, None, now()).unwrap();
        assert!(matches!(resolved, Resolved::Stored(_)));
        assert!((resolved.rate() - 0.92).abs() < 1e-12);
        assert_eq!(resolved.stored_id(), Some(1));
    }

    #[test]
    fn test_latest_observation_wins() {
        let store = vec![obs(1, USD, EUR, 0.90, 0), obs(2, USD, EUR, 0.92, 100)];
        let resolved = resolve(&store, USD, EUR, None, now()).unwrap();
        assert!((resolved.rate() - 0.92).abs() < 1e-12);
    }

    #[test]
    fn test_timestamp_tie_breaks_by_id() {
        let store = vec![obs(7, USD, EUR, 0.90, 50), obs(9, USD, EUR, 0.93, 50)];
        let resolved = resolve(&store, USD, EUR, None, now()).unwrap();
        assert_eq!(resolved.stored_id(), Some(9));
    }

    #[test]
    fn test_inverse_fallback() {
        // USD -> EUR = 0.92 stored; EUR -> USD must come back as 1/0.92
        let store = vec![obs(1, USD, EUR, 0.92, 0)];
        let resolved = resolve(&store, EUR, USD, None, now()).unwrap();
        assert!((resolved.rate() - 1.086_956_521_739_13).abs() < 1e-4);
        match resolved {
            Resolved::Derived(d) => {
                assert_eq!(d.provenance, Provenance::Inverse { source_id: 1 });
                assert!(d.is_manual);
                assert_eq!(d.fetched_at, store[0].fetched_at);
            }
            Resolved::Stored(_) => panic!("inverse must be derived"),
        }
    }

    #[test]
    fn test_pivot_chaining() {
        // EUR -> USD = 1.09, USD -> KZT = 450; default USD
        let store = vec![obs(1, EUR, USD, 1.09, 0), obs(2, USD, KZT, 450.0, 0)];
        let resolved = resolve(&store, EUR, KZT, Some(USD), now()).unwrap();
        assert!((resolved.rate() - 1.09 * 450.0).abs() < 1e-6);
        match resolved {
            Resolved::Derived(d) => {
                assert_eq!(d.provenance, Provenance::ViaDefault);
                assert!(!d.is_manual);
                assert_eq!(d.fetched_at, now());
            }
            Resolved::Stored(_) => panic!("chained rate must be derived"),
        }
    }

    #[test]
    fn test_pivot_legs_accept_inverse() {
        // Both legs only known in the opposite direction
        let store = vec![obs(1, USD, EUR, 0.92, 0), obs(2, KZT, USD, 0.002, 0)];
        let resolved = resolve(&store, EUR, KZT, Some(USD), now()).unwrap();
        let expected = (1.0 / 0.92) * (1.0 / 0.002);
        assert!((resolved.rate() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_no_default_no_chaining() {
        let store = vec![obs(1, EUR, USD, 1.09, 0), obs(2, USD, KZT, 450.0, 0)];
        assert!(resolve(&store, EUR, KZT, None, now()).is_none());
    }

    #[test]
    fn test_unreachable_pair() {
        let store = vec![obs(1, USD, EUR, 0.92, 0)];
        assert!(resolve(&store, GBP, KZT, Some(USD), now()).is_none());
    }

    #[test]
    fn test_non_positive_inverse_skipped() {
        // A corrupt zero rate must never be divided by; with nothing else
        // stored the pair is simply unresolved
        let store = vec![obs(1, EUR, USD, 0.0, 0)];
        assert!(resolve(&store, USD, EUR, None, now()).is_none());
    }

    proptest! {
        /// Stored direct observations always win over everything else.
        #[test]
        fn prop_direct_beats_inverse(
            direct in 0.0001f64..10_000.0,
            inverse in 0.0001f64..10_000.0,
        ) {
            let store = vec![
                obs(1, USD, EUR, direct, 0),
                obs(2, EUR, USD, inverse, 0),
            ];
            let resolved = resolve(&store, USD, EUR, None, now()).unwrap();
            prop_assert_eq!(resolved.stored_id(), Some(1));
            prop_assert!((resolved.rate() - direct).abs() < 1e-12);
        }

        /// With only a direct A -> B rate stored, B -> A resolves to its
        /// reciprocal.
        #[test]
        fn prop_inverse_symmetry(rate in 0.0001f64..10_000.0) {
            let store = vec![obs(1, USD, EUR, rate, 0)];
            let resolved = resolve(&store, EUR, USD, None, now()).unwrap();
            prop_assert!((resolved.rate() - 1.0 / rate).abs() / (1.0 / rate) < 1e-12);
        }

        /// Identity resolution holds for any store contents.
        #[test]
        fn prop_identity_is_one(rate in 0.0001f64..10_000.0) {
            let store = vec![obs(1, USD, EUR, rate, 0)];
            let resolved = resolve(&store, KZT, KZT, Some(USD), now()).unwrap();
            prop_assert!((resolved.rate() - 1.0).abs() < 1e-12);
        }

        /// Pivot chaining multiplies the two legs.
        #[test]
        fn prop_pivot_product(
            to_pivot in 0.0001f64..10_000.0,
            from_pivot in 0.0001f64..10_000.0,
        ) {
            let store = vec![
                obs(1, EUR, USD, to_pivot, 0),
                obs(2, USD, KZT, from_pivot, 0),
            ];
            let resolved = resolve(&store, EUR, KZT, Some(USD), now()).unwrap();
            let expected = to_pivot * from_pivot;
            prop_assert!((resolved.rate() - expected).abs() / expected < 1e-12);
        }
    }
}
