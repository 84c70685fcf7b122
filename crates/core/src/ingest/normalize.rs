//! Provider payload normalization.
//!
//! The provider publishes a daily document quoting each currency in its own
//! home currency: `value / max(1, nominal)` home units buy one unit of the
//! coded currency. The home currency itself anchors implicitly at 1.0.
//! From those anchors, `rate(base -> quote) = anchor[base] / anchor[quote]`,
//! which yields quote units per one base unit: one base unit is worth
//! `anchor[base]` home units, and each quote unit costs `anchor[quote]` of
//! them.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::ProviderError;
use crate::rates::types::is_valid_rate;

/// One quoted currency in the provider document.
#[derive(Debug, Clone, Deserialize)]
pub struct RateEntry {
    /// Home-currency value of `nominal` units of this currency.
    pub value: f64,
    /// Unit count the value refers to; defaults to 1.
    pub nominal: Option<f64>,
}

/// The provider's daily rates document.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesDocument {
    /// Quoted currencies keyed by code.
    pub rates: BTreeMap<String, RateEntry>,
}

/// Normalization output: resolved pair rates plus the requested codes the
/// payload did not contain.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Quote code -> rate (quote units per one base unit).
    pub rates: BTreeMap<String, f64>,
    /// Requested codes absent from the payload, for logging.
    pub missing: Vec<String>,
}

/// Builds the anchor map (home-currency units per one unit of each code)
/// from a provider document. Unusable entries are dropped.
#[must_use]
pub fn anchor_map(document: &RatesDocument, home_code: &str) -> BTreeMap<String, f64> {
    let mut anchors: BTreeMap<String, f64> = document
        .rates
        .iter()
        .filter_map(|(code, entry)| {
            let nominal = entry.nominal.unwrap_or(1.0).max(1.0);
            let anchor = entry.value / nominal;
            is_valid_rate(anchor).then(|| (code.clone(), anchor))
        })
        .collect();
    anchors.insert(home_code.to_string(), 1.0);
    anchors
}

/// Computes base -> quote rates for every requested quote present in the
/// anchor map.
///
/// Quotes that produce a non-finite or non-positive rate are dropped;
/// requested codes absent from the payload are reported back in `missing`
/// rather than failing the batch.
///
/// # Errors
///
/// Fails when the base itself is absent from the anchors, or when nothing
/// usable remains.
pub fn pair_rates(
    anchors: &BTreeMap<String, f64>,
    base_code: &str,
    quote_codes: &[String],
) -> Result<Normalized, ProviderError> {
    let base_anchor = *anchors
        .get(base_code)
        .ok_or_else(|| ProviderError::BaseMissing(base_code.to_string()))?;

    let mut rates = BTreeMap::new();
    let mut missing = Vec::new();
    for quote in quote_codes {
        if quote == base_code {
            continue;
        }
        match anchors.get(quote) {
            Some(quote_anchor) => {
                let rate = base_anchor / quote_anchor;
                if is_valid_rate(rate) {
                    rates.insert(quote.clone(), rate);
                }
            }
            None => missing.push(quote.clone()),
        }
    }

    if rates.is_empty() {
        return Err(ProviderError::EmptyResult);
    }
    Ok(Normalized { rates, missing })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> RatesDocument {
        serde_json::from_str(
            r#"{
                "rates": {
                    "USD": { "value": 90.0, "nominal": 1 },
                    "EUR": { "value": 100.0 },
                    "KZT": { "value": 20.0, "nominal": 100 },
                    "XXX": { "value": -5.0 }
                }
            }"#,
        )
        .unwrap()
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_anchor_map_applies_nominal_and_home() {
        let anchors = anchor_map(&document(), "RUB");
        assert!((anchors["USD"] - 90.0).abs() < 1e-12);
        assert!((anchors["EUR"] - 100.0).abs() < 1e-12);
        // 100 KZT cost 20 home units, so one costs 0.2
        assert!((anchors["KZT"] - 0.2).abs() < 1e-12);
        assert!((anchors["RUB"] - 1.0).abs() < 1e-12);
        // Negative values never make it into the anchors
        assert!(!anchors.contains_key("XXX"));
    }

    #[test]
    fn test_pair_rates_direction() {
        // 1 USD = 90 home, 1 EUR = 100 home => 1 USD = 0.9 EUR
        let anchors = anchor_map(&document(), "RUB");
        let normalized = pair_rates(&anchors, "USD", &codes(&["EUR", "KZT", "RUB"])).unwrap();
        assert!((normalized.rates["EUR"] - 0.9).abs() < 1e-12);
        assert!((normalized.rates["KZT"] - 450.0).abs() < 1e-12);
        assert!((normalized.rates["RUB"] - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_rates_skips_absent_codes() {
        let anchors = anchor_map(&document(), "RUB");
        let normalized = pair_rates(&anchors, "USD", &codes(&["EUR", "GBP"])).unwrap();
        assert_eq!(normalized.rates.len(), 1);
        assert_eq!(normalized.missing, codes(&["GBP"]));
    }

    #[test]
    fn test_pair_rates_ignores_base_itself() {
        let anchors = anchor_map(&document(), "RUB");
        let normalized = pair_rates(&anchors, "USD", &codes(&["USD", "EUR"])).unwrap();
        assert!(!normalized.rates.contains_key("USD"));
    }

    #[test]
    fn test_pair_rates_missing_base() {
        let anchors = anchor_map(&document(), "RUB");
        let err = pair_rates(&anchors, "CHF", &codes(&["EUR"])).unwrap_err();
        assert_eq!(err.reason(), "base_missing");
    }

    #[test]
    fn test_pair_rates_empty_result() {
        let anchors = anchor_map(&document(), "RUB");
        let err = pair_rates(&anchors, "USD", &codes(&["GBP", "CHF"])).unwrap_err();
        assert_eq!(err.reason(), "empty_result");
    }

    #[test]
    fn test_unparseable_document_is_an_error() {
        let result: Result<RatesDocument, _> = serde_json::from_str(r#"{"rates": 3}"#);
        assert!(result.is_err());
    }
}
