//! Price conversion arithmetic.
//!
//! Prices are IEEE-754 doubles. Rounding happens once, at the point a price
//! is produced for a concrete currency - never at storage time - using
//! conventional half-away-from-zero rounding to the currency's configured
//! number of decimal places.

/// Rounds a value half-away-from-zero to the given number of decimal places.
#[must_use]
pub fn round_to_places(value: f64, decimal_places: u32) -> f64 {
    #[allow(clippy::cast_possible_wrap)]
    let factor = 10f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

/// Converts an amount using the given exchange rate and rounds the result
/// to the target currency's decimal places.
#[must_use]
pub fn convert_price(amount: f64, rate: f64, decimal_places: u32) -> f64 {
    round_to_places(amount * rate, decimal_places)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_convert_basic() {
        // 100 * 1.5 = 150
        assert!((convert_price(100.0, 1.5, 2) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_rounds_to_target_precision() {
        // 100 * 0.92 = 92.00 at two decimals
        assert!((convert_price(100.0, 0.92, 2) - 92.0).abs() < 1e-9);
        // 100 * 1.23456789 = 123.456789 -> 123.46
        assert!((convert_price(100.0, 1.234_567_89, 2) - 123.46).abs() < 1e-9);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert!((round_to_places(2.5, 0) - 3.0).abs() < 1e-9);
        assert!((round_to_places(3.5, 0) - 4.0).abs() < 1e-9);
        assert!((round_to_places(-2.5, 0) + 3.0).abs() < 1e-9);
        assert!((round_to_places(2.345, 2) - 2.35).abs() < 1e-9);
    }

    #[test]
    fn test_zero_decimal_currencies() {
        // Yen-style currencies keep no fractional digits
        assert!((convert_price(10.0, 147.33, 0) - 1473.0).abs() < 1e-9);
    }

    proptest! {
        /// Rounded values carry no more than the requested number of
        /// fractional digits.
        #[test]
        fn prop_round_strips_extra_digits(
            value in -1_000_000.0f64..1_000_000.0,
            places in 0u32..=4,
        ) {
            let rounded = round_to_places(value, places);
            #[allow(clippy::cast_possible_wrap)]
            let scaled = rounded * 10f64.powi(places as i32);
            prop_assert!((scaled - scaled.round()).abs() < 1e-4);
        }

        /// Rounding never moves a value by more than half a unit in the
        /// last requested decimal place.
        #[test]
        fn prop_round_is_close(
            value in -1_000_000.0f64..1_000_000.0,
            places in 0u32..=4,
        ) {
            let rounded = round_to_places(value, places);
            #[allow(clippy::cast_possible_wrap)]
            let half_ulp = 0.5 / 10f64.powi(places as i32);
            prop_assert!((rounded - value).abs() <= half_ulp + 1e-9);
        }
    }
}
