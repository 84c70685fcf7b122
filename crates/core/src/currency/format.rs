//! Storefront amount formatting.
//!
//! Formatting follows the display metadata an operator configures per
//! currency: symbol, symbol placement, separators, and decimal precision.

use serde::{Deserialize, Serialize};

use super::convert::round_to_places;

/// Where the currency symbol is placed relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// Symbol before the amount ("$ 10.00").
    Before,
    /// Symbol after the amount ("10.00 ₸").
    After,
}

/// Display metadata for rendering amounts in a currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyStyle {
    /// Currency symbol.
    pub symbol: String,
    /// Number of decimal places to render.
    pub decimal_places: u32,
    /// Symbol placement.
    pub symbol_position: SymbolPosition,
    /// Separator between thousands groups.
    pub thousands_separator: String,
    /// Separator before the fractional part.
    pub decimal_separator: String,
}

/// Formats an amount according to the currency's display metadata.
#[must_use]
pub fn format_amount(amount: f64, style: &CurrencyStyle) -> String {
    let rounded = round_to_places(amount, style.decimal_places);
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    #[allow(clippy::cast_possible_wrap)]
    let factor = 10f64.powi(style.decimal_places as i32);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = (abs * factor).round() as u64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let divisor = factor as u64;
    let (int_part, frac_part) = if style.decimal_places == 0 {
        (total, 0)
    } else {
        (total / divisor, total % divisor)
    };

    let mut grouped = String::new();
    let digits = int_part.to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&style.thousands_separator);
        }
        grouped.push(ch);
    }

    let mut body = grouped;
    if style.decimal_places > 0 {
        body.push_str(&style.decimal_separator);
        body.push_str(&format!(
            "{frac_part:0width$}",
            width = style.decimal_places as usize
        ));
    }
    if negative {
        body.insert(0, '-');
    }

    match style.symbol_position {
        SymbolPosition::Before => format!("{} {}", style.symbol, body),
        SymbolPosition::After => format!("{} {}", body, style.symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(symbol: &str, places: u32, position: SymbolPosition) -> CurrencyStyle {
        CurrencyStyle {
            symbol: symbol.to_string(),
            decimal_places: places,
            symbol_position: position,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }

    #[test]
    fn test_format_symbol_before() {
        let usd = style("$", 2, SymbolPosition::Before);
        assert_eq!(format_amount(1_234_567.891, &usd), "$ 1,234,567.89");
    }

    #[test]
    fn test_format_symbol_after() {
        let kzt = style("₸", 2, SymbolPosition::After);
        assert_eq!(format_amount(500.0, &kzt), "500.00 ₸");
    }

    #[test]
    fn test_format_zero_decimals() {
        let jpy = style("¥", 0, SymbolPosition::Before);
        assert_eq!(format_amount(98_765.4, &jpy), "¥ 98,765");
    }

    #[test]
    fn test_format_custom_separators() {
        let eur = CurrencyStyle {
            symbol: "€".to_string(),
            decimal_places: 2,
            symbol_position: SymbolPosition::After,
            thousands_separator: " ".to_string(),
            decimal_separator: ",".to_string(),
        };
        assert_eq!(format_amount(9_876.5, &eur), "9 876,50 €");
    }

    #[test]
    fn test_format_negative() {
        let usd = style("$", 2, SymbolPosition::Before);
        assert_eq!(format_amount(-42.5, &usd), "$ -42.50");
    }
}
