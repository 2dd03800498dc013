//! # Display Formatting
//!
//! The estimator works in a single display currency (US dollars). Amounts are
//! plain `f64` everywhere; these helpers only decide how they look.
//!
//! ```rust
//! use estimator_core::money::{format_money, format_percent};
//!
//! assert_eq!(format_money(2970.0), "$2,970.00");
//! assert_eq!(format_money(-150.5), "-$150.50");
//! assert_eq!(format_percent(0.4566), "45.7%");
//! ```

/// Format a dollar amount with thousands separators and two decimals.
///
/// Non-finite input renders as `$0`.
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let cents = (amount.abs() * 100.0).round();
    let negative = amount < 0.0 && cents > 0.0;
    // Whole dollars stay in f64; amounts past u64 range still print every digit
    let (dollars, remainder) = if cents.is_finite() {
        ((cents / 100.0).trunc(), cents % 100.0)
    } else {
        (amount.abs().trunc(), 0.0)
    };

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        group_thousands(&format!("{:.0}", dollars)),
        remainder as u8
    )
}

/// Format a ratio as a percentage with one decimal place.
pub fn format_percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", ratio * 100.0)
}

/// Format a quantity the way it was most likely entered: no trailing ".0".
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{:.0}", quantity)
    } else {
        format!("{}", quantity)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(7.5), "$7.50");
        assert_eq!(format_money(1050.0), "$1,050.00");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-1356.0), "-$1,356.00");
    }

    #[test]
    fn test_format_money_rounding() {
        assert_eq!(format_money(0.005), "$0.01");
        assert_eq!(format_money(19.999), "$20.00");
        assert_eq!(format_money(-0.001), "$0.00");
    }

    #[test]
    fn test_format_money_beyond_u64() {
        assert_eq!(format_money(1e20), "$100,000,000,000,000,000,000.00");
        assert_eq!(format_money(-1e20), "-$100,000,000,000,000,000,000.00");

        let max = format_money(f64::MAX);
        assert!(max.starts_with("$179,769,313,486,231,570,"));
        assert!(max.ends_with(".00"));
    }

    #[test]
    fn test_format_money_non_finite() {
        assert_eq!(format_money(f64::NAN), "$0");
        assert_eq!(format_money(f64::INFINITY), "$0");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(0.6), "60.0%");
        assert_eq!(format_percent(-0.25), "-25.0%");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(80.0), "80");
        assert_eq!(format_quantity(12.5), "12.5");
    }
}
