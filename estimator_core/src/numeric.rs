//! # Numeric Coercion
//!
//! Every quantity, rate, wage and dollar amount in an estimate is stored the
//! way the operator typed it: a number, a piece of text, or nothing at all.
//! Nothing is ever rejected. Instead each read goes through [`coerce`], which
//! turns whatever is stored into a finite `f64`, using zero for anything blank
//! or unparseable.
//!
//! ## JSON Shape
//!
//! [`NumericField`] serializes transparently, so a document written by the
//! browser version of the tool (where `"quantity": "80"` and
//! `"quantity": 80` both occur) round-trips unchanged:
//!
//! ```json
//! { "quantity": 80, "rate": "7.50", "hours": null }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use estimator_core::numeric::{coerce_str, NumericField};
//!
//! assert_eq!(NumericField::from(7.5).value(), 7.5);
//! assert_eq!(NumericField::from_input(" 12 ").value(), 12.0);
//! assert_eq!(NumericField::from_input("").value(), 0.0);
//! assert_eq!(coerce_str("twelve"), 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// A user-editable numeric value as it is stored in the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    /// A JSON number
    Number(f64),
    /// Text as entered (may or may not parse)
    Text(String),
    /// `null` or missing
    #[default]
    Empty,
}

impl NumericField {
    /// Store raw operator input verbatim.
    pub fn from_input(text: impl Into<String>) -> Self {
        NumericField::Text(text.into())
    }

    /// The coerced value. Always finite.
    pub fn value(&self) -> f64 {
        coerce(self)
    }

    /// True when the field holds nothing, or only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            NumericField::Number(_) => false,
            NumericField::Text(text) => text.trim().is_empty(),
            NumericField::Empty => true,
        }
    }
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        NumericField::Number(value)
    }
}

impl From<&str> for NumericField {
    fn from(text: &str) -> Self {
        NumericField::from_input(text)
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericField::Number(n) => write!(f, "{}", n),
            NumericField::Text(text) => write!(f, "{}", text),
            NumericField::Empty => Ok(()),
        }
    }
}

/// Coerce a stored field into a finite number.
pub fn coerce(field: &NumericField) -> f64 {
    match field {
        NumericField::Number(n) => finite_or_zero(*n),
        NumericField::Text(text) => coerce_str(text),
        NumericField::Empty => 0.0,
    }
}

/// Coerce text using the browser's numeric-string grammar.
///
/// Surrounding whitespace is ignored; decimal, exponent and unsigned
/// `0x`/`0o`/`0b` forms are accepted. Everything else, including values that
/// are not finite, is zero.
pub fn coerce_str(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let parsed = match parse_prefixed_integer(trimmed) {
        Some(value) => Some(value),
        None => trimmed.parse::<f64>().ok(),
    };

    parsed.map(finite_or_zero).unwrap_or(0.0)
}

fn parse_prefixed_integer(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        // "0x" alone or "0xZZ" is not a number at all
        return Some(f64::NAN);
    }
    u64::from_str_radix(digits, radix).ok().map(|v| v as f64)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
