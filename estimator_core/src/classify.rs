//! # Label Classification
//!
//! Maps a line item's free-text label onto the pricing bucket a preset uses
//! for it. Matching is a case-insensitive substring test. Classification is
//! only consulted when a preset is applied; totals never depend on it.

use serde::{Deserialize, Serialize};

/// Pricing bucket for linear rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinearBucket {
    /// Ordinary single-story roofline
    Base,
    /// Second story, steep pitch or tile roof
    Steep,
}

impl LinearBucket {
    pub const ALL: [LinearBucket; 2] = [LinearBucket::Base, LinearBucket::Steep];

    pub fn key(&self) -> &'static str {
        match self {
            LinearBucket::Base => "base",
            LinearBucket::Steep => "steep",
        }
    }
}

/// Pricing bucket for count rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CountBucket {
    Bush,
    SmallTree,
    LargeTree,
    /// Trim, wreaths, garland and other decor
    Trim,
    Generic,
}

impl CountBucket {
    pub const ALL: [CountBucket; 5] = [
        CountBucket::Bush,
        CountBucket::SmallTree,
        CountBucket::LargeTree,
        CountBucket::Trim,
        CountBucket::Generic,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CountBucket::Bush => "bush",
            CountBucket::SmallTree => "smallTree",
            CountBucket::LargeTree => "largeTree",
            CountBucket::Trim => "trim",
            CountBucket::Generic => "generic",
        }
    }
}

const STEEP_KEYWORDS: [&str; 8] = [
    "2nd",
    "second",
    "steep",
    "tile",
    "two-story",
    "two story",
    "2 story",
    "second story",
];

const TRIM_KEYWORDS: [&str; 4] = ["trim", "wreath", "garland", "decor"];

/// Classify a linear row's label.
///
/// ```rust
/// use estimator_core::classify::{classify_linear, LinearBucket};
///
/// assert_eq!(classify_linear("2nd Story Roofline"), LinearBucket::Steep);
/// assert_eq!(classify_linear("Front gutter"), LinearBucket::Base);
/// ```
pub fn classify_linear(label: &str) -> LinearBucket {
    let label = label.to_lowercase();
    if STEEP_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        LinearBucket::Steep
    } else {
        LinearBucket::Base
    }
}

/// Classify a count row's label. The first matching rule wins, so
/// "Large Trim Tree" is a large tree, not trim.
///
/// ```rust
/// use estimator_core::classify::{classify_count, CountBucket};
///
/// assert_eq!(classify_count("Large Decorative Tree"), CountBucket::LargeTree);
/// assert_eq!(classify_count("Porch garland"), CountBucket::Trim);
/// ```
pub fn classify_count(label: &str) -> CountBucket {
    let label = label.to_lowercase();
    let has = |kw: &str| label.contains(kw);

    if has("large") && has("tree") {
        CountBucket::LargeTree
    } else if has("small") && has("tree") {
        CountBucket::SmallTree
    } else if has("bush") {
        CountBucket::Bush
    } else if TRIM_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        CountBucket::Trim
    } else {
        CountBucket::Generic
    }
}
