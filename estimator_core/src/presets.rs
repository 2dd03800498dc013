//! # Rate Presets
//!
//! A preset is a named rate table with one rate per pricing bucket. Applying
//! a preset rewrites the rate of every row it covers according to the row's
//! classified bucket:
//!
//! - linear rows whose unit is "ft" (any case) get the linear bucket rate;
//!   rows in any other unit are left alone
//! - every count row gets the count bucket rate, whatever its unit
//!
//! The preset choice is not recorded in the estimate, only its effect.
//!
//! ## Built-in Catalog
//!
//! | Preset   | base | steep | bush | smallTree | largeTree | trim | generic |
//! |----------|------|-------|------|-----------|-----------|------|---------|
//! | Budget   | 10   | 12.5  | 30   | 30        | 45        | 35   | 35      |
//! | Standard | 12   | 15    | 35   | 35        | 50        | 40   | 40      |
//! | High-End | 14   | 18    | 40   | 40        | 55        | 50   | 50      |
//!
//! ## Example
//!
//! ```rust
//! use estimator_core::estimate::Estimate;
//! use estimator_core::presets::{apply_preset, PresetCatalog};
//!
//! let catalog = PresetCatalog::builtin();
//! let mut estimate = Estimate::starter();
//!
//! let applied = apply_preset(&mut estimate, catalog.find("High-End").unwrap());
//! assert_eq!(applied.linear_updated, 2);
//! assert_eq!(estimate.linear[1].rate.value(), 18.0); // "2nd Story Roofline"
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{classify_count, classify_linear, CountBucket, LinearBucket};
use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::Estimate;
use crate::numeric::NumericField;

/// Preset selected when nothing else is configured
pub const DEFAULT_PRESET: &str = "Standard";

/// Rates for linear buckets ($/ft)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRates {
    pub base: f64,
    pub steep: f64,
}

impl LinearRates {
    pub fn rate(&self, bucket: LinearBucket) -> f64 {
        match bucket {
            LinearBucket::Base => self.base,
            LinearBucket::Steep => self.steep,
        }
    }
}

/// Rates for count buckets ($/unit)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountRates {
    pub bush: f64,
    pub small_tree: f64,
    pub large_tree: f64,
    pub trim: f64,
    pub generic: f64,
}

impl CountRates {
    pub fn rate(&self, bucket: CountBucket) -> f64 {
        match bucket {
            CountBucket::Bush => self.bush,
            CountBucket::SmallTree => self.small_tree,
            CountBucket::LargeTree => self.large_tree,
            CountBucket::Trim => self.trim,
            CountBucket::Generic => self.generic,
        }
    }
}

/// A named rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub linear: LinearRates,
    pub count: CountRates,
}

impl Preset {
    /// Reject blank names and rates that are negative or not finite.
    pub fn validate(&self) -> EstimateResult<()> {
        if self.name.trim().is_empty() {
            return Err(EstimateError::invalid_input("preset.name", &self.name, "Preset name must not be blank"));
        }

        let linear = LinearBucket::ALL.iter().map(|b| (b.key(), self.linear.rate(*b)));
        let count = CountBucket::ALL.iter().map(|b| (b.key(), self.count.rate(*b)));
        for (bucket, rate) in linear.chain(count) {
            if !rate.is_finite() || rate < 0.0 {
                return Err(EstimateError::invalid_input(
                    format!("{}.{}", self.name, bucket),
                    rate.to_string(),
                    "Preset rates must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

static BUILTIN_PRESETS: Lazy<Vec<Preset>> = Lazy::new(|| {
    vec![
        Preset {
            name: "Budget".to_string(),
            linear: LinearRates { base: 10.0, steep: 12.5 },
            count: CountRates {
                bush: 30.0,
                small_tree: 30.0,
                large_tree: 45.0,
                trim: 35.0,
                generic: 35.0,
            },
        },
        Preset {
            name: "Standard".to_string(),
            linear: LinearRates { base: 12.0, steep: 15.0 },
            count: CountRates {
                bush: 35.0,
                small_tree: 35.0,
                large_tree: 50.0,
                trim: 40.0,
                generic: 40.0,
            },
        },
        Preset {
            name: "High-End".to_string(),
            linear: LinearRates { base: 14.0, steep: 18.0 },
            count: CountRates {
                bush: 40.0,
                small_tree: 40.0,
                large_tree: 55.0,
                trim: 50.0,
                generic: 50.0,
            },
        },
    ]
});

/// Ordered collection of presets with unique (case-insensitive) names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// Budget, Standard and High-End.
    pub fn builtin() -> Self {
        PresetCatalog {
            presets: BUILTIN_PRESETS.clone(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Look up by exact name, then case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.presets.iter().find(|p| p.name.eq_ignore_ascii_case(name)))
    }

    /// Like [`get`](Self::get), but a missing preset is an error.
    pub fn find(&self, name: &str) -> EstimateResult<&Preset> {
        self.get(name).ok_or_else(|| EstimateError::preset_not_found(name))
    }

    /// Add a preset, replacing any existing preset with the same name.
    pub fn upsert(&mut self, preset: Preset) -> EstimateResult<()> {
        preset.validate()?;
        match self.presets.iter_mut().find(|p| p.name.eq_ignore_ascii_case(&preset.name)) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        Ok(())
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        PresetCatalog::builtin()
    }
}

/// How many rows a preset rewrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PresetApplication {
    pub linear_updated: usize,
    pub count_updated: usize,
}

/// Rewrite rates in place from a preset.
pub fn apply_preset(estimate: &mut Estimate, preset: &Preset) -> PresetApplication {
    let mut applied = PresetApplication::default();

    for item in estimate.linear.iter_mut().filter(|item| item.is_feet()) {
        item.rate = NumericField::from(preset.linear.rate(classify_linear(&item.label)));
        applied.linear_updated += 1;
    }

    for item in estimate.count.iter_mut() {
        item.rate = NumericField::from(preset.count.rate(classify_count(&item.label)));
        applied.count_updated += 1;
    }

    debug!(
        preset = %preset.name,
        linear_updated = applied.linear_updated,
        count_updated = applied.count_updated,
        "applied preset"
    );
    applied
}
