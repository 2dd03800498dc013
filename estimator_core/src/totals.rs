//! # Totals Engine
//!
//! Every figure shown for an estimate is derived here from the current
//! document. Nothing is cached; [`Totals::compute`] is cheap and is simply
//! called again after each edit.
//!
//! ## Derivation
//!
//! ```text
//! revenue        = Σ linear qty×rate + Σ count qty×rate
//! materialsAuto  = Σ selected ft rows  qty × clamp(linear rate, 0.50, 0.85)
//!                + Σ selected count rows qty × clamp(strand rate, 10, 16)
//!                  (0 when auto materials are off)
//! materialsTotal = materialsAuto + materialsFlat
//! expenses       = labor + materialsTotal + overhead
//! profit         = revenue - expenses
//! margin         = profit / revenue   (0 when revenue <= 0)
//! ```
//!
//! The material rates are clamped when read, never when stored: a document
//! holding `materialsRateLinear = 2.0` keeps that value, but its totals use
//! 0.85.

use serde::{Deserialize, Serialize};

use crate::estimate::{Estimate, LineItem, LINEAR_MATERIAL_RATE_RANGE, STRAND_MATERIAL_RATE_RANGE};

/// Margin at or above which the estimate is healthy
pub const GOOD_MARGIN: f64 = 0.60;

/// Margin at or above which the estimate is acceptable
pub const WARN_MARGIN: f64 = 0.45;

/// Qualitative margin tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginBadge {
    Good,
    Warn,
    Bad,
}

impl MarginBadge {
    pub fn from_margin(margin: f64) -> Self {
        if margin >= GOOD_MARGIN {
            MarginBadge::Good
        } else if margin >= WARN_MARGIN {
            MarginBadge::Warn
        } else {
            MarginBadge::Bad
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MarginBadge::Good => "good",
            MarginBadge::Warn => "warn",
            MarginBadge::Bad => "bad",
        }
    }
}

impl std::fmt::Display for MarginBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// All derived figures for an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub linear_total: f64,
    pub count_total: f64,
    pub revenue: f64,
    pub auto_materials_linear: f64,
    pub auto_materials_strands: f64,
    pub materials_auto: f64,
    pub materials_flat: f64,
    pub materials_total: f64,
    pub labor_total: f64,
    pub overhead: f64,
    pub expenses: f64,
    pub profit: f64,
    pub margin: f64,
    pub margin_badge: MarginBadge,
}

impl Totals {
    pub fn compute(estimate: &Estimate) -> Self {
        let linear_total = section_total(&estimate.linear);
        let count_total = section_total(&estimate.count);
        let revenue = linear_total + count_total;

        let auto_materials_linear = auto_materials_linear(estimate);
        let auto_materials_strands = auto_materials_strands(estimate);
        let materials_auto = if estimate.materials.auto_enabled {
            auto_materials_linear + auto_materials_strands
        } else {
            0.0
        };
        let materials_flat = estimate.materials.flat.value();
        let materials_total = materials_auto + materials_flat;

        let labor_total: f64 = estimate.laborers.iter().map(|l| l.cost()).sum();
        let overhead = estimate.overhead_flat.value();
        let expenses = labor_total + materials_total + overhead;

        let profit = revenue - expenses;
        let margin = if revenue > 0.0 { profit / revenue } else { 0.0 };

        Totals {
            linear_total,
            count_total,
            revenue,
            auto_materials_linear,
            auto_materials_strands,
            materials_auto,
            materials_flat,
            materials_total,
            labor_total,
            overhead,
            expenses,
            profit,
            margin,
            margin_badge: MarginBadge::from_margin(margin),
        }
    }
}

impl Estimate {
    /// Derive all totals from the current document.
    pub fn totals(&self) -> Totals {
        Totals::compute(self)
    }
}

/// Σ quantity × rate over a section
pub fn section_total(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::line_total).sum()
}

/// Clamp a stored rate into its documented range.
pub fn clamp_rate(rate: f64, (min, max): (f64, f64)) -> f64 {
    rate.min(max).max(min)
}

/// Material cost of selected linear rows measured in feet.
pub fn auto_materials_linear(estimate: &Estimate) -> f64 {
    let rate = clamp_rate(estimate.materials.linear_rate.value(), LINEAR_MATERIAL_RATE_RANGE);
    estimate
        .linear
        .iter()
        .filter(|item| item.selected && item.is_feet())
        .map(|item| item.quantity.value() * rate)
        .sum()
}

/// Material cost of selected count rows.
pub fn auto_materials_strands(estimate: &Estimate) -> f64 {
    let rate = clamp_rate(estimate.materials.strand_rate.value(), STRAND_MATERIAL_RATE_RANGE);
    estimate
        .count
        .iter()
        .filter(|item| item.selected)
        .map(|item| item.quantity.value() * rate)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{ItemKind, Laborer, LineItem};
    use crate::numeric::NumericField;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_starter_scenario() {
        let totals = Estimate::starter().totals();

        assert!(close(totals.linear_total, 1050.0));
        assert!(close(totals.count_total, 20.0 * 45.0 + 8.0 * 30.0 + 12.0 * 30.0 + 3.0 * 40.0));
        assert!(close(totals.count_total, 1620.0));
        assert!(close(totals.revenue, 2670.0));

        // 140 ft × 0.70 and 43 strands × 12
        assert!(close(totals.auto_materials_linear, 98.0));
        assert!(close(totals.auto_materials_strands, 516.0));
        assert!(close(totals.materials_total, 1214.0));
        assert!(close(totals.labor_total, 400.0));
        assert!(close(totals.expenses, 1614.0));
        assert!(close(totals.profit, 1056.0));
        assert!(close(totals.margin, 1056.0 / 2670.0));
        assert_eq!(totals.margin_badge, MarginBadge::Bad);
    }

    #[test]
    fn test_empty_document() {
        let totals = Estimate::default().totals();
        assert_eq!(totals.linear_total, 0.0);
        assert_eq!(totals.count_total, 0.0);
        assert_eq!(totals.revenue, 0.0);
        assert_eq!(totals.margin, 0.0);
        assert_eq!(totals.margin_badge, MarginBadge::Bad);
    }

    #[test]
    fn test_zero_revenue_margin_with_expenses() {
        let mut estimate = Estimate::default();
        estimate.laborers.push(Laborer::new("Solo", 30.0, 10.0));
        estimate.overhead_flat = NumericField::from(150.0);

        let totals = estimate.totals();
        assert_eq!(totals.revenue, 0.0);
        assert_eq!(totals.profit, -450.0);
        assert_eq!(totals.margin, 0.0);
    }

    #[test]
    fn test_revenue_identity_with_garbage_fields() {
        let mut estimate = Estimate::starter();
        estimate.linear[0].quantity = NumericField::from_input("");
        estimate.count[0].rate = NumericField::from_input("lots");

        let totals = estimate.totals();
        assert!(close(totals.revenue, totals.linear_total + totals.count_total));
        assert!(close(totals.linear_total, 450.0));
        assert!(close(totals.count_total, 720.0));
    }

    #[test]
    fn test_linear_rate_clamped_on_read() {
        let mut estimate = Estimate::starter();
        estimate.materials.linear_rate = NumericField::from(2.0);

        let totals = estimate.totals();
        assert!(close(totals.auto_materials_linear, 140.0 * 0.85));
        // The stored value is untouched
        assert_eq!(estimate.materials.linear_rate, NumericField::from(2.0));

        estimate.materials.linear_rate = NumericField::from(0.1);
        assert!(close(estimate.totals().auto_materials_linear, 140.0 * 0.5));
    }

    #[test]
    fn test_strand_rate_clamped_on_read() {
        let mut estimate = Estimate::starter();
        estimate.materials.strand_rate = NumericField::from(40.0);
        assert!(close(estimate.totals().auto_materials_strands, 43.0 * 16.0));

        // Blank coerces to 0, which clamps up to the minimum
        estimate.materials.strand_rate = NumericField::from_input("");
        assert!(close(estimate.totals().auto_materials_strands, 43.0 * 10.0));
    }

    #[test]
    fn test_auto_materials_respects_selection_and_unit() {
        let mut estimate = Estimate::default();
        estimate.materials.auto_enabled = true;
        estimate.materials.linear_rate = NumericField::from(0.7);
        estimate.materials.strand_rate = NumericField::from(12.0);

        let mut unselected = LineItem::new("Eaves", 100.0, "ft", 5.0);
        unselected.selected = false;
        estimate.push_line_item(ItemKind::Linear, unselected);
        estimate.push_line_item(ItemKind::Linear, LineItem::new("Arch", 10.0, "in", 5.0));
        estimate.push_line_item(ItemKind::Linear, LineItem::new("Ridge", 10.0, "Ft", 5.0));

        let mut skipped = LineItem::new("Bushes", 4.0, "strands", 30.0);
        skipped.selected = false;
        estimate.push_line_item(ItemKind::Count, skipped);
        estimate.push_line_item(ItemKind::Count, LineItem::new("Wreath", 2.0, "each", 30.0));

        let totals = estimate.totals();
        assert!(close(totals.auto_materials_linear, 7.0));
        assert!(close(totals.auto_materials_strands, 24.0));
        assert!(close(totals.materials_auto, 31.0));
    }

    #[test]
    fn test_auto_materials_disabled() {
        let mut estimate = Estimate::starter();
        estimate.materials.auto_enabled = false;

        let totals = estimate.totals();
        assert_eq!(totals.materials_auto, 0.0);
        assert!(close(totals.materials_total, 600.0));
        // Components are still reported
        assert!(close(totals.auto_materials_linear, 98.0));
    }

    #[test]
    fn test_margin_badge_tiers() {
        assert_eq!(MarginBadge::from_margin(0.75), MarginBadge::Good);
        assert_eq!(MarginBadge::from_margin(0.60), MarginBadge::Good);
        assert_eq!(MarginBadge::from_margin(0.5999), MarginBadge::Warn);
        assert_eq!(MarginBadge::from_margin(0.45), MarginBadge::Warn);
        assert_eq!(MarginBadge::from_margin(0.10), MarginBadge::Bad);
        assert_eq!(MarginBadge::from_margin(-1.0), MarginBadge::Bad);
    }

    #[test]
    fn test_totals_json() {
        let json = serde_json::to_value(Estimate::starter().totals()).unwrap();
        assert_eq!(json["marginBadge"], "bad");
        assert_eq!(json["revenue"], 2670.0);
    }
}
