//! Plain-text views of the estimate and the preset catalog.

use std::fmt::Write;

use estimator_core::estimate::{Estimate, ItemKind, LineItem};
use estimator_core::money::{format_money, format_percent};
use estimator_core::presets::PresetCatalog;
use estimator_core::totals::Totals;

/// The estimate screen: sections, costs, and the bottom line.
pub fn render_estimate(estimate: &Estimate, totals: &Totals) -> String {
    let mut out = String::new();
    let title = if estimate.title.trim().is_empty() {
        "Untitled estimate"
    } else {
        estimate.title.as_str()
    };
    let _ = writeln!(out, "{}", title);
    if !estimate.customer.name.is_empty() {
        let _ = writeln!(out, "Customer: {}", estimate.customer.name);
    }

    for kind in ItemKind::ALL {
        let subtotal = match kind {
            ItemKind::Linear => totals.linear_total,
            ItemKind::Count => totals.count_total,
        };
        out.push('\n');
        render_section(&mut out, kind.display_name(), estimate.items(kind), subtotal);
    }

    out.push('\n');
    let _ = writeln!(out, "Materials");
    if estimate.materials.auto_enabled {
        let _ = writeln!(
            out,
            "  Auto ({} /ft, {} /strand)     {:>12}  {:>12}",
            estimate.materials.linear_rate,
            estimate.materials.strand_rate,
            format_money(totals.auto_materials_linear),
            format_money(totals.auto_materials_strands),
        );
    } else {
        let _ = writeln!(out, "  Auto                 off");
    }
    let _ = writeln!(out, "  Flat                 {:>12}", format_money(totals.materials_flat));
    let _ = writeln!(out, "  Total                {:>12}", format_money(totals.materials_total));

    out.push('\n');
    let _ = writeln!(out, "Labor");
    for (index, laborer) in estimate.laborers.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}  {:<20} {:>8}/h x {:<6} {:>12}",
            index + 1,
            laborer.name,
            format_money(laborer.wage.value()),
            laborer.hours.value(),
            format_money(laborer.cost()),
        );
    }
    let _ = writeln!(out, "  Total                {:>12}", format_money(totals.labor_total));

    out.push('\n');
    let _ = writeln!(out, "Revenue               {:>12}", format_money(totals.revenue));
    let _ = writeln!(out, "Overhead              {:>12}", format_money(totals.overhead));
    let _ = writeln!(out, "Expenses              {:>12}", format_money(totals.expenses));
    let _ = writeln!(out, "Profit                {:>12}", format_money(totals.profit));
    let _ = writeln!(
        out,
        "Margin                {:>12}  [{}]",
        format_percent(totals.margin),
        totals.margin_badge
    );

    if !estimate.notes.trim().is_empty() {
        let _ = writeln!(out, "\nNotes: {}", estimate.notes);
    }
    out
}

fn render_section(out: &mut String, name: &str, items: &[LineItem], subtotal: f64) {
    let _ = writeln!(out, "{}", name);
    if items.is_empty() {
        let _ = writeln!(out, "  (no items)");
    }
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2} {} {:<24} {:>8} {:<8} {:>10} {:>12}  {}",
            index + 1,
            if item.selected { "[x]" } else { "[ ]" },
            item.label,
            item.quantity.to_string(),
            item.unit,
            format_money(item.rate.value()),
            format_money(item.line_total()),
            short_id(item),
        );
    }
    let _ = writeln!(out, "  Subtotal {:>58}", format_money(subtotal));
}

/// Enough of the id to address the row from the command line.
fn short_id(item: &LineItem) -> String {
    item.id.simple().to_string()[..8].to_string()
}

/// The preset list, marking the one `apply-preset` uses by default.
pub fn render_presets(catalog: &PresetCatalog, selected: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "   {:<12} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>7}",
        "Preset", "base", "steep", "bush", "small", "large", "trim", "generic"
    );
    for preset in catalog.iter() {
        let _ = writeln!(
            out,
            " {} {:<12} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>7}",
            if preset.name == selected { "*" } else { " " },
            preset.name,
            preset.linear.base,
            preset.linear.steep,
            preset.count.bush,
            preset.count.small_tree,
            preset.count.large_tree,
            preset.count.trim,
            preset.count.generic,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_starter() {
        let estimate = Estimate::starter();
        let text = render_estimate(&estimate, &estimate.totals());

        assert!(text.starts_with("Medium Tier\n"));
        assert!(text.contains("1st Story Roofline"));
        assert!(text.contains("$1,050.00"));
        assert!(text.contains("$1,056.00"));
        assert!(text.contains("39.6%"));
        assert!(text.contains("[bad]"));
        assert!(!text.contains("Notes:"));
    }

    #[test]
    fn test_render_keeps_raw_text() {
        let mut estimate = Estimate::starter();
        estimate.count[0].quantity = "lots".into();
        estimate.notes = "Gate code 4471".to_string();
        let text = render_estimate(&estimate, &estimate.totals());

        assert!(text.contains("lots"));
        assert!(text.contains("Notes: Gate code 4471"));
    }

    #[test]
    fn test_render_presets_marks_selection() {
        let text = render_presets(&PresetCatalog::builtin(), "Budget");
        let budget = text.lines().find(|l| l.contains("Budget")).unwrap();
        assert!(budget.starts_with(" *"));
        let standard = text.lines().find(|l| l.contains("Standard")).unwrap();
        assert!(!standard.starts_with(" *"));
    }
}
