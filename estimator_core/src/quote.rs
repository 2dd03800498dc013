//! # Customer Quote
//!
//! A read-only, price-only projection of an estimate for the customer. It
//! carries the company and customer identity, the title, a date, every line
//! item with its line total, a subtotal per section and a grand total equal
//! to the estimate's revenue.
//!
//! Materials, labor, overhead and profit are internal figures and never
//! appear here. Notes are included only when they contain something other
//! than whitespace.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use estimator_core::estimate::Estimate;
//! use estimator_core::quote::Quote;
//!
//! let estimate = Estimate::starter();
//! let date = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
//! let quote = Quote::from_estimate(&estimate, date);
//!
//! assert_eq!(quote.grand_total, estimate.totals().revenue);
//! println!("{}", quote);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::estimate::{Contact, Estimate, ItemKind, LineItem};
use crate::money::{format_money, format_quantity};
use crate::totals::section_total;

/// One priced row as the customer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub label: String,
    pub quantity: f64,
    pub unit: String,
    pub rate: f64,
    pub line_total: f64,
}

impl From<&LineItem> for QuoteLine {
    fn from(item: &LineItem) -> Self {
        QuoteLine {
            label: item.label.clone(),
            quantity: item.quantity.value(),
            unit: item.unit.clone(),
            rate: item.rate.value(),
            line_total: item.line_total(),
        }
    }
}

/// One section of the quote with its subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSection {
    pub kind: ItemKind,
    pub title: String,
    pub lines: Vec<QuoteLine>,
    pub subtotal: f64,
}

impl QuoteSection {
    fn from_items(kind: ItemKind, items: &[LineItem]) -> Self {
        QuoteSection {
            kind,
            title: kind.display_name().to_string(),
            lines: items.iter().map(QuoteLine::from).collect(),
            subtotal: section_total(items),
        }
    }
}

/// The customer-facing quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub title: String,
    pub date: NaiveDate,
    pub company: Contact,
    pub customer: Contact,
    pub linear: QuoteSection,
    pub count: QuoteSection,
    /// Equal to the estimate's revenue
    pub grand_total: f64,
    pub notes: Option<String>,
}

impl Quote {
    pub fn from_estimate(estimate: &Estimate, date: NaiveDate) -> Self {
        let linear = QuoteSection::from_items(ItemKind::Linear, &estimate.linear);
        let count = QuoteSection::from_items(ItemKind::Count, &estimate.count);
        let grand_total = linear.subtotal + count.subtotal;

        let notes = if estimate.notes.trim().is_empty() {
            None
        } else {
            Some(estimate.notes.clone())
        };

        Quote {
            title: estimate.title.clone(),
            date,
            company: estimate.company.clone(),
            customer: estimate.customer.clone(),
            linear,
            count,
            grand_total,
            notes,
        }
    }

    pub fn sections(&self) -> [&QuoteSection; 2] {
        [&self.linear, &self.count]
    }
}

fn write_contact(f: &mut std::fmt::Formatter<'_>, heading: &str, contact: &Contact) -> std::fmt::Result {
    if contact.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}:", heading)?;
    for field in [&contact.name, &contact.address, &contact.phone, &contact.email] {
        if !field.is_empty() {
            writeln!(f, "  {}", field)?;
        }
    }
    Ok(())
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "QUOTE: {}", self.title)?;
        writeln!(f, "Date: {}", self.date.format("%B %-d, %Y"))?;
        writeln!(f)?;
        write_contact(f, "From", &self.company)?;
        write_contact(f, "Prepared for", &self.customer)?;

        for section in self.sections() {
            writeln!(f)?;
            writeln!(f, "{}", section.title)?;
            for line in &section.lines {
                writeln!(
                    f,
                    "  {:<28} {:>8} {:<8} x {:>10} = {:>12}",
                    line.label,
                    format_quantity(line.quantity),
                    line.unit,
                    format_money(line.rate),
                    format_money(line.line_total),
                )?;
            }
            writeln!(f, "  {:>73}", format!("Subtotal: {}", format_money(section.subtotal)))?;
        }

        writeln!(f)?;
        writeln!(f, "TOTAL: {}", format_money(self.grand_total))?;

        if let Some(notes) = &self.notes {
            writeln!(f)?;
            writeln!(f, "Notes: {}", notes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
    }

    #[test]
    fn test_grand_total_is_revenue() {
        let estimate = Estimate::starter();
        let quote = Quote::from_estimate(&estimate, quote_date());

        assert_eq!(quote.linear.subtotal, 1050.0);
        assert_eq!(quote.count.subtotal, 1620.0);
        assert_eq!(quote.grand_total, estimate.totals().revenue);
        assert_eq!(quote.linear.lines.len(), 2);
        assert_eq!(quote.count.lines[0].line_total, 900.0);
    }

    #[test]
    fn test_internal_figures_are_omitted() {
        let mut estimate = Estimate::starter();
        estimate.notes = "Install before Dec 1".to_string();
        let text = Quote::from_estimate(&estimate, quote_date()).to_string();

        assert!(text.contains("TOTAL: $2,670.00"));
        assert!(text.contains("Notes: Install before Dec 1"));
        assert!(text.contains("November 28, 2025"));
        for internal in ["Labor", "Materials", "Profit", "Margin", "Overhead"] {
            assert!(!text.contains(internal), "quote leaked {}", internal);
        }
    }

    #[test]
    fn test_blank_notes_hidden() {
        let mut estimate = Estimate::starter();
        estimate.notes = "   ".to_string();
        let quote = Quote::from_estimate(&estimate, quote_date());

        assert!(quote.notes.is_none());
        assert!(!quote.to_string().contains("Notes:"));
    }

    #[test]
    fn test_contacts_rendered_when_present() {
        let mut estimate = Estimate::starter();
        estimate.company.name = "Bright Nights Lighting".to_string();
        estimate.customer.name = "Pat Rivera".to_string();
        estimate.customer.address = "12 Holly Ln".to_string();

        let text = Quote::from_estimate(&estimate, quote_date()).to_string();
        assert!(text.contains("From:\n  Bright Nights Lighting"));
        assert!(text.contains("Prepared for:\n  Pat Rivera\n  12 Holly Ln"));
    }

    #[test]
    fn test_coerced_values_in_lines() {
        let mut estimate = Estimate::default();
        estimate.add_line_item(ItemKind::Count);
        estimate.count[0].quantity = "4".into();
        estimate.count[0].rate = "n/a".into();

        let quote = Quote::from_estimate(&estimate, quote_date());
        assert_eq!(quote.count.lines[0].quantity, 4.0);
        assert_eq!(quote.count.lines[0].rate, 0.0);
        assert_eq!(quote.grand_total, 0.0);
    }
}
