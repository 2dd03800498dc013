//! # Estimate Document
//!
//! The `Estimate` struct is the root container for everything the operator
//! enters. It is persisted and exported wholesale as JSON, using the same
//! camelCase keys as the browser version of the tool so that its exports
//! import unchanged.
//!
//! ## Structure
//!
//! ```text
//! Estimate
//! ├── title, notes
//! ├── company / customer: Contact
//! ├── linear: Vec<LineItem>   (measured footage)
//! ├── count: Vec<LineItem>    (strands, wreaths, ...)
//! ├── materials: MaterialsSettings (flattened into the top level)
//! ├── overheadFlat
//! └── laborers: Vec<Laborer>
//! ```
//!
//! Totals are never stored; see [`crate::totals`].
//!
//! ## Example
//!
//! ```rust
//! use estimator_core::estimate::{Estimate, ItemKind};
//!
//! let mut estimate = Estimate::starter();
//! let id = estimate.add_line_item(ItemKind::Linear);
//! assert_eq!(estimate.items(ItemKind::Linear).len(), 3);
//!
//! estimate.remove_line_item(ItemKind::Linear, &id);
//! assert_eq!(estimate.items(ItemKind::Linear).len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::numeric::NumericField;

/// Documented bounds for the per-foot linear material rate ($/ft).
pub const LINEAR_MATERIAL_RATE_RANGE: (f64, f64) = (0.50, 0.85);

/// Documented bounds for the per-strand material rate ($/strand).
pub const STRAND_MATERIAL_RATE_RANGE: (f64, f64) = (10.0, 16.0);

/// Wage for a newly added laborer ($/hr)
pub const DEFAULT_WAGE: f64 = 25.0;

/// Hours for a newly added laborer
pub const DEFAULT_HOURS: f64 = 8.0;

/// The two line-item collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Priced by measured length
    Linear,
    /// Priced per unit (strand, wreath, ...)
    Count,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Linear, ItemKind::Count];

    /// Unit given to rows created in this section
    pub fn default_unit(&self) -> &'static str {
        match self {
            ItemKind::Linear => "ft",
            ItemKind::Count => "strands",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemKind::Linear => "Linear Items (ft)",
            ItemKind::Count => "Count-Based Items (per item/strand)",
        }
    }

    /// Lower-case name used in commands and error messages
    pub fn key(&self) -> &'static str {
        match self {
            ItemKind::Linear => "linear",
            ItemKind::Count => "count",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One priced row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Include this row in the auto-materials calculation
    #[serde(default)]
    pub selected: bool,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub quantity: NumericField,

    /// Free text, e.g. "ft" or "strands"
    #[serde(default)]
    pub unit: String,

    /// Dollars per unit
    #[serde(default)]
    pub rate: NumericField,
}

impl LineItem {
    /// A blank row as created by "add row".
    pub fn blank(unit: impl Into<String>) -> Self {
        LineItem {
            id: Uuid::new_v4(),
            selected: true,
            label: String::new(),
            quantity: NumericField::from(0.0),
            unit: unit.into(),
            rate: NumericField::from(0.0),
        }
    }

    /// A selected row with the given values.
    pub fn new(label: impl Into<String>, quantity: f64, unit: impl Into<String>, rate: f64) -> Self {
        LineItem {
            id: Uuid::new_v4(),
            selected: true,
            label: label.into(),
            quantity: NumericField::from(quantity),
            unit: unit.into(),
            rate: NumericField::from(rate),
        }
    }

    /// quantity × rate, both coerced
    pub fn line_total(&self) -> f64 {
        self.quantity.value() * self.rate.value()
    }

    /// Whether the unit is feet ("ft", any case)
    pub fn is_feet(&self) -> bool {
        self.unit.to_lowercase() == "ft"
    }
}

/// A crew member billed by the hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laborer {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(default)]
    pub name: String,

    /// Dollars per hour
    #[serde(default)]
    pub wage: NumericField,

    #[serde(default)]
    pub hours: NumericField,
}

impl Laborer {
    pub fn new(name: impl Into<String>, wage: f64, hours: f64) -> Self {
        Laborer {
            id: Uuid::new_v4(),
            name: name.into(),
            wage: NumericField::from(wage),
            hours: NumericField::from(hours),
        }
    }

    /// wage × hours, both coerced
    pub fn cost(&self) -> f64 {
        self.wage.value() * self.hours.value()
    }
}

/// Name and contact details for the company or the customer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.phone.is_empty() && self.email.is_empty() && self.address.is_empty()
    }
}

/// Material cost settings.
///
/// The rates are stored exactly as entered, even outside their documented
/// ranges. Clamping happens when totals are derived.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialsSettings {
    /// Derive material cost from selected rows
    #[serde(rename = "materialsAutoEnabled")]
    pub auto_enabled: bool,

    /// $/ft for selected linear rows in feet
    #[serde(rename = "materialsRateLinear")]
    pub linear_rate: NumericField,

    /// $/strand for selected count rows
    #[serde(rename = "materialsRateStrand")]
    pub strand_rate: NumericField,

    /// Manually entered material cost
    #[serde(rename = "materialsFlat")]
    pub flat: NumericField,
}

/// Root estimate document.
///
/// `Default` is an empty document (what missing keys fall back to on
/// import); use [`Estimate::starter`] for the built-in template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Estimate {
    pub title: String,
    pub notes: String,
    pub company: Contact,
    pub customer: Contact,
    pub linear: Vec<LineItem>,
    pub count: Vec<LineItem>,
    #[serde(flatten)]
    pub materials: MaterialsSettings,
    pub overhead_flat: NumericField,
    pub laborers: Vec<Laborer>,
}

impl Estimate {
    /// The built-in starter template.
    pub fn starter() -> Self {
        Estimate {
            title: "Medium Tier".to_string(),
            notes: String::new(),
            company: Contact::default(),
            customer: Contact::default(),
            linear: vec![
                LineItem::new("1st Story Roofline", 80.0, "ft", 7.5),
                LineItem::new("2nd Story Roofline", 60.0, "ft", 7.5),
            ],
            count: vec![
                LineItem::new("Large Trees", 20.0, "strands", 45.0),
                LineItem::new("Bushes", 8.0, "strands", 30.0),
                LineItem::new("Small Trees", 12.0, "strands", 30.0),
                LineItem::new("Decorative Trim", 3.0, "strands", 40.0),
            ],
            materials: MaterialsSettings {
                auto_enabled: true,
                linear_rate: NumericField::from(0.7),
                strand_rate: NumericField::from(12.0),
                flat: NumericField::from(600.0),
            },
            overhead_flat: NumericField::from(0.0),
            laborers: vec![
                Laborer::new("Laborer 1", DEFAULT_WAGE, DEFAULT_HOURS),
                Laborer::new("Laborer 2", DEFAULT_WAGE, DEFAULT_HOURS),
            ],
        }
    }

    /// The starter template with the operator's company filled in.
    pub fn starter_for(company: &Contact) -> Self {
        Estimate {
            company: company.clone(),
            ..Estimate::starter()
        }
    }

    pub fn items(&self, kind: ItemKind) -> &[LineItem] {
        match kind {
            ItemKind::Linear => &self.linear,
            ItemKind::Count => &self.count,
        }
    }

    pub fn items_mut(&mut self, kind: ItemKind) -> &mut Vec<LineItem> {
        match kind {
            ItemKind::Linear => &mut self.linear,
            ItemKind::Count => &mut self.count,
        }
    }

    /// Append a blank row to a section and return its id.
    pub fn add_line_item(&mut self, kind: ItemKind) -> Uuid {
        self.push_line_item(kind, LineItem::blank(kind.default_unit()))
    }

    /// Append an existing row to a section and return its id.
    pub fn push_line_item(&mut self, kind: ItemKind, item: LineItem) -> Uuid {
        let id = item.id;
        self.items_mut(kind).push(item);
        id
    }

    /// Remove a row by id.
    ///
    /// Returns the removed row if it existed.
    pub fn remove_line_item(&mut self, kind: ItemKind, id: &Uuid) -> Option<LineItem> {
        let items = self.items_mut(kind);
        let index = items.iter().position(|item| &item.id == id)?;
        Some(items.remove(index))
    }

    pub fn line_item(&self, kind: ItemKind, id: &Uuid) -> Option<&LineItem> {
        self.items(kind).iter().find(|item| &item.id == id)
    }

    pub fn line_item_mut(&mut self, kind: ItemKind, id: &Uuid) -> Option<&mut LineItem> {
        self.items_mut(kind).iter_mut().find(|item| &item.id == id)
    }

    /// Append a laborer named after their position ("Laborer 3") at the
    /// default wage and hours.
    pub fn add_laborer(&mut self) -> Uuid {
        let laborer = Laborer::new(
            format!("Laborer {}", self.laborers.len() + 1),
            DEFAULT_WAGE,
            DEFAULT_HOURS,
        );
        let id = laborer.id;
        self.laborers.push(laborer);
        id
    }

    pub fn remove_laborer(&mut self, id: &Uuid) -> Option<Laborer> {
        let index = self.laborers.iter().position(|l| &l.id == id)?;
        Some(self.laborers.remove(index))
    }

    pub fn laborer_mut(&mut self, id: &Uuid) -> Option<&mut Laborer> {
        self.laborers.iter_mut().find(|l| &l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_template() {
        let estimate = Estimate::starter();
        assert_eq!(estimate.title, "Medium Tier");
        assert_eq!(estimate.linear.len(), 2);
        assert_eq!(estimate.count.len(), 4);
        assert_eq!(estimate.laborers.len(), 2);
        assert!(estimate.materials.auto_enabled);
        assert_eq!(estimate.materials.flat.value(), 600.0);
        assert!(estimate.linear.iter().chain(&estimate.count).all(|item| item.selected));
    }

    #[test]
    fn test_line_total_with_empty_strings() {
        let mut item = LineItem::new("Roofline", 80.0, "ft", 7.5);
        assert_eq!(item.line_total(), 600.0);

        item.quantity = NumericField::from_input("");
        assert_eq!(item.line_total(), 0.0);

        item.quantity = NumericField::from_input("10");
        item.rate = NumericField::from_input("");
        assert_eq!(item.line_total(), 0.0);
    }

    #[test]
    fn test_add_row_defaults() {
        let mut estimate = Estimate::default();
        let linear_id = estimate.add_line_item(ItemKind::Linear);
        let count_id = estimate.add_line_item(ItemKind::Count);

        let linear = estimate.line_item(ItemKind::Linear, &linear_id).unwrap();
        assert!(linear.selected);
        assert_eq!(linear.unit, "ft");
        assert_eq!(linear.label, "");
        assert_eq!(linear.line_total(), 0.0);

        let count = estimate.line_item(ItemKind::Count, &count_id).unwrap();
        assert_eq!(count.unit, "strands");
    }

    #[test]
    fn test_remove_unknown_row_is_noop() {
        let mut estimate = Estimate::starter();
        assert!(estimate.remove_line_item(ItemKind::Count, &Uuid::new_v4()).is_none());
        assert_eq!(estimate.count.len(), 4);
    }

    #[test]
    fn test_add_laborer_numbering() {
        let mut estimate = Estimate::starter();
        let id = estimate.add_laborer();
        let laborer = estimate.laborers.iter().find(|l| l.id == id).unwrap();
        assert_eq!(laborer.name, "Laborer 3");
        assert_eq!(laborer.cost(), 200.0);

        assert!(estimate.remove_laborer(&id).is_some());
        assert_eq!(estimate.laborers.len(), 2);
    }

    #[test]
    fn test_is_feet_ignores_case_only() {
        assert!(LineItem::new("a", 1.0, "FT", 1.0).is_feet());
        assert!(LineItem::new("a", 1.0, "Ft", 1.0).is_feet());
        assert!(!LineItem::new("a", 1.0, "feet", 1.0).is_feet());
        assert!(!LineItem::new("a", 1.0, " ft", 1.0).is_feet());
    }

    #[test]
    fn test_serialized_keys_match_browser_document() {
        let json = serde_json::to_value(Estimate::starter()).unwrap();
        for key in [
            "title",
            "notes",
            "linear",
            "count",
            "materialsFlat",
            "materialsAutoEnabled",
            "materialsRateLinear",
            "materialsRateStrand",
            "overheadFlat",
            "laborers",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert!(json.get("materials").is_none());
    }

    #[test]
    fn test_browser_export_parses() {
        let raw = r#"{
            "title": "Corner lot",
            "linear": [
                { "id": "0b6c1f4e-7d0a-4a5e-9c43-5f0b8e1d2a11", "selected": true,
                  "label": "Gutter", "quantity": "120", "unit": "ft", "rate": 9 }
            ],
            "count": [],
            "materialsFlat": "",
            "materialsAutoEnabled": true,
            "materialsRateLinear": "0.6",
            "materialsRateStrand": 12,
            "overheadFlat": 0,
            "laborers": [],
            "notes": "Gate code 4411"
        }"#;

        let estimate: Estimate = serde_json::from_str(raw).unwrap();
        assert_eq!(estimate.title, "Corner lot");
        assert_eq!(estimate.linear[0].line_total(), 1080.0);
        assert_eq!(estimate.materials.linear_rate.value(), 0.6);
        assert!(estimate.company.is_empty());
    }

    #[test]
    fn test_missing_keys_take_empty_defaults() {
        let estimate: Estimate = serde_json::from_str(r#"{ "linear": [ { "label": "Eaves" } ] }"#).unwrap();
        assert_eq!(estimate.title, "");
        assert!(!estimate.materials.auto_enabled);
        assert_eq!(estimate.linear[0].quantity, NumericField::Empty);
        assert!(!estimate.linear[0].selected);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(serde_json::from_str::<Estimate>(r#"{ "linear": "not a list" }"#).is_err());
    }
}
