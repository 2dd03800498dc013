//! # estimator_core - Holiday Lighting Estimate Engine
//!
//! `estimator_core` holds everything behind the estimator except the screen:
//! the estimate document, its derived totals, rate presets, the
//! customer-facing quote, and persistence. All documents and results are
//! JSON-serializable, and the persisted shape matches what earlier versions
//! of the tool wrote, so old saves and exports load unchanged.
//!
//! ## Design Philosophy
//!
//! - **Forgiving input**: numeric fields keep whatever the operator typed;
//!   values are coerced on read and bad input counts as zero
//! - **Derived, not stored**: totals are recomputed from the document every
//!   time and never saved
//! - **Whole-document updates**: each edit replaces the document and writes
//!   it back through a [`store::KeyValueStore`]
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use estimator_core::estimate::Estimate;
//! use estimator_core::totals::MarginBadge;
//!
//! let estimate = Estimate::starter();
//! let totals = estimate.totals();
//!
//! assert_eq!(totals.revenue, 2670.0);
//! assert_eq!(totals.expenses, 1614.0);
//! assert_eq!(totals.margin_badge, MarginBadge::Bad);
//! ```
//!
//! ## Modules
//!
//! - [`estimate`] - The estimate document: line items, laborers, contacts
//! - [`numeric`] - Text-or-number fields and their coercion rules
//! - [`totals`] - Revenue, materials, labor, profit and margin
//! - [`classify`] - Label keyword buckets used by presets
//! - [`presets`] - Rate presets and the preset catalog
//! - [`quote`] - Price-only quote projection
//! - [`pdf`] - Quote PDF rendering via Typst
//! - [`money`] - Currency and percentage formatting
//! - [`session`] - Load-at-start, save-after-mutation editing session
//! - [`store`] - Key-value persistence bridge
//! - [`file_io`] - Atomic writes, locking, export and import
//! - [`config`] - TOML configuration
//! - [`errors`] - Structured error types

pub mod classify;
pub mod config;
pub mod errors;
pub mod estimate;
pub mod file_io;
pub mod money;
pub mod numeric;
pub mod pdf;
pub mod presets;
pub mod quote;
pub mod session;
pub mod store;
pub mod totals;

// Re-export commonly used types at crate root for convenience
pub use errors::{EstimateError, EstimateResult};
pub use estimate::{Contact, Estimate, ItemKind, Laborer, LineItem};
pub use numeric::NumericField;
pub use presets::{Preset, PresetCatalog};
pub use quote::Quote;
pub use session::{ActiveView, Session, SessionOptions};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use totals::{MarginBadge, Totals};
