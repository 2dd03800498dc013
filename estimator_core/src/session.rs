//! # Editing Session
//!
//! A `Session` owns the current estimate and the store it is mirrored to.
//! The contract is simple:
//!
//! - **load at start**: [`Session::open`] reads the stored document once;
//!   an absent, unreadable or unparsable entry means the starter template
//! - **save after mutation**: every edit produces a new document that
//!   replaces the old one, then the whole document is written back
//!
//! Writes are best effort. A failed write is logged and the in-memory
//! document stays as edited. A failed import leaves the document untouched
//! and returns the error for the front end to show.
//!
//! ## Example
//!
//! ```rust
//! use estimator_core::estimate::ItemKind;
//! use estimator_core::session::{Session, SessionOptions};
//! use estimator_core::store::MemoryStore;
//!
//! let mut session = Session::open(MemoryStore::new(), SessionOptions::default());
//! assert_eq!(session.totals().revenue, 2670.0);
//!
//! let id = session.add_line_item(ItemKind::Count);
//! session.edit_line_item(ItemKind::Count, &id, |item| {
//!     item.label = "Porch wreath".to_string();
//!     item.quantity = "2".into();
//!     item.rate = "25".into();
//! })?;
//! assert_eq!(session.totals().revenue, 2720.0);
//! # Ok::<(), estimator_core::errors::EstimateError>(())
//! ```

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LoadedConfig;
use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::{Contact, Estimate, ItemKind, Laborer, LineItem};
use crate::file_io::{self, export_file_name, export_json, parse_estimate};
use crate::presets::{apply_preset, PresetApplication, PresetCatalog, DEFAULT_PRESET};
use crate::quote::Quote;
use crate::store::{KeyValueStore, DEFAULT_STORAGE_KEY};
use crate::totals::Totals;

/// Question asked before a reset
pub const RESET_PROMPT: &str = "Reset to starter template? This will replace your current inputs.";

/// Which screen the front end is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    #[default]
    Estimate,
    Quote,
}

/// Transient UI state. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub view: ActiveView,
    /// Preset chosen for the next "apply"
    pub preset: String,
}

/// How a session is set up.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub storage_key: String,
    pub catalog: PresetCatalog,
    pub default_preset: String,
    /// Company identity placed into the starter template
    pub company: Contact,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            catalog: PresetCatalog::builtin(),
            default_preset: DEFAULT_PRESET.to_string(),
            company: Contact::default(),
        }
    }
}

impl From<&LoadedConfig> for SessionOptions {
    fn from(loaded: &LoadedConfig) -> Self {
        SessionOptions {
            storage_key: loaded.config.storage_key.clone(),
            catalog: loaded.catalog.clone(),
            default_preset: loaded.config.default_preset.clone(),
            company: loaded.config.company.clone(),
        }
    }
}

/// An export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub contents: String,
}

pub struct Session<S: KeyValueStore> {
    estimate: Estimate,
    store: S,
    options: SessionOptions,
    view: ViewState,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the stored estimate, or start from the template.
    pub fn open(store: S, options: SessionOptions) -> Self {
        let estimate = load_or_default(&store, &options.storage_key, || Estimate::starter_for(&options.company));
        let view = initial_view(&options);
        Session {
            estimate,
            store,
            options,
            view,
        }
    }

    pub fn estimate(&self) -> &Estimate {
        &self.estimate
    }

    pub fn totals(&self) -> Totals {
        self.estimate.totals()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.options.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Edit a copy of the document, replace the current one with it, and
    /// persist.
    pub fn update<R>(&mut self, edit: impl FnOnce(&mut Estimate) -> R) -> R {
        let mut next = self.estimate.clone();
        let result = edit(&mut next);
        self.replace(next);
        result
    }

    /// Like [`update`](Self::update), but an `Err` discards the edit.
    pub fn try_update<R>(&mut self, edit: impl FnOnce(&mut Estimate) -> EstimateResult<R>) -> EstimateResult<R> {
        let mut next = self.estimate.clone();
        let result = edit(&mut next)?;
        self.replace(next);
        Ok(result)
    }

    pub fn add_line_item(&mut self, kind: ItemKind) -> Uuid {
        self.update(|estimate| estimate.add_line_item(kind))
    }

    pub fn push_line_item(&mut self, kind: ItemKind, item: LineItem) -> Uuid {
        self.update(|estimate| estimate.push_line_item(kind, item))
    }

    pub fn remove_line_item(&mut self, kind: ItemKind, id: &Uuid) -> EstimateResult<LineItem> {
        self.try_update(|estimate| {
            estimate
                .remove_line_item(kind, id)
                .ok_or_else(|| EstimateError::item_not_found(kind.key(), id.to_string()))
        })
    }

    pub fn edit_line_item(&mut self, kind: ItemKind, id: &Uuid, edit: impl FnOnce(&mut LineItem)) -> EstimateResult<()> {
        self.try_update(|estimate| {
            let item = estimate
                .line_item_mut(kind, id)
                .ok_or_else(|| EstimateError::item_not_found(kind.key(), id.to_string()))?;
            edit(item);
            Ok(())
        })
    }

    pub fn add_laborer(&mut self) -> Uuid {
        self.update(Estimate::add_laborer)
    }

    pub fn remove_laborer(&mut self, id: &Uuid) -> EstimateResult<Laborer> {
        self.try_update(|estimate| {
            estimate
                .remove_laborer(id)
                .ok_or_else(|| EstimateError::item_not_found("labor", id.to_string()))
        })
    }

    pub fn edit_laborer(&mut self, id: &Uuid, edit: impl FnOnce(&mut Laborer)) -> EstimateResult<()> {
        self.try_update(|estimate| {
            let laborer = estimate
                .laborer_mut(id)
                .ok_or_else(|| EstimateError::item_not_found("labor", id.to_string()))?;
            edit(laborer);
            Ok(())
        })
    }

    /// Choose the preset the next [`apply_selected_preset`](Self::apply_selected_preset) uses.
    pub fn select_preset(&mut self, name: &str) -> EstimateResult<()> {
        let preset = self.options.catalog.find(name)?;
        self.view.preset = preset.name.clone();
        Ok(())
    }

    pub fn apply_selected_preset(&mut self) -> EstimateResult<PresetApplication> {
        let preset = self.options.catalog.find(&self.view.preset)?.clone();
        Ok(self.update(|estimate| apply_preset(estimate, &preset)))
    }

    /// Select a preset by name and apply it.
    pub fn apply_preset(&mut self, name: &str) -> EstimateResult<PresetApplication> {
        self.select_preset(name)?;
        self.apply_selected_preset()
    }

    pub fn set_view(&mut self, view: ActiveView) {
        self.view.view = view;
    }

    /// Replace the document with the starter template if `confirm` agrees.
    ///
    /// Also restores the initial view and preset choice. Returns whether the
    /// reset happened.
    pub fn reset(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(RESET_PROMPT) {
            debug!("reset declined");
            return false;
        }

        let starter = Estimate::starter_for(&self.options.company);
        self.replace(starter);
        self.view = initial_view(&self.options);
        info!("estimate reset to starter template");
        true
    }

    pub fn export(&self) -> EstimateResult<ExportedDocument> {
        Ok(ExportedDocument {
            file_name: export_file_name(Utc::now()),
            contents: export_json(&self.estimate)?,
        })
    }

    pub fn export_to_dir(&self, dir: &Path) -> EstimateResult<PathBuf> {
        let path = file_io::export_to_dir(&self.estimate, dir)?;
        info!(path = %path.display(), "estimate exported");
        Ok(path)
    }

    /// Replace the whole document with imported JSON.
    pub fn import_str(&mut self, text: &str) -> EstimateResult<()> {
        let imported = parse_estimate(text).inspect_err(|e| warn!(error = %e, "import rejected"))?;
        self.replace(imported);
        info!("estimate replaced by import");
        Ok(())
    }

    pub fn import_path(&mut self, path: &Path) -> EstimateResult<()> {
        let imported = file_io::import_from_path(path).inspect_err(|e| warn!(error = %e, "import rejected"))?;
        self.replace(imported);
        info!(path = %path.display(), "estimate replaced by import");
        Ok(())
    }

    pub fn quote(&self, date: NaiveDate) -> Quote {
        Quote::from_estimate(&self.estimate, date)
    }

    fn replace(&mut self, next: Estimate) {
        self.estimate = next;
        self.persist();
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.estimate) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "could not serialize estimate");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.options.storage_key, &json) {
            warn!(key = %self.options.storage_key, error = %e, "could not save estimate");
        }
    }
}

/// The configured preset under its catalog spelling, so it compares equal to
/// what `select_preset` stores.
fn initial_view(options: &SessionOptions) -> ViewState {
    let preset = options
        .catalog
        .get(&options.default_preset)
        .map(|preset| preset.name.clone())
        .unwrap_or_else(|| options.default_preset.clone());
    ViewState {
        view: ActiveView::default(),
        preset,
    }
}

/// Read the stored estimate, falling back to `default` when it is absent or
/// cannot be read or parsed.
pub fn load_or_default(store: &impl KeyValueStore, key: &str, default: impl FnOnce() -> Estimate) -> Estimate {
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(key, error = %e, "stored estimate is unreadable; using starter template");
                default()
            }
        },
        Ok(None) => {
            debug!(key, "no stored estimate; using starter template");
            default()
        }
        Err(e) => {
            warn!(key, error = %e, "could not read stored estimate; using starter template");
            default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::NumericField;
    use crate::store::{FileStore, MemoryStore};
    use tempfile::tempdir;

    fn fresh() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), SessionOptions::default())
    }

    fn stored(session: &Session<MemoryStore>) -> Estimate {
        let raw = session.store().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_open_without_stored_document() {
        let session = fresh();
        assert_eq!(session.estimate().title, "Medium Tier");
        assert_eq!(session.view().preset, "Standard");
        assert_eq!(session.view().view, ActiveView::Estimate);
        // Nothing is written until something changes
        assert!(session.store().get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_open_with_corrupt_document() {
        let store = MemoryStore::with_entry(DEFAULT_STORAGE_KEY, "{ not json");
        let session = Session::open(store, SessionOptions::default());
        assert_eq!(session.estimate().title, "Medium Tier");
    }

    #[test]
    fn test_open_uses_configured_company() {
        let options = SessionOptions {
            company: Contact {
                name: "Bright Nights".to_string(),
                ..Contact::default()
            },
            ..SessionOptions::default()
        };
        let session = Session::open(MemoryStore::new(), options);
        assert_eq!(session.estimate().company.name, "Bright Nights");
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut session = fresh();
        session.update(|e| e.title = "Corner lot".to_string());
        assert_eq!(stored(&session).title, "Corner lot");

        let id = session.add_laborer();
        assert_eq!(stored(&session).laborers.len(), 3);

        session.edit_laborer(&id, |l| l.hours = NumericField::from(4.0)).unwrap();
        assert_eq!(stored(&session), *session.estimate());
    }

    #[test]
    fn test_write_failure_keeps_edit_in_memory() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let mut session = Session::open(store, SessionOptions::default());

        session.update(|e| e.notes = "HOA approval pending".to_string());
        assert_eq!(session.estimate().notes, "HOA approval pending");
    }

    #[test]
    fn test_unknown_item_leaves_document_alone() {
        let mut session = fresh();
        let before = session.estimate().clone();

        let err = session
            .edit_line_item(ItemKind::Linear, &Uuid::new_v4(), |item| item.label = "x".to_string())
            .unwrap_err();
        assert_eq!(err.error_code(), "ITEM_NOT_FOUND");
        assert!(session.remove_laborer(&Uuid::new_v4()).is_err());
        assert_eq!(*session.estimate(), before);
        assert!(session.store().get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_apply_selected_preset() {
        let mut session = fresh();
        session.select_preset("budget").unwrap();
        assert_eq!(session.view().preset, "Budget");

        let applied = session.apply_selected_preset().unwrap();
        assert_eq!(applied.linear_updated, 2);
        assert_eq!(session.estimate().linear[0].rate.value(), 10.0);
        assert_eq!(session.estimate().linear[1].rate.value(), 12.5);
        assert_eq!(stored(&session).linear[1].rate.value(), 12.5);
    }

    #[test]
    fn test_configured_preset_uses_catalog_spelling() {
        let options = SessionOptions {
            default_preset: "budget".to_string(),
            ..SessionOptions::default()
        };
        let mut session = Session::open(MemoryStore::new(), options);
        assert_eq!(session.view().preset, "Budget");

        session.select_preset("High-End").unwrap();
        assert!(session.reset(|_| true));
        assert_eq!(session.view().preset, "Budget");
    }

    #[test]
    fn test_select_unknown_preset_keeps_choice() {
        let mut session = fresh();
        assert!(session.select_preset("Luxury").is_err());
        assert_eq!(session.view().preset, "Standard");
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut session = fresh();
        session.update(|e| e.title = "Custom".to_string());
        session.select_preset("High-End").unwrap();
        session.set_view(ActiveView::Quote);

        let mut asked = String::new();
        assert!(!session.reset(|prompt| {
            asked = prompt.to_string();
            false
        }));
        assert_eq!(asked, RESET_PROMPT);
        assert_eq!(session.estimate().title, "Custom");
        assert_eq!(session.view().preset, "High-End");

        assert!(session.reset(|_| true));
        assert_eq!(session.estimate().title, "Medium Tier");
        assert_eq!(session.view().preset, "Standard");
        assert_eq!(session.view().view, ActiveView::Estimate);
        assert_eq!(stored(&session).title, "Medium Tier");
    }

    #[test]
    fn test_malformed_import_leaves_document_and_totals() {
        let mut session = fresh();
        session.update(|e| e.title = "Keep me".to_string());
        let before = session.estimate().clone();
        let totals_before = session.totals();

        let err = session.import_str("{\"title\": \"half").unwrap_err();
        assert_eq!(err.error_code(), "IMPORT_FAILED");
        assert!(err.to_string().starts_with("Invalid JSON file"));

        assert_eq!(*session.estimate(), before);
        assert_eq!(session.totals(), totals_before);
        assert_eq!(stored(&session), before);
    }

    #[test]
    fn test_export_then_import_reproduces_document() {
        let mut session = fresh();
        session.update(|e| {
            e.customer.name = "Pat Rivera".to_string();
            e.materials.linear_rate = NumericField::from_input("2.0");
        });
        let exported = session.export().unwrap();
        assert!(exported.file_name.starts_with("estimate_"));
        assert!(exported.file_name.ends_with(".json"));

        let mut other = fresh();
        other.import_str(&exported.contents).unwrap();
        assert_eq!(other.estimate(), session.estimate());
        assert_eq!(stored(&other), *session.estimate());
    }

    #[test]
    fn test_file_backed_session_survives_restart() {
        let dir = tempdir().unwrap();

        let mut session = Session::open(FileStore::new(dir.path()), SessionOptions::default());
        session.apply_preset("High-End").unwrap();
        let id = session.add_line_item(ItemKind::Linear);
        drop(session);

        let reopened = Session::open(FileStore::new(dir.path()), SessionOptions::default());
        assert_eq!(reopened.estimate().linear.len(), 3);
        assert!(reopened.estimate().line_item(ItemKind::Linear, &id).is_some());
        assert_eq!(reopened.estimate().linear[0].rate.value(), 14.0);
    }

    #[test]
    fn test_import_path_and_export_to_dir() {
        let dir = tempdir().unwrap();
        let session = fresh();
        let path = session.export_to_dir(dir.path()).unwrap();

        let mut other = fresh();
        other.update(|e| e.linear.clear());
        other.import_path(&path).unwrap();
        assert_eq!(other.estimate(), session.estimate());
    }
}
