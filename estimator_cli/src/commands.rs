//! Command handlers. Each one works on an open session and prints its result.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use estimator_core::errors::{EstimateError, EstimateResult};
use estimator_core::estimate::{Estimate, ItemKind, Laborer, LineItem};
use estimator_core::numeric::NumericField;
use estimator_core::pdf::render_quote_pdf;
use estimator_core::session::{ActiveView, Session};
use estimator_core::store::KeyValueStore;

use crate::cli::{Command, Field, ItemFields, LaborCommand, LaborFields, Toggle};
use crate::render::{render_estimate, render_presets};

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> EstimateResult<()> {
        if self.json {
            let json = serde_json::to_string_pretty(value).map_err(|e| EstimateError::SerializationError {
                reason: e.to_string(),
            })?;
            println!("{}", json);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

pub fn execute<S: KeyValueStore>(
    session: &mut Session<S>,
    command: Command,
    export_dir: &Path,
    out: Output,
) -> EstimateResult<()> {
    match command {
        Command::Show => show(session, out),
        Command::Quote { pdf, date } => {
            session.set_view(ActiveView::Quote);
            quote(session, pdf, date, out)
        }
        Command::Presets => {
            let selected = session.view().preset.clone();
            out.print(session.catalog(), || render_presets(session.catalog(), &selected))
        }
        Command::ApplyPreset { name } => {
            let applied = match name {
                Some(name) => session.apply_preset(&name)?,
                None => session.apply_selected_preset()?,
            };
            info!(preset = %session.view().preset, "preset applied");
            if !out.json {
                println!(
                    "Applied {}: {} linear and {} count rates updated\n",
                    session.view().preset,
                    applied.linear_updated,
                    applied.count_updated
                );
            }
            show(session, out)
        }
        Command::Add {
            section,
            fields,
            no_materials,
        } => {
            let kind = ItemKind::from(section);
            let unit = fields.unit.clone().unwrap_or_else(|| kind.default_unit().to_string());
            let mut item = LineItem::blank(unit);
            apply_item_fields(&mut item, &fields);
            item.selected = !no_materials;
            session.push_line_item(kind, item);
            show(session, out)
        }
        Command::Edit {
            section,
            row,
            fields,
            materials,
        } => {
            let kind = ItemKind::from(section);
            let id = resolve_row(&item_ids(session.estimate(), kind), &row, kind.key())?;
            session.edit_line_item(kind, &id, |item| {
                apply_item_fields(item, &fields);
                if let Some(toggle) = materials {
                    item.selected = toggle == Toggle::On;
                }
            })?;
            show(session, out)
        }
        Command::Remove { section, row } => {
            let kind = ItemKind::from(section);
            let id = resolve_row(&item_ids(session.estimate(), kind), &row, kind.key())?;
            session.remove_line_item(kind, &id)?;
            show(session, out)
        }
        Command::Labor { command } => {
            labor(session, command)?;
            show(session, out)
        }
        Command::Set { field, value } => {
            set_field(session, field, value)?;
            show(session, out)
        }
        Command::Export { out: dir } => {
            let dir = dir.unwrap_or_else(|| export_dir.to_path_buf());
            let path = session.export_to_dir(&dir)?;
            out.print(&json!({ "path": path }), || format!("Exported to {}\n", path.display()))
        }
        Command::Import { file } => {
            session.import_path(&file)?;
            show(session, out)
        }
        Command::Reset { yes } => {
            let reset = session.reset(|prompt| yes || confirm_on_stdin(prompt));
            if reset {
                show(session, out)
            } else {
                out.print(&json!({ "reset": false }), || "Reset cancelled\n".to_string())
            }
        }
    }
}

fn show<S: KeyValueStore>(session: &mut Session<S>, out: Output) -> EstimateResult<()> {
    session.set_view(ActiveView::Estimate);
    let estimate = session.estimate();
    let totals = session.totals();
    out.print(&json!({ "estimate": estimate, "totals": totals }), || {
        render_estimate(estimate, &totals)
    })
}

fn quote<S: KeyValueStore>(
    session: &Session<S>,
    pdf: Option<PathBuf>,
    date: Option<NaiveDate>,
    out: Output,
) -> EstimateResult<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let quote = session.quote(date);

    match pdf {
        Some(path) => {
            let bytes = render_quote_pdf(&quote)?;
            fs::write(&path, bytes)
                .map_err(|e| EstimateError::file_error("write", path.display().to_string(), e.to_string()))?;
            info!(path = %path.display(), "quote PDF written");
            out.print(&json!({ "path": path }), || format!("Quote written to {}\n", path.display()))
        }
        None => out.print(&quote, || quote.to_string()),
    }
}

fn labor<S: KeyValueStore>(session: &mut Session<S>, command: LaborCommand) -> EstimateResult<()> {
    match command {
        LaborCommand::Add { fields } => {
            let id = session.add_laborer();
            session.edit_laborer(&id, |laborer| apply_labor_fields(laborer, &fields))
        }
        LaborCommand::Edit { row, fields } => {
            let id = resolve_row(&laborer_ids(session.estimate()), &row, "labor")?;
            session.edit_laborer(&id, |laborer| apply_labor_fields(laborer, &fields))
        }
        LaborCommand::Remove { row } => {
            let id = resolve_row(&laborer_ids(session.estimate()), &row, "labor")?;
            session.remove_laborer(&id).map(|_| ())
        }
    }
}

fn apply_item_fields(item: &mut LineItem, fields: &ItemFields) {
    if let Some(label) = &fields.label {
        item.label = label.clone();
    }
    if let Some(qty) = &fields.qty {
        item.quantity = NumericField::from_input(qty.as_str());
    }
    if let Some(unit) = &fields.unit {
        item.unit = unit.clone();
    }
    if let Some(rate) = &fields.rate {
        item.rate = NumericField::from_input(rate.as_str());
    }
}

fn apply_labor_fields(laborer: &mut Laborer, fields: &LaborFields) {
    if let Some(name) = &fields.name {
        laborer.name = name.clone();
    }
    if let Some(wage) = &fields.wage {
        laborer.wage = NumericField::from_input(wage.as_str());
    }
    if let Some(hours) = &fields.hours {
        laborer.hours = NumericField::from_input(hours.as_str());
    }
}

fn set_field<S: KeyValueStore>(session: &mut Session<S>, field: Field, value: String) -> EstimateResult<()> {
    if field == Field::MaterialsAuto {
        let enabled = parse_switch(&value)?;
        session.update(|estimate| estimate.materials.auto_enabled = enabled);
        return Ok(());
    }

    session.update(|estimate| {
        let numeric = || NumericField::from_input(value.as_str());
        match field {
            Field::Title => estimate.title = value.clone(),
            Field::Notes => estimate.notes = value.clone(),
            Field::Overhead => estimate.overhead_flat = numeric(),
            Field::MaterialsFlat => estimate.materials.flat = numeric(),
            Field::MaterialsRateLinear => estimate.materials.linear_rate = numeric(),
            Field::MaterialsRateStrand => estimate.materials.strand_rate = numeric(),
            Field::CompanyName => estimate.company.name = value.clone(),
            Field::CompanyPhone => estimate.company.phone = value.clone(),
            Field::CompanyEmail => estimate.company.email = value.clone(),
            Field::CompanyAddress => estimate.company.address = value.clone(),
            Field::CustomerName => estimate.customer.name = value.clone(),
            Field::CustomerPhone => estimate.customer.phone = value.clone(),
            Field::CustomerEmail => estimate.customer.email = value.clone(),
            Field::CustomerAddress => estimate.customer.address = value.clone(),
            Field::MaterialsAuto => {}
        }
    });
    Ok(())
}

fn parse_switch(value: &str) -> EstimateResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(EstimateError::invalid_input(
            "materials-auto",
            value,
            "Expected on or off",
        )),
    }
}

fn item_ids(estimate: &Estimate, kind: ItemKind) -> Vec<Uuid> {
    estimate.items(kind).iter().map(|item| item.id).collect()
}

fn laborer_ids(estimate: &Estimate) -> Vec<Uuid> {
    estimate.laborers.iter().map(|laborer| laborer.id).collect()
}

/// Find a row by 1-based position, full id, or unique id prefix.
fn resolve_row(ids: &[Uuid], row: &str, collection: &str) -> EstimateResult<Uuid> {
    let row = row.trim();
    let not_found = || EstimateError::item_not_found(collection, row);

    if let Ok(position) = row.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| ids.get(index))
            .copied()
            .ok_or_else(not_found);
    }

    if let Ok(id) = Uuid::parse_str(row) {
        return ids.iter().find(|candidate| **candidate == id).copied().ok_or_else(not_found);
    }

    let prefix = row.to_lowercase().replace('-', "");
    if prefix.is_empty() {
        return Err(not_found());
    }
    let mut matches = ids.iter().filter(|id| id.simple().to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(*id),
        (Some(_), Some(_)) => Err(EstimateError::invalid_input(
            collection,
            row,
            "Ambiguous id prefix; use more characters",
        )),
        _ => Err(not_found()),
    }
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
