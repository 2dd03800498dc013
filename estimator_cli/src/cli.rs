//! Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use estimator_core::config::CliOverrides;
use estimator_core::estimate::ItemKind;

#[derive(Debug, Parser)]
#[command(name = "estimator")]
#[command(version, about = "Holiday lighting estimates and customer quotes")]
pub struct Cli {
    /// Config file (default: ./estimator.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the saved estimate
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Preset used by `apply-preset` when no name is given
    #[arg(long, global = true, value_name = "NAME")]
    pub preset: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            data_dir: self.data_dir.clone(),
            preset: self.preset.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show line items, totals and margin
    Show,
    /// Show the customer quote, or write it as a PDF
    Quote {
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
        /// Quote date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List rate presets
    Presets,
    /// Rewrite line item rates from a preset
    ApplyPreset { name: Option<String> },
    /// Add a line item
    Add {
        #[arg(value_enum)]
        section: Section,
        #[command(flatten)]
        fields: ItemFields,
        /// Leave the row out of automatic materials
        #[arg(long, default_value_t = false)]
        no_materials: bool,
    },
    /// Edit a line item
    Edit {
        #[arg(value_enum)]
        section: Section,
        /// 1-based position, id, or id prefix
        row: String,
        #[command(flatten)]
        fields: ItemFields,
        #[arg(long, value_enum)]
        materials: Option<Toggle>,
    },
    /// Remove a line item
    Remove {
        #[arg(value_enum)]
        section: Section,
        row: String,
    },
    /// Manage laborers
    Labor {
        #[command(subcommand)]
        command: LaborCommand,
    },
    /// Set a document field
    Set {
        #[arg(value_enum)]
        field: Field,
        value: String,
    },
    /// Write the estimate to a timestamped JSON file
    Export {
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Replace the estimate with a JSON file
    Import { file: PathBuf },
    /// Go back to the starter template
    Reset {
        /// Do not ask for confirmation
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum LaborCommand {
    Add {
        #[command(flatten)]
        fields: LaborFields,
    },
    Edit {
        row: String,
        #[command(flatten)]
        fields: LaborFields,
    },
    Remove { row: String },
}

/// Line item fields. Numbers are kept as typed.
#[derive(Debug, Clone, Default, Args)]
pub struct ItemFields {
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long)]
    pub qty: Option<String>,
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub rate: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LaborFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub wage: Option<String>,
    #[arg(long)]
    pub hours: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Linear,
    Count,
}

impl From<Section> for ItemKind {
    fn from(section: Section) -> Self {
        match section {
            Section::Linear => ItemKind::Linear,
            Section::Count => ItemKind::Count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    Title,
    Notes,
    Overhead,
    MaterialsFlat,
    MaterialsAuto,
    MaterialsRateLinear,
    MaterialsRateStrand,
    CompanyName,
    CompanyPhone,
    CompanyEmail,
    CompanyAddress,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    CustomerAddress,
}
