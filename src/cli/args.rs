//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    add::AddArgs, calc::CalcArgs, completions::CompletionsArgs, list::ListArgs, rm::RmArgs,
    search::SearchArgs, set::SetArgs, show::ShowArgs, update::UpdateArgs,
};

#[derive(Parser)]
#[command(name = "tubmeter")]
#[command(author, version, about = "Bathtub measurement log with side incline comparison")]
#[command(long_about = "Record bathtub measurements, derive the side incline from vertical and an estimated capacity, and compare models.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file (default: from config, else ./bathtubs.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Measure and save a new bathtub
    Add(AddArgs),

    /// List all bathtubs
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one bathtub
    Show(ShowArgs),

    /// Search bathtubs by name
    Search(SearchArgs),

    /// Change measurements or name of a bathtub
    Update(UpdateArgs),

    /// Set a single field by name (e.g. `set 3 height 44`)
    Set(SetArgs),

    /// Delete a bathtub
    #[command(visible_alias = "delete")]
    Rm(RmArgs),

    /// Calculate incline and capacity without saving
    Calc(CalcArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table for terminals
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
