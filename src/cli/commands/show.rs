//! `tubmeter show` command - Show one bathtub

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_cm, format_incline, format_liters, Session};
use crate::cli::table::RecordTable;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::BathtubRecord;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Bathtub id
    pub id: i64,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let record = session.store.get(args.id)?;

    match session.format(global) {
        OutputFormat::Auto => print_details(&record, session.precision()),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&record).into_diagnostic()?),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record).into_diagnostic()?)
        }
        format => {
            let records = [record];
            print!(
                "{}",
                RecordTable::new(&records, session.precision()).render(format)?
            );
        }
    }

    session.close()
}

/// Print a record as a labelled card
pub fn print_details(record: &BathtubRecord, precision: usize) {
    println!(
        "{} {}",
        style(format!("#{}", record.id)).cyan(),
        style(&record.name).bold()
    );
    println!("{}", style("─".repeat(40)).dim());
    println!("  Top width:     {} cm", format_cm(record.top_width));
    println!("  Bottom width:  {} cm", format_cm(record.bottom_width));
    println!("  Width:         {} cm", format_cm(record.width));
    println!("  Height:        {} cm", format_cm(record.height));
    println!(
        "  Side incline:  {}°",
        style(format_incline(record.incline_degrees, precision)).yellow()
    );
    println!("  Capacity:      {} L", format_liters(record.liters));
    println!("  Created:       {}", record.created_at.format("%Y-%m-%d"));
}
