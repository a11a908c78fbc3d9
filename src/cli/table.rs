//! Table formatting for bathtub records
//!
//! One renderer serves `list`, `search` and `show`, so every command prints
//! the same columns in the same units.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_cm, format_incline, format_liters, truncate_str};
use crate::cli::OutputFormat;
use crate::core::BathtubRecord;

/// Maximum name width in the aligned terminal table
const NAME_WIDTH: usize = 24;

/// Column headers for human-facing tables
const HEADERS: [&str; 9] = [
    "ID",
    "Name",
    "Top (cm)",
    "Bottom (cm)",
    "Width (cm)",
    "Height (cm)",
    "Incline (°)",
    "Liters",
    "Created",
];

/// Column names for machine-facing output; these match the stored fields
const FIELD_NAMES: [&str; 9] = [
    "id",
    "name",
    "top_width",
    "bottom_width",
    "width",
    "height",
    "incline_degrees",
    "liters",
    "created_at",
];

/// Renders records in any output format
#[derive(Debug, Clone, Copy)]
pub struct RecordTable<'a> {
    records: &'a [BathtubRecord],
    precision: usize,
}

impl<'a> RecordTable<'a> {
    pub fn new(records: &'a [BathtubRecord], precision: usize) -> Self {
        Self { records, precision }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Auto => Ok(self.render_aligned()),
            OutputFormat::Tsv => Ok(self.render_tsv()),
            OutputFormat::Csv => self.render_csv(),
            OutputFormat::Json => {
                let mut out = serde_json::to_string_pretty(self.records).into_diagnostic()?;
                out.push('\n');
                Ok(out)
            }
            OutputFormat::Yaml => serde_yml::to_string(&self.records).into_diagnostic(),
            OutputFormat::Md => Ok(self.render_markdown()),
            OutputFormat::Id => Ok(self
                .records
                .iter()
                .map(|r| format!("{}\n", r.id))
                .collect()),
        }
    }

    fn cells(&self, record: &BathtubRecord) -> [String; 9] {
        [
            record.id.to_string(),
            record.name.clone(),
            format_cm(record.top_width),
            format_cm(record.bottom_width),
            format_cm(record.width),
            format_cm(record.height),
            format_incline(record.incline_degrees, self.precision),
            format_liters(record.liters),
            record.created_at.format("%Y-%m-%d").to_string(),
        ]
    }

    fn render_aligned(&self) -> String {
        let widths = [5, NAME_WIDTH + 2, 10, 12, 11, 12, 12, 9, 10];
        let mut out = String::new();

        let header: Vec<String> = HEADERS
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{:<w$}", style(h).bold(), w = w))
            .collect();
        out.push_str(header.join("").trim_end());
        out.push('\n');
        out.push_str(&format!("{}\n", style("─".repeat(widths.iter().sum())).dim()));

        for record in self.records {
            let cells = self.cells(record);
            let mut line = String::new();
            line.push_str(&format!("{:<w$}", style(&cells[0]).cyan(), w = widths[0]));
            line.push_str(&format!(
                "{:<w$}",
                truncate_str(&cells[1], NAME_WIDTH),
                w = widths[1]
            ));
            for i in 2..6 {
                line.push_str(&format!("{:<w$}", cells[i], w = widths[i]));
            }
            line.push_str(&format!(
                "{:<w$}",
                incline_style(record.incline_degrees, &cells[6]),
                w = widths[6]
            ));
            let liters = if record.liters.is_some() {
                style(cells[7].clone())
            } else {
                style(cells[7].clone()).dim()
            };
            line.push_str(&format!("{:<w$}", liters, w = widths[7]));
            line.push_str(&cells[8]);
            out.push_str(&line);
            out.push('\n');
        }

        out
    }

    fn render_tsv(&self) -> String {
        let mut out = FIELD_NAMES.join("\t");
        out.push('\n');
        for record in self.records {
            let cells = self.cells(record).map(|cell| tsv_field(&cell));
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    fn render_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(FIELD_NAMES).into_diagnostic()?;
        for record in self.records {
            writer.write_record(self.cells(record)).into_diagnostic()?;
        }
        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }

    fn render_markdown(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(HEADERS);
        for record in self.records {
            builder.push_record(self.cells(record));
        }
        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }
}

/// TSV has no quoting, so a control character in a cell becomes a space
fn tsv_field(cell: &str) -> String {
    cell.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Higher incline leans back further; color by comfort band
fn incline_style(degrees: f64, text: &str) -> console::StyledObject<String> {
    let s = text.to_string();
    if degrees < 0.0 {
        style(s).red()
    } else if degrees >= 25.0 {
        style(s).green()
    } else if degrees >= 15.0 {
        style(s).yellow()
    } else {
        style(s).dim()
    }
}

/// Print a summary line after a table
pub fn print_summary(count: usize, skipped: usize) {
    let mut line = format!("{} bathtub(s)", style(count).cyan());
    if skipped > 0 {
        line.push_str(&format!(", {} corrupt row(s) skipped", style(skipped).yellow()));
    }
    println!("{}", style(line).dim());
}
