//! `tubmeter list` command - List all bathtubs

use std::cmp::Ordering;

use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::helpers::Session;
use crate::cli::table::{print_summary, RecordTable};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{BathtubRecord, CorruptRecord, Listing};

/// Sort key for list output
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Incline,
    Liters,
    Created,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Sort by field
    #[arg(long, default_value = "id")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let listing = session.store.list()?;

    let mut records = listing.records;
    sort_records(&mut records, args.sort);
    if args.reverse {
        records.reverse();
    }
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    print_listing(
        &session,
        global,
        Listing {
            records,
            skipped: listing.skipped,
        },
        args.count,
    )?;
    session.close()
}

/// Print records in the requested format and report skipped rows on stderr
pub(crate) fn print_listing(
    session: &Session,
    global: &GlobalOpts,
    listing: Listing,
    count_only: bool,
) -> Result<()> {
    report_skipped(&listing.skipped);

    if count_only {
        println!("{}", listing.records.len());
        return Ok(());
    }

    let format = session.format(global);
    if listing.records.is_empty() && format == OutputFormat::Auto {
        if !global.quiet {
            println!("No bathtubs recorded yet. Add one with `tubmeter add`.");
        }
        return Ok(());
    }

    let table = RecordTable::new(&listing.records, session.precision());
    print!("{}", table.render(format)?);

    if format == OutputFormat::Auto && !global.quiet {
        println!();
        print_summary(listing.records.len(), listing.skipped.len());
    }

    Ok(())
}

fn report_skipped(skipped: &[CorruptRecord]) {
    for corrupt in skipped {
        let id = corrupt
            .id
            .map_or_else(|| "?".to_string(), |id| id.to_string());
        eprintln!(
            "{} Skipped corrupt record {}: {}",
            style("⚠").yellow(),
            style(id).cyan(),
            corrupt.reason
        );
    }
}

/// Sort records in place; ties keep id order
pub fn sort_records(records: &mut [BathtubRecord], field: SortField) {
    match field {
        SortField::Id => records.sort_by_key(|r| r.id),
        SortField::Name => records.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        }),
        SortField::Incline => records.sort_by(|a, b| {
            a.incline_degrees
                .total_cmp(&b.incline_degrees)
                .then(a.id.cmp(&b.id))
        }),
        // Records without a capacity estimate sort first
        SortField::Liters => records.sort_by(|a, b| {
            let by_liters = match (a.liters, b.liters) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_liters.then(a.id.cmp(&b.id))
        }),
        SortField::Created => records.sort_by_key(|r| (r.created_at, r.id)),
    }
}
