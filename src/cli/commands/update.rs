//! `tubmeter update` command - Change measurements or name of a bathtub
//!
//! Incline and capacity are always recomputed from the resulting measurements.

use console::style;
use miette::Result;

use crate::cli::helpers::{format_incline, format_liters, Session};
use crate::cli::GlobalOpts;
use crate::core::{BathtubRecord, BathtubUpdate};

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Bathtub id
    pub id: i64,

    /// New model name
    #[arg(long)]
    pub name: Option<String>,

    /// Length at the rim (cm)
    #[arg(long, short = 't')]
    pub top_width: Option<f64>,

    /// Length at the floor (cm)
    #[arg(long, short = 'b')]
    pub bottom_width: Option<f64>,

    /// Breadth of the tub (cm)
    #[arg(long, short = 'w')]
    pub width: Option<f64>,

    /// Depth from rim to floor (cm)
    #[arg(long = "height", short = 'H')]
    pub height: Option<f64>,
}

pub fn run(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let changes = BathtubUpdate {
        name: args.name,
        top_width: args.top_width,
        bottom_width: args.bottom_width,
        width: args.width,
        height: args.height,
    };

    let mut session = Session::open(global)?;
    let before = session.store.get(args.id)?;
    let after = session.store.update(args.id, &changes)?;

    if !global.quiet {
        print_change(&before, &after, session.precision());
    }
    session.close()
}

/// Report an applied update, including the incline change
pub(crate) fn print_change(before: &BathtubRecord, after: &BathtubRecord, precision: usize) {
    println!(
        "{} Updated {} '{}'",
        style("✓").green(),
        style(format!("#{}", after.id)).cyan(),
        after.name
    );
    if before.incline_degrees != after.incline_degrees {
        println!(
            "  Side incline: {}° → {}°",
            format_incline(before.incline_degrees, precision),
            style(format_incline(after.incline_degrees, precision)).yellow()
        );
    } else {
        println!(
            "  Side incline: {}° (unchanged)",
            format_incline(after.incline_degrees, precision)
        );
    }
    if before.liters != after.liters {
        println!(
            "  Capacity:     {} L → {} L",
            format_liters(before.liters),
            format_liters(after.liters)
        );
    }
}
