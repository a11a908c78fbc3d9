//! `tubmeter calc` command - Calculate metrics without saving

use console::style;
use miette::Result;

use crate::cli::helpers::{format_incline, format_liters, output_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{compute_incline, estimate_capacity, Config};

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Length at the rim (cm)
    #[arg(long, short = 't')]
    pub top_width: f64,

    /// Length at the floor (cm)
    #[arg(long, short = 'b')]
    pub bottom_width: f64,

    /// Depth from rim to floor (cm)
    #[arg(long = "height", short = 'H')]
    pub height: f64,

    /// Breadth of the tub (cm); needed for the capacity estimate
    #[arg(long, short = 'w')]
    pub width: Option<f64>,
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let precision = config.incline_precision();
    let incline = compute_incline(args.top_width, args.bottom_width, args.height)?;
    let liters = estimate_capacity(
        Some(args.top_width),
        Some(args.bottom_width),
        args.width,
        Some(args.height),
    );

    match output_format(global, &config) {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "incline_degrees": incline,
                "liters": liters,
            });
            println!("{}", value);
        }
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Id => {
            println!("{}", format_incline(incline, precision));
        }
        _ => {
            println!(
                "Side incline: {}°",
                style(format_incline(incline, precision)).yellow()
            );
            println!("Capacity:     {} L", format_liters(liters));
            if incline < 0.0 && !global.quiet {
                eprintln!(
                    "{} bottom width exceeds top width; check the measurements",
                    style("⚠").yellow()
                );
            }
        }
    }

    Ok(())
}
