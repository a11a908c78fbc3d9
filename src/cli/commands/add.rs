//! `tubmeter add` command - Measure and save a new bathtub

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_incline, format_liters, Session};
use crate::cli::GlobalOpts;
use crate::core::Measurements;

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Model name (e.g. "Polypex Siena")
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

    /// Prompt for any value not given on the command line
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (name, measurements) = if args.interactive {
        prompt_missing(args)?
    } else {
        require_all(args)?
    };

    let mut session = Session::open(global)?;
    let record = session.store.add(&name, measurements)?;

    if global.quiet {
        println!("{}", record.id);
    } else {
        println!(
            "{} Saved {} '{}' with side incline {}°",
            style("✓").green(),
            style(format!("#{}", record.id)).cyan(),
            record.name,
            style(format_incline(record.incline_degrees, session.precision())).yellow()
        );
        println!("  Estimated capacity: {} L", format_liters(record.liters));
    }

    session.close()
}

fn require_all(args: AddArgs) -> Result<(String, Measurements)> {
    let missing = |flag: &str| {
        miette::miette!("{} is required (or use -i for interactive)", flag)
    };

    let name = args.name.ok_or_else(|| missing("NAME"))?;
    let measurements = Measurements::new(
        args.top_width.ok_or_else(|| missing("--top-width"))?,
        args.bottom_width.ok_or_else(|| missing("--bottom-width"))?,
        args.width.ok_or_else(|| missing("--width"))?,
        args.height.ok_or_else(|| missing("--height"))?,
    );
    Ok((name, measurements))
}

fn prompt_missing(args: AddArgs) -> Result<(String, Measurements)> {
    let theme = ColorfulTheme::default();

    println!("{} New bathtub", style("◆").cyan());

    let name = match args.name {
        Some(name) => name,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Name")
            .validate_with(|input: &String| {
                if input.trim().is_empty() {
                    Err("name must not be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .into_diagnostic()?,
    };

    let top_width = prompt_cm(&theme, "Top width (cm)", args.top_width)?;
    let bottom_width = prompt_cm(&theme, "Bottom width (cm)", args.bottom_width)?;
    let width = prompt_cm(&theme, "Width (cm)", args.width)?;
    let height = prompt_cm(&theme, "Height (cm)", args.height)?;

    Ok((name, Measurements::new(top_width, bottom_width, width, height)))
}

fn prompt_cm(theme: &ColorfulTheme, prompt: &str, given: Option<f64>) -> Result<f64> {
    if let Some(value) = given {
        return Ok(value);
    }
    Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|value: &f64| {
            if value.is_finite() && *value > 0.0 {
                Ok(())
            } else {
                Err("must be greater than zero")
            }
        })
        .interact_text()
        .into_diagnostic()
}
