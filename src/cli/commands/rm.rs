//! `tubmeter rm` command - Delete a bathtub

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::StoreError;

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Bathtub id
    pub id: i64,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    if !args.yes {
        // A corrupt row has no readable name but can still be deleted
        let label = match session.store.get(args.id) {
            Ok(record) => format!("#{} '{}'", record.id, record.name),
            Err(StoreError::CorruptRecord { .. }) => format!("corrupt record #{}", args.id),
            Err(e) => return Err(e.into()),
        };
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {}?", label))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Cancelled");
            return session.close();
        }
    }

    session.store.delete(args.id)?;

    if !global.quiet {
        println!(
            "{} Deleted {}",
            style("✓").green(),
            style(format!("#{}", args.id)).cyan()
        );
    }
    session.close()
}
