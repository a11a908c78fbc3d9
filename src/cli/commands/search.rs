//! `tubmeter search` command - Find bathtubs by name

use miette::Result;

use super::list::print_listing;
use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Text to look for in names (case-insensitive)
    pub term: String,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let listing = session.store.search(&args.term)?;

    if listing.is_empty() && !args.count {
        if !global.quiet {
            println!("No bathtubs matching '{}'", args.term);
        }
        return session.close();
    }

    print_listing(&session, global, listing, args.count)?;
    session.close()
}
