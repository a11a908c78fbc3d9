//! `tubmeter set` command - Update a single field by name

use miette::Result;

use super::update::print_change;
use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::BathtubUpdate;

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Bathtub id
    pub id: i64,

    /// Field name: name, top_width, bottom_width, width or height
    pub field: String,

    /// New value
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

pub fn run(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut changes = BathtubUpdate::default();
    changes.set(&args.field, &args.value)?;

    let mut session = Session::open(global)?;
    let before = session.store.get(args.id)?;
    let after = session.store.update(args.id, &changes)?;

    if !global.quiet {
        print_change(&before, &after, session.precision());
    }
    session.close()
}
