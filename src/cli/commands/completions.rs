//! `tubmeter completions` command - Shell completion scripts
//!
//! Completes every subcommand (`add`, `list`, `calc` ...) along with the
//! `--format` and `--sort` values. Any shell clap_complete knows is accepted:
//!
//! ```bash
//! source <(tubmeter completions bash)
//! tubmeter completions zsh > "${fpath[1]}/_tubmeter"
//! tubmeter completions fish > ~/.config/fish/completions/tubmeter.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

/// Binary name the generated scripts register completions for
const BIN_NAME: &str = "tubmeter";

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}

fn write_completions(shell: Shell, out: &mut impl Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}
