use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use tubmeter::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Add(args) => tubmeter::cli::commands::add::run(args, &global),
        Commands::List(args) => tubmeter::cli::commands::list::run(args, &global),
        Commands::Show(args) => tubmeter::cli::commands::show::run(args, &global),
        Commands::Search(args) => tubmeter::cli::commands::search::run(args, &global),
        Commands::Update(args) => tubmeter::cli::commands::update::run(args, &global),
        Commands::Set(args) => tubmeter::cli::commands::set::run(args, &global),
        Commands::Rm(args) => tubmeter::cli::commands::rm::run(args, &global),
        Commands::Calc(args) => tubmeter::cli::commands::calc::run(args, &global),
        Commands::Completions(args) => tubmeter::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "tubmeter=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
