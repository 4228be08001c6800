use clap::Parser;
use miette::Result;
use tracing::level_filters::LevelFilter;

use arlunio::cli::{Cli, Commands};
use arlunio::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let printer = Printer::new(cli.quiet);

    match cli.command {
        Commands::List(args) => arlunio::cli::list::run(args, &printer)?,
        Commands::Inspect(args) => arlunio::cli::inspect::run(args)?,
        Commands::Check(args) => arlunio::cli::check::run(args, &printer)?,
        Commands::Render(args) => arlunio::cli::render::run(args, &printer)?,
        Commands::Completions(args) => arlunio::cli::completions::run(args)?,
    }

    Ok(())
}
