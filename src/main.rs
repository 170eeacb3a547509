use clap::Parser;
use tracing_subscriber::EnvFilter;

mod analysis;
mod cli;
mod core;
mod output;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("bactools=debug,info")
    } else {
        EnvFilter::new("bactools=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Breseq(args) => {
            cli::breseq::run(args, cli.verbose)?;
        }
        cli::Commands::MergeTables(args) => {
            cli::merge::run(args)?;
        }
        cli::Commands::AnnotateTree(args) => {
            cli::annotate::run(args)?;
        }
        cli::Commands::CombineRuns(args) => {
            cli::runs::run(args)?;
        }
        cli::Commands::FilterContigs(args) => {
            cli::contigs::run(args)?;
        }
        cli::Commands::SampleSheets(args) => {
            cli::sheets::run(args)?;
        }
    }

    Ok(())
}
