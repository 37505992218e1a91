use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use simplot::cli;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let level = if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    // RUST_LOG overrides the default level
    SimpleLogger::new().with_level(level).env().init()?;

    cli::run(args)
}
