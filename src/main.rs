use anyhow::Result;
use clap::Parser;

use riskwatch::cli::{Args, Command};
use riskwatch::{logging, run_status, run_watch, OutputFormat, Settings, WatchOptions};

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?.apply(args.overrides());
    logging::init(args.log_level.as_deref().or(settings.log_level.as_deref()));

    let rt = tokio::runtime::Runtime::new()?;

    match args.command {
        Command::Watch {
            boost,
            boost_for,
            json,
            count,
            ..
        } => {
            let options = WatchOptions {
                format: if json {
                    OutputFormat::Json
                } else {
                    OutputFormat::Human
                },
                boost: boost.zip(boost_for),
                count,
            };
            rt.block_on(run_watch(&settings.client, options))
        }
        Command::Status => rt.block_on(run_status(&settings.client)),
    }
}
