mod cli;

use awsipblock::{Blocker, ConfigBuilder, Outcome};
use clap::Parser;
use cli::OutputFormat;
use log::error;
use std::process::ExitCode;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Main
-------------------------------------------------------------------------------------------------*/

fn main() -> ExitCode {
    let args = cli::Args::parse();

    if let Err(error) = stderrlog::new()
        .module(module_path!())
        .quiet(args.verbose.is_silent())
        .verbosity(args.verbose.log_level_filter())
        .init()
    {
        eprintln!("Failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    // Configuration: environment first, then command line overrides
    let mut builder = ConfigBuilder::new();
    if let Some(url) = &args.url {
        builder.url(url);
    }
    if let Some(region) = &args.region {
        builder.region(region);
    }
    if let Some(service) = &args.service {
        builder.service(service);
    }
    let blocker = Blocker::new(builder.build());

    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            error!("Failed to build the HTTP client: {error}");
            return ExitCode::FAILURE;
        }
    };

    // A single refresh cycle populates the table
    if let Outcome::Failed = blocker.refresher(client).refresh() {
        error!(
            "Unable to retrieve the AWS IP Ranges from {}",
            blocker.config().url()
        );
        return ExitCode::FAILURE;
    }

    let snapshot = blocker.table().snapshot();
    cli::log::snapshot_summary(&snapshot);
    cli::log::check_results(&snapshot, &args.ips);

    match args.output {
        OutputFormat::Table if args.ips.is_empty() => cli::output::prefix_table(&snapshot),
        OutputFormat::Table => cli::output::check_table(&snapshot, &args.ips),
        OutputFormat::Cidr => cli::output::prefixes_in_cidr_format(&snapshot),
        OutputFormat::Netmask => cli::output::prefixes_in_netmask_format(&snapshot),
    }

    ExitCode::SUCCESS
}
