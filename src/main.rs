use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, error};

use xml_compare::cli::Cli;
use xml_compare::config::ConfigManager;
use xml_compare::logging::{self, Profile};
use xml_compare::output::Output;
use xml_compare::{compare, document};

/// Exit status when the documents match within the tolerances
const EXIT_EQUAL: u8 = 0;
/// Exit status when at least one difference survives
const EXIT_DIFFERENT: u8 = 1;
/// Exit status for usage, configuration, document or evaluation errors
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(&cli).await {
        Ok(true) => ExitCode::from(EXIT_EQUAL),
        Ok(false) => ExitCode::from(EXIT_DIFFERENT),
        Err(err) => {
            // No-op when the configuration already initialised logging.
            logging::init(Profile::Development, cli.verbose);
            error!(error = %err, "Comparison failed");
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<bool> {
    cli.validate().map_err(anyhow::Error::msg)?;

    let config = ConfigManager::load_config(cli)
        .await
        .context("Failed to load configuration")?;
    logging::init(Profile::Development, config.output.verbose);
    let settings = config.to_settings()?;
    debug!(?config, "Configuration loaded");

    let (expected, actual) =
        tokio::try_join!(document::load(&cli.expected), document::load(&cli.actual))?;
    let result = compare(&expected, &actual, &settings)?;

    let output = Output::new(config.verbosity());
    let report = output.format_diff(&result, config.output.format.into())?;
    println!("{}", report.trim_end());

    Ok(result.is_equal())
}
