// Entrypoint for the CLI application.
// - Keeps `main` small: load config, set up logging, build the API client
//   and hand the parsed command to the UI layer.
// - Errors are printed once by `ui::report_error`, which also picks the
//   exit code.

use clap::Parser;
use premiumize_cli::{api::ApiClient, cli::Cli, config::Config, logging, ui};
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        let code = ui::report_error(&err);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    // Flags can only switch modes on; the environment sets the baseline.
    config.verbose |= cli.verbose;
    config.dry_run |= cli.dryrun;

    logging::init(config.verbose);
    debug!(api_url = %config.api_url, dry_run = config.dry_run, "configuration loaded");

    let api = ApiClient::from_config(&config)?;
    ui::run(&api, cli.command).await
}
