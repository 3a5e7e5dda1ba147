//! Rebate CLI

use std::process::ExitCode;

use rebate_app::observability;
use tracing::error;

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = Cli::load();

    if let Err(source) = observability::init(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging is not initialised, so the error can only go to stderr"
        )]
        {
            eprintln!("{source}");
        }

        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(code) => code,
        Err(message) => {
            error!("{message}");

            ExitCode::FAILURE
        }
    }
}
