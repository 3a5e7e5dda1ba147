use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rebate::fixtures::Fixture;
use rebate_app::config::{FixturesConfig, LoggingConfig};

mod coupon;
mod evaluate;

#[derive(Debug, Parser)]
#[command(name = "rebate", about = "Rebate discount CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(flatten)]
    fixtures: FixturesConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply discounts to a fixture cart and print the receipt
    Evaluate(evaluate::EvaluateArgs),

    /// Check whether a coupon code is valid
    Coupon(coupon::CouponArgs),
}

impl Cli {
    /// Parse arguments, reading a `.env` file first if one exists.
    pub(crate) fn load() -> Self {
        _ = dotenvy::dotenv();

        Self::parse()
    }

    pub(crate) async fn run(self) -> Result<ExitCode, String> {
        let fixture = Fixture::with_base_path(&self.fixtures.path)
            .load_set(&self.fixtures.set)
            .map_err(|error| {
                format!(
                    "failed to load fixture set {} from {}: {error}",
                    self.fixtures.set,
                    self.fixtures.path.display()
                )
            })?;

        match self.command {
            Commands::Evaluate(args) => evaluate::run(args, fixture).await,
            Commands::Coupon(args) => coupon::run(args, fixture).await,
        }
    }
}
