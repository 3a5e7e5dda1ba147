use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Args;
use jiff::Timestamp;
use rebate::fixtures::Fixture;
use rebate_app::domain::discounts::{DiscountsService, InMemoryDiscountsService};

#[derive(Debug, Args)]
pub(crate) struct CouponArgs {
    /// Coupon code, matched exactly
    #[arg(long)]
    code: String,

    /// Point in time to validate at; defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(args: CouponArgs, fixture: Fixture<'static>) -> Result<ExitCode, String> {
    let service = InMemoryDiscountsService::new(fixture.into_catalog());
    let at = args.at.unwrap_or_else(Timestamp::now);

    let valid = service
        .validate_coupon(&args.code, at)
        .await
        .map_err(|error| format!("failed to validate coupon: {error}"))?;

    let status = if valid { "valid" } else { "invalid" };

    writeln!(io::stdout().lock(), "{}: {status}", args.code)
        .map_err(|error| format!("failed to write output: {error}"))?;

    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
