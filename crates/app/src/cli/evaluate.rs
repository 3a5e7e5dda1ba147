use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Args;
use jiff::Timestamp;
use rebate::fixtures::Fixture;
use rebate_app::domain::{
    checkout::checkout,
    discounts::{DiscountsService, InMemoryDiscountsService, models::DiscountQuery},
};

#[derive(Debug, Args)]
pub(crate) struct EvaluateArgs {
    /// Cart name in the fixture set
    #[arg(long)]
    cart: String,

    /// Coupon code to add to the cart
    #[arg(long)]
    coupon: Option<String>,

    /// Channel handle, replacing the cart's channel
    #[arg(long)]
    channel: Option<String>,

    /// Customer group handles, replacing the cart's customer groups
    #[arg(long = "customer-group")]
    customer_groups: Vec<String>,

    /// Point in time to evaluate at; defaults to now
    #[arg(long)]
    at: Option<Timestamp>,

    /// Redeem the applied discounts
    #[arg(long)]
    checkout: bool,
}

pub(crate) async fn run(args: EvaluateArgs, fixture: Fixture<'static>) -> Result<ExitCode, String> {
    let mut cart = fixture
        .cart(&args.cart)
        .map_err(|error| error.to_string())?
        .clone();

    if let Some(code) = args.coupon {
        cart = cart.with_coupon_code(code);
    }

    if let Some(channel) = &args.channel {
        cart = cart.with_channel(fixture.channel(channel).map_err(|error| error.to_string())?);
    }

    if !args.customer_groups.is_empty() {
        let customer_groups = args
            .customer_groups
            .iter()
            .map(|group| fixture.customer_group(group))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| error.to_string())?;

        cart = cart.with_customer_groups(customer_groups);
    }

    let query = DiscountQuery::for_cart(&cart, args.at.unwrap_or_else(Timestamp::now));
    let service = InMemoryDiscountsService::new(fixture.into_catalog());

    let eligible = service
        .get_discounts(&query, &cart)
        .await
        .map_err(|error| format!("failed to list discounts: {error}"))?;

    let evaluation = if args.checkout {
        checkout(&service, &query, &cart)
            .await
            .map_err(|error| format!("checkout failed: {error}"))?
    } else {
        service
            .evaluate(&query, &cart)
            .await
            .map_err(|error| format!("failed to evaluate cart: {error}"))?
    };

    let catalog = service.catalog();
    let catalog = catalog.read().await;
    let mut out = io::stdout().lock();

    writeln!(out, "Eligible discounts at {}:", query.now)
        .map_err(|error| format!("failed to write output: {error}"))?;

    for discount in &eligible {
        writeln!(
            out,
            "  [{}] {} ({})",
            discount.priority(),
            discount.name(),
            discount.handle()
        )
        .map_err(|error| format!("failed to write output: {error}"))?;
    }

    evaluation
        .receipt()
        .write_to(&mut out, &catalog)
        .map_err(|error| format!("failed to render receipt: {error}"))?;

    Ok(ExitCode::SUCCESS)
}
