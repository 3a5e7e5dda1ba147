//! Scenarios from the default YAML fixture set

use jiff::Timestamp;
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

use rebate::{fixtures::Fixture, prelude::*};

fn now() -> Result<Timestamp, jiff::Error> {
    "2024-06-01T12:00:00Z".parse()
}

fn eligible_handles(fixture: &Fixture<'_>, cart: &str, now: Timestamp) -> TestResult<Vec<String>> {
    let cart = fixture.cart(cart)?;
    let evaluation = Evaluation::for_cart(cart, now);

    Ok(evaluation
        .get_discounts(fixture.catalog(), Some(cart))
        .into_iter()
        .map(|discount| discount.handle().to_string())
        .collect())
}

#[test]
fn default_set_loads() -> TestResult {
    let fixture = Fixture::from_set("default")?;

    assert_eq!(fixture.catalog().len(), 10);
    assert_eq!(fixture.channels().len(), 2);
    assert_eq!(fixture.customer_groups().len(), 2);
    assert_eq!(fixture.products().len(), 4);

    let handles: Vec<&str> = fixture
        .catalog()
        .discounts()
        .map(Discount::handle)
        .take(3)
        .collect();

    assert_eq!(handles, ["summer-sale", "trade-discount", "welcome-coupon"]);

    Ok(())
}

#[test]
fn web_retail_cart_gets_collection_sale_and_bogof() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;

    assert_eq!(
        eligible_handles(&fixture, "web-retail", now)?,
        ["socks-bogof", "summer-sale"]
    );

    let cart = fixture.cart("web-retail")?;
    let mut evaluation = Evaluation::for_cart(cart, now);
    let discounted = DiscountEngine::new().apply(&mut evaluation, fixture.catalog(), cart)?;

    assert_eq!(discounted.subtotal(), Money::from_minor(6_200, GBP));
    assert_eq!(discounted.free_quantity(1), 1);
    assert_eq!(discounted.line_discount(1), Some(Money::from_minor(400, GBP)));
    assert_eq!(discounted.line_discount(0), Some(Money::from_minor(500, GBP)));
    assert_eq!(discounted.total(), Money::from_minor(5_300, GBP));

    Ok(())
}

#[test]
fn welcome_coupon_splits_fixed_amount() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;

    assert_eq!(
        eligible_handles(&fixture, "web-retail-welcome", now)?,
        ["socks-bogof", "summer-sale", "welcome-coupon"]
    );

    let cart = fixture.cart("web-retail-welcome")?;
    let mut evaluation = Evaluation::for_cart(cart, now);
    let discounted = DiscountEngine::new().apply(&mut evaluation, fixture.catalog(), cart)?;

    let welcome = fixture.discount("welcome-coupon")?;
    let welcome_amounts: Vec<i64> = evaluation
        .get_applied()
        .iter()
        .filter(|applied| applied.discount == welcome)
        .map(|applied| applied.amount.to_minor_units())
        .collect();

    assert_eq!(welcome_amounts, [425, 75]);
    assert_eq!(discounted.total(), Money::from_minor(4_800, GBP));

    Ok(())
}

#[test]
fn vip_coupon_stops_further_discounts() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;

    assert_eq!(
        eligible_handles(&fixture, "vip", now)?,
        ["vip-stop", "socks-bogof", "summer-sale"]
    );

    let cart = fixture.cart("vip")?;
    let mut evaluation = Evaluation::for_cart(cart, now);
    let discounted = DiscountEngine::new().apply(&mut evaluation, fixture.catalog(), cart)?;

    let vip = fixture.discount("vip-stop")?;

    assert!(
        evaluation
            .get_applied()
            .iter()
            .all(|applied| applied.discount == vip)
    );
    assert_eq!(discounted.total(), Money::from_minor(2_475, GBP));

    Ok(())
}

#[test]
fn trade_customers_in_store() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;

    assert_eq!(
        eligible_handles(&fixture, "trade-pos", now)?,
        ["trade-discount", "socks-bogof", "pos-only"]
    );

    let cart = fixture.cart("trade-pos")?;
    let mut evaluation = Evaluation::for_cart(cart, now);
    let discounted = DiscountEngine::new().apply(&mut evaluation, fixture.catalog(), cart)?;

    // 15% trade discount, then 5% of what is left
    assert_eq!(discounted.line_discount(0), Some(Money::from_minor(231, GBP)));
    assert_eq!(discounted.line_discount(1), Some(Money::from_minor(193, GBP)));
    assert_eq!(discounted.total(), Money::from_minor(1_776, GBP));

    Ok(())
}

#[test]
fn coupon_validation_against_fixture_catalog() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;
    let catalog = fixture.catalog();

    assert!(catalog.validate_coupon("WELCOME5", now));
    assert!(catalog.validate_coupon("VIP", now));
    assert!(!catalog.validate_coupon("welcome5", now));
    assert!(!catalog.validate_coupon("FLASH", now), "expired");
    assert!(!catalog.validate_coupon("SPENT", now), "used up");
    assert!(!catalog.validate_coupon("", now));

    Ok(())
}

#[test]
fn visibility_is_separate_from_eligibility() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;

    let trade = fixture.customer_group("trade")?;
    let key = fixture.discount("trade-discount")?;
    let discount = fixture.catalog().get(key).ok_or("missing trade discount")?;

    assert!(!discount.is_visible_to(trade, now));

    let mut evaluation = Evaluation::new(now);
    evaluation.customer_group(trade);

    assert!(
        evaluation
            .get_discounts(fixture.catalog(), None)
            .iter()
            .any(|eligible| eligible.key() == key)
    );

    Ok(())
}

#[test]
fn receipt_renders_fixture_cart() -> TestResult {
    let fixture = Fixture::from_set("default")?;
    let now = now()?;

    let cart = fixture.cart("web-retail")?;
    let mut evaluation = Evaluation::for_cart(cart, now);
    let discounted = DiscountEngine::new().apply(&mut evaluation, fixture.catalog(), cart)?;

    let receipt = Receipt::new(&discounted, evaluation.get_applied());

    let mut out = Vec::new();
    receipt.write_to(&mut out, fixture.catalog())?;

    let output = String::from_utf8(out)?;

    assert!(output.contains("Hoodie (hoodie-m)"));
    assert!(output.contains("summer-sale"));
    assert!(output.contains("socks-bogof"));
    assert!(output.contains("3 (1 free)"));
    assert_eq!(receipt.savings()?, Money::from_minor(900, GBP));

    Ok(())
}
