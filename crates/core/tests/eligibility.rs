//! Discount eligibility: activity, usage, channels, customer groups, coupons and ordering.

use jiff::{SignedDuration, Timestamp};
use rusty_money::{Money, iso::GBP};
use serde_json::json;
use slotmap::SlotMap;
use testresult::TestResult;

use rebate::prelude::*;

fn now() -> Result<Timestamp, jiff::Error> {
    "2024-06-01T12:00:00Z".parse()
}

fn sale(handle: &str, now: Timestamp) -> Discount {
    Discount::new(handle, handle, AmountOff::IDENTIFIER)
        .with_starts_at(now)
        .with_data(json!({ "percentage": 10 }))
}

fn handles<'c>(discounts: &[&'c Discount]) -> Vec<&'c str> {
    discounts.iter().copied().map(Discount::handle).collect()
}

fn cart<'a>() -> Result<Cart<'a>, CartError> {
    Cart::with_lines(
        [CartLine::new(
            ProductKey::default(),
            VariantKey::default(),
            Money::from_minor(1_000, GBP),
            1,
        )],
        GBP,
    )
}

#[test]
fn unlimited_discounts_are_always_usable() -> TestResult {
    let now = now()?;
    let mut catalog = DiscountCatalog::new();

    for uses in [0, 1, 1_000, u32::MAX] {
        catalog.insert(sale(&format!("uses-{uses}"), now).with_uses(uses));
    }

    let eligible = Evaluation::new(now).get_discounts(&catalog, None);

    assert_eq!(eligible.len(), 4);
    assert!(catalog.discounts().all(Discount::is_usable));

    Ok(())
}

#[test]
fn inactive_and_exhausted_discounts_are_excluded() -> TestResult {
    let now = now()?;
    let hour = SignedDuration::from_hours(1);
    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("live", now));
    catalog.insert(sale("future", now.checked_add(hour)?));
    catalog.insert(sale("ended", now.checked_sub(hour)?).with_ends_at(now));
    catalog.insert(sale("exhausted", now).with_uses(5).with_max_uses(5));
    catalog.insert(Discount::new("Draft", "draft", AmountOff::IDENTIFIER));

    let eligible = Evaluation::new(now).get_discounts(&catalog, None);

    assert_eq!(handles(&eligible), ["live"]);

    Ok(())
}

#[test]
fn unattached_discounts_apply_in_every_context() -> TestResult {
    let now = now()?;
    let mut channels = SlotMap::<ChannelKey, ()>::with_key();
    let mut groups = SlotMap::<CustomerGroupKey, ()>::with_key();
    let web = channels.insert(());
    let pos = channels.insert(());
    let retail = groups.insert(());

    let mut catalog = DiscountCatalog::new();
    catalog.insert(sale("everywhere", now));

    let mut contexts = [
        Evaluation::new(now),
        Evaluation::new(now),
        Evaluation::new(now),
        Evaluation::new(now),
    ];

    let [_, web_only, pos_retail, all] = &mut contexts;

    web_only.channel(web);
    pos_retail.channel(pos).customer_group(retail);
    all.channel([web, pos]).customer_group(retail);

    for evaluation in &contexts {
        assert_eq!(
            handles(&evaluation.get_discounts(&catalog, None)),
            ["everywhere"]
        );
    }

    Ok(())
}

#[test]
fn disabled_channel_never_matches_regardless_of_window() -> TestResult {
    let now = now()?;
    let mut channels = SlotMap::<ChannelKey, ()>::with_key();
    let web = channels.insert(());

    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("disabled-open", now).with_channel(ChannelAvailability::disabled(
        web,
        Window::open(),
    )));
    catalog.insert(
        sale("disabled-current", now).with_channel(ChannelAvailability::disabled(
            web,
            Window::between(Timestamp::MIN, Timestamp::MAX),
        )),
    );
    catalog.insert(sale("enabled", now).with_channel(ChannelAvailability::enabled(
        web,
        Window::starting(now),
    )));

    let mut evaluation = Evaluation::new(now);
    evaluation.channel(web);

    assert_eq!(handles(&evaluation.get_discounts(&catalog, None)), ["enabled"]);

    Ok(())
}

#[test]
fn channel_window_is_checked_independently() -> TestResult {
    let now = now()?;
    let hour = SignedDuration::from_hours(1);
    let mut channels = SlotMap::<ChannelKey, ()>::with_key();
    let web = channels.insert(());

    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("not-yet", now).with_channel(ChannelAvailability::enabled(
        web,
        Window::starting(now.checked_add(hour)?),
    )));
    catalog.insert(sale("over", now).with_channel(ChannelAvailability::enabled(
        web,
        Window::between(now.checked_sub(hour)?, now),
    )));

    let mut evaluation = Evaluation::new(now);
    evaluation.channel(web);

    assert!(evaluation.get_discounts(&catalog, None).is_empty());

    Ok(())
}

#[test]
fn channel_restriction_needs_a_registered_channel() -> TestResult {
    let now = now()?;
    let mut channels = SlotMap::<ChannelKey, ()>::with_key();
    let web = channels.insert(());
    let pos = channels.insert(());

    let mut catalog = DiscountCatalog::new();
    catalog.insert(
        sale("web-only", now).with_channel(ChannelAvailability::enabled(web, Window::open())),
    );

    let mut in_store = Evaluation::new(now);
    in_store.channel(pos);

    let mut either = Evaluation::new(now);
    either.channel(pos).channel(web);

    let unrestricted = Evaluation::new(now);

    assert!(in_store.get_discounts(&catalog, None).is_empty());
    assert_eq!(handles(&either.get_discounts(&catalog, None)), ["web-only"]);
    assert_eq!(
        handles(&unrestricted.get_discounts(&catalog, None)),
        ["web-only"]
    );

    Ok(())
}

#[test]
fn customer_groups_gate_on_enabled_not_visible() -> TestResult {
    let now = now()?;
    let mut groups = SlotMap::<CustomerGroupKey, ()>::with_key();
    let retail = groups.insert(());
    let trade = groups.insert(());

    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("hidden-trade", now).with_customer_group(
        CustomerGroupAvailability::enabled(trade, Window::open()).with_visible(false),
    ));
    catalog.insert(sale("listed-only", now).with_customer_group(
        CustomerGroupAvailability::disabled(trade, Window::open()).with_visible(true),
    ));
    catalog.insert(sale("retail", now).with_customer_group(
        CustomerGroupAvailability::enabled(retail, Window::open()),
    ));

    let mut evaluation = Evaluation::new(now);
    evaluation.customer_group(trade);

    assert_eq!(
        handles(&evaluation.get_discounts(&catalog, None)),
        ["hidden-trade"]
    );

    Ok(())
}

#[test]
fn cart_coupon_selects_exact_match() -> TestResult {
    let now = now()?;
    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("abcd", now).with_coupon("ABCD"));
    catalog.insert(sale("abcdef", now).with_coupon("ABCDEF"));

    let cart = cart()?.with_coupon_code("ABCDEF");
    let eligible = Evaluation::new(now).get_discounts(&catalog, Some(&cart));

    assert_eq!(handles(&eligible), ["abcdef"]);

    Ok(())
}

#[test]
fn coupon_gated_discounts_need_a_cart_coupon() -> TestResult {
    let now = now()?;
    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("open", now));
    catalog.insert(sale("gated", now).with_coupon("SECRET"));

    let cart = cart()?;
    let evaluation = Evaluation::new(now);

    assert_eq!(
        handles(&evaluation.get_discounts(&catalog, Some(&cart))),
        ["open"]
    );
    assert_eq!(
        handles(&evaluation.get_discounts(&catalog, None)),
        ["open", "gated"],
        "coupons are not filtered without a cart"
    );

    Ok(())
}

#[test]
fn coupon_validation_ignores_channel_and_group_restrictions() -> TestResult {
    let now = now()?;
    let mut channels = SlotMap::<ChannelKey, ()>::with_key();
    let mut groups = SlotMap::<CustomerGroupKey, ()>::with_key();
    let web = channels.insert(());
    let trade = groups.insert(());

    let mut catalog = DiscountCatalog::new();

    catalog.insert(
        sale("ten-off", now)
            .with_coupon("10OFF")
            .with_channel(ChannelAvailability::disabled(web, Window::open()))
            .with_customer_group(CustomerGroupAvailability::disabled(trade, Window::open())),
    );

    assert!(catalog.validate_coupon("10OFF", now));
    assert!(!catalog.validate_coupon("20OFF", now));

    Ok(())
}

#[test]
fn discounts_are_ordered_by_priority() -> TestResult {
    let now = now()?;
    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("five", now).with_priority(5));
    catalog.insert(sale("one", now).with_priority(1));
    catalog.insert(sale("three", now).with_priority(3));

    let eligible = Evaluation::new(now).get_discounts(&catalog, None);
    let priorities: Vec<u32> = eligible.iter().copied().map(Discount::priority).collect();

    assert_eq!(priorities, [1, 3, 5]);

    Ok(())
}

#[test]
fn equal_priorities_keep_creation_order() -> TestResult {
    let now = now()?;
    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("b", now).with_priority(2));
    catalog.insert(sale("a", now).with_priority(1));
    catalog.insert(sale("c", now).with_priority(2));
    catalog.insert(sale("d", now).with_priority(1));

    let eligible = Evaluation::new(now).get_discounts(&catalog, None);

    assert_eq!(handles(&eligible), ["a", "d", "b", "c"]);

    Ok(())
}

#[test]
fn listing_is_idempotent() -> TestResult {
    let now = now()?;
    let mut channels = SlotMap::<ChannelKey, ()>::with_key();
    let web = channels.insert(());

    let mut catalog = DiscountCatalog::new();

    for (idx, priority) in [3, 1, 2, 1].into_iter().enumerate() {
        catalog.insert(
            sale(&format!("sale-{idx}"), now)
                .with_priority(priority)
                .with_channel(ChannelAvailability::enabled(web, Window::open())),
        );
    }

    let cart = cart()?;
    let mut evaluation = Evaluation::new(now);
    evaluation.channel(web);

    let first = handles(&evaluation.get_discounts(&catalog, Some(&cart)));
    let second = handles(&evaluation.get_discounts(&catalog, Some(&cart)));

    assert_eq!(first, second);
    assert_eq!(first, ["sale-1", "sale-3", "sale-2", "sale-0"]);

    Ok(())
}

#[test]
fn product_scope_limits_to_relevant_discounts() -> TestResult {
    let now = now()?;
    let mut products = SlotMap::<ProductKey, ()>::with_key();
    let hoodie = products.insert(());
    let socks = products.insert(());

    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("anything", now));
    catalog.insert(sale("hoodies", now).with_purchasable(DiscountPurchasable::condition(
        PurchasableRef::Product(hoodie),
    )));
    catalog.insert(sale("socks", now).with_purchasable(DiscountPurchasable::reward(
        PurchasableRef::Product(socks),
    )));

    let mut evaluation = Evaluation::new(now);
    evaluation.products(ProductScope::new([hoodie]));

    assert_eq!(
        handles(&evaluation.get_discounts(&catalog, None)),
        ["anything", "hoodies"]
    );

    let mut rewards = Evaluation::new(now);
    rewards.products(ProductScope::new([hoodie]).with_scope(PurchasableScope::Reward));

    assert_eq!(
        handles(&rewards.get_discounts(&catalog, None)),
        ["anything", "hoodies"],
        "condition rows are ignored when scoping to rewards"
    );

    Ok(())
}

#[test]
fn variant_limited_discounts_are_excluded_from_product_scope() -> TestResult {
    let now = now()?;
    let mut products = SlotMap::<ProductKey, ()>::with_key();
    let mut variants = SlotMap::<VariantKey, ()>::with_key();
    let hoodie = products.insert(());
    let large = variants.insert(());

    let mut catalog = DiscountCatalog::new();

    catalog.insert(sale("anything", now));
    catalog.insert(sale("variant-limited", now).with_purchasable(
        DiscountPurchasable::limitation(PurchasableRef::Variant(large)),
    ));

    let mut evaluation = Evaluation::new(now);
    evaluation.products(ProductScope::new([hoodie]));

    assert_eq!(
        handles(&evaluation.get_discounts(&catalog, None)),
        ["anything"]
    );

    Ok(())
}
