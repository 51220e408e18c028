use wolfhost::currency::{convert_from_kes, convert_to_kes, is_supported, rates};
use wolfhost::tiers::Tier;

#[test]
fn tier_prices() {
    assert_eq!("Limited".parse::<Tier>().unwrap().price(), 50.0);
    assert_eq!("Unlimited".parse::<Tier>().unwrap().price(), 100.0);
    assert_eq!("Admin".parse::<Tier>().unwrap().price(), 200.0);
}

#[test]
fn unknown_plan_is_rejected() {
    assert!("Premium".parse::<Tier>().is_err());
    assert!("".parse::<Tier>().is_err());
    assert_eq!("unlimited".parse::<Tier>().unwrap(), Tier::Unlimited);
}

#[test]
fn description_tag_round_trips() {
    for tier in Tier::ALL {
        assert_eq!(Tier::from_description(&tier.description_tag()), Some(tier));
    }
    assert_eq!(Tier::from_description("my minecraft box"), None);
}

#[test]
fn legacy_plan_inference_uses_limit_thresholds() {
    let limited = Tier::Limited.limits();
    let unlimited = Tier::Unlimited.limits();
    let admin = Tier::Admin.limits();
    assert_eq!(Tier::infer_from_limits(limited.memory, limited.cpu), Tier::Limited);
    assert_eq!(Tier::infer_from_limits(unlimited.memory, unlimited.cpu), Tier::Unlimited);
    assert_eq!(Tier::infer_from_limits(admin.memory, admin.cpu), Tier::Admin);
    assert_eq!(Tier::infer_from_limits(0, 100), Tier::Admin);
    assert_eq!(Tier::infer_from_limits(1024, 50), Tier::Limited);
}

#[test]
fn currency_round_trip_stays_within_rounding() {
    let amounts = [1.0, 49.99, 500.0, 1234.56, 100000.0];
    for rate in rates() {
        for amount in amounts {
            let foreign = convert_from_kes(amount, &rate.code).unwrap();
            let back = convert_to_kes(foreign, &rate.code).unwrap();
            // Rounding the foreign amount to cents moves the KES value by at most half a cent of that currency.
            let tolerance = 0.005 * rate.kes_per_unit + 0.01;
            assert!(
                (back - amount).abs() <= tolerance,
                "{} {amount} -> {foreign} -> {back}",
                rate.code
            );
        }
    }
}

#[test]
fn kes_is_identity_and_unknown_codes_fail() {
    assert_eq!(convert_to_kes(250.0, "KES"), Some(250.0));
    assert_eq!(convert_to_kes(10.0, "usd"), Some(1295.0));
    assert!(is_supported("EUR"));
    assert_eq!(convert_to_kes(10.0, "XYZ"), None);
    assert_eq!(convert_from_kes(10.0, "XYZ"), None);
}
