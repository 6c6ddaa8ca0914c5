//! Payment derivation from duration, rate, extras and advance.
use rust_decimal::Decimal;

use gig_agenda::engine::finance::{PaymentTerms, cost_per_person};

fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

fn terms(rate: &str, advance: &str, extra: &str) -> PaymentTerms {
    PaymentTerms {
        hourly_rate: d(rate),
        advance_payment: d(advance),
        extra_cost: d(extra),
    }
}

#[test]
fn three_hours_at_one_thousand() {
    let summary = terms("1000", "0", "0").summarize(180).unwrap();

    assert_eq!(summary.total_payment, d("3000.00"));
    assert_eq!(summary.remaining_payment, d("3000.00"));
    assert_eq!(summary.percentage_paid, Decimal::ZERO);
}

#[test]
fn partial_hours_are_charged_per_minute() {
    let summary = terms("1000", "0", "250").summarize(210).unwrap();

    assert_eq!(summary.total_payment, d("3750.00"));
}

#[test]
fn advance_reduces_remaining_and_sets_percentage() {
    let summary = terms("1000", "500", "0").summarize(180).unwrap();

    assert_eq!(summary.remaining_payment, d("2500.00"));
    assert_eq!(summary.percentage_paid, d("16.67"));
}

#[test]
fn fully_paid_contract() {
    let summary = terms("1000", "3000", "0").summarize(180).unwrap();

    assert_eq!(summary.remaining_payment, Decimal::ZERO);
    assert_eq!(summary.percentage_paid, d("100.00"));
}

#[test]
fn advance_above_total_is_rejected() {
    let err = terms("1000", "3000.01", "0").summarize(180).unwrap_err();

    assert_eq!(err.field, "advance_payment");
}

#[test]
fn negative_amounts_are_rejected() {
    assert_eq!(
        terms("-1", "0", "0").summarize(60).unwrap_err().field,
        "hourly_rate"
    );
    assert_eq!(
        terms("100", "0", "-5").summarize(60).unwrap_err().field,
        "extra_cost"
    );
}

#[test]
fn zero_total_has_zero_percentage() {
    let summary = terms("0", "0", "0").summarize(120).unwrap();

    assert_eq!(summary.total_payment, Decimal::ZERO);
    assert_eq!(summary.percentage_paid, Decimal::ZERO);
}

#[test]
fn rounding_is_half_away_from_zero() {
    // 0.05/h for half an hour is 0.025.
    let summary = terms("0.05", "0", "0").summarize(30).unwrap();

    assert_eq!(summary.total_payment, d("0.03"));
}

#[test]
fn cost_per_person_needs_an_audience() {
    assert_eq!(cost_per_person(d("3000"), 120), Some(d("25.00")));
    assert_eq!(cost_per_person(d("1000"), 3), Some(d("333.33")));
    assert_eq!(cost_per_person(d("1000"), 0), None);
}

#[test]
fn amounts_beyond_the_money_columns_are_rejected() {
    assert_eq!(
        terms("100000000", "0", "0").summarize(60).unwrap_err().field,
        "hourly_rate"
    );
    assert_eq!(
        terms("100", "0", "100000000.00").summarize(60).unwrap_err().field,
        "extra_cost"
    );
    assert!(terms("99999999.99", "0", "0").validate().is_ok());
}

#[test]
fn huge_rate_is_a_field_error_not_a_panic() {
    let err = terms("79228162514264337593543950335", "0", "0")
        .summarize(240)
        .unwrap_err();

    assert_eq!(err.field, "hourly_rate");
}

#[test]
fn total_above_the_column_limit_is_rejected() {
    let err = terms("99999999.99", "0", "0").summarize(180).unwrap_err();

    assert_eq!(err.field, "hourly_rate");
}

#[test]
fn more_than_two_decimals_are_rejected() {
    assert_eq!(
        terms("10.005", "0", "0").summarize(180).unwrap_err().field,
        "hourly_rate"
    );
    assert_eq!(
        terms("10", "0.001", "0").summarize(180).unwrap_err().field,
        "advance_payment"
    );
    // Trailing zeros are not extra precision.
    assert!(terms("10.500", "0", "0").validate().is_ok());
}
