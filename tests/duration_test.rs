//! Event window arithmetic, including events that run past midnight.
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use gig_agenda::engine::duration::{EventWindow, format_minutes, minutes_to_hours};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn same_day_event_counts_plain_minutes() {
    let window = EventWindow::new(date(2025, 8, 21), time(20, 0), time(23, 0)).unwrap();

    assert_eq!(window.total_minutes(), 180);
    assert!(!window.crosses_midnight());
}

#[test]
fn end_before_start_rolls_into_next_day() {
    let window = EventWindow::new(date(2025, 8, 21), time(22, 0), time(2, 0)).unwrap();

    assert_eq!(window.total_minutes(), 240);
    assert_eq!(window.hours(), Decimal::new(4, 0));
    assert!(window.crosses_midnight());
    assert_eq!(window.end.date(), date(2025, 8, 22));
    assert_eq!(window.end.time(), time(2, 0));
}

#[test]
fn ending_exactly_at_midnight() {
    let window = EventWindow::new(date(2025, 12, 31), time(21, 30), time(0, 0)).unwrap();

    assert_eq!(window.total_minutes(), 150);
    assert_eq!(window.end.date(), date(2026, 1, 1));
}

#[test]
fn identical_start_and_end_is_rejected() {
    let err = EventWindow::new(date(2025, 8, 21), time(20, 0), time(20, 0)).unwrap_err();

    assert_eq!(err.field, "end_time");
}

#[test]
fn seconds_round_to_the_nearest_minute() {
    let start = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
    let end = NaiveTime::from_hms_opt(20, 59, 40).unwrap();
    let window = EventWindow::new(date(2025, 8, 21), start, end).unwrap();

    assert_eq!(window.total_minutes(), 60);
}

#[test]
fn contains_is_inclusive_at_both_ends() {
    let window = EventWindow::new(date(2025, 8, 21), time(23, 0), time(1, 0)).unwrap();

    assert!(window.contains(date(2025, 8, 21).and_time(time(23, 0))));
    assert!(window.contains(date(2025, 8, 22).and_time(time(0, 30))));
    assert!(window.contains(date(2025, 8, 22).and_time(time(1, 0))));
    assert!(!window.contains(date(2025, 8, 22).and_time(time(1, 1))));
    assert!(!window.contains(date(2025, 8, 21).and_time(time(22, 59))));
}

#[test]
fn display_helpers() {
    assert_eq!(format_minutes(240), "4h");
    assert_eq!(format_minutes(210), "3h 30m");
    assert_eq!(format_minutes(45), "45m");
    assert_eq!(minutes_to_hours(210), Decimal::new(350, 2));
    assert_eq!(minutes_to_hours(100), Decimal::new(167, 2));
}
