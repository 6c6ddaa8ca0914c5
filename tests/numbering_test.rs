use chrono::NaiveDate;

use gig_agenda::engine::numbering::{
    format_contract_number, highest_sequence, parse_sequence, sequence_prefix,
};

#[test]
fn prefix_follows_the_creation_year() {
    let created = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();

    assert_eq!(sequence_prefix(created), "CT-2025");
}

#[test]
fn sequence_is_zero_padded_to_four_digits() {
    assert_eq!(format_contract_number("CT-2025", 1), "CT-2025-0001");
    assert_eq!(format_contract_number("CT-2025", 42), "CT-2025-0042");
    assert_eq!(format_contract_number("CT-2025", 12345), "CT-2025-12345");
}

#[test]
fn parse_only_accepts_numbers_under_the_prefix() {
    assert_eq!(parse_sequence("CT-2025", "CT-2025-0007"), Some(7));
    assert_eq!(parse_sequence("CT-2025", "CT-2024-0007"), None);
    assert_eq!(parse_sequence("CT-2025", "CT-2025-"), None);
    assert_eq!(parse_sequence("CT-2025", "CT-2025-00a7"), None);
    assert_eq!(parse_sequence("CT-2025", "CT-20250007"), None);
}

#[test]
fn highest_sequence_compares_numerically() {
    let issued = ["CT-2025-9999", "CT-2025-10000", "CT-2025-0002", "CT-2024-20000"];

    assert_eq!(highest_sequence("CT-2025", issued), 10000);
    assert_eq!(highest_sequence("CT-2026", issued), 0);
}
