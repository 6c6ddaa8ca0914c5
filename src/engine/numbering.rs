//! Contract numbers: `CT-{YYYY}-{NNNN}`, sequenced per creation year.
//!
//! Only formatting and parsing live here. Handing out the next value is done
//! under a row lock by [`crate::db::sequences`].

use chrono::{Datelike, NaiveDate};

pub const NUMBER_PREFIX: &str = "CT";

/// Sequence scope for contracts created on `created_on`, e.g. `CT-2025`.
pub fn sequence_prefix(created_on: NaiveDate) -> String {
    format!("{NUMBER_PREFIX}-{}", created_on.year())
}

pub fn format_contract_number(prefix: &str, sequence: u32) -> String {
    format!("{prefix}-{sequence:04}")
}

/// Numeric suffix of `number` if it belongs to `prefix`.
///
/// Comparing the parsed value rather than the string keeps `CT-2025-10000`
/// above `CT-2025-9999`.
pub fn parse_sequence(prefix: &str, number: &str) -> Option<u32> {
    let suffix = number.strip_prefix(prefix)?.strip_prefix('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Highest sequence among `numbers` sharing `prefix`, or 0 when there is none.
pub fn highest_sequence<'a, I>(prefix: &str, numbers: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    numbers
        .into_iter()
        .filter_map(|n| parse_sequence(prefix, n))
        .max()
        .unwrap_or(0)
}
