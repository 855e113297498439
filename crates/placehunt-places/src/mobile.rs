//! Mobile-number predicate used by the presentation layer.
//!
//! Matches French mobile numbers in national format: ten digits starting
//! with `06` or `07`, once whitespace is removed.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::DetailRecord;

static MOBILE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[67][0-9]{8}$").expect("valid regex"));

/// Removes every whitespace character from a phone number.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

#[must_use]
pub fn is_mobile_number(phone: &str) -> bool {
    MOBILE_NUMBER.is_match(&normalize_phone(phone))
}

/// Keeps only records whose phone number is a mobile number.
#[must_use]
pub fn retain_mobile(records: Vec<DetailRecord>) -> Vec<DetailRecord> {
    records
        .into_iter()
        .filter(|r| is_mobile_number(&r.formatted_phone_number))
        .collect()
}

/// Records to show for one page: everything when `all_numbers` is set,
/// otherwise mobiles only.
#[must_use]
pub fn select_for_display(records: &[DetailRecord], all_numbers: bool) -> Vec<&DetailRecord> {
    records
        .iter()
        .filter(|r| all_numbers || is_mobile_number(&r.formatted_phone_number))
        .collect()
}
