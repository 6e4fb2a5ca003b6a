use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest amount the store accepts: precision 12, scale 2.
pub const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;

pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a decimal amount into integer minor units, rounding to 2 places first.
/// Returns `None` when the value does not fit in an `i64`.
pub fn to_cents(d: Decimal) -> Option<i64> {
    round_money(d)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|c| c.to_i64())
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Trims and uppercases a currency code. Codes are 3 to 8 ASCII letters or digits.
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    let valid = (3..=8).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(code)
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
