//! Currency helpers. Amounts are integer minor units (cents) everywhere
//! except the HTTP boundary, which speaks decimal currency numbers.

/// Converts a decimal currency amount to cents, rounding half away from zero.
/// Returns `None` for negative, NaN or out-of-range input.
pub fn to_minor(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }

    let cents = (amount * 100.0).round();
    if cents > i64::MAX as f64 {
        return None;
    }

    Some(cents as i64)
}

pub fn from_minor(amount_minor: i64) -> f64 {
    amount_minor as f64 / 100.0
}

/// `$1234.50` style rendering used in customer-facing messages.
pub fn format_minor(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// `percent`% of `amount_minor`, rounded half-up to the cent.
pub fn percent_of(amount_minor: i64, percent: i32) -> i64 {
    let product = i128::from(amount_minor) * i128::from(percent);
    let rounded = (product + 50).div_euclid(100);
    i64::try_from(rounded).unwrap_or(i64::MAX)
}
