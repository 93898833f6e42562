use num_bigint::BigUint;
use std::str::FromStr;

/// Parse a raw on-chain amount into its canonical decimal digit string.
///
/// Only plain ASCII digits are accepted; signs, separators and exponents are rejected.
pub fn canonical_amount(raw: &str) -> Option<String> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::from_str(raw).ok().map(|value| value.to_string())
}

/// Insert a decimal point `precision` digits from the right of an integer digit string.
///
/// Works purely on the digits so amounts beyond `u64`/`f64` range keep every digit.
/// Trailing zeros are preserved (`"5000000"` at precision 6 is `"5.000000"`).
pub fn insert_decimal_point(raw: &str, precision: u32) -> String {
    if precision == 0 {
        return raw.to_string();
    }

    let precision = precision as usize;
    if raw.len() > precision {
        let (integer, fraction) = raw.split_at(raw.len() - precision);
        format!("{}.{}", integer, fraction)
    } else {
        format!("0.{}{}", "0".repeat(precision - raw.len()), raw)
    }
}
