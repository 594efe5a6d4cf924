//! Shared formatting helpers.

const BYTE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Formats a byte count on a base-1024 ladder with at most two decimals.
///
/// `1024.0` renders as `"1 KB"`, `1536.0` as `"1.5 KB"` and zero as
/// `"0 Bytes"`. Negative values keep their sign, values below one byte stay
/// in `Bytes`, and non-finite input renders as `"0 Bytes"`.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes == 0.0 {
        return "0 Bytes".to_string();
    }

    let sign = if bytes < 0.0 { "-" } else { "" };
    let mut value = bytes.abs();
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{sign}{trimmed} {}", BYTE_UNITS[unit])
}

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Whole minutes in a number of seconds, rounding down. Negative input is zero.
pub fn whole_minutes(seconds: i64) -> u64 {
    u64::try_from(seconds.max(0)).unwrap_or(0) / 60
}
