//! Binary-prefixed size scaling.

/// Binary unit prefixes, index = power of 1024.
pub const UNITS: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Scales a byte count to the largest binary unit not exceeding it.
///
/// The unit index is `floor(log2(bytes) / 10)`, clamped to [`UNITS`]; zero
/// maps to bytes.
///
/// ```
/// use datfetch_core::report::scale1024;
///
/// assert_eq!(scale1024(0), (0.0, "B"));
/// assert_eq!(scale1024(1024), (1.0, "KiB"));
/// assert_eq!(scale1024(1_048_576), (1.0, "MiB"));
/// ```
#[must_use]
pub fn scale1024(bytes: u64) -> (f64, &'static str) {
    let power = if bytes == 0 {
        0
    } else {
        ((bytes.ilog2() / 10) as usize).min(UNITS.len() - 1)
    };
    let divisor = 1024_f64.powi(power as i32);
    (bytes as f64 / divisor, UNITS[power])
}

/// Formats a byte count as `"<value> <unit>"` with one decimal.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let (value, unit) = scale1024(bytes);
    format!("{value:.1} {unit}")
}
