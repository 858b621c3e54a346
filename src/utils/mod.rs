use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

// ── Number formatting ─────────────────────────────────────────────────────────

/// Insert thousands separators into an integer.
pub fn fmt_number(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Round to the nearest integer and group thousands: 2499.6 → "2,500".
pub fn fmt_grouped(v: f64) -> String {
    fmt_number(v.round() as i64)
}

/// Two fixed decimals: 1.5 → "1.50".
pub fn fmt_fixed2(v: f64) -> String {
    format!("{:.2}", v)
}

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Compact SI notation with two significant digits, used for axis ticks.
/// 2500 → "2.5k" | 12000 → "12k" | 500 → "500" | 0.25 → "250m"
pub fn fmt_si(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return "0.0".to_string();
    }

    let mut exp = v.abs().log10().floor() as i32;
    // Rounding to two significant digits can carry into the next power (9.96 → 10).
    let rounded = round_sig(v, 2);
    if rounded.abs() >= 10f64.powi(exp + 1) {
        exp += 1;
    }

    let k = exp.div_euclid(3).clamp(-8, 8);
    let scaled = rounded / 10f64.powi(3 * k);
    let decimals = (1 - (exp - 3 * k)).max(0) as usize;
    let prefix = SI_PREFIXES[(k + 8) as usize];
    format!("{:.*}{}", decimals, scaled, prefix)
}

fn round_sig(v: f64, digits: i32) -> f64 {
    let exp = v.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - exp);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(1_234_567), "1,234,567");
        assert_eq!(fmt_number(0), "0");
        assert_eq!(fmt_number(-42_000), "-42,000");
        assert_eq!(fmt_number(999), "999");
    }

    #[test]
    fn test_fmt_grouped_rounds() {
        assert_eq!(fmt_grouped(2499.6), "2,500");
        assert_eq!(fmt_grouped(1234.4), "1,234");
        assert_eq!(fmt_grouped(-3500.0), "-3,500");
    }

    #[test]
    fn test_fmt_fixed2() {
        assert_eq!(fmt_fixed2(1.5), "1.50");
        assert_eq!(fmt_fixed2(0.0), "0.00");
    }

    #[test]
    fn test_fmt_si() {
        assert_eq!(fmt_si(2500.0), "2.5k");
        assert_eq!(fmt_si(12000.0), "12k");
        assert_eq!(fmt_si(1000.0), "1.0k");
        assert_eq!(fmt_si(500.0), "500");
        assert_eq!(fmt_si(0.0), "0.0");
        assert_eq!(fmt_si(0.25), "250m");
        assert_eq!(fmt_si(3_400_000.0), "3.4M");
        assert_eq!(fmt_si(-1500.0), "-1.5k");
    }
}
