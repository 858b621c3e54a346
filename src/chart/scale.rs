//! Scale math shared by the renderer and the producers' tests.

use crate::projector::Domain;

/// Maps a value domain linearly onto a pixel range. The range may be
/// inverted (SVG y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: Domain,
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: Domain, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let t = (v - self.domain.min) / self.domain.span();
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

/// Ordinal positions across a pixel range. A point scale is a band scale
/// with zero-width bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
    bandwidth: f64,
    len: usize,
}

impl BandScale {
    /// Bands with equal inner and outer padding (fractions of a step).
    pub fn band(len: usize, range: (f64, f64), padding: f64) -> Self {
        Self::build(len, range, padding, padding)
    }

    /// Points with outer padding only.
    pub fn point(len: usize, range: (f64, f64), padding: f64) -> Self {
        Self::build(len, range, 1.0, padding)
    }

    fn build(len: usize, range: (f64, f64), inner: f64, outer: f64) -> Self {
        let (r0, r1) = range;
        let n = len as f64;
        let step = (r1 - r0) / (n - inner + 2.0 * outer).max(1.0);
        let start = r0 + ((r1 - r0) - step * (n - inner)) * 0.5;
        Self {
            start,
            step,
            bandwidth: step * (1.0 - inner),
            len,
        }
    }

    /// Left edge of band `i` (or the point itself).
    pub fn position(&self, i: usize) -> Option<f64> {
        (i < self.len).then(|| self.start + self.step * i as f64)
    }

    /// Center of band `i`.
    pub fn center(&self, i: usize) -> Option<f64> {
        self.position(i).map(|x| x + self.bandwidth / 2.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

/// Tick spacing as `(factor, exponent)`: step = factor × 10^exponent.
fn tick_increment(domain: Domain, count: usize) -> Option<(f64, i32)> {
    let raw = domain.span() / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }
    let exp = raw.log10().floor() as i32;
    let err = raw / 10f64.powi(exp);
    let factor = if err >= 50f64.sqrt() {
        10.0
    } else if err >= 10f64.sqrt() {
        5.0
    } else if err >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    Some((factor, exp))
}

/// Round-number ticks inside `domain`, roughly `count` of them.
pub fn nice_ticks(domain: Domain, count: usize) -> Vec<f64> {
    let Some((factor, exp)) = tick_increment(domain, count) else {
        return Vec::new();
    };
    if exp >= 0 {
        let step = factor * 10f64.powi(exp);
        let first = (domain.min / step).ceil() as i64;
        let last = (domain.max / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    } else {
        // Divide by the inverse step so fractional ticks come out exact.
        let inv = 10f64.powi(-exp) / factor;
        let first = (domain.min * inv).ceil() as i64;
        let last = (domain.max * inv).floor() as i64;
        (first..=last).map(|i| i as f64 / inv).collect()
    }
}

/// Decimals needed to print ticks produced by [`nice_ticks`].
pub fn tick_decimals(domain: Domain, count: usize) -> usize {
    match tick_increment(domain, count) {
        Some((factor, exp)) if exp < 0 => {
            let decimals = -exp - if factor >= 10.0 { 1 } else { 0 };
            decimals.max(0) as usize
        }
        _ => 0,
    }
}
