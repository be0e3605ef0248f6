//! Sequential color scale and per-metric domain computation.
//!
//! The map uses a single-hue red ramp over a `[lo, hi]` domain. The domain
//! is global per metric (computed over all years), so color intensity stays
//! comparable while the animation scrubs through years.

use crate::dataset::DatasetIndex;
use crate::models::Metric;

/// sRGB triplet used for map fills and the legend gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Darken by multiplying each channel with `0.7^amount` (the hover
    /// emphasis; `amount` 0.8 gives a clearly distinct shade).
    pub fn darken(self, amount: f64) -> Rgb {
        let k = 0.7f64.powf(amount);
        let scale = |c: u8| ((c as f64) * k).round().clamp(0.0, 255.0) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Neutral fill for countries with no record at the active (year, metric).
/// Chosen off the ramp: the ramp floor is near-white, so "zero" and
/// "unknown" never look identical.
pub const NO_DATA: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

/// Fixed lower bound of the PM2.5 domain. Values below it are valid but
/// compressed against the floor (a visual choice, not a data filter).
pub const PM25_FLOOR: f64 = 5.0;

/// Nine-anchor single-hue red ramp (ColorBrewer "Reds"), sampled with
/// piecewise-linear interpolation.
const REDS: [Rgb; 9] = [
    Rgb::new(0xff, 0xf5, 0xf0),
    Rgb::new(0xfe, 0xe0, 0xd2),
    Rgb::new(0xfc, 0xbb, 0xa1),
    Rgb::new(0xfc, 0x92, 0x72),
    Rgb::new(0xfb, 0x6a, 0x4a),
    Rgb::new(0xef, 0x3b, 0x2c),
    Rgb::new(0xcb, 0x18, 0x1d),
    Rgb::new(0xa5, 0x0f, 0x15),
    Rgb::new(0x67, 0x00, 0x0d),
];

/// A value is either backed by a record (and colored) or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Value(Rgb),
    NoData,
}

impl Fill {
    pub fn rgb(self) -> Rgb {
        match self {
            Fill::Value(c) => c,
            Fill::NoData => NO_DATA,
        }
    }
}

/// Sequential scale over a fixed numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub lo: f64,
    pub hi: f64,
}

impl ColorScale {
    /// Compute the active domain for a metric:
    /// - PM2.5: `[PM25_FLOOR, max over all years]`
    /// - mortality: `[0, max of that metric over all years and countries]`
    ///
    /// When the metric has no data (or its max does not exceed the floor)
    /// the domain widens to `floor + 1.0` so the mapping stays valid.
    pub fn for_metric(metric: Metric, index: &DatasetIndex) -> Self {
        let lo = match metric {
            Metric::Pm25 => PM25_FLOOR,
            _ => 0.0,
        };
        let hi = match index.metric_max(metric) {
            Some(max) if max > lo => max,
            _ => lo + 1.0,
        };
        Self { lo, hi }
    }

    /// Sample the ramp at `t` in `[0, 1]` (clamped).
    pub fn sample(self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let pos = t * (REDS.len() - 1) as f64;
        let i = (pos.floor() as usize).min(REDS.len() - 2);
        let frac = pos - i as f64;
        let a = REDS[i];
        let b = REDS[i + 1];
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        Rgb::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
    }

    /// Map a value into the ramp. Out-of-domain values are clamped by the
    /// scale itself.
    pub fn color(self, v: f64) -> Rgb {
        let span = self.hi - self.lo;
        if span <= 0.0 {
            return self.sample(0.0);
        }
        self.sample((v - self.lo) / span)
    }
}

/// Fill for a country under the current state. `NoData` iff the index has
/// no record for the (metric, year, country) triple; a recorded 0.0 is a
/// real value and gets the ramp floor color, not the neutral one.
pub fn fill_for(
    metric: Metric,
    year: i32,
    country: &str,
    scale: ColorScale,
    index: &DatasetIndex,
) -> Fill {
    match index.value(metric, year, country) {
        Some(v) => Fill::Value(scale.color(v)),
        None => Fill::NoData,
    }
}

/// "Nice" tick values across `[lo, hi]`: multiples of a 1/2/5 × 10^k step
/// chosen so roughly `count` ticks fall inside the range.
pub fn nice_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite()) || count == 0 || hi <= lo {
        return Vec::new();
    }
    let step = tick_step(lo, hi, count);
    if step <= 0.0 {
        return Vec::new();
    }
    let start = (lo / step).ceil() as i64;
    let stop = (hi / step).floor() as i64;
    (start..=stop).map(|i| i as f64 * step).collect()
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count.max(1) as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let err = raw / base;
    // Thresholds are the geometric midpoints between 1, 2, 5 and 10.
    let factor = if err >= 50f64.sqrt() {
        10.0
    } else if err >= 10f64.sqrt() {
        5.0
    } else if err >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    base * factor
}
