//! Value-to-color palette lookup.
//!
//! A [`Palette`] is a 256-entry RGB table rendered once from a sparse set
//! of color stops, then sampled many times per frame. Rendering follows
//! the usual linear color-stop rules: each table entry takes the color at
//! the center of its bucket, interpolated between the surrounding stops,
//! and entries outside the first/last stop repeat that stop's color.

use crate::types::{HotlineError, Rgb, StopSpec};

/// Number of entries in a palette table.
pub const PALETTE_SIZE: usize = 256;

/// Upper bound on the normalized value before indexing.
///
/// Keeps `value == max` in the last bucket instead of one past it.
const MAX_RELATIVE: f64 = 0.999;

/// A resolved color stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the palette in `[0, 1]`.
    pub offset: f64,
    pub color: Rgb,
}

impl ColorStop {
    #[must_use]
    pub const fn new(offset: f64, color: Rgb) -> Self {
        Self { offset, color }
    }
}

/// Precomputed RGB lookup table.
///
/// Read-only once built; share it by reference across draw calls and
/// threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    table: [Rgb; PALETTE_SIZE],
}

impl Palette {
    /// Render the lookup table from color stops.
    ///
    /// Offsets are clamped to `[0, 1]` and stops are stably sorted, so
    /// two stops at the same offset produce a hard edge there. An empty
    /// stop list yields an all-black table.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(stops: &[ColorStop]) -> Self {
        let mut sorted: Vec<ColorStop> = stops
            .iter()
            .map(|s| ColorStop::new(s.offset.clamp(0.0, 1.0), s.color))
            .collect();
        sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        let mut table = [Rgb::BLACK; PALETTE_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            let t = (i as f64 + 0.5) / PALETTE_SIZE as f64;
            *entry = color_at(&sorted, t);
        }
        Self { table }
    }

    /// A palette with a single color everywhere.
    #[must_use]
    pub const fn solid(color: Rgb) -> Self {
        Self {
            table: [color; PALETTE_SIZE],
        }
    }

    /// Parse CSS color stops and render the table.
    ///
    /// # Errors
    ///
    /// Returns [`HotlineError::InvalidColor`] if any stop's color string
    /// cannot be parsed.
    pub fn from_css(stops: &[StopSpec]) -> Result<Self, HotlineError> {
        let resolved = stops
            .iter()
            .map(|s| Ok(ColorStop::new(s.offset, parse_css_color(&s.color)?)))
            .collect::<Result<Vec<_>, HotlineError>>()?;
        Ok(Self::build(&resolved))
    }

    /// Look up the color for `value` within the domain `[min, max]`.
    ///
    /// Values outside the domain clamp to the first or last entry.
    /// Requires `max > min`; this is asserted in debug builds. In release
    /// builds an empty domain degrades to a defined entry instead of
    /// indexing out of range.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn sample(&self, value: f64, min: f64, max: f64) -> Rgb {
        debug_assert!(max > min, "palette domain is empty: min={min}, max={max}");
        // `f64::max` maps NaN to 0.0.
        let relative = ((value - min) / (max - min)).max(0.0).min(MAX_RELATIVE);
        let index = (relative * PALETTE_SIZE as f64).floor() as usize;
        self.table[index.min(PALETTE_SIZE - 1)]
    }

    /// All table entries, lowest value first.
    #[must_use]
    pub const fn entries(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.table
    }
}

/// Parse a CSS color string (named, hex, `rgb()`, `hsl()`, ...) into RGB.
///
/// Alpha is discarded.
///
/// # Errors
///
/// Returns [`HotlineError::InvalidColor`] when the string is not a color.
pub fn parse_css_color(value: &str) -> Result<Rgb, HotlineError> {
    let color = csscolorparser::parse(value).map_err(|e| HotlineError::InvalidColor {
        value: value.to_owned(),
        reason: e.to_string(),
    })?;
    let [r, g, b, _] = color.to_rgba8();
    Ok(Rgb::new(r, g, b))
}

/// Interpolated color at `t` along sorted stops.
fn color_at(stops: &[ColorStop], t: f64) -> Rgb {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgb::BLACK;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        // Earlier windows were skipped, so `t >= lo.offset` here.
        if t < hi.offset {
            let span = hi.offset - lo.offset;
            return lo.color.lerp(hi.color, (t - lo.offset) / span);
        }
    }
    last.color
}
