//! Per-point color resolution.

use crate::palette::{Palette, parse_css_color};
use crate::types::{HotlineConfig, HotlineError, Point, Rgb};

/// Value that marks a point as "known to have no measurement".
///
/// Such points take the unknown color instead of a palette entry.
pub const UNKNOWN_VALUE: f64 = -1.0;

/// Maps point values to colors for one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorResolver {
    palette: Palette,
    min: f64,
    max: f64,
    color: Option<Rgb>,
    unknown_color: Rgb,
}

impl ColorResolver {
    /// # Errors
    ///
    /// [`HotlineError::InvalidConfig`] unless `min < max`, both finite.
    pub fn new(
        palette: Palette,
        min: f64,
        max: f64,
        color: Option<Rgb>,
        unknown_color: Rgb,
    ) -> Result<Self, HotlineError> {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(HotlineError::InvalidConfig(format!(
                "value domain must satisfy min < max, got min={min}, max={max}"
            )));
        }
        Ok(Self {
            palette,
            min,
            max,
            color,
            unknown_color,
        })
    }

    /// Parse the palette and colors of `config`.
    ///
    /// # Errors
    ///
    /// [`HotlineError::InvalidColor`] for any unparsable color string,
    /// [`HotlineError::InvalidConfig`] for an empty palette or an empty
    /// value domain.
    pub fn from_config(config: &HotlineConfig) -> Result<Self, HotlineError> {
        if config.palette.is_empty() {
            return Err(HotlineError::InvalidConfig(
                "palette needs at least one color stop".to_owned(),
            ));
        }
        let palette = Palette::from_css(&config.palette)?;
        let color = config.color.as_deref().map(parse_css_color).transpose()?;
        let unknown_color = parse_css_color(&config.unknown_color)?;
        Self::new(palette, config.min, config.max, color, unknown_color)
    }

    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Palette color for `value` within the configured domain.
    #[must_use]
    pub fn rgb_for_value(&self, value: f64) -> Rgb {
        self.palette.sample(value, self.min, self.max)
    }

    /// Color of a single point, ignoring its neighbors.
    ///
    /// A memoized `rgb` wins. Points without a value take the flat color
    /// (or the unknown color when none is set); [`UNKNOWN_VALUE`] takes
    /// the unknown color.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn rgb_for_point(&self, point: &Point) -> Rgb {
        if let Some(rgb) = point.rgb {
            return rgb;
        }
        match point.z {
            None => self.color.unwrap_or(self.unknown_color),
            Some(z) if z == UNKNOWN_VALUE => self.unknown_color,
            Some(z) => self.rgb_for_value(z),
        }
    }

    /// Assign `rgb` to every point of a path.
    ///
    /// Points with a value are colored first. A point without one then
    /// takes the average of its two neighbors when both are colored,
    /// which is what makes a ramp anchor blend the colors on either side.
    pub fn resolve_path(&self, points: &mut [Point]) {
        for point in points.iter_mut().filter(|p| p.z.is_some()) {
            point.rgb = Some(self.rgb_for_point(point));
        }

        for i in 0..points.len() {
            if points[i].rgb.is_some() {
                continue;
            }
            let prev = i.checked_sub(1).and_then(|j| points[j].rgb);
            let next = points.get(i + 1).and_then(|p| p.rgb);
            points[i].rgb = Some(match (prev, next) {
                (Some(a), Some(b)) => a.midpoint(b),
                _ => self.rgb_for_point(&points[i]),
            });
        }
    }
}
