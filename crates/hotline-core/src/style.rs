//! Line widths and outlines.

use serde::{Deserialize, Serialize};

use crate::palette::parse_css_color;
use crate::types::{HotlineError, Rgb};

/// Extra click slop on touch devices, in pixels.
pub const TOUCH_TOLERANCE: f64 = 10.0;

/// One row of a zoom-dependent width table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWeight {
    /// Applies at this zoom level and above.
    pub zoom: f64,
    pub weight: f64,
}

impl ZoomWeight {
    #[must_use]
    pub const fn new(zoom: f64, weight: f64) -> Self {
        Self { zoom, weight }
    }
}

/// A line width with an optional zoom table.
///
/// Table rows are scanned in order, so list them from the highest zoom
/// down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWeight {
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zoom_weight: Vec<ZoomWeight>,
}

impl LineWeight {
    #[must_use]
    pub const fn new(weight: f64, zoom_weight: Vec<ZoomWeight>) -> Self {
        Self {
            weight,
            zoom_weight,
        }
    }

    /// A fixed width, independent of zoom.
    #[must_use]
    pub const fn fixed(weight: f64) -> Self {
        Self::new(weight, Vec::new())
    }

    /// Width at `zoom`.
    ///
    /// The first row with `zoom >= row.zoom` wins; below every row the
    /// last row applies. Without a table, or without a known zoom, the
    /// base weight is used.
    #[must_use]
    pub fn resolve(&self, zoom: Option<f64>) -> f64 {
        let (Some(zoom), Some(last)) = (zoom, self.zoom_weight.last()) else {
            return self.weight;
        };
        self.zoom_weight
            .iter()
            .find(|row| zoom >= row.zoom)
            .unwrap_or(last)
            .weight
    }

    pub(crate) fn validate(&self, what: &str) -> Result<(), HotlineError> {
        let weights = std::iter::once(self.weight).chain(self.zoom_weight.iter().map(|r| r.weight));
        for w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(HotlineError::InvalidConfig(format!(
                    "{what} weight must be finite and non-negative, got {w}"
                )));
            }
        }
        Ok(())
    }
}

/// An outline as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSpec {
    /// CSS color string.
    pub color: String,
    #[serde(flatten)]
    pub weight: LineWeight,
}

impl OutlineSpec {
    #[must_use]
    pub fn new(color: impl Into<String>, weight: LineWeight) -> Self {
        Self {
            color: color.into(),
            weight,
        }
    }

    /// Parse the color and check the widths.
    ///
    /// # Errors
    ///
    /// [`HotlineError::InvalidColor`] for an unparsable color,
    /// [`HotlineError::InvalidConfig`] for a negative or non-finite width.
    pub fn resolve(&self) -> Result<Outline, HotlineError> {
        self.weight.validate("outline")?;
        Ok(Outline {
            color: parse_css_color(&self.color)?,
            weight: self.weight.clone(),
        })
    }
}

/// An outline ready for drawing.
///
/// Its width is added on both sides of the colored line.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub color: Rgb,
    pub weight: LineWeight,
}

/// Hit-test slop around a line: half its width, plus the widest outline
/// (base weights), plus [`TOUCH_TOLERANCE`] on touch devices.
#[must_use]
pub fn click_tolerance(weight: f64, outlines: &[Outline], touch: bool) -> f64 {
    let widest = outlines
        .iter()
        .map(|o| o.weight.weight)
        .fold(0.0_f64, f64::max);
    let touch = if touch { TOUCH_TOLERANCE } else { 0.0 };
    weight / 2.0 + widest + touch
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn layer_weight() -> LineWeight {
        LineWeight::new(6.0, vec![ZoomWeight::new(13.0, 5.0), ZoomWeight::new(11.0, 4.0)])
    }

    #[test]
    fn resolve_picks_first_matching_row() {
        let w = layer_weight();
        assert_eq!(w.resolve(Some(16.0)), 5.0);
        assert_eq!(w.resolve(Some(13.0)), 5.0);
        assert_eq!(w.resolve(Some(12.0)), 4.0);
        assert_eq!(w.resolve(Some(11.0)), 4.0);
    }

    #[test]
    fn resolve_below_table_uses_last_row() {
        assert_eq!(layer_weight().resolve(Some(3.0)), 4.0);
    }

    #[test]
    fn resolve_without_table_or_zoom_uses_base() {
        assert_eq!(LineWeight::fixed(7.0).resolve(Some(12.0)), 7.0);
        assert_eq!(layer_weight().resolve(None), 6.0);
    }

    #[test]
    fn outline_spec_resolves_color() {
        let outline = OutlineSpec::new("white", LineWeight::fixed(3.0)).resolve().unwrap();
        assert_eq!(outline.color, Rgb::new(255, 255, 255));
    }

    #[test]
    fn outline_spec_rejects_bad_input() {
        assert!(matches!(
            OutlineSpec::new("nope", LineWeight::fixed(3.0)).resolve(),
            Err(HotlineError::InvalidColor { .. })
        ));
        assert!(matches!(
            OutlineSpec::new("white", LineWeight::fixed(-1.0)).resolve(),
            Err(HotlineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn outline_spec_flattens_weight_in_json() {
        let spec: OutlineSpec = serde_json::from_str(
            r##"{"color": "#aaa", "weight": 4, "zoom_weight": [{"zoom": 13, "weight": 4}]}"##,
        )
        .unwrap();
        assert_eq!(spec.weight.weight, 4.0);
        assert_eq!(spec.weight.zoom_weight.len(), 1);
    }

    #[test]
    fn click_tolerance_adds_widest_outline() {
        let outlines = vec![
            Outline {
                color: Rgb::BLACK,
                weight: LineWeight::fixed(4.0),
            },
            Outline {
                color: Rgb::BLACK,
                weight: LineWeight::fixed(3.0),
            },
        ];
        assert_eq!(click_tolerance(6.0, &outlines, false), 7.0);
        assert_eq!(click_tolerance(6.0, &outlines, true), 17.0);
        assert_eq!(click_tolerance(6.0, &[], false), 3.0);
    }
}
