//! Shared types for the hotline geometry and color core.

use serde::{Deserialize, Serialize};

use crate::banding::GradientConfig;
use crate::style::{LineWeight, OutlineSpec, ZoomWeight};

/// An 8-bit RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Opaque black, used when a palette has no stops.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear interpolation towards `other`.
    ///
    /// `t = 0.0` yields `self`, `t = 1.0` yields `other`. Channels are
    /// rounded to the nearest integer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Channel-wise average, rounded down.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn midpoint(self, other: Self) -> Self {
        let avg = |a: u8, b: u8| ((u16::from(a) + u16::from(b)) / 2) as u8;
        Self::new(
            avg(self.r, other.r),
            avg(self.g, other.g),
            avg(self.b, other.b),
        )
    }

    /// CSS functional notation, e.g. `rgb(255,0,0)`.
    #[must_use]
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// A projected vertex in device (pixel) space.
///
/// `z` is the scalar that drives the color. `None` means the point has
/// no color of its own: its color is interpolated from its neighbors or
/// falls back to the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels.
    pub y: f64,
    /// Value driving the color (altitude, speed, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Resolved color, memoized once computed.
    #[serde(skip)]
    pub rgb: Option<Rgb>,
    /// Set on points at a color boundary; simplification must keep them.
    #[serde(skip)]
    pub cant_be_deleted: bool,
}

impl Point {
    /// Create a point without a value.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            rgb: None,
            cant_be_deleted: false,
        }
    }

    /// Create a point carrying the value `z`.
    #[must_use]
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            rgb: None,
            cant_be_deleted: false,
        }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An ordered sequence of points forming one drawable polyline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path(Vec<Point>);

impl Path {
    /// Create a new path from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the path.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the path and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Path {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An axis-aligned rectangle in pixel space (the viewport).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from two corners, in any order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Bounds covering a surface of the given dimensions.
    #[must_use]
    pub fn from_dimensions(dimensions: Dimensions) -> Self {
        Self::new(
            0.0,
            0.0,
            f64::from(dimensions.width),
            f64::from(dimensions.height),
        )
    }

    /// Bounding box of a set of points. `None` when there are no points.
    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(acc.map_or(Self::new(p.x, p.y, p.x, p.y), |b: Self| Self {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            }))
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether `p` lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether the two rectangles share at least one point (edges included).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        other.max_x >= self.min_x
            && other.min_x <= self.max_x
            && other.max_y >= self.min_y
            && other.min_y <= self.max_y
    }
}

/// Drawing surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A palette color stop as written in configuration: an offset in
/// `[0, 1]` and a CSS color string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSpec {
    pub offset: f64,
    pub color: String,
}

impl StopSpec {
    #[must_use]
    pub fn new(offset: f64, color: impl Into<String>) -> Self {
        Self {
            offset,
            color: color.into(),
        }
    }
}

/// Configuration for rendering hotlines.
///
/// Colors are CSS strings (named, hex, `rgb()`, `hsl()`); they are parsed
/// and validated by [`Hotline::new`](crate::Hotline::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotlineConfig {
    /// Value mapped to the start of the palette.
    pub min: f64,

    /// Value mapped to the end of the palette. Must be greater than `min`.
    pub max: f64,

    /// Palette color stops.
    pub palette: Vec<StopSpec>,

    /// Flat color for points without a value. Falls back to
    /// `unknown_color` when unset.
    pub color: Option<String>,

    /// Color for points whose value is unknown.
    pub unknown_color: String,

    /// Width of the colored line.
    pub weight: LineWeight,

    /// Outlines drawn underneath the colored line, outermost first.
    pub outlines: Vec<OutlineSpec>,

    /// Color banding and transition-ramp tuning.
    pub gradient: GradientConfig,

    /// Simplification tolerance in pixels. `0.0` disables simplification.
    pub smooth_factor: f64,

    /// Skip viewport clipping and draw the projected rings as they are.
    pub no_clip: bool,
}

impl HotlineConfig {
    pub const DEFAULT_MIN: f64 = 0.0;
    pub const DEFAULT_MAX: f64 = 1.0;
    pub const DEFAULT_UNKNOWN_COLOR: &'static str = "#aaa";
    pub const DEFAULT_WEIGHT: f64 = 6.0;
    pub const DEFAULT_SMOOTH_FACTOR: f64 = 1.0;
    pub const DEFAULT_MIN_COLOR_LENGTH: f64 = 10.0;

    /// The green-yellow-red palette.
    #[must_use]
    pub fn default_palette() -> Vec<StopSpec> {
        vec![
            StopSpec::new(0.0, "green"),
            StopSpec::new(0.5, "yellow"),
            StopSpec::new(1.0, "red"),
        ]
    }
}

impl Default for HotlineConfig {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
            palette: Self::default_palette(),
            color: None,
            unknown_color: Self::DEFAULT_UNKNOWN_COLOR.to_owned(),
            weight: LineWeight::new(
                Self::DEFAULT_WEIGHT,
                vec![ZoomWeight::new(13.0, 5.0), ZoomWeight::new(11.0, 4.0)],
            ),
            outlines: vec![
                OutlineSpec::new(
                    "#aaa",
                    LineWeight::new(
                        4.0,
                        vec![ZoomWeight::new(13.0, 4.0), ZoomWeight::new(11.0, 3.0)],
                    ),
                ),
                OutlineSpec::new(
                    "white",
                    LineWeight::new(
                        3.0,
                        vec![ZoomWeight::new(13.0, 3.0), ZoomWeight::new(11.0, 2.0)],
                    ),
                ),
            ],
            gradient: GradientConfig {
                min_color_length: Self::DEFAULT_MIN_COLOR_LENGTH,
                ..GradientConfig::default()
            },
            smooth_factor: Self::DEFAULT_SMOOTH_FACTOR,
            no_clip: false,
        }
    }
}

/// Errors raised while setting up a [`Hotline`](crate::Hotline).
///
/// Nothing here is fatal to the surrounding application: a caller
/// should skip drawing the affected layer.
#[derive(Debug, thiserror::Error)]
pub enum HotlineError {
    /// A CSS color string could not be parsed.
    #[error("invalid color {value:?}: {reason}")]
    InvalidColor {
        /// The offending color string.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Configuration values are inconsistent.
    #[error("invalid hotline configuration: {0}")]
    InvalidConfig(String),
}
