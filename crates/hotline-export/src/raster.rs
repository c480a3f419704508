//! Raster drawing surface backed by a `tiny-skia` pixmap.
//!
//! `tiny-skia` handles sub-pixel positioning and anti-aliasing; gradient
//! strokes use a two-stop [`LinearGradient`] shader laid along the
//! segment.

use tiny_skia::{
    BlendMode, Color, GradientStop, LineCap, LineJoin, LinearGradient, Paint, PathBuilder, Pixmap,
    PremultipliedColorU8, Rect, Shader, SpreadMode, Stroke, Transform,
};

use hotline_core::{Bounds, Dimensions, Point, Rgb, Surface};

use crate::ExportError;

/// A [`Surface`] that rasterizes strokes into a transparent pixmap.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// A transparent surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidDimensions`] when either side is zero
    /// or the pixmap would be too large to allocate.
    pub fn new(dimensions: Dimensions) -> Result<Self, ExportError> {
        let Dimensions { width, height } = dimensions;
        let pixmap =
            Pixmap::new(width, height).ok_or(ExportError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    /// Premultiplied color of one pixel; `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.pixel(x, y)
    }

    #[must_use]
    pub const fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encode the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::PngEncode`] if the encoder fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        self.pixmap
            .encode_png()
            .map_err(|e| ExportError::PngEncode(e.to_string()))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stroke(&mut self, points: &[(f64, f64)], paint: &Paint<'_>, width: f64) {
        let Some(path) = build_path(points) else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}

impl Surface for PixmapSurface {
    #[allow(clippy::cast_possible_truncation)]
    fn clear(&mut self, bounds: &Bounds) {
        let Some(rect) = Rect::from_ltrb(
            bounds.min_x as f32,
            bounds.min_y as f32,
            bounds.max_x as f32,
            bounds.max_y as f32,
        ) else {
            log::debug!("skipping clear of degenerate rectangle {bounds:?}");
            return;
        };
        let paint = Paint {
            blend_mode: BlendMode::Clear,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Rgb, width: f64) {
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        self.stroke(&coords, &solid_paint(color), width);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stroke_gradient(&mut self, from: &Point, to: &Point, start: Rgb, end: Rgb, width: f64) {
        let segment = [(from.x, from.y), (to.x, to.y)];
        // A zero-length shader collapses to its end color.
        if from.distance_squared(to) < f64::EPSILON {
            self.stroke(&segment, &solid_paint(start), width);
            return;
        }
        let shader = LinearGradient::new(
            tiny_skia::Point::from_xy(from.x as f32, from.y as f32),
            tiny_skia::Point::from_xy(to.x as f32, to.y as f32),
            vec![
                GradientStop::new(0.0, to_color(start)),
                GradientStop::new(1.0, to_color(end)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        );
        let paint = match shader {
            Some(shader) => Paint {
                shader,
                anti_alias: true,
                ..Paint::default()
            },
            None => solid_paint(start),
        };
        self.stroke(&segment, &paint, width);
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255)
}

fn solid_paint(color: Rgb) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(to_color(color)),
        anti_alias: true,
        ..Paint::default()
    }
}

/// Build a tiny-skia path; `None` for fewer than two points.
#[allow(clippy::cast_possible_truncation)]
fn build_path(points: &[(f64, f64)]) -> Option<tiny_skia::Path> {
    let [first, rest @ ..] = points else {
        return None;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(first.0 as f32, first.1 as f32);
    for p in rest {
        pb.line_to(p.0 as f32, p.1 as f32);
    }
    pb.finish()
}
