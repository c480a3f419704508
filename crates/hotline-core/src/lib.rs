//! hotline-core: Geometry and color core for hotline rendering (sans-IO).
//!
//! A hotline is a polyline whose color follows a value carried by each
//! vertex (altitude, speed, heart rate, ...). Given projected vertices in
//! pixel space, this crate produces colored paths and the stroke
//! commands that draw them:
//!
//! viewport clipping -> boundary-preserving simplification ->
//! color banding -> color resolution -> outline and hotline planning.
//!
//! This crate has **no I/O dependencies**. Drawing happens through the
//! [`Surface`] trait; concrete SVG and raster surfaces live in
//! `hotline-export`.

pub mod banding;
pub mod clip;
pub mod color;
pub mod draw;
pub mod palette;
pub mod simplify;
pub mod style;
pub mod types;

pub use banding::{GradientBanding, GradientConfig};
pub use clip::{ClipState, ClippedSegment, clip_rings, clip_segment};
pub use color::ColorResolver;
pub use draw::{DrawCommand, Surface};
pub use palette::{ColorStop, Palette};
pub use style::{LineWeight, Outline, OutlineSpec, ZoomWeight};
pub use types::{Bounds, Dimensions, HotlineConfig, HotlineError, Path, Point, Rgb, StopSpec};

/// A configured hotline renderer.
///
/// Holds everything parsed out of a [`HotlineConfig`]; cheap to share by
/// reference across paths and threads.
#[derive(Debug, Clone)]
pub struct Hotline {
    config: HotlineConfig,
    colors: ColorResolver,
    outlines: Vec<Outline>,
    banding: GradientBanding,
}

impl Hotline {
    /// Validate `config` and parse its colors.
    ///
    /// # Errors
    ///
    /// Returns [`HotlineError::InvalidColor`] if any color string fails to
    /// parse, and [`HotlineError::InvalidConfig`] for an empty value
    /// domain, an empty palette, negative or non-finite widths, a
    /// negative smoothing tolerance, or inconsistent gradient knobs.
    pub fn new(config: &HotlineConfig) -> Result<Self, HotlineError> {
        let colors = ColorResolver::from_config(config)?;
        config.weight.validate("line")?;
        config.gradient.validate()?;
        if !config.smooth_factor.is_finite() || config.smooth_factor < 0.0 {
            return Err(HotlineError::InvalidConfig(format!(
                "smooth_factor must be finite and non-negative, got {}",
                config.smooth_factor
            )));
        }
        let outlines = config
            .outlines
            .iter()
            .map(OutlineSpec::resolve)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config: config.clone(),
            colors,
            outlines,
            banding: GradientBanding::new(config.gradient),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &HotlineConfig {
        &self.config
    }

    /// Turn projected rings into colored paths ready to plan.
    ///
    /// # Steps
    ///
    /// 1. Clip to `viewport` (skipped when `no_clip` is set)
    /// 2. Flag color boundaries so simplification keeps them
    /// 3. Simplify with `smooth_factor`
    /// 4. Insert transition ramps at color changes
    /// 5. Resolve every point's color
    ///
    /// Paths that end up empty are dropped. Rings whose combined extent
    /// misses `viewport` produce nothing, with or without clipping.
    #[must_use = "returns the prepared paths"]
    pub fn prepare(&self, rings: &[Path], viewport: &Bounds) -> Vec<Path> {
        let extent = Bounds::from_points(rings.iter().flat_map(Path::points));
        if !extent.is_some_and(|e| e.intersects(viewport)) {
            log::debug!("{} rings lie outside {viewport:?}", rings.len());
            return Vec::new();
        }

        // 1. Viewport clipping.
        let parts = if self.config.no_clip {
            rings.to_vec()
        } else {
            clip_rings(rings, viewport)
        };

        let prepared: Vec<Path> = parts
            .into_iter()
            .filter_map(|part| {
                // 2. Boundary flags.
                let mut points = part.into_points();
                simplify::mark_color_boundaries(&mut points);

                // 3. Simplification.
                let simplified = simplify::simplify(&Path::new(points), self.config.smooth_factor);

                // 4. Color banding.
                let mut banded = self.banding.compute_gradient_path(simplified.points());

                // 5. Colors.
                self.colors.resolve_path(&mut banded);
                (!banded.is_empty()).then(|| Path::new(banded))
            })
            .collect();

        log::debug!(
            "prepared {} rings into {} paths ({} points)",
            rings.len(),
            prepared.len(),
            prepared.iter().map(Path::len).sum::<usize>(),
        );
        prepared
    }

    /// Stroke commands for prepared paths: outlines first, then the line.
    #[must_use]
    pub fn plan(&self, paths: &[Path], zoom: Option<f64>) -> Vec<DrawCommand> {
        let width = self.line_weight(zoom);
        let mut commands = draw::plan_outlines(paths, &self.outlines, width, zoom);
        commands.extend(draw::plan_hotline(paths, width));
        commands
    }

    /// Plan and draw prepared paths onto `surface`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, paths: &[Path], zoom: Option<f64>) {
        draw::execute(surface, &self.plan(paths, zoom));
    }

    /// Clear `viewport`, then draw.
    pub fn redraw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        paths: &[Path],
        viewport: &Bounds,
        zoom: Option<f64>,
    ) {
        surface.clear(viewport);
        self.draw(surface, paths, zoom);
    }

    /// Width of the colored line at `zoom`.
    #[must_use]
    pub fn line_weight(&self, zoom: Option<f64>) -> f64 {
        self.config.weight.resolve(zoom)
    }

    /// Palette color for a raw value.
    #[must_use]
    pub fn rgb_for_value(&self, value: f64) -> Rgb {
        self.colors.rgb_for_value(value)
    }

    /// Hit-test slop around the line, in pixels.
    #[must_use]
    pub fn click_tolerance(&self, touch: bool) -> f64 {
        style::click_tolerance(self.config.weight.weight, &self.outlines, touch)
    }
}
