//! SVG drawing surface.
//!
//! Records strokes and serializes them into an SVG string with `<path>`
//! elements using the [`svg`] crate for document construction, XML
//! escaping, and path data formatting.
//!
//! Solid strokes become plain `<path>` elements. Gradient strokes become
//! a one-segment `<path>` whose stroke references a
//! `<linearGradient gradientUnits="userSpaceOnUse">` in `<defs>`, so the
//! ramp runs exactly from the segment's start to its end.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and the rendering
//! configuration.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Definitions, Description, Element, LinearGradient, Path, Stop, Title};
use svg::node::{Node, Text, Value};

use hotline_core::{Bounds, Dimensions, Point, Rgb, Surface};

/// Namespace for the embedded configuration element.
const CONFIG_NAMESPACE: &str = "https://github.com/hotline-rs/hotline/ns/1";

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized rendering configuration, emitted inside `<metadata>`
    /// wrapped in a namespaced `<hotline:config>` element so exported
    /// files carry the settings that produced them.
    pub config_json: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
enum Stroke {
    Solid {
        points: Vec<(f64, f64)>,
        color: Rgb,
        width: f64,
    },
    Gradient {
        from: (f64, f64),
        to: (f64, f64),
        start: Rgb,
        end: Rgb,
        width: f64,
    },
}

/// A [`Surface`] that records strokes for SVG output.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    dimensions: Dimensions,
    strokes: Vec<Stroke>,
}

impl SvgSurface {
    /// An empty document of the given pixel size.
    #[must_use]
    pub const fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            strokes: Vec::new(),
        }
    }

    /// Number of strokes recorded so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.strokes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Serialize the recorded strokes.
    ///
    /// The `viewBox` matches the surface's pixel dimensions.
    #[must_use]
    pub fn into_svg(self, metadata: &SvgMetadata<'_>) -> String {
        let Dimensions { width, height } = self.dimensions;
        let mut doc = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height));

        if let Some(title) = metadata.title {
            doc = doc.add(Title::new(title));
        }

        if let Some(description) = metadata.description {
            doc = doc.add(Description::new().add(Text::new(description)));
        }

        if let Some(config_json) = metadata.config_json {
            let mut config_el = Element::new("hotline:config");
            config_el.assign("xmlns:hotline", CONFIG_NAMESPACE);
            config_el.append(Text::new(config_json));
            let mut metadata_el = Element::new("metadata");
            metadata_el.append(config_el);
            doc = doc.add(metadata_el);
        }

        let mut defs = Definitions::new();
        let mut paths = Vec::with_capacity(self.strokes.len());
        let mut gradient_count = 0_usize;

        for stroke in &self.strokes {
            match stroke {
                Stroke::Solid {
                    points,
                    color,
                    width,
                } => {
                    let d = build_path_data(points);
                    if d.is_empty() {
                        continue;
                    }
                    paths.push(stroked_path(d, color.to_css(), *width));
                }
                Stroke::Gradient {
                    from,
                    to,
                    start,
                    end,
                    width,
                } => {
                    let id = format!("hotline-gradient-{gradient_count}");
                    gradient_count += 1;
                    defs = defs.add(
                        LinearGradient::new()
                            .set("id", id.as_str())
                            .set("gradientUnits", "userSpaceOnUse")
                            .set("x1", from.0)
                            .set("y1", from.1)
                            .set("x2", to.0)
                            .set("y2", to.1)
                            .add(Stop::new().set("offset", 0).set("stop-color", start.to_css()))
                            .add(Stop::new().set("offset", 1).set("stop-color", end.to_css())),
                    );
                    let d = build_path_data(&[*from, *to]);
                    paths.push(stroked_path(d, format!("url(#{id})"), *width));
                }
            }
        }

        if gradient_count > 0 {
            doc = doc.add(defs);
        }
        for path in paths {
            doc = doc.add(path);
        }

        log::debug!(
            "serialized {} strokes ({gradient_count} gradients) into a {width}x{height} SVG",
            self.strokes.len(),
        );

        // The svg crate omits the XML declaration, so we prepend it.
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
    }
}

impl Surface for SvgSurface {
    /// A document cannot erase part of what it holds, so only a clear
    /// covering the whole surface has an effect.
    fn clear(&mut self, bounds: &Bounds) {
        let whole = Bounds::from_dimensions(self.dimensions);
        if bounds.min_x <= whole.min_x
            && bounds.min_y <= whole.min_y
            && bounds.max_x >= whole.max_x
            && bounds.max_y >= whole.max_y
        {
            self.strokes.clear();
        } else {
            log::debug!("ignoring partial clear of an SVG surface");
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Rgb, width: f64) {
        self.strokes.push(Stroke::Solid {
            points: points.iter().map(|p| (p.x, p.y)).collect(),
            color,
            width,
        });
    }

    fn stroke_gradient(&mut self, from: &Point, to: &Point, start: Rgb, end: Rgb, width: f64) {
        self.strokes.push(Stroke::Gradient {
            from: (from.x, from.y),
            to: (to.x, to.y),
            start,
            end,
            width,
        });
    }
}

/// Build an SVG path `d` attribute string from a point list.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for fewer than 2 points.
///
/// Coordinates are formatted by the [`svg`] crate using `f32` precision.
///
/// # Examples
///
/// ```
/// use hotline_export::build_path_data;
///
/// let d = build_path_data(&[(10.0, 20.0), (30.0, 40.0)]);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[(f64, f64)]) -> String {
    let [first, rest @ ..] = points else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(*first);
    for p in rest {
        data = data.line_to(*p);
    }
    String::from(Value::from(data))
}

fn stroked_path(d: String, stroke: String, width: f64) -> Path {
    Path::new()
        .set("d", d)
        .set("fill", "none")
        .set("stroke", stroke)
        .set("stroke-width", width)
        .set("stroke-linecap", "round")
        .set("stroke-linejoin", "round")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn line(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    // --- build_path_data ---

    #[test]
    fn path_data_needs_two_points() {
        assert_eq!(build_path_data(&[]), "");
        assert_eq!(build_path_data(&[(1.0, 1.0)]), "");
        assert_eq!(build_path_data(&[(1.0, 2.0), (3.5, 4.0), (5.0, 6.0)]), "M1,2 L3.5,4 L5,6");
    }

    // --- Document structure ---

    #[test]
    fn empty_document() {
        let svg = SvgSurface::new(dims(1920, 1080)).into_svg(&no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.contains(r#"width="1920""#));
        assert!(svg.contains(r#"height="1080""#));
        assert!(svg.contains(r#"viewBox="0 0 1920 1080""#));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<defs"));
    }

    #[test]
    fn solid_stroke_becomes_round_path() {
        let mut surface = SvgSurface::new(dims(800, 600));
        surface.stroke_polyline(&line(&[(10.0, 20.0), (30.0, 40.0)]), RED, 6.0);
        let svg = surface.into_svg(&no_meta());

        assert!(svg.contains(r#"d="M10,20 L30,40""#));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"stroke="rgb(255,0,0)""#));
        assert!(svg.contains(r#"stroke-width="6""#));
        assert!(svg.contains(r#"stroke-linecap="round""#));
        assert!(svg.contains(r#"stroke-linejoin="round""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn single_point_stroke_is_skipped() {
        let mut surface = SvgSurface::new(dims(100, 100));
        surface.stroke_polyline(&line(&[(5.0, 5.0)]), RED, 1.0);
        assert_eq!(surface.len(), 1);
        assert!(!surface.into_svg(&no_meta()).contains("<path"));
    }

    #[test]
    fn gradient_stroke_references_definition() {
        let mut surface = SvgSurface::new(dims(100, 100));
        surface.stroke_gradient(&Point::new(0.0, 0.0), &Point::new(10.0, 5.0), RED, BLUE, 4.0);
        surface.stroke_gradient(&Point::new(10.0, 5.0), &Point::new(20.0, 5.0), BLUE, RED, 4.0);
        let svg = surface.into_svg(&no_meta());

        assert_eq!(svg.matches("<linearGradient").count(), 2);
        assert!(svg.contains(r#"id="hotline-gradient-0""#));
        assert!(svg.contains(r#"id="hotline-gradient-1""#));
        assert!(svg.contains(r#"gradientUnits="userSpaceOnUse""#));
        assert!(svg.contains(r#"x2="10""#));
        assert!(svg.contains(r#"stop-color="rgb(255,0,0)""#));
        assert!(svg.contains(r#"stop-color="rgb(0,0,255)""#));
        assert!(svg.contains(r#"stroke="url(#hotline-gradient-0)""#));
        assert!(svg.contains(r#"d="M0,0 L10,5""#));
    }

    #[test]
    fn strokes_keep_drawing_order() {
        let mut surface = SvgSurface::new(dims(100, 100));
        surface.stroke_polyline(&line(&[(0.0, 0.0), (1.0, 1.0)]), BLUE, 10.0);
        surface.stroke_polyline(&line(&[(0.0, 0.0), (1.0, 1.0)]), RED, 4.0);
        let svg = surface.into_svg(&no_meta());
        let wide = svg.find(r#"stroke-width="10""#).unwrap();
        let narrow = svg.find(r#"stroke-width="4""#).unwrap();
        assert!(wide < narrow, "outline must be drawn underneath");
    }

    // --- clear ---

    #[test]
    fn full_clear_drops_strokes() {
        let mut surface = SvgSurface::new(dims(100, 100));
        surface.stroke_polyline(&line(&[(0.0, 0.0), (1.0, 1.0)]), RED, 1.0);
        surface.clear(&Bounds::new(-1.0, -1.0, 200.0, 200.0));
        assert!(surface.is_empty());
    }

    #[test]
    fn partial_clear_is_ignored() {
        let mut surface = SvgSurface::new(dims(100, 100));
        surface.stroke_polyline(&line(&[(0.0, 0.0), (1.0, 1.0)]), RED, 1.0);
        surface.clear(&Bounds::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(surface.len(), 1);
    }

    // --- Metadata ---

    #[test]
    fn title_and_desc_emitted_and_escaped() {
        let meta = SvgMetadata {
            title: Some("A <B> & C"),
            description: Some("min=0, max=1"),
            ..SvgMetadata::default()
        };
        let svg = SvgSurface::new(dims(100, 100)).into_svg(&meta);
        assert!(svg.contains("<title>A &lt;B&gt; &amp; C</title>"));
        assert!(svg.contains("<desc>min=0, max=1</desc>"));
    }

    #[test]
    fn title_and_desc_omitted_when_none() {
        let svg = SvgSurface::new(dims(100, 100)).into_svg(&no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
        assert!(!svg.contains("<metadata>"));
    }

    #[test]
    fn metadata_precedes_drawing() {
        let mut surface = SvgSurface::new(dims(100, 100));
        surface.stroke_gradient(&Point::new(0.0, 0.0), &Point::new(1.0, 0.0), RED, BLUE, 1.0);
        let meta = SvgMetadata {
            title: Some("track"),
            description: Some("desc"),
            config_json: Some(r#"{"min":0}"#),
        };
        let svg = surface.into_svg(&meta);

        assert!(svg.contains(&format!(r#"<hotline:config xmlns:hotline="{CONFIG_NAMESPACE}">"#)));
        let title = svg.find("<title>").unwrap();
        let desc = svg.find("<desc>").unwrap();
        let metadata = svg.find("<metadata>").unwrap();
        let defs = svg.find("<defs>").unwrap();
        let path = svg.find("<path").unwrap();
        assert!(title < desc && desc < metadata && metadata < defs && defs < path);
    }
}
