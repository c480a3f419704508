//! Integration test: run a synthetic elevation track through the full
//! preparation pipeline and draw it onto both export surfaces.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hotline_core::{Bounds, Dimensions, Hotline, HotlineConfig, Path, Point, Surface};
use hotline_export::{PixmapSurface, SvgMetadata, SvgSurface};

const DIMENSIONS: Dimensions = Dimensions {
    width: 400,
    height: 300,
};

/// A wavy track climbing from 100 m to 900 m, in 100 m steps, that
/// starts and ends outside the surface.
fn elevation_track() -> Path {
    (0..=120)
        .map(|i| {
            let t = f64::from(i);
            let x = t.mul_add(4.0, -40.0);
            let y = (t / 8.0).sin().mul_add(60.0, 150.0);
            let elevation = (t / 15.0).floor().mul_add(100.0, 100.0);
            Point::with_z(x, y, elevation)
        })
        .collect()
}

fn hotline() -> Hotline {
    Hotline::new(&HotlineConfig {
        min: 100.0,
        max: 900.0,
        ..HotlineConfig::default()
    })
    .expect("default config with a valid domain should be accepted")
}

#[test]
fn elevation_track_to_svg() {
    let hotline = hotline();
    let viewport = Bounds::from_dimensions(DIMENSIONS);
    let paths = hotline.prepare(&[elevation_track()], &viewport);

    assert_eq!(paths.len(), 1, "track crosses the viewport once");
    let points = paths[0].points();
    eprintln!("Prepared {} points", points.len());
    assert!(points.iter().all(|p| viewport.contains(p)));
    assert!(points.iter().all(|p| p.rgb.is_some()));

    let mut surface = SvgSurface::new(DIMENSIONS);
    hotline.redraw(&mut surface, &paths, &viewport, Some(14.0));
    assert!(!surface.is_empty());

    let config_json = serde_json::to_string(hotline.config()).unwrap();
    let svg = surface.into_svg(&SvgMetadata {
        title: Some("elevation"),
        description: Some("synthetic elevation track"),
        config_json: Some(&config_json),
    });

    assert!(svg.contains("<svg"));
    assert!(svg.contains("</svg>"));
    assert!(svg.contains("<title>elevation</title>"));
    // Two outlines, then the colored line.
    assert!(svg.matches("<path").count() > 2);
    assert!(svg.contains("<linearGradient"));
    let outline = svg.find(r#"stroke-width="13""#).unwrap();
    let line = svg.find(r#"stroke-width="5""#).unwrap();
    assert!(outline < line, "outlines are drawn underneath the line");

    let output_path = std::path::Path::new(env!("CARGO_TARGET_TMPDIR")).join("elevation.svg");
    std::fs::write(&output_path, &svg).unwrap();
    eprintln!("SVG written to {output_path:?} ({} bytes)", svg.len());
}

#[test]
fn elevation_track_to_png() {
    let hotline = hotline();
    let viewport = Bounds::from_dimensions(DIMENSIONS);
    let paths = hotline.prepare(&[elevation_track()], &viewport);

    let mut surface = PixmapSurface::new(DIMENSIONS).unwrap();
    hotline.draw(&mut surface, &paths, None);

    // The track's start is low and green-ish, its end is high and red-ish.
    let first = paths[0].first().unwrap();
    let last = paths[0].last().unwrap();
    let low = hotline.rgb_for_value(first.z.unwrap());
    let high = hotline.rgb_for_value(last.z.unwrap());
    assert!(low.g > low.r, "low end should be green, got {low:?}");
    assert!(high.r > high.g, "high end should be red, got {high:?}");

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (x, y) = (first.x.round() as u32 + 2, first.y.round() as u32);
    let pixel = surface.pixel(x, y).unwrap();
    assert!(pixel.alpha() > 0, "stroke should cover the track start");

    let png = surface.encode_png().unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    let output_path = std::path::Path::new(env!("CARGO_TARGET_TMPDIR")).join("elevation.png");
    std::fs::write(&output_path, &png).unwrap();
    eprintln!("PNG written to {output_path:?} ({} bytes)", png.len());
}

#[test]
fn clearing_the_whole_svg_surface_starts_over() {
    let hotline = hotline();
    let viewport = Bounds::from_dimensions(DIMENSIONS);
    let paths = hotline.prepare(&[elevation_track()], &viewport);

    let mut surface = SvgSurface::new(DIMENSIONS);
    hotline.draw(&mut surface, &paths, None);
    let once = surface.len();
    hotline.redraw(&mut surface, &paths, &viewport, None);
    assert_eq!(surface.len(), once);

    surface.clear(&viewport);
    assert!(surface.is_empty());
}
