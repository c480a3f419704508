//! Color banding: smooth hard color changes along a path into short ramps.
//!
//! Consecutive points with the same value form a [`Band`]. Bands shorter
//! than [`GradientConfig::min_color_length`] are folded into a neighbor,
//! then every band boundary gets a transition ramp whose length is a
//! percentage of the shorter adjacent band, clamped to
//! `[min_gradient, max_gradient]`. The ramp is expressed in the output
//! path by:
//!
//! - a synthetic point where the ramp ends inside the band, carrying the
//!   band's value, and
//! - the band's boundary point with its value cleared (`z = None`), so
//!   the renderer blends its color instead of looking it up.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::{HotlineError, Point};

/// Tuning knobs for [`GradientBanding`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Ramp length as a percentage of the shorter adjacent band.
    pub gradient_percent: f64,
    /// Lower clamp for a ramp length, in pixels.
    pub min_gradient: f64,
    /// Upper clamp for a ramp length, in pixels.
    pub max_gradient: f64,
    /// Bands shorter than this (in pixels) are merged into a neighbor.
    pub min_color_length: f64,
}

impl GradientConfig {
    pub const DEFAULT_GRADIENT_PERCENT: f64 = 30.0;
    pub const DEFAULT_MIN_GRADIENT: f64 = 10.0;
    pub const DEFAULT_MAX_GRADIENT: f64 = 30.0;
    pub const DEFAULT_MIN_COLOR_LENGTH: f64 = 20.0;

    /// Check that every knob is finite and non-negative and that
    /// `min_gradient <= max_gradient`.
    ///
    /// # Errors
    ///
    /// Returns [`HotlineError::InvalidConfig`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<(), HotlineError> {
        let fields = [
            ("gradient_percent", self.gradient_percent),
            ("min_gradient", self.min_gradient),
            ("max_gradient", self.max_gradient),
            ("min_color_length", self.min_color_length),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(HotlineError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.min_gradient > self.max_gradient {
            return Err(HotlineError::InvalidConfig(format!(
                "min_gradient ({}) exceeds max_gradient ({})",
                self.min_gradient, self.max_gradient
            )));
        }
        Ok(())
    }
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            gradient_percent: Self::DEFAULT_GRADIENT_PERCENT,
            min_gradient: Self::DEFAULT_MIN_GRADIENT,
            max_gradient: Self::DEFAULT_MAX_GRADIENT,
            min_color_length: Self::DEFAULT_MIN_COLOR_LENGTH,
        }
    }
}

/// A maximal run of consecutive points sharing one value.
///
/// Bands live only for the duration of one banding pass and own their
/// points outright.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub points: Vec<Point>,
    /// Value shared by the band's points.
    pub color: Option<f64>,
    /// Summed length of the band's segments.
    pub distance: f64,
    /// Shorter than the minimum color length at the last measurement.
    pub to_delete: bool,
    /// Ramp length at the band's start; `0.0` without a predecessor.
    pub start_gradient: f64,
    /// Ramp length at the band's end; `0.0` without a successor.
    pub end_gradient: f64,
}

impl Band {
    /// Create an unmeasured band; its color is taken from the first point.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        let color = points.first().and_then(|p| p.z);
        Self {
            points,
            color,
            distance: 0.0,
            to_delete: false,
            start_gradient: 0.0,
            end_gradient: 0.0,
        }
    }

    /// Recompute `distance` and `to_delete`.
    pub fn measure(&mut self, min_color_length: f64) {
        self.distance = self
            .points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum();
        self.to_delete = self.distance < min_color_length;
    }
}

/// Restructures a path so color changes blend over short ramps.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientBanding {
    config: GradientConfig,
}

impl GradientBanding {
    #[must_use]
    pub const fn new(config: GradientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &GradientConfig {
        &self.config
    }

    /// Compute the banded point sequence for one path.
    ///
    /// Paths with fewer than two points are returned as they are.
    #[must_use = "returns the banded path"]
    pub fn compute_gradient_path(&self, points: &[Point]) -> Vec<Point> {
        if points.len() < 2 {
            return points.to_vec();
        }

        let mut bands = group_by_color(points);
        let grouped = bands.len();
        let merges = prune_short_bands(&mut bands, self.config.min_color_length);
        set_gradient_lengths(&mut bands, &self.config);
        for band in &mut bands {
            insert_gradient_points(band);
        }

        log::debug!(
            "banded {} points: {grouped} bands, {merges} merged, {} kept",
            points.len(),
            bands.len(),
        );
        flatten(bands)
    }
}

/// Split `points` into bands of equal consecutive values.
///
/// A band closed by a value change with a single point is padded with a
/// copy of that point. The final band is never padded.
#[must_use]
pub fn group_by_color(points: &[Point]) -> Vec<Band> {
    let mut bands = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for p in points {
        let changed = current.last().is_some_and(|last| last.z != p.z);
        if changed {
            if let [only] = current[..] {
                current.push(only);
            }
            bands.push(Band::new(std::mem::take(&mut current)));
        }
        current.push(*p);
    }

    if !current.is_empty() {
        bands.push(Band::new(current));
    }
    bands
}

/// Measure every band.
pub fn measure_bands(bands: &mut [Band], min_color_length: f64) {
    for band in bands {
        band.measure(min_color_length);
    }
}

/// Fold bands shorter than `min_color_length` into a neighbor until none
/// is left. Returns the number of merges.
///
/// The first short band is always handled next and lengths are updated
/// after every single merge, so the result never depends on stale
/// lengths. A short band goes to the longer of its two neighbors (the
/// following one on a tie), taking on that neighbor's value: appended
/// when it goes to the preceding band, prepended when it goes to the
/// following one. A lone band is never removed.
///
/// Runs in time linear in the number of points: bands are merged as
/// ranges over one shared point buffer, and only the receiving band's
/// length changes with each merge.
///
/// On return every band is freshly measured.
pub fn prune_short_bands(bands: &mut Vec<Band>, min_color_length: f64) -> usize {
    measure_bands(bands, min_color_length);
    if bands.len() < 2 || !bands.iter().any(|b| b.to_delete) {
        return 0;
    }

    let count = bands.len();
    let mut points: Vec<Point> = Vec::with_capacity(bands.iter().map(|b| b.points.len()).sum());
    let mut spans: Vec<Span> = Vec::with_capacity(count);
    for (k, band) in bands.drain(..).enumerate() {
        let start = points.len();
        points.extend(band.points);
        spans.push(Span {
            range: start..points.len(),
            color: band.color,
            distance: band.distance,
            absorbed: false,
            prev: k.checked_sub(1),
            next: (k + 1 < count).then_some(k + 1),
        });
    }

    let mut head = 0;
    let mut alive = count;
    // Every live span before the cursor is long enough.
    let mut cursor = Some(0);
    let mut merges = 0;

    while alive >= 2 {
        let mut at = cursor;
        let mut short = None;
        while let Some(k) = at {
            if spans[k].distance < min_color_length {
                short = Some(k);
                break;
            }
            at = spans[k].next;
        }
        let Some(k) = short else {
            break;
        };

        let (prev, next) = (spans[k].prev, spans[k].next);
        let into_prev = match (prev, next) {
            (Some(p), Some(n)) => spans[p].distance > spans[n].distance,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let Some(r) = (if into_prev { prev } else { next }) else {
            break;
        };

        let donor = spans[k].range.clone();
        let donor_distance = spans[k].distance;
        let (left, right) = if into_prev {
            (spans[r].range.clone(), donor)
        } else {
            (donor, spans[r].range.clone())
        };
        let gap = match (left.clone().next_back(), right.clone().next()) {
            (Some(a), Some(b)) => points[a].distance(&points[b]),
            _ => 0.0,
        };

        let receiver = &mut spans[r];
        receiver.range = left.start..right.end;
        receiver.distance = if into_prev {
            receiver.distance + gap + donor_distance
        } else {
            donor_distance + gap + receiver.distance
        };
        receiver.absorbed = true;

        if let Some(p) = prev {
            spans[p].next = next;
        } else {
            head = r;
        }
        if let Some(n) = next {
            spans[n].prev = prev;
        }
        log::trace!(
            "merged short band {k} ({donor_distance:.2}px) into {}",
            if into_prev { "previous" } else { "next" },
        );
        alive -= 1;
        merges += 1;
        cursor = prev.or(Some(r));
    }

    let mut at = Some(head);
    while let Some(k) = at {
        let span = &spans[k];
        let slice = &points[span.range.clone()];
        let band_points = if span.absorbed {
            slice.iter().map(|p| Point { z: span.color, ..*p }).collect()
        } else {
            slice.to_vec()
        };
        bands.push(Band {
            color: span.color,
            ..Band::new(band_points)
        });
        at = span.next;
    }
    measure_bands(bands, min_color_length);
    merges
}

/// A band while pruning: a range of the shared point buffer linked to
/// its live neighbors.
struct Span {
    range: Range<usize>,
    color: Option<f64>,
    distance: f64,
    /// Took in another band's points, which need its value.
    absorbed: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ramp length between two adjacent bands.
#[must_use]
pub fn gradient_length(a: f64, b: f64, config: &GradientConfig) -> f64 {
    (a.min(b) * config.gradient_percent / 100.0)
        .floor()
        .min(config.max_gradient)
        .max(config.min_gradient)
}

/// Set every band's start and end ramp lengths from its neighbors'
/// measured distances.
pub fn set_gradient_lengths(bands: &mut [Band], config: &GradientConfig) {
    let distances: Vec<f64> = bands.iter().map(|b| b.distance).collect();
    for (i, band) in bands.iter_mut().enumerate() {
        band.start_gradient = i
            .checked_sub(1)
            .map_or(0.0, |p| gradient_length(distances[p], band.distance, config));
        band.end_gradient = distances
            .get(i + 1)
            .map_or(0.0, |&next| gradient_length(next, band.distance, config));
    }
}

/// Insert the ramp end points into a band and clear the value of its
/// boundary points on every side that has a ramp.
pub fn insert_gradient_points(band: &mut Band) {
    let has_start = band.start_gradient > 0.0;
    let has_end = band.end_gradient > 0.0;

    if has_start {
        insert_start_point(&mut band.points, band.start_gradient);
    }
    if has_end {
        insert_end_point(&mut band.points, band.end_gradient);
    }

    if has_start && let Some(first) = band.points.first_mut() {
        first.z = None;
    }
    if has_end && let Some(last) = band.points.last_mut() {
        last.z = None;
    }
}

/// Concatenate bands, dropping the last point of every band but the
/// final one.
#[must_use]
pub fn flatten(bands: Vec<Band>) -> Vec<Point> {
    let total: usize = bands.iter().map(|b| b.points.len()).sum();
    let last = bands.len().saturating_sub(1);
    let mut path = Vec::with_capacity(total);

    for (i, band) in bands.into_iter().enumerate() {
        let mut points = band.points;
        if i != last {
            points.pop();
        }
        path.extend(points);
    }
    path
}

/// Walk forward `length` along `points` and insert a point there,
/// valued like the point that follows it.
fn insert_start_point(points: &mut Vec<Point>, length: f64) {
    let mut walked = 0.0;
    for j in 0..points.len().saturating_sub(1) {
        let (current, next) = (points[j], points[j + 1]);
        let before = walked;
        walked += current.distance(&next);
        if walked > length {
            let mut p = point_along(&current, &next, length - before);
            p.z = next.z;
            points.insert(j + 1, p);
            return;
        }
    }
}

/// Walk backward `length` from the end of `points` and insert a point
/// there, valued like the point that precedes it in the walk.
fn insert_end_point(points: &mut Vec<Point>, length: f64) {
    let mut walked = 0.0;
    for j in (1..points.len()).rev() {
        let (prev, current) = (points[j - 1], points[j]);
        walked += current.distance(&prev);
        if walked > length {
            let mut p = point_along(&prev, &current, walked - length);
            p.z = current.z;
            points.insert(j, p);
            return;
        }
    }
}

/// The point `distance` away from `from` in the direction of `to`.
fn point_along(from: &Point, to: &Point, distance: f64) -> Point {
    let len = from.distance(to);
    if distance == 0.0 || len == 0.0 {
        return Point::new(from.x, from.y);
    }
    let ux = (to.x - from.x) / len;
    let uy = (to.y - from.y) / len;
    Point::new(from.x + distance * ux, from.y + distance * uy)
}
