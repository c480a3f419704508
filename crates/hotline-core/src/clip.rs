//! Viewport clipping: trim projected polylines to the visible rectangle.
//!
//! Segments are clipped one at a time with Cohen-Sutherland outcodes.
//! Every intersection point created on a viewport edge inherits the `z`
//! value of the endpoint it replaces, so clipping never changes the
//! colors along the visible part of a line.
//!
//! A ring that leaves and re-enters the viewport is split into several
//! [`Path`]s, one per visible stretch.

use std::ops::BitOr;

use crate::types::{Bounds, Path, Point};

/// Intersection steps allowed per segment.
///
/// Each step clears at least one outcode bit in exact arithmetic, so four
/// per endpoint is enough; the cap only bites on NaN or rounding noise
/// right at a corner.
const MAX_CLIP_STEPS: usize = 8;

/// Cohen-Sutherland classification of a point against a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcode(u8);

impl Outcode {
    /// Inside or on the edge of the rectangle.
    pub const INSIDE: Self = Self(0);
    /// `x < min_x`.
    pub const X_MIN: Self = Self(1);
    /// `x > max_x`.
    pub const X_MAX: Self = Self(2);
    /// `y < min_y`.
    pub const Y_MIN: Self = Self(4);
    /// `y > max_y`.
    pub const Y_MAX: Self = Self(8);

    /// Classify `p` against `bounds`.
    #[must_use]
    pub fn of(p: &Point, bounds: &Bounds) -> Self {
        let mut code = 0;
        if p.x < bounds.min_x {
            code |= Self::X_MIN.0;
        } else if p.x > bounds.max_x {
            code |= Self::X_MAX.0;
        }
        if p.y < bounds.min_y {
            code |= Self::Y_MIN.0;
        } else if p.y > bounds.max_y {
            code |= Self::Y_MAX.0;
        }
        Self(code)
    }

    #[must_use]
    pub const fn is_inside(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `flag` is set.
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0 && flag.0 != 0
    }

    /// Whether both codes lie beyond the same edge.
    #[must_use]
    pub const fn shares_edge(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Outcode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Scan state threaded through consecutive [`clip_segment`] calls.
///
/// Holds the outcode of the previous segment's original end point so the
/// next segment, which starts there, need not classify it again. Create
/// one per ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipState {
    last_code: Option<Outcode>,
}

impl ClipState {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_code: None }
    }

    /// Outcode of the end point passed to the most recent call.
    #[must_use]
    pub const fn last_code(&self) -> Option<Outcode> {
        self.last_code
    }
}

/// The visible part of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedSegment {
    pub start: Point,
    pub end: Point,
    /// `start` was replaced by an intersection with the viewport edge.
    pub start_clipped: bool,
    /// `end` was replaced by an intersection with the viewport edge.
    pub end_clipped: bool,
}

/// Clip the segment `a`-`b` against `bounds`.
///
/// Returns `None` when no part of the segment is visible. With
/// `reuse_last_outcode`, the outcode of `a` is taken from `state`
/// instead of being recomputed; only pass `true` when `a` is the `b` of
/// the previous call on the same `state`. Results are identical either
/// way.
#[must_use]
pub fn clip_segment(
    a: &Point,
    b: &Point,
    bounds: &Bounds,
    state: &mut ClipState,
    reuse_last_outcode: bool,
) -> Option<ClippedSegment> {
    let mut code_a = match state.last_code {
        Some(code) if reuse_last_outcode => code,
        _ => Outcode::of(a, bounds),
    };
    let mut code_b = Outcode::of(b, bounds);
    state.last_code = Some(code_b);

    let mut segment = ClippedSegment {
        start: *a,
        end: *b,
        start_clipped: false,
        end_clipped: false,
    };

    for _ in 0..MAX_CLIP_STEPS {
        if (code_a | code_b).is_inside() {
            return Some(segment);
        }
        if code_a.shares_edge(code_b) {
            return None;
        }

        let clip_start = !code_a.is_inside();
        let code_out = if clip_start { code_a } else { code_b };
        let mut p = edge_intersection(&segment.start, &segment.end, code_out, bounds);
        let new_code = Outcode::of(&p, bounds);

        if clip_start {
            p.z = segment.start.z;
            segment.start = p;
            segment.start_clipped = true;
            code_a = new_code;
        } else {
            p.z = segment.end.z;
            segment.end = p;
            segment.end_clipped = true;
            code_b = new_code;
        }
    }

    log::trace!(
        "giving up clipping ({}, {})-({}, {}) after {MAX_CLIP_STEPS} steps",
        a.x,
        a.y,
        b.x,
        b.y,
    );
    None
}

/// Split projected rings into the parts visible inside `bounds`.
///
/// A part ends where a segment leaves the viewport or where its ring
/// ends. When the bounding box of all rings misses the viewport, nothing
/// is visible and no parts are returned.
#[must_use = "returns the visible parts"]
pub fn clip_rings(rings: &[Path], bounds: &Bounds) -> Vec<Path> {
    let Some(extent) = Bounds::from_points(rings.iter().flat_map(Path::points)) else {
        return Vec::new();
    };
    if !extent.intersects(bounds) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for ring in rings {
        clip_ring_into(ring.points(), bounds, &mut parts);
    }

    log::debug!("clipped {} rings into {} parts", rings.len(), parts.len());
    parts
}

/// Clip one ring, appending its visible parts to `parts`.
fn clip_ring_into(points: &[Point], bounds: &Bounds, parts: &mut Vec<Path>) {
    let mut state = ClipState::new();
    let mut current: Vec<Point> = Vec::new();
    let last_segment = points.len().saturating_sub(2);

    for (j, pair) in points.windows(2).enumerate() {
        let Some(segment) = clip_segment(&pair[0], &pair[1], bounds, &mut state, j > 0) else {
            continue;
        };

        current.push(segment.start);

        if segment.end_clipped || j == last_segment {
            current.push(segment.end);
            parts.push(Path::new(std::mem::take(&mut current)));
        }
    }

    // Only reachable when the iteration guard rejected a segment mid-part.
    push_leftover(current, parts);
}

/// Keep what is left of an unfinished part if it still forms a line.
fn push_leftover(current: Vec<Point>, parts: &mut Vec<Path>) {
    if current.len() >= 2 {
        parts.push(Path::new(current));
    } else if let [only] = current.as_slice() {
        log::trace!(
            "dropping lone point ({}, {}) left by a rejected segment",
            only.x,
            only.y,
        );
    }
}

/// Intersection of the segment `a`-`b` with the edge named by `code`.
///
/// Edges are tried in the order `y_max`, `y_min`, `x_max`, `x_min`. A
/// zero-length span along the crossing axis keeps `a`'s coordinate.
fn edge_intersection(a: &Point, b: &Point, code: Outcode, bounds: &Bounds) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ratio = |num: f64, den: f64| if den == 0.0 { 0.0 } else { num / den };

    let (x, y) = if code.has(Outcode::Y_MAX) {
        (a.x + dx * ratio(bounds.max_y - a.y, dy), bounds.max_y)
    } else if code.has(Outcode::Y_MIN) {
        (a.x + dx * ratio(bounds.min_y - a.y, dy), bounds.min_y)
    } else if code.has(Outcode::X_MAX) {
        (bounds.max_x, a.y + dy * ratio(bounds.max_x - a.x, dx))
    } else {
        (bounds.min_x, a.y + dy * ratio(bounds.min_x - a.x, dx))
    };

    Point::new(x, y)
}
