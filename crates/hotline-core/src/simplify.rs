//! Path simplification that never removes a color boundary.
//!
//! Two passes, both on squared distances: a radial-distance reduction
//! drops points closer than `tolerance` to the last kept point, then
//! Ramer-Douglas-Peucker drops points within `tolerance` of the segment
//! between their kept neighbors. Points flagged
//! [`cant_be_deleted`](Point::cant_be_deleted) survive both passes, so
//! color changes stay exactly where the data put them.

use crate::types::{Path, Point};

/// Flag every point that sits on a color boundary.
///
/// A point is a boundary when its predecessor or successor is missing or
/// carries a different `z`. Path ends are therefore always flagged.
pub fn mark_color_boundaries(points: &mut [Point]) {
    let zs: Vec<Option<f64>> = points.iter().map(|p| p.z).collect();
    for (i, point) in points.iter_mut().enumerate() {
        let prev = i.checked_sub(1).map(|j| zs[j]);
        let next = zs.get(i + 1).copied();
        point.cant_be_deleted = prev != Some(point.z) || next != Some(point.z);
    }
}

/// Simplify a single path with the given pixel tolerance.
///
/// A tolerance of 0.0 preserves all points, as do paths with fewer than
/// 3 points.
#[must_use = "returns the simplified path"]
pub fn simplify(path: &Path, tolerance: f64) -> Path {
    if tolerance <= 0.0 || path.len() < 3 {
        return path.clone();
    }

    let sq_tolerance = tolerance * tolerance;
    let reduced = reduce_radial(path.points(), sq_tolerance);
    Path::new(simplify_rdp(&reduced, sq_tolerance))
}

/// Simplify multiple paths, each independently.
#[must_use = "returns the simplified paths"]
pub fn simplify_paths(paths: &[Path], tolerance: f64) -> Vec<Path> {
    paths.iter().map(|p| simplify(p, tolerance)).collect()
}

/// Keep a point only if it is farther than the tolerance from the last
/// kept point, or is a boundary. The last point is always kept.
fn reduce_radial(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut reduced = vec![first];
    let mut prev = first;
    let mut prev_kept_last = rest.is_empty();
    for (i, &p) in rest.iter().enumerate() {
        if p.distance_squared(&prev) > sq_tolerance || p.cant_be_deleted {
            reduced.push(p);
            prev = p;
            prev_kept_last = i + 1 == rest.len();
        }
    }
    if !prev_kept_last && let Some(&last) = rest.last() {
        reduced.push(last);
    }
    reduced
}

fn simplify_rdp(points: &[Point], sq_tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept: Vec<bool> = points.iter().map(|p| p.cant_be_deleted).collect();
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, sq_tolerance, &mut kept);

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` farthest from the segment
/// between them. If its squared distance exceeds `sq_tolerance`, the
/// point is kept and both sub-ranges are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, sq_tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = segment_distance_squared(&points[i], &points[start], &points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > sq_tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, sq_tolerance, kept);
        rdp_recurse(points, max_idx, end, sq_tolerance, kept);
    }
}

/// Squared distance from `p` to the closest point of segment `a`-`b`.
///
/// When `a` and `b` coincide, this is the squared distance to `a`.
fn segment_distance_squared(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    let closest = if length_sq > 0.0 {
        let t = (p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / length_sq;
        if t > 1.0 {
            Point::new(b.x, b.y)
        } else if t > 0.0 {
            Point::new(dx.mul_add(t, a.x), dy.mul_add(t, a.y))
        } else {
            Point::new(a.x, a.y)
        }
    } else {
        Point::new(a.x, a.y)
    };

    p.distance_squared(&closest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(x: f64, y: f64) -> Point {
        Point {
            cant_be_deleted: true,
            ..Point::new(x, y)
        }
    }

    #[test]
    fn empty_path_unchanged() {
        let result = simplify(&Path::new(vec![]), 1.0);
        assert!(result.is_empty());
    }

    #[test]
    fn two_points_unchanged() {
        let path = Path::new(vec![Point::new(0.0, 0.0), Point::new(0.1, 0.0)]);
        assert_eq!(simplify(&path, 1.0), path);
    }

    #[test]
    fn zero_tolerance_preserves_all_points() {
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.1),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.05),
            Point::new(4.0, 0.0),
        ]);
        assert_eq!(simplify(&path, 0.0).len(), 5);
    }

    #[test]
    fn collinear_points_collapse_to_endpoints() {
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(4.0, 4.0),
            Point::new(6.0, 6.0),
            Point::new(8.0, 8.0),
        ]);
        let result = simplify(&path, 0.1);
        assert_eq!(
            result.points(),
            &[Point::new(0.0, 0.0), Point::new(8.0, 8.0)]
        );
    }

    #[test]
    fn zigzag_retains_peaks() {
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 5.0),
            Point::new(4.0, 0.0),
            Point::new(6.0, 5.0),
            Point::new(8.0, 0.0),
        ]);
        assert_eq!(simplify(&path, 1.0).len(), 5);
        assert_eq!(simplify(&path, 10.0).len(), 2);
    }

    #[test]
    fn radial_pass_drops_close_points_but_keeps_last() {
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(1.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.2, 0.0),
        ]);
        let result = simplify(&path, 1.0);
        assert_eq!(
            result.points(),
            &[Point::new(0.0, 0.0), Point::new(5.2, 0.0)]
        );
    }

    #[test]
    fn boundary_points_survive_both_passes() {
        let path = Path::new(vec![
            Point::new(0.0, 0.0),
            boundary(0.2, 0.0),
            Point::new(3.0, 0.0),
            boundary(6.0, 0.0),
            Point::new(9.0, 0.0),
        ]);
        let result = simplify(&path, 1.0);
        assert_eq!(
            result.points(),
            &[
                Point::new(0.0, 0.0),
                boundary(0.2, 0.0),
                boundary(6.0, 0.0),
                Point::new(9.0, 0.0),
            ]
        );
    }

    #[test]
    fn mark_color_boundaries_flags_changes_and_ends() {
        let mut points = vec![
            Point::with_z(0.0, 0.0, 0.0),
            Point::with_z(1.0, 0.0, 0.0),
            Point::with_z(2.0, 0.0, 0.0),
            Point::with_z(3.0, 0.0, 1.0),
            Point::with_z(4.0, 0.0, 1.0),
        ];
        mark_color_boundaries(&mut points);
        let flags: Vec<bool> = points.iter().map(|p| p.cant_be_deleted).collect();
        assert_eq!(flags, vec![true, false, true, true, true]);
    }

    #[test]
    fn mark_color_boundaries_treats_missing_values_alike() {
        let mut points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        mark_color_boundaries(&mut points);
        assert!(!points[1].cant_be_deleted);
    }

    #[test]
    fn marked_path_keeps_its_color_change() {
        let mut points: Vec<Point> = (0..10)
            .map(|i| Point::with_z(f64::from(i), 0.0, if i < 6 { 1.0 } else { 2.0 }))
            .collect();
        mark_color_boundaries(&mut points);
        let result = simplify(&Path::new(points), 2.0);
        let zs: Vec<Option<f64>> = result.points().iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
        assert!((result.points()[1].x - 5.0).abs() < f64::EPSILON);
        assert!((result.points()[2].x - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn simplify_paths_applies_to_each() {
        let paths = vec![
            Path::new(vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 2.0),
                Point::new(4.0, 4.0),
            ]),
            Path::new(vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 5.0),
                Point::new(4.0, 0.0),
            ]),
        ];
        let results = simplify_paths(&paths, 0.5);
        assert_eq!(results[0].len(), 2);
        assert_eq!(results[1].len(), 3);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 0.0);
        assert!((segment_distance_squared(&Point::new(1.0, 3.0), &a, &b) - 9.0).abs() < 1e-10);
        assert!((segment_distance_squared(&Point::new(5.0, 4.0), &a, &b) - 25.0).abs() < 1e-10);
        assert!((segment_distance_squared(&Point::new(-3.0, 0.0), &a, &b) - 9.0).abs() < 1e-10);
    }

    #[test]
    fn segment_distance_coincident_endpoints() {
        let a = Point::new(0.0, 0.0);
        let d = segment_distance_squared(&Point::new(3.0, 4.0), &a, &a);
        assert!((d - 25.0).abs() < 1e-10);
    }
}
