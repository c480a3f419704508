//! Turning colored paths into stroke commands.
//!
//! Planning is separate from drawing: the `plan_*` functions produce a
//! flat list of [`DrawCommand`]s, and [`execute`] replays them on any
//! [`Surface`]. A hotline is drawn as outlines first (widest underneath
//! by configuration order), then the colored line on top. Runs of one
//! value become a single solid polyline; every value change becomes a
//! one-segment two-stop gradient stroke.

use crate::style::Outline;
use crate::types::{Bounds, Path, Point, Rgb};

/// A drawing target with round-capped, round-joined strokes.
pub trait Surface {
    /// Erase everything inside `bounds`.
    fn clear(&mut self, bounds: &Bounds);

    /// Stroke a polyline in a single color.
    fn stroke_polyline(&mut self, points: &[Point], color: Rgb, width: f64);

    /// Stroke one segment with a linear gradient from `start` at `from`
    /// to `end` at `to`.
    fn stroke_gradient(&mut self, from: &Point, to: &Point, start: Rgb, end: Rgb, width: f64);
}

/// A single stroke, ready to replay.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Polyline {
        points: Vec<Point>,
        color: Rgb,
        width: f64,
    },
    Gradient {
        from: Point,
        to: Point,
        start: Rgb,
        end: Rgb,
        width: f64,
    },
}

impl DrawCommand {
    /// Replay this command on `surface`.
    pub fn apply<S: Surface + ?Sized>(&self, surface: &mut S) {
        match self {
            Self::Polyline {
                points,
                color,
                width,
            } => surface.stroke_polyline(points, *color, *width),
            Self::Gradient {
                from,
                to,
                start,
                end,
                width,
            } => surface.stroke_gradient(from, to, *start, *end, *width),
        }
    }
}

/// One wide polyline per outline and path, to be drawn before the line.
///
/// Each outline widens the line by its weight on both sides. Outlines
/// whose width resolves to zero are skipped.
#[must_use]
pub fn plan_outlines(
    paths: &[Path],
    outlines: &[Outline],
    line_weight: f64,
    zoom: Option<f64>,
) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    for outline in outlines {
        let outline_weight = outline.weight.resolve(zoom);
        if outline_weight <= 0.0 {
            continue;
        }
        let width = 2.0_f64.mul_add(outline_weight, line_weight);
        commands.extend(
            paths
                .iter()
                .filter(|p| !p.is_empty())
                .map(|p| DrawCommand::Polyline {
                    points: p.points().to_vec(),
                    color: outline.color,
                    width,
                }),
        );
    }
    commands
}

/// Strokes for the colored line itself.
///
/// Expects points whose `rgb` has been resolved; an unresolved point is
/// drawn black.
#[must_use]
pub fn plan_hotline(paths: &[Path], width: f64) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    for path in paths {
        plan_path(path.points(), width, &mut commands);
    }
    commands
}

fn plan_path(points: &[Point], width: f64, commands: &mut Vec<DrawCommand>) {
    let last = points.len().saturating_sub(1);
    let mut run: Vec<Point> = Vec::new();

    for (j, pair) in points.windows(2).enumerate() {
        let (start, end) = (&pair[0], &pair[1]);
        run.push(*start);
        if start.z == end.z && j + 1 != last {
            continue;
        }

        let run_points = std::mem::take(&mut run);
        if run_points.len() >= 2 {
            let color = color_of(&run_points[0]);
            commands.push(DrawCommand::Polyline {
                points: run_points,
                color,
                width,
            });
        }
        commands.push(DrawCommand::Gradient {
            from: *start,
            to: *end,
            start: color_of(start),
            end: color_of(end),
            width,
        });
    }
}

fn color_of(p: &Point) -> Rgb {
    p.rgb.unwrap_or_default()
}

/// Replay commands in order.
pub fn execute<S: Surface + ?Sized>(surface: &mut S, commands: &[DrawCommand]) {
    for command in commands {
        command.apply(surface);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::style::LineWeight;

    const A: Rgb = Rgb::new(10, 0, 0);
    const B: Rgb = Rgb::new(0, 20, 0);

    fn colored(x: f64, z: f64, rgb: Rgb) -> Point {
        Point {
            rgb: Some(rgb),
            ..Point::with_z(x, 0.0, z)
        }
    }

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, _bounds: &Bounds) {
            self.log.push("clear".to_owned());
        }

        fn stroke_polyline(&mut self, points: &[Point], color: Rgb, width: f64) {
            self.log
                .push(format!("line {} {} {width}", points.len(), color.to_css()));
        }

        fn stroke_gradient(&mut self, from: &Point, to: &Point, start: Rgb, end: Rgb, width: f64) {
            self.log.push(format!(
                "grad {}->{} {}->{} {width}",
                from.x,
                to.x,
                start.to_css(),
                end.to_css()
            ));
        }
    }

    #[test]
    fn single_value_path_is_one_run_plus_closing_segment() {
        let path = Path::new(vec![colored(0.0, 1.0, A), colored(1.0, 1.0, A), colored(2.0, 1.0, A)]);
        let commands = plan_hotline(&[path], 5.0);
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            &commands[0],
            DrawCommand::Polyline { points, color, width } if points.len() == 2 && *color == A && *width == 5.0
        ));
        assert!(matches!(
            &commands[1],
            DrawCommand::Gradient { from, to, .. } if from.x == 1.0 && to.x == 2.0
        ));
    }

    #[test]
    fn value_change_emits_gradient_segment() {
        let path = Path::new(vec![
            colored(0.0, 1.0, A),
            colored(1.0, 1.0, A),
            colored(2.0, 2.0, B),
            colored(3.0, 2.0, B),
            colored(4.0, 2.0, B),
        ]);
        let mut surface = Recorder::default();
        execute(&mut surface, &plan_hotline(&[path], 4.0));
        assert_eq!(
            surface.log,
            vec![
                "line 2 rgb(10,0,0) 4",
                "grad 1->2 rgb(10,0,0)->rgb(0,20,0) 4",
                "line 2 rgb(0,20,0) 4",
                "grad 3->4 rgb(0,20,0)->rgb(0,20,0) 4",
            ]
        );
    }

    #[test]
    fn short_runs_skip_the_solid_stroke() {
        let path = Path::new(vec![colored(0.0, 1.0, A), colored(1.0, 2.0, B)]);
        let commands = plan_hotline(&[path], 4.0);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], DrawCommand::Gradient { .. }));
    }

    #[test]
    fn degenerate_paths_draw_nothing() {
        let commands = plan_hotline(&[Path::default(), Path::new(vec![colored(0.0, 1.0, A)])], 4.0);
        assert!(commands.is_empty());
    }

    #[test]
    fn unresolved_points_draw_black() {
        let path = Path::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        let commands = plan_hotline(&[path], 1.0);
        assert!(matches!(
            commands[0],
            DrawCommand::Gradient { start, end, .. } if start == Rgb::BLACK && end == Rgb::BLACK
        ));
    }

    #[test]
    fn outlines_widen_the_line_and_keep_order() {
        let outlines = vec![
            Outline {
                color: A,
                weight: LineWeight::fixed(4.0),
            },
            Outline {
                color: B,
                weight: LineWeight::fixed(0.0),
            },
            Outline {
                color: B,
                weight: LineWeight::fixed(3.0),
            },
        ];
        let paths = vec![
            Path::new(vec![colored(0.0, 1.0, A), colored(1.0, 1.0, A)]),
            Path::default(),
        ];
        let commands = plan_outlines(&paths, &outlines, 6.0, None);
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            &commands[0],
            DrawCommand::Polyline { color, width, .. } if *color == A && *width == 14.0
        ));
        assert!(matches!(
            &commands[1],
            DrawCommand::Polyline { color, width, .. } if *color == B && *width == 12.0
        ));
    }
}
