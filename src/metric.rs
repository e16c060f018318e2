use crate::geometry::{compute_circumcircle_center, Point};
use cgmath::MetricSpace;

/// Result of a circle-event query: the sweep position at which the event
/// fires and the equidistant center it fires at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub event_y: f64,
    pub center: Point,
}

/// Distance-specific geometry consumed by the sweep.
///
/// The driver is otherwise metric-agnostic: these two functions are the
/// only places the shape of a bisector enters the algorithm.
pub trait Metric {
    /// Returns the x-coordinate where the arcs focused at `left` and
    /// `right` meet, with the sweepline as directrix, choosing the
    /// intersection consistent with `left` lying left of `right` on the
    /// beachline.
    fn compute_breakpoint(&self, left: Point, right: Point, sweep_y: f64) -> f64;

    /// Returns the circle event for three consecutive arc foci, or `None`
    /// when the sites are collinear or the computation is not finite.
    fn compute_convergence_point(&self, p1: Point, p2: Point, p3: Point) -> Option<Convergence>;
}

/// The standard Euclidean metric: parabolic arcs, circumcircle events.
#[derive(Debug, Default, Clone, Copy)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn compute_breakpoint(&self, left: Point, right: Point, sweep_y: f64) -> f64 {
        // A focus on the sweepline degenerates to a vertical ray, so these
        // cases are settled before forming the quadratic coefficients.
        if left.y == sweep_y && right.y == sweep_y {
            return (left.x + right.x) * 0.5;
        }
        if left.y == sweep_y {
            return left.x;
        }
        if right.y == sweep_y {
            return right.x;
        }

        let d1 = 1.0 / (2.0 * (left.y - sweep_y));
        let d2 = 1.0 / (2.0 * (right.y - sweep_y));
        let a = d1 - d2;
        let b = 2.0 * (right.x * d2 - left.x * d1);
        let c = (left.y.powi(2) + left.x.powi(2) - sweep_y.powi(2)) * d1
            - (right.y.powi(2) + right.x.powi(2) - sweep_y.powi(2)) * d2;

        if a == 0.0 {
            // Equal focus heights leave a single intersection.
            -c / b
        } else {
            let delta = b.powi(2) - 4.0 * a * c;
            (-b + f64::sqrt(delta)) / (2.0 * a)
        }
    }

    fn compute_convergence_point(&self, p1: Point, p2: Point, p3: Point) -> Option<Convergence> {
        let center = compute_circumcircle_center(p1, p2, p3)?;
        let radius = center.distance(p2);
        let event_y = center.y - radius;
        if event_y.is_finite() {
            Some(Convergence { event_y, center })
        } else {
            None
        }
    }
}

/// Resolves a registered metric by name.
pub fn named_metric(name: &str) -> Option<Box<dyn Metric>> {
    match name {
        "euclidean" => Some(Box::new(Euclidean)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn breakpoint_of_equal_height_foci_is_the_midpoint() {
        let x = Euclidean.compute_breakpoint(Point::new(0.0, 1.0), Point::new(2.0, 1.0), 0.0);
        assert_relative_eq!(x, 1.0);
    }

    #[test]
    fn breakpoint_respects_arc_order() {
        // The two parabolas intersect at x = 0 and x = 4; which of them is
        // the breakpoint depends on which arc is on the left.
        let high = Point::new(0.0, 2.0);
        let low = Point::new(1.0, 1.0);
        assert_relative_eq!(Euclidean.compute_breakpoint(high, low, 0.0), 0.0);
        assert_relative_eq!(Euclidean.compute_breakpoint(low, high, 0.0), 4.0);
    }

    #[test]
    fn breakpoint_with_focus_on_the_sweepline() {
        let x = Euclidean.compute_breakpoint(Point::new(0.0, 1.0), Point::new(0.5, 0.0), 0.0);
        assert_relative_eq!(x, 0.5);
        let x = Euclidean.compute_breakpoint(Point::new(0.5, 0.0), Point::new(0.0, 1.0), 0.0);
        assert_relative_eq!(x, 0.5);
    }

    #[test]
    fn breakpoint_of_two_foci_on_the_sweepline_is_the_midpoint() {
        let x = Euclidean.compute_breakpoint(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 0.0);
        assert_relative_eq!(x, 0.5);
    }

    #[test]
    fn convergence_point_is_the_circumcenter() {
        let conv = Euclidean
            .compute_convergence_point(
                Point::new(0.0, 0.0),
                Point::new(1.0, 2.0),
                Point::new(2.0, 0.0),
            )
            .unwrap();
        assert_relative_eq!(conv.center.x, 1.0);
        assert_relative_eq!(conv.center.y, 0.75);
        // The circle touches the sweepline at center.y - radius.
        assert_relative_eq!(conv.event_y, 0.75 - 1.25);
    }

    #[test]
    fn collinear_sites_produce_no_convergence_point() {
        assert!(Euclidean
            .compute_convergence_point(
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0)
            )
            .is_none());
    }

    #[test]
    fn named_lookup() {
        assert!(named_metric("euclidean").is_some());
        assert!(named_metric("manhattan").is_none());
    }
}
