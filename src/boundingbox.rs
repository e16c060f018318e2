use crate::geometry::{Point, Vector};

const DIRECTION_EPSILON: f64 = 1e-6;

/// An axis-aligned rectangle used to terminate the diagram's unbounded
/// edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl BoundingBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        BoundingBox {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Grows the box just enough to contain `point`.
    pub fn expand_to_contain(&mut self, point: Point) {
        self.left = self.left.min(point.x);
        self.bottom = self.bottom.min(point.y);
        self.right = self.right.max(point.x);
        self.top = self.top.max(point.y);
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.bottom && point.y <= self.top
    }

    /// Intersects the ray `origin + t * direction`, `t > 0`, with the box.
    ///
    /// Each axis contributes a candidate t for the side the ray is heading
    /// towards, or infinity when the direction component vanishes; the
    /// nearest candidate wins. The origin must lie inside the box.
    pub fn intersect(&self, origin: Point, direction: Vector) -> Point {
        let t1 = if direction.x > DIRECTION_EPSILON {
            (self.right - origin.x) / direction.x
        } else if direction.x < -DIRECTION_EPSILON {
            (self.left - origin.x) / direction.x
        } else {
            f64::INFINITY
        };
        let t2 = if direction.y > DIRECTION_EPSILON {
            (self.top - origin.y) / direction.y
        } else if direction.y < -DIRECTION_EPSILON {
            (self.bottom - origin.y) / direction.y
        } else {
            f64::INFINITY
        };

        origin + direction * t1.min(t2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn intersects_the_nearest_side() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let hit = bbox.intersect(Point::new(0.0, 0.0), Vector::new(1.0, 0.5));
        assert_relative_eq!(hit.x, 1.0);
        assert_relative_eq!(hit.y, 0.5);
    }

    #[test]
    fn vertical_ray_hits_top_or_bottom() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
        let hit = bbox.intersect(Point::new(0.5, 0.0), Vector::new(0.0, -2.0));
        assert_relative_eq!(hit.x, 0.5);
        assert_relative_eq!(hit.y, -1.0);
        let hit = bbox.intersect(Point::new(0.5, 0.0), Vector::new(0.0, 2.0));
        assert_relative_eq!(hit.y, 1.0);
    }

    #[test]
    fn expansion_is_pointwise() {
        let mut bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        bbox.expand_to_contain(Point::new(-2.0, 0.5));
        bbox.expand_to_contain(Point::new(0.5, 3.0));
        assert!(bbox.contains(Point::new(-2.0, 3.0)));
        assert!(!bbox.contains(Point::new(-2.1, 0.0)));
    }
}
