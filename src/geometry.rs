use cgmath::EuclideanSpace;

pub type Point = cgmath::Point2<f64>;
pub type Vector = cgmath::Vector2<f64>;

/// Rotates a vector by a quarter turn counter-clockwise.
pub fn get_orthogonal(a: Vector) -> Vector {
    Vector::new(-a.y, a.x)
}

pub fn get_det(a: Vector, b: Vector) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Computes the center of the circle through the three points.
///
/// Returns `None` when the points are collinear (or close enough that the
/// intersection of the perpendicular bisectors is not finite).
pub fn compute_circumcircle_center(point_1: Point, point_2: Point, point_3: Point) -> Option<Point> {
    let v1 = get_orthogonal(point_1 - point_2);
    let v2 = get_orthogonal(point_2 - point_3);
    let delta = (point_3 - point_1) * 0.5;
    let denominator = get_det(v1, v2);
    if denominator == 0.0 {
        return None;
    }
    let t = get_det(delta, v2) / denominator;
    let center = Point::from_vec((point_1.to_vec() + point_2.to_vec()) * 0.5 + v1 * t);
    if center.x.is_finite() && center.y.is_finite() {
        Some(center)
    } else {
        None
    }
}
