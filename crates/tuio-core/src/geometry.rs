//! Points, affine helpers and convex hull tests

use std::f32::consts::TAU;
use std::fmt;

use tracing::warn;

use crate::bundle::Bundle;
use crate::ids::SessionId;
use crate::messages::{ContainerAssociation, ConvexHull};
use crate::{Error, Result};

/// Normalised 2D coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

/// Normalised 3D coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<(f32, f32)> for Point2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32, f32)> for Point3 {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Scale one coordinate about `center`
#[inline]
pub fn scale_about(value: f32, factor: f32, center: f32) -> f32 {
    center + (value - center) * factor
}

/// Rotate `(x, y)` by `angle` radians about `(cx, cy)`
#[inline]
pub fn rotate_about(x: f32, y: f32, angle: f32, cx: f32, cy: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

/// Signed area of the parallelogram (o→a, o→b)
#[inline]
fn cross(o: Point2, a: Point2, b: Point2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Winding sign of a convex polygon: 1 counter-clockwise, -1 clockwise.
///
/// Collinear vertices are tolerated. Fewer than three points, a fully
/// degenerate polygon, any reflex vertex, an edge folding back on its
/// predecessor or a boundary winding more than once (a star polygon) is
/// rejected.
pub fn convex_orientation(points: &[Point2]) -> Result<i8> {
    if points.len() < 3 {
        return Err(Error::Geometry(format!(
            "polygon needs at least 3 points, got {}",
            points.len()
        )));
    }
    let mut sign = 0i8;
    let mut winding = 0.0f32;
    let n = points.len();
    for i in 0..n {
        let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let turn = cross(a, b, c);
        let along = (b.x - a.x) * (c.x - b.x) + (b.y - a.y) * (c.y - b.y);
        winding += turn.atan2(along);

        let turn_sign = if turn > 0.0 {
            1
        } else if turn < 0.0 {
            -1
        } else if along < 0.0 {
            return Err(Error::Geometry(format!(
                "polygon folds back at vertex {}",
                (i + 1) % n
            )));
        } else {
            continue;
        };
        if sign == 0 {
            sign = turn_sign;
        } else if sign != turn_sign {
            return Err(Error::Geometry(format!(
                "polygon is not convex at vertex {}",
                (i + 1) % n
            )));
        }
    }
    if sign == 0 {
        return Err(Error::Geometry("polygon is degenerate".to_string()));
    }
    // Exterior angles of a simple convex polygon sum to exactly one turn
    if (winding.abs() - TAU).abs() > 0.1 {
        return Err(Error::Geometry(format!(
            "polygon winds {:.1} times",
            winding.abs() / TAU
        )));
    }
    Ok(sign)
}

/// Point-in-convex-polygon test; points on the boundary are inside
pub fn hull_contains(hull: &[Point2], point: Point2) -> Result<bool> {
    let sign = convex_orientation(hull)? as f32;
    let n = hull.len();
    Ok((0..n).all(|i| cross(hull[i], hull[(i + 1) % n], point) * sign >= 0.0))
}

/// Find the first convex hull in `bundle` containing `point` and describe
/// it as a container of `session`. Hulls that are not convex are skipped.
pub fn containment_in_bundle(
    bundle: &Bundle,
    point: Point2,
    session: SessionId,
) -> Option<ContainerAssociation> {
    let mut index = 0;
    while let Some(hull) = bundle.message_of_type::<ConvexHull>(index) {
        index += 1;
        if hull.session_id == session {
            continue;
        }
        match hull.contains(point) {
            Ok(true) => {
                return Some(ContainerAssociation::new(hull.session_id, 0, vec![session]))
            }
            Ok(false) => {}
            Err(e) => warn!("Skipping hull {}: {}", hull.session_id, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Point2> {
        vec![
            Point2::new(-1.0, 4.0),
            Point2::new(-1.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(5.0, 4.0),
        ]
    }

    #[test]
    fn test_hull_contains() {
        let hull = quad();
        assert!(hull_contains(&hull, Point2::new(1.0, 2.5)).unwrap());
        assert!(!hull_contains(&hull, Point2::new(-2.0, -1.0)).unwrap());
        assert!(hull_contains(&hull, Point2::new(-1.0, 2.0)).unwrap());
    }

    #[test]
    fn test_clockwise_hull() {
        let mut hull = quad();
        hull.reverse();
        assert_eq!(convex_orientation(&hull).unwrap(), -1);
        assert!(hull_contains(&hull, Point2::new(1.0, 2.5)).unwrap());
    }

    #[test]
    fn test_reflex_vertex_rejected() {
        let hull = vec![
            Point2::new(-1.0, 4.0),
            Point2::new(-1.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(5.0, 4.0),
        ];
        let err = hull_contains(&hull, Point2::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::Geometry(_)));
    }

    #[test]
    fn test_star_polygon_rejected() {
        // Regular pentagon vertices visited in the order 0, 2, 4, 1, 3
        let pentagon: Vec<Point2> = (0..5)
            .map(|k| {
                let a = std::f32::consts::FRAC_PI_2 + k as f32 * TAU / 5.0;
                Point2::new(a.cos(), a.sin())
            })
            .collect();
        let star: Vec<Point2> = [0, 2, 4, 1, 3].iter().map(|&k| pentagon[k]).collect();

        assert!(convex_orientation(&pentagon).is_ok());
        assert!(matches!(convex_orientation(&star), Err(Error::Geometry(_))));
        assert!(hull_contains(&star, Point2::new(0.0, 0.9)).is_err());
    }

    #[test]
    fn test_fold_back_rejected() {
        let hull = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(convex_orientation(&hull).is_err());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let (x, y) = rotate_about(2.0, 1.0, std::f32::consts::FRAC_PI_2, 1.0, 1.0);
        assert!((x - 1.0).abs() < 1e-6);
        assert!((y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_about_center() {
        assert_eq!(scale_about(3.0, 2.0, 1.0), 5.0);
        assert_eq!(scale_about(1.0, 10.0, 1.0), 1.0);
    }

    #[test]
    fn test_containment_in_bundle() {
        use crate::messages::{AliveMessage, FrameMessage};
        use crate::time::IMMEDIATELY;

        let bundle = Bundle::new();
        bundle.push(FrameMessage::new(1, IMMEDIATELY));
        bundle.push(ConvexHull::new(
            10,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 2.0),
            ],
        ));
        bundle.push(ConvexHull::new(20, quad()));
        bundle.push(AliveMessage::new(vec![10, 20, 3]));

        let coa = containment_in_bundle(&bundle, Point2::new(1.0, 2.5), 3).unwrap();
        assert_eq!(coa.session_id, 20);
        assert_eq!(coa.contained, vec![3]);
        assert!(containment_in_bundle(&bundle, Point2::new(9.0, 9.0), 3).is_none());
    }
}
