//! Geometry messages
//!
//! ```text
//! /tuio2/chg  s_id x0 y0 ... xN yN
//! /tuio2/ocg  s_id x0 y0 ... xN yN
//! /tuio2/icg  s_id x0 y0 ... xN yN [true x0 y0 ... xM yM]*
//! /tuio2/svg  s_id r0 ... rN
//! /tuio2/arg  s_id x0 y0 w0 ... xN yN wN
//! ```

use std::fmt;

use rosc::OscType;

use crate::codec::{uint_arg, ArgReader, OscCodec};
use crate::geometry::{hull_contains, scale_about, Point2};
use crate::ids::SessionId;
use crate::messages::traits::{
    impl_session_id, move_points, rotate_points, scale_points, Movable2d, Rotatable2d,
    Scalable2d,
};
use crate::Result;

fn push_points(args: &mut Vec<OscType>, points: &[Point2]) {
    for p in points {
        args.push(OscType::Float(p.x));
        args.push(OscType::Float(p.y));
    }
}

/// Read `x y` pairs until the arguments end or a separator follows
fn read_points(r: &mut ArgReader<'_>) -> Option<Vec<Point2>> {
    let mut points = Vec::new();
    while !r.is_empty() && !matches!(r.clone().skip(), Some(OscType::Bool(_))) {
        points.push(Point2::new(r.float()?, r.float()?));
    }
    Some(points)
}

fn write_points(f: &mut fmt::Formatter<'_>, points: &[Point2]) -> fmt::Result {
    f.write_str("[")?;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", p)?;
    }
    f.write_str("]")
}

/// Implements point-list codec and transforms for single-polygon messages
macro_rules! polygon_message {
    ($(#[$doc:meta])* $name:ident, $path:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub session_id: SessionId,
            pub points: Vec<Point2>,
        }

        impl $name {
            pub fn new(session_id: SessionId, points: Vec<Point2>) -> Self {
                Self { session_id, points }
            }
        }

        impl OscCodec for $name {
            const PATH: &'static str = $path;

            fn to_args(&self) -> Vec<OscType> {
                let mut args = vec![uint_arg(self.session_id)];
                push_points(&mut args, &self.points);
                args
            }

            fn from_args(args: &[OscType]) -> Option<Self> {
                let mut r = ArgReader::new(args);
                let session_id = r.uint()?;
                let points = read_points(&mut r)?;
                r.finish()?;
                Some(Self { session_id, points })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} s_id={} ", Self::PATH, self.session_id)?;
                write_points(f, &self.points)
            }
        }

        impl Movable2d for $name {
            fn move_x(&mut self, dx: f32) {
                move_points(self.points.iter_mut(), dx, 0.0);
            }

            fn move_y(&mut self, dy: f32) {
                move_points(self.points.iter_mut(), 0.0, dy);
            }
        }

        impl Scalable2d for $name {
            fn scale_x(&mut self, factor: f32, center_x: f32) {
                scale_points(self.points.iter_mut(), factor, center_x, 1.0, 0.0);
            }

            fn scale_y(&mut self, factor: f32, center_y: f32) {
                scale_points(self.points.iter_mut(), 1.0, 0.0, factor, center_y);
            }
        }

        impl Rotatable2d for $name {
            fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32) {
                rotate_points(self.points.iter_mut(), angle, center_x, center_y);
            }
        }
    };
}

polygon_message!(
    /// `/tuio2/chg`: convex hull
    ConvexHull,
    "/tuio2/chg"
);

polygon_message!(
    /// `/tuio2/ocg`: outer contour
    OuterContour,
    "/tuio2/ocg"
);

impl ConvexHull {
    /// Whether `point` lies inside or on the hull. Non-convex point lists are
    /// rejected rather than tested.
    pub fn contains(&self, point: Point2) -> Result<bool> {
        hull_contains(&self.points, point)
    }
}

/// `/tuio2/icg`: one or more inner contours (holes)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InnerContour {
    pub session_id: SessionId,
    pub contours: Vec<Vec<Point2>>,
}

impl OscCodec for InnerContour {
    const PATH: &'static str = "/tuio2/icg";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        for (i, contour) in self.contours.iter().enumerate() {
            if i > 0 {
                args.push(OscType::Bool(true));
            }
            push_points(&mut args, contour);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let mut contours = Vec::new();
        if !r.is_empty() {
            contours.push(read_points(&mut r)?);
            while r.separator() {
                contours.push(read_points(&mut r)?);
            }
        }
        r.finish()?;
        Some(Self {
            session_id,
            contours,
        })
    }
}

impl fmt::Display for InnerContour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s_id={}", Self::PATH, self.session_id)?;
        for contour in &self.contours {
            f.write_str(" ")?;
            write_points(f, contour)?;
        }
        Ok(())
    }
}

impl Movable2d for InnerContour {
    fn move_x(&mut self, dx: f32) {
        move_points(self.contours.iter_mut().flatten(), dx, 0.0);
    }

    fn move_y(&mut self, dy: f32) {
        move_points(self.contours.iter_mut().flatten(), 0.0, dy);
    }
}

impl Scalable2d for InnerContour {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        scale_points(self.contours.iter_mut().flatten(), factor, center_x, 1.0, 0.0);
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        scale_points(self.contours.iter_mut().flatten(), 1.0, 0.0, factor, center_y);
    }
}

impl Rotatable2d for InnerContour {
    fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32) {
        rotate_points(self.contours.iter_mut().flatten(), angle, center_x, center_y);
    }
}

/// `/tuio2/svg`: one radius per skeleton node, in skeleton wire order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonVolume {
    pub session_id: SessionId,
    pub radii: Vec<f32>,
}

impl OscCodec for SkeletonVolume {
    const PATH: &'static str = "/tuio2/svg";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        args.extend(self.radii.iter().copied().map(OscType::Float));
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        Some(Self {
            session_id: r.uint()?,
            radii: r.rest_floats()?,
        })
    }
}

impl fmt::Display for SkeletonVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s_id={} {:?}", Self::PATH, self.session_id, self.radii)
    }
}

/// Horizontal run of covered samples
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Span {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

/// `/tuio2/arg`: area as a list of horizontal spans
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Area {
    pub session_id: SessionId,
    pub spans: Vec<Span>,
}

impl OscCodec for Area {
    const PATH: &'static str = "/tuio2/arg";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        for span in &self.spans {
            args.extend([span.x, span.y, span.width].map(OscType::Float));
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let mut spans = Vec::with_capacity(r.remaining() / 3);
        while !r.is_empty() {
            spans.push(Span {
                x: r.float()?,
                y: r.float()?,
                width: r.float()?,
            });
        }
        Some(Self { session_id, spans })
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} spans[{}]",
            Self::PATH,
            self.session_id,
            self.spans.len()
        )
    }
}

impl Movable2d for Area {
    fn move_x(&mut self, dx: f32) {
        for span in &mut self.spans {
            span.x += dx;
        }
    }

    fn move_y(&mut self, dy: f32) {
        for span in &mut self.spans {
            span.y += dy;
        }
    }
}

impl Scalable2d for Area {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        for span in &mut self.spans {
            span.x = scale_about(span.x, factor, center_x);
            span.width *= factor;
        }
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        for span in &mut self.spans {
            span.y = scale_about(span.y, factor, center_y);
        }
    }
}

impl_session_id!(ConvexHull, OuterContour, InnerContour, SkeletonVolume, Area);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::typetag;

    fn hull() -> ConvexHull {
        ConvexHull::new(
            3,
            vec![
                Point2::new(-1.0, 4.0),
                Point2::new(-1.0, 0.0),
                Point2::new(3.0, 0.0),
                Point2::new(5.0, 4.0),
            ],
        )
    }

    #[test]
    fn test_hull_codec() {
        let msg = hull().to_osc();
        assert_eq!(msg.addr, "/tuio2/chg");
        assert_eq!(typetag(&msg.args), "iffffffff");
        assert_eq!(ConvexHull::parse(&msg), Some(hull()));
    }

    #[test]
    fn test_hull_rejects_odd_coordinate_count() {
        let mut args = hull().to_args();
        args.push(OscType::Float(1.0));
        assert!(ConvexHull::from_args(&args).is_none());
    }

    #[test]
    fn test_hull_transforms() {
        let mut h = hull();
        h.move_by(1.0, -1.0);
        assert_eq!(h.points[0], Point2::new(0.0, 3.0));
        h.scale_x(2.0, 0.0);
        assert_eq!(h.points[3], Point2::new(12.0, 3.0));
        h.rotate_by(std::f32::consts::PI, 0.0, 0.0);
        assert!((h.points[0].y + 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_inner_contours_with_separator() {
        let icg = InnerContour {
            session_id: 4,
            contours: vec![
                vec![Point2::new(0.1, 0.1), Point2::new(0.2, 0.1)],
                vec![Point2::new(0.5, 0.5)],
            ],
        };
        let msg = icg.to_osc();
        assert_eq!(typetag(&msg.args), "iffffTff");
        assert_eq!(InnerContour::parse(&msg), Some(icg));
    }

    #[test]
    fn test_area_spans() {
        let area = Area {
            session_id: 1,
            spans: vec![
                Span {
                    x: 0.1,
                    y: 0.2,
                    width: 0.3,
                },
                Span {
                    x: 0.1,
                    y: 0.3,
                    width: 0.2,
                },
            ],
        };
        assert_eq!(Area::parse(&area.to_osc()), Some(area.clone()));
        let mut args = area.to_args();
        args.pop();
        assert!(Area::from_args(&args).is_none());
    }
}
