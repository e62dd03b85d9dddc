//! Capability traits shared across the message catalog
//!
//! Each message struct implements the subset that applies to it; there is no
//! inheritance between them.

use crate::geometry::{rotate_about, scale_about, Point2, Point3};
use crate::ids::SessionId;

pub trait HasSessionId {
    fn session_id(&self) -> SessionId;
    fn set_session_id(&mut self, id: SessionId);
}

pub trait HasComponentId {
    fn component_id(&self) -> u32;
    fn set_component_id(&mut self, id: u32);
}

/// Type and user ids travel packed into one `int32` (type high, user low)
pub trait HasTypeUser {
    fn type_id(&self) -> u16;
    fn user_id(&self) -> u16;
    fn set_type_user(&mut self, type_id: u16, user_id: u16);

    fn type_user_id(&self) -> u32 {
        pack_type_user(self.type_id(), self.user_id())
    }
}

pub trait Movable2d {
    fn move_x(&mut self, dx: f32);
    fn move_y(&mut self, dy: f32);

    fn move_by(&mut self, dx: f32, dy: f32) {
        self.move_x(dx);
        self.move_y(dy);
    }
}

pub trait Movable3d: Movable2d {
    fn move_z(&mut self, dz: f32);
}

/// Independent-axis scaling about an explicit center coordinate
pub trait Scalable2d {
    fn scale_x(&mut self, factor: f32, center_x: f32);
    fn scale_y(&mut self, factor: f32, center_y: f32);

    /// Uniform scaling about `(center_x, center_y)`
    fn scale(&mut self, factor: f32, center_x: f32, center_y: f32) {
        self.scale_x(factor, center_x);
        self.scale_y(factor, center_y);
    }
}

pub trait Scalable3d: Scalable2d {
    fn scale_z(&mut self, factor: f32, center_z: f32);
}

/// In-plane rotation (radians) about a point
pub trait Rotatable2d {
    fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32);
}

/// Out-of-plane rotations. Pitch turns about the x axis, roll about the y axis.
pub trait Rotatable3d: Rotatable2d {
    fn pitch(&mut self, angle: f32, center: Point3);
    fn roll(&mut self, angle: f32, center: Point3);
}

pub fn pack_type_user(type_id: u16, user_id: u16) -> u32 {
    ((type_id as u32) << 16) | user_id as u32
}

pub fn unpack_type_user(packed: u32) -> (u16, u16) {
    ((packed >> 16) as u16, (packed & 0xffff) as u16)
}

/// Wrap an angle into `[0, 2π)`
pub fn normalize_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

pub(crate) fn move_points<'a>(points: impl Iterator<Item = &'a mut Point2>, dx: f32, dy: f32) {
    for p in points {
        p.x += dx;
        p.y += dy;
    }
}

pub(crate) fn scale_points<'a>(
    points: impl Iterator<Item = &'a mut Point2>,
    fx: f32,
    cx: f32,
    fy: f32,
    cy: f32,
) {
    for p in points {
        p.x = scale_about(p.x, fx, cx);
        p.y = scale_about(p.y, fy, cy);
    }
}

pub(crate) fn rotate_points<'a>(
    points: impl Iterator<Item = &'a mut Point2>,
    angle: f32,
    cx: f32,
    cy: f32,
) {
    for p in points {
        (p.x, p.y) = rotate_about(p.x, p.y, angle, cx, cy);
    }
}

/// Pitch a 3D point about `center` (rotation in the y/z plane)
pub(crate) fn pitch_point(p: &mut Point3, angle: f32, center: Point3) {
    (p.y, p.z) = rotate_about(p.y, p.z, angle, center.y, center.z);
}

/// Roll a 3D point about `center` (rotation in the x/z plane)
pub(crate) fn roll_point(p: &mut Point3, angle: f32, center: Point3) {
    (p.x, p.z) = rotate_about(p.x, p.z, angle, center.x, center.z);
}

/// Implements [`HasSessionId`] for structs with a plain `session_id` field
macro_rules! impl_session_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::messages::traits::HasSessionId for $ty {
                fn session_id(&self) -> $crate::ids::SessionId {
                    self.session_id
                }

                fn set_session_id(&mut self, id: $crate::ids::SessionId) {
                    self.session_id = id;
                }
            }
        )*
    };
}

/// Implements [`HasComponentId`] and [`HasTypeUser`] for entity structs
macro_rules! impl_component_type_user {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::messages::traits::HasComponentId for $ty {
                fn component_id(&self) -> u32 {
                    self.component_id
                }

                fn set_component_id(&mut self, id: u32) {
                    self.component_id = id;
                }
            }

            impl $crate::messages::traits::HasTypeUser for $ty {
                fn type_id(&self) -> u16 {
                    self.type_id
                }

                fn user_id(&self) -> u16 {
                    self.user_id
                }

                fn set_type_user(&mut self, type_id: u16, user_id: u16) {
                    self.type_id = type_id;
                    self.user_id = user_id;
                }
            }
        )*
    };
}

pub(crate) use impl_component_type_user;
pub(crate) use impl_session_id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_user_packing() {
        let packed = pack_type_user(0x0102, 0x0304);
        assert_eq!(packed, 0x0102_0304);
        assert_eq!(unpack_type_user(packed), (0x0102, 0x0304));
    }

    #[test]
    fn test_normalize_angle() {
        let a = normalize_angle(-std::f32::consts::FRAC_PI_2);
        assert!((a - 3.0 * std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_point() {
        let mut p = Point3::new(0.0, 1.0, 0.0);
        pitch_point(&mut p, std::f32::consts::FRAC_PI_2, Point3::default());
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - 1.0).abs() < 1e-6);
    }
}
