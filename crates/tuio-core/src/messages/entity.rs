//! Component messages: pointers, tokens, bounds and symbols
//!
//! ```text
//! /tuio2/ptr  s_id tu_id c_id x y angle shear radius press [x_vel y_vel p_vel m_acc p_acc]
//! /tuio2/tok  s_id tu_id c_id x y angle                    [x_vel y_vel a_vel m_acc r_acc]
//! /tuio2/bnd  s_id x y angle width height area             [x_vel y_vel a_vel m_acc r_acc]
//! /tuio2/sym  s_id tu_id c_id group data
//! /tuio2/p3d  s_id tu_id c_id x y z x_ax y_ax z_ax radius        [x_vel y_vel z_vel r_vel m_acc r_acc]
//! /tuio2/t3d  s_id tu_id c_id x y z angle x_ax y_ax z_ax         [x_vel y_vel z_vel a_vel m_acc r_acc]
//! /tuio2/b3d  s_id x y z angle x_ax y_ax z_ax width height depth volume [x_vel ... r_acc]
//! ```

use std::fmt;

use rosc::OscType;

use crate::codec::{uint_arg, ArgReader, OscCodec};
use crate::geometry::{rotate_about, scale_about, Point3};
use crate::ids::SessionId;
use crate::messages::traits::{
    impl_component_type_user, impl_session_id, normalize_angle, pack_type_user, pitch_point,
    roll_point, unpack_type_user, Movable2d, Movable3d, Rotatable2d, Rotatable3d, Scalable2d,
    Scalable3d,
};

/// Optional 2D velocity/acceleration tail.
///
/// For pointers `a_vel`/`r_acc` carry pressure velocity and acceleration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion2d {
    pub x_vel: f32,
    pub y_vel: f32,
    pub a_vel: f32,
    pub m_acc: f32,
    pub r_acc: f32,
}

impl Motion2d {
    const ARGS: usize = 5;

    fn push_args(&self, args: &mut Vec<OscType>) {
        args.extend(
            [self.x_vel, self.y_vel, self.a_vel, self.m_acc, self.r_acc].map(OscType::Float),
        );
    }

    fn read(r: &mut ArgReader<'_>) -> Option<Option<Self>> {
        match r.remaining() {
            0 => Some(None),
            Self::ARGS => Some(Some(Self {
                x_vel: r.float()?,
                y_vel: r.float()?,
                a_vel: r.float()?,
                m_acc: r.float()?,
                r_acc: r.float()?,
            })),
            _ => None,
        }
    }
}

/// Optional 3D velocity/acceleration tail
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion3d {
    pub x_vel: f32,
    pub y_vel: f32,
    pub z_vel: f32,
    pub a_vel: f32,
    pub m_acc: f32,
    pub r_acc: f32,
}

impl Motion3d {
    const ARGS: usize = 6;

    fn push_args(&self, args: &mut Vec<OscType>) {
        args.extend(
            [
                self.x_vel, self.y_vel, self.z_vel, self.a_vel, self.m_acc, self.r_acc,
            ]
            .map(OscType::Float),
        );
    }

    fn read(r: &mut ArgReader<'_>) -> Option<Option<Self>> {
        match r.remaining() {
            0 => Some(None),
            Self::ARGS => Some(Some(Self {
                x_vel: r.float()?,
                y_vel: r.float()?,
                z_vel: r.float()?,
                a_vel: r.float()?,
                m_acc: r.float()?,
                r_acc: r.float()?,
            })),
            _ => None,
        }
    }
}

fn read_type_user(r: &mut ArgReader<'_>) -> Option<(u16, u16)> {
    r.uint().map(unpack_type_user)
}

/// `/tuio2/ptr`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pointer {
    pub session_id: SessionId,
    pub type_id: u16,
    pub user_id: u16,
    pub component_id: u32,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub shear: f32,
    pub radius: f32,
    pub pressure: f32,
    pub motion: Option<Motion2d>,
}

impl Pointer {
    pub fn new(session_id: SessionId, x: f32, y: f32) -> Self {
        Self {
            session_id,
            x,
            y,
            ..Default::default()
        }
    }
}

impl OscCodec for Pointer {
    const PATH: &'static str = "/tuio2/ptr";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![
            uint_arg(self.session_id),
            uint_arg(pack_type_user(self.type_id, self.user_id)),
            uint_arg(self.component_id),
        ];
        args.extend(
            [
                self.x,
                self.y,
                self.angle,
                self.shear,
                self.radius,
                self.pressure,
            ]
            .map(OscType::Float),
        );
        if let Some(motion) = &self.motion {
            motion.push_args(&mut args);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let (type_id, user_id) = read_type_user(&mut r)?;
        let msg = Self {
            session_id,
            type_id,
            user_id,
            component_id: r.uint()?,
            x: r.float()?,
            y: r.float()?,
            angle: r.float()?,
            shear: r.float()?,
            radius: r.float()?,
            pressure: r.float()?,
            motion: Motion2d::read(&mut r)?,
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} tu=({},{}) c_id={} pos=({}, {}) angle={} shear={} radius={} press={}",
            Self::PATH,
            self.session_id,
            self.type_id,
            self.user_id,
            self.component_id,
            self.x,
            self.y,
            self.angle,
            self.shear,
            self.radius,
            self.pressure
        )
    }
}

/// `/tuio2/tok`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token {
    pub session_id: SessionId,
    pub type_id: u16,
    pub user_id: u16,
    pub component_id: u32,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub motion: Option<Motion2d>,
}

impl Token {
    pub fn new(session_id: SessionId, component_id: u32, x: f32, y: f32, angle: f32) -> Self {
        Self {
            session_id,
            component_id,
            x,
            y,
            angle,
            ..Default::default()
        }
    }
}

impl OscCodec for Token {
    const PATH: &'static str = "/tuio2/tok";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![
            uint_arg(self.session_id),
            uint_arg(pack_type_user(self.type_id, self.user_id)),
            uint_arg(self.component_id),
            OscType::Float(self.x),
            OscType::Float(self.y),
            OscType::Float(self.angle),
        ];
        if let Some(motion) = &self.motion {
            motion.push_args(&mut args);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let (type_id, user_id) = read_type_user(&mut r)?;
        let msg = Self {
            session_id,
            type_id,
            user_id,
            component_id: r.uint()?,
            x: r.float()?,
            y: r.float()?,
            angle: r.float()?,
            motion: Motion2d::read(&mut r)?,
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} tu=({},{}) c_id={} pos=({}, {}) angle={}",
            Self::PATH,
            self.session_id,
            self.type_id,
            self.user_id,
            self.component_id,
            self.x,
            self.y,
            self.angle
        )
    }
}

/// `/tuio2/bnd`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    pub session_id: SessionId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub width: f32,
    pub height: f32,
    pub area: f32,
    pub motion: Option<Motion2d>,
}

impl OscCodec for Bounds {
    const PATH: &'static str = "/tuio2/bnd";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        args.extend(
            [
                self.x,
                self.y,
                self.angle,
                self.width,
                self.height,
                self.area,
            ]
            .map(OscType::Float),
        );
        if let Some(motion) = &self.motion {
            motion.push_args(&mut args);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let msg = Self {
            session_id: r.uint()?,
            x: r.float()?,
            y: r.float()?,
            angle: r.float()?,
            width: r.float()?,
            height: r.float()?,
            area: r.float()?,
            motion: Motion2d::read(&mut r)?,
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} pos=({}, {}) angle={} size={}x{} area={}",
            Self::PATH,
            self.session_id,
            self.x,
            self.y,
            self.angle,
            self.width,
            self.height,
            self.area
        )
    }
}

/// `/tuio2/sym`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Symbol {
    pub session_id: SessionId,
    pub type_id: u16,
    pub user_id: u16,
    pub component_id: u32,
    /// Symbol family, e.g. `fidtrk/18` or `qr/url`
    pub group: String,
    pub data: String,
}

impl OscCodec for Symbol {
    const PATH: &'static str = "/tuio2/sym";

    fn to_args(&self) -> Vec<OscType> {
        vec![
            uint_arg(self.session_id),
            uint_arg(pack_type_user(self.type_id, self.user_id)),
            uint_arg(self.component_id),
            OscType::String(self.group.clone()),
            OscType::String(self.data.clone()),
        ]
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let (type_id, user_id) = read_type_user(&mut r)?;
        let msg = Self {
            session_id,
            type_id,
            user_id,
            component_id: r.uint()?,
            group: r.string()?.to_string(),
            data: r.string()?.to_string(),
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} tu=({},{}) c_id={} group={} data={}",
            Self::PATH,
            self.session_id,
            self.type_id,
            self.user_id,
            self.component_id,
            self.group,
            self.data
        )
    }
}

/// `/tuio2/p3d`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pointer3d {
    pub session_id: SessionId,
    pub type_id: u16,
    pub user_id: u16,
    pub component_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Pointing direction
    pub axis: Point3,
    pub radius: f32,
    pub motion: Option<Motion3d>,
}

impl OscCodec for Pointer3d {
    const PATH: &'static str = "/tuio2/p3d";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![
            uint_arg(self.session_id),
            uint_arg(pack_type_user(self.type_id, self.user_id)),
            uint_arg(self.component_id),
        ];
        args.extend(
            [
                self.x,
                self.y,
                self.z,
                self.axis.x,
                self.axis.y,
                self.axis.z,
                self.radius,
            ]
            .map(OscType::Float),
        );
        if let Some(motion) = &self.motion {
            motion.push_args(&mut args);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let (type_id, user_id) = read_type_user(&mut r)?;
        let msg = Self {
            session_id,
            type_id,
            user_id,
            component_id: r.uint()?,
            x: r.float()?,
            y: r.float()?,
            z: r.float()?,
            axis: Point3::new(r.float()?, r.float()?, r.float()?),
            radius: r.float()?,
            motion: Motion3d::read(&mut r)?,
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Pointer3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} tu=({},{}) c_id={} pos=({}, {}, {}) axis={} radius={}",
            Self::PATH,
            self.session_id,
            self.type_id,
            self.user_id,
            self.component_id,
            self.x,
            self.y,
            self.z,
            self.axis,
            self.radius
        )
    }
}

/// `/tuio2/t3d`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Token3d {
    pub session_id: SessionId,
    pub type_id: u16,
    pub user_id: u16,
    pub component_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation about `axis`
    pub angle: f32,
    pub axis: Point3,
    pub motion: Option<Motion3d>,
}

impl OscCodec for Token3d {
    const PATH: &'static str = "/tuio2/t3d";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![
            uint_arg(self.session_id),
            uint_arg(pack_type_user(self.type_id, self.user_id)),
            uint_arg(self.component_id),
        ];
        args.extend(
            [
                self.x,
                self.y,
                self.z,
                self.angle,
                self.axis.x,
                self.axis.y,
                self.axis.z,
            ]
            .map(OscType::Float),
        );
        if let Some(motion) = &self.motion {
            motion.push_args(&mut args);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let session_id = r.uint()?;
        let (type_id, user_id) = read_type_user(&mut r)?;
        let msg = Self {
            session_id,
            type_id,
            user_id,
            component_id: r.uint()?,
            x: r.float()?,
            y: r.float()?,
            z: r.float()?,
            angle: r.float()?,
            axis: Point3::new(r.float()?, r.float()?, r.float()?),
            motion: Motion3d::read(&mut r)?,
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Token3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} tu=({},{}) c_id={} pos=({}, {}, {}) angle={} axis={}",
            Self::PATH,
            self.session_id,
            self.type_id,
            self.user_id,
            self.component_id,
            self.x,
            self.y,
            self.z,
            self.angle,
            self.axis
        )
    }
}

/// `/tuio2/b3d`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds3d {
    pub session_id: SessionId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub angle: f32,
    pub axis: Point3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub volume: f32,
    pub motion: Option<Motion3d>,
}

impl OscCodec for Bounds3d {
    const PATH: &'static str = "/tuio2/b3d";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.session_id)];
        args.extend(
            [
                self.x,
                self.y,
                self.z,
                self.angle,
                self.axis.x,
                self.axis.y,
                self.axis.z,
                self.width,
                self.height,
                self.depth,
                self.volume,
            ]
            .map(OscType::Float),
        );
        if let Some(motion) = &self.motion {
            motion.push_args(&mut args);
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let msg = Self {
            session_id: r.uint()?,
            x: r.float()?,
            y: r.float()?,
            z: r.float()?,
            angle: r.float()?,
            axis: Point3::new(r.float()?, r.float()?, r.float()?),
            width: r.float()?,
            height: r.float()?,
            depth: r.float()?,
            volume: r.float()?,
            motion: Motion3d::read(&mut r)?,
        };
        r.finish()?;
        Some(msg)
    }
}

impl fmt::Display for Bounds3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} s_id={} pos=({}, {}, {}) angle={} axis={} size={}x{}x{} volume={}",
            Self::PATH,
            self.session_id,
            self.x,
            self.y,
            self.z,
            self.angle,
            self.axis,
            self.width,
            self.height,
            self.depth,
            self.volume
        )
    }
}

impl_session_id!(Pointer, Token, Bounds, Symbol, Pointer3d, Token3d, Bounds3d);
impl_component_type_user!(Pointer, Token, Symbol, Pointer3d, Token3d);

/// Movable/scalable for structs with plain `x`/`y` (and optionally `z`)
macro_rules! impl_position_transforms {
    ($($ty:ty),*) => {
        $(
            impl Movable2d for $ty {
                fn move_x(&mut self, dx: f32) {
                    self.x += dx;
                }

                fn move_y(&mut self, dy: f32) {
                    self.y += dy;
                }
            }
        )*
    };
}

impl_position_transforms!(Pointer, Token, Bounds, Pointer3d, Token3d, Bounds3d);

macro_rules! impl_move_z {
    ($($ty:ty),*) => {
        $(
            impl Movable3d for $ty {
                fn move_z(&mut self, dz: f32) {
                    self.z += dz;
                }
            }
        )*
    };
}

impl_move_z!(Pointer3d, Token3d, Bounds3d);

impl Scalable2d for Pointer {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        self.x = scale_about(self.x, factor, center_x);
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        self.y = scale_about(self.y, factor, center_y);
    }

    fn scale(&mut self, factor: f32, center_x: f32, center_y: f32) {
        self.scale_x(factor, center_x);
        self.scale_y(factor, center_y);
        self.radius *= factor;
    }
}

impl Scalable2d for Token {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        self.x = scale_about(self.x, factor, center_x);
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        self.y = scale_about(self.y, factor, center_y);
    }
}

impl Scalable2d for Bounds {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        self.x = scale_about(self.x, factor, center_x);
        self.width *= factor;
        self.area *= factor;
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        self.y = scale_about(self.y, factor, center_y);
        self.height *= factor;
        self.area *= factor;
    }
}

impl Scalable2d for Bounds3d {
    fn scale_x(&mut self, factor: f32, center_x: f32) {
        self.x = scale_about(self.x, factor, center_x);
        self.width *= factor;
        self.volume *= factor;
    }

    fn scale_y(&mut self, factor: f32, center_y: f32) {
        self.y = scale_about(self.y, factor, center_y);
        self.height *= factor;
        self.volume *= factor;
    }
}

impl Scalable3d for Bounds3d {
    fn scale_z(&mut self, factor: f32, center_z: f32) {
        self.z = scale_about(self.z, factor, center_z);
        self.depth *= factor;
        self.volume *= factor;
    }
}

macro_rules! impl_scale_3d_position {
    ($($ty:ty),*) => {
        $(
            impl Scalable2d for $ty {
                fn scale_x(&mut self, factor: f32, center_x: f32) {
                    self.x = scale_about(self.x, factor, center_x);
                }

                fn scale_y(&mut self, factor: f32, center_y: f32) {
                    self.y = scale_about(self.y, factor, center_y);
                }
            }

            impl Scalable3d for $ty {
                fn scale_z(&mut self, factor: f32, center_z: f32) {
                    self.z = scale_about(self.z, factor, center_z);
                }
            }
        )*
    };
}

impl_scale_3d_position!(Pointer3d, Token3d);

/// Rotate position about the center and turn the orientation by `angle`
macro_rules! impl_rotate_2d {
    ($($ty:ty),*) => {
        $(
            impl Rotatable2d for $ty {
                fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32) {
                    (self.x, self.y) = rotate_about(self.x, self.y, angle, center_x, center_y);
                    self.angle = normalize_angle(self.angle + angle);
                }
            }
        )*
    };
}

impl_rotate_2d!(Pointer, Token, Bounds);

/// 3D entities yaw their position and axis about z; the angle about the
/// axis is unchanged.
macro_rules! impl_rotate_3d {
    ($($ty:ty),*) => {
        $(
            impl Rotatable2d for $ty {
                fn rotate_by(&mut self, angle: f32, center_x: f32, center_y: f32) {
                    (self.x, self.y) = rotate_about(self.x, self.y, angle, center_x, center_y);
                    (self.axis.x, self.axis.y) =
                        rotate_about(self.axis.x, self.axis.y, angle, 0.0, 0.0);
                }
            }

            impl Rotatable3d for $ty {
                fn pitch(&mut self, angle: f32, center: Point3) {
                    let mut position = Point3::new(self.x, self.y, self.z);
                    pitch_point(&mut position, angle, center);
                    (self.x, self.y, self.z) = (position.x, position.y, position.z);
                    pitch_point(&mut self.axis, angle, Point3::default());
                }

                fn roll(&mut self, angle: f32, center: Point3) {
                    let mut position = Point3::new(self.x, self.y, self.z);
                    roll_point(&mut position, angle, center);
                    (self.x, self.y, self.z) = (position.x, position.y, position.z);
                    roll_point(&mut self.axis, angle, Point3::default());
                }
            }
        )*
    };
}

impl_rotate_3d!(Pointer3d, Token3d, Bounds3d);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::typetag;
    use crate::messages::traits::HasTypeUser;

    #[test]
    fn test_pointer_short_and_motion_forms() {
        let mut ptr = Pointer::new(7, 0.25, 0.75);
        ptr.set_type_user(2, 9);
        ptr.pressure = 0.5;
        let msg = ptr.to_osc();
        assert_eq!(typetag(&msg.args), "iiiffffff");
        assert_eq!(Pointer::parse(&msg), Some(ptr.clone()));

        ptr.motion = Some(Motion2d {
            x_vel: 0.1,
            ..Default::default()
        });
        let msg = ptr.to_osc();
        assert_eq!(typetag(&msg.args), "iiifffffffffff");
        assert_eq!(Pointer::parse(&msg), Some(ptr));
    }

    #[test]
    fn test_pointer_rejects_truncated_motion() {
        let mut args = Pointer::new(1, 0.0, 0.0).to_args();
        args.push(OscType::Float(1.0));
        assert!(Pointer::from_args(&args).is_none());
    }

    #[test]
    fn test_token_path_mismatch() {
        let mut msg = Token::new(3, 12, 0.5, 0.5, 0.0).to_osc();
        msg.addr = "/tuio2/ptr".to_string();
        assert!(Token::parse(&msg).is_none());
    }

    #[test]
    fn test_token_rotation() {
        let mut tok = Token::new(3, 12, 1.0, 0.5, 0.0);
        tok.rotate_by(std::f32::consts::PI, 0.5, 0.5);
        assert!((tok.x - 0.0).abs() < 1e-6);
        assert!((tok.y - 0.5).abs() < 1e-6);
        assert!((tok.angle - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_scale_x() {
        let mut bnd = Bounds {
            session_id: 1,
            x: 0.6,
            y: 0.5,
            width: 0.2,
            height: 0.1,
            area: 0.02,
            ..Default::default()
        };
        bnd.scale_x(2.0, 0.5);
        assert!((bnd.x - 0.7).abs() < 1e-6);
        assert!((bnd.width - 0.4).abs() < 1e-6);
        assert_eq!(bnd.height, 0.1);
    }

    #[test]
    fn test_token3d_pitch_moves_axis() {
        let mut tok = Token3d {
            session_id: 4,
            y: 1.0,
            axis: Point3::new(0.0, 1.0, 0.0),
            ..Default::default()
        };
        tok.pitch(std::f32::consts::FRAC_PI_2, Point3::default());
        assert!(tok.y.abs() < 1e-6);
        assert!((tok.z - 1.0).abs() < 1e-6);
        assert!((tok.axis.z - 1.0).abs() < 1e-6);
        let msg = tok.to_osc();
        assert_eq!(Token3d::parse(&msg), Some(tok));
    }

    #[test]
    fn test_symbol_roundtrip() {
        let sym = Symbol {
            session_id: 5,
            component_id: 18,
            group: "fidtrk/18".to_string(),
            data: "0122212221221221111".to_string(),
            ..Default::default()
        };
        let msg = sym.to_osc();
        assert_eq!(typetag(&msg.args), "iiiss");
        assert_eq!(Symbol::parse(&msg), Some(sym));
    }
}
