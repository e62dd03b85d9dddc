//! Frame and alive messages
//!
//! Every TUIO bundle opens with exactly one `/tuio2/frm` and closes with
//! exactly one `/tuio2/alv`.
//!
//! ```text
//! /tuio2/frm  ,it       frame_id timetag
//! /tuio2/frm  ,itsiii   frame_id timetag app_name ipv4 instance (width<<16 | height)
//! /tuio2/alv  ,i*       session_id...
//! ```

use std::fmt;
use std::net::Ipv4Addr;

use rosc::OscType;

use crate::codec::{uint_arg, ArgReader, OscCodec};
use crate::ids::{FrameId, SessionId};
use crate::time::Timetag;

/// `/tuio2/frm`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameMessage {
    pub frame_id: FrameId,
    pub time: Timetag,
    pub app_name: String,
    /// Source IPv4 address in host byte order
    pub address: u32,
    pub instance_id: u32,
    pub width: u16,
    pub height: u16,
}

impl FrameMessage {
    pub fn new(frame_id: FrameId, time: Timetag) -> Self {
        Self {
            frame_id,
            time,
            ..Default::default()
        }
    }

    pub fn with_source(mut self, app_name: &str, address: Ipv4Addr, instance_id: u32) -> Self {
        self.app_name = app_name.to_string();
        self.address = address.into();
        self.instance_id = instance_id;
        self
    }

    pub fn with_dimension(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn source_address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Width in the upper 16 bits, height in the lower 16
    pub fn packed_dimension(&self) -> u32 {
        ((self.width as u32) << 16) | self.height as u32
    }

    /// Whether the source/dimension tail goes on the wire
    pub fn is_extended(&self) -> bool {
        !self.app_name.is_empty()
            || self.address != 0
            || self.instance_id != 0
            || self.packed_dimension() != 0
    }
}

impl OscCodec for FrameMessage {
    const PATH: &'static str = "/tuio2/frm";

    fn to_args(&self) -> Vec<OscType> {
        let mut args = vec![uint_arg(self.frame_id), OscType::Time(self.time.into())];
        if self.is_extended() {
            args.push(OscType::String(self.app_name.clone()));
            args.push(uint_arg(self.address));
            args.push(uint_arg(self.instance_id));
            args.push(uint_arg(self.packed_dimension()));
        }
        args
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        let mut r = ArgReader::new(args);
        let mut frame = FrameMessage::new(r.uint()?, r.time()?);
        if !r.is_empty() {
            frame.app_name = r.string()?.to_string();
            frame.address = r.uint()?;
            frame.instance_id = r.uint()?;
            let dim = r.uint()?;
            frame.width = (dim >> 16) as u16;
            frame.height = (dim & 0xffff) as u16;
        }
        r.finish()?;
        Some(frame)
    }
}

impl fmt::Display for FrameMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id={} time={}", Self::PATH, self.frame_id, self.time)?;
        if self.is_extended() {
            write!(
                f,
                " source={}@{}:{} dim={}x{}",
                self.app_name,
                self.source_address(),
                self.instance_id,
                self.width,
                self.height
            )?;
        }
        Ok(())
    }
}

/// `/tuio2/alv`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliveMessage {
    pub session_ids: Vec<SessionId>,
}

impl AliveMessage {
    pub fn new(session_ids: Vec<SessionId>) -> Self {
        Self { session_ids }
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.session_ids.contains(&id)
    }
}

impl OscCodec for AliveMessage {
    const PATH: &'static str = "/tuio2/alv";

    fn to_args(&self) -> Vec<OscType> {
        self.session_ids.iter().map(|id| uint_arg(*id)).collect()
    }

    fn from_args(args: &[OscType]) -> Option<Self> {
        ArgReader::new(args).rest_uints().map(Self::new)
    }
}

impl fmt::Display for AliveMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", Self::PATH, self.session_ids)
    }
}
