//! TUIO Core
//!
//! Message, bundle and topology primitives for TUIO 2.0.
//!
//! This crate provides:
//! - The message catalog ([`Message`], [`messages`]) with bit-exact OSC
//!   encoding per message type ([`OscCodec`])
//! - Shared bundles and bundle stacks ([`Bundle`], [`BundleStack`])
//! - Session and frame id lifecycle ([`SessionManager`], [`FrameManager`])
//! - A directed multigraph with topology detection ([`Graph`])
//! - Address-keyed decoding of wire messages ([`ConvertorRegistry`])

pub mod bundle;
pub mod codec;
pub mod convert;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod ids;
pub mod messages;
pub mod time;

pub use bundle::{Bundle, BundleStack, OLDEST};
pub use codec::{ArgReader, OscCodec};
pub use convert::{Convertor, ConvertorRegistry};
pub use error::{Error, Result, Topology};
pub use geometry::{containment_in_bundle, Point2, Point3};
pub use graph::{DfsStep, Edge, EdgeId, Graph, NodeId};
pub use ids::{
    FrameId, FrameManager, SessionId, SessionManager, OUT_OF_ORDER_FRAME_ID, UNUSED_SESSION_ID,
};
pub use messages::{Message, MessageKind, TypedMessage};
pub use time::Timetag;

/// Default TUIO UDP port
pub const DEFAULT_UDP_PORT: u16 = 3333;

/// OSC address prefix shared by every TUIO 2.0 message
pub const TUIO2_PREFIX: &str = "/tuio2/";
