//! TUIO 2.0 message catalog
//!
//! Each wire message has its own struct implementing [`OscCodec`] plus the
//! capability traits that apply to it. [`Message`] is the closed sum of all
//! of them, with [`GenericMessage`] carrying anything the catalog does not
//! recognise.

pub mod association;
pub mod content;
pub mod entity;
pub mod frame;
pub mod geometry;
pub mod skeleton;
pub mod traits;

use std::fmt;

use rosc::{OscBundle, OscMessage, OscPacket};

use crate::codec::OscCodec;
use crate::ids::SessionId;

pub use association::{
    AliveAssociation, ContainerAssociation, LinkAssociation, LinkGraph, LinkPorts,
    LinkedListAssociation, LinkedTreeAssociation,
};
pub use content::{Control, Data, DataPayload, GenericMessage, Raw, Signal};
pub use entity::{Bounds, Bounds3d, Motion2d, Motion3d, Pointer, Pointer3d, Symbol, Token, Token3d};
pub use frame::{AliveMessage, FrameMessage};
pub use geometry::{Area, ConvexHull, InnerContour, OuterContour, SkeletonVolume, Span};
pub use skeleton::{Skeleton, Skeleton2d, Skeleton3d, SkeletonGraph, SkeletonPoint};
pub use traits::{
    HasComponentId, HasSessionId, HasTypeUser, Movable2d, Movable3d, Rotatable2d, Rotatable3d,
    Scalable2d, Scalable3d,
};

/// Catalog member that can be looked up inside a [`Message`]
pub trait TypedMessage: OscCodec + Into<Message> {
    const KIND: MessageKind;

    fn from_message(message: &Message) -> Option<&Self>;

    fn from_message_mut(message: &mut Message) -> Option<&mut Self>;
}

macro_rules! catalog {
    (
        session { $($sv:ident($sty:ty)),* $(,)? }
        plain { $($pv:ident($pty:ty)),* $(,)? }
    ) => {
        /// Any catalog message
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            $($sv($sty),)*
            $($pv($pty),)*
            /// Unrecognised address, kept verbatim
            Generic(GenericMessage),
        }

        /// Variant tag of a [`Message`]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageKind {
            $($sv,)*
            $($pv,)*
            Generic,
        }

        impl Message {
            pub fn kind(&self) -> MessageKind {
                match self {
                    $(Message::$sv(_) => MessageKind::$sv,)*
                    $(Message::$pv(_) => MessageKind::$pv,)*
                    Message::Generic(_) => MessageKind::Generic,
                }
            }

            /// OSC address this message is written to
            pub fn path(&self) -> &str {
                match self {
                    $(Message::$sv(_) => <$sty as OscCodec>::PATH,)*
                    $(Message::$pv(_) => <$pty as OscCodec>::PATH,)*
                    Message::Generic(m) => &m.path,
                }
            }

            pub fn to_osc(&self) -> OscMessage {
                match self {
                    $(Message::$sv(m) => m.to_osc(),)*
                    $(Message::$pv(m) => m.to_osc(),)*
                    Message::Generic(m) => m.to_osc(),
                }
            }

            /// Session id for variants that carry one
            pub fn session_id(&self) -> Option<SessionId> {
                match self {
                    $(Message::$sv(m) => Some(m.session_id()),)*
                    _ => None,
                }
            }

            pub fn as_session_mut(&mut self) -> Option<&mut dyn HasSessionId> {
                match self {
                    $(Message::$sv(m) => Some(m),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for Message {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Message::$sv(m) => fmt::Display::fmt(m, f),)*
                    $(Message::$pv(m) => fmt::Display::fmt(m, f),)*
                    Message::Generic(m) => fmt::Display::fmt(m, f),
                }
            }
        }

        $(
            impl From<$sty> for Message {
                fn from(m: $sty) -> Self {
                    Message::$sv(m)
                }
            }

            impl TypedMessage for $sty {
                const KIND: MessageKind = MessageKind::$sv;

                fn from_message(message: &Message) -> Option<&Self> {
                    match message {
                        Message::$sv(m) => Some(m),
                        _ => None,
                    }
                }

                fn from_message_mut(message: &mut Message) -> Option<&mut Self> {
                    match message {
                        Message::$sv(m) => Some(m),
                        _ => None,
                    }
                }
            }
        )*

        $(
            impl From<$pty> for Message {
                fn from(m: $pty) -> Self {
                    Message::$pv(m)
                }
            }

            impl TypedMessage for $pty {
                const KIND: MessageKind = MessageKind::$pv;

                fn from_message(message: &Message) -> Option<&Self> {
                    match message {
                        Message::$pv(m) => Some(m),
                        _ => None,
                    }
                }

                fn from_message_mut(message: &mut Message) -> Option<&mut Self> {
                    match message {
                        Message::$pv(m) => Some(m),
                        _ => None,
                    }
                }
            }
        )*
    };
}

catalog! {
    session {
        Pointer(Pointer),
        Token(Token),
        Bounds(Bounds),
        Symbol(Symbol),
        Pointer3d(Pointer3d),
        Token3d(Token3d),
        Bounds3d(Bounds3d),
        Control(Control),
        Data(Data),
        Signal(Signal),
        Raw(Raw),
        ConvexHull(ConvexHull),
        OuterContour(OuterContour),
        InnerContour(InnerContour),
        Skeleton(Skeleton2d),
        Skeleton3d(Skeleton3d),
        SkeletonVolume(SkeletonVolume),
        Area(Area),
        ContainerAssociation(ContainerAssociation),
        LinkAssociation(LinkAssociation),
        LinkedListAssociation(LinkedListAssociation),
        LinkedTreeAssociation(LinkedTreeAssociation),
    }
    plain {
        Frame(FrameMessage),
        Alive(AliveMessage),
        AliveAssociation(AliveAssociation),
    }
}

impl From<GenericMessage> for Message {
    fn from(m: GenericMessage) -> Self {
        Message::Generic(m)
    }
}

impl Message {
    /// Append this message to an outbound wire bundle
    pub fn imprint(&self, target: &mut OscBundle) {
        target.content.push(OscPacket::Message(self.to_osc()));
    }

    pub fn is_frame(&self) -> bool {
        matches!(self, Message::Frame(_))
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, Message::Alive(_))
    }

    pub fn as_movable_mut(&mut self) -> Option<&mut dyn Movable2d> {
        match self {
            Message::Pointer(m) => Some(m),
            Message::Token(m) => Some(m),
            Message::Bounds(m) => Some(m),
            Message::Pointer3d(m) => Some(m),
            Message::Token3d(m) => Some(m),
            Message::Bounds3d(m) => Some(m),
            Message::ConvexHull(m) => Some(m),
            Message::OuterContour(m) => Some(m),
            Message::InnerContour(m) => Some(m),
            Message::Skeleton(m) => Some(m),
            Message::Skeleton3d(m) => Some(m),
            Message::Area(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalable_mut(&mut self) -> Option<&mut dyn Scalable2d> {
        match self {
            Message::Pointer(m) => Some(m),
            Message::Token(m) => Some(m),
            Message::Bounds(m) => Some(m),
            Message::Pointer3d(m) => Some(m),
            Message::Token3d(m) => Some(m),
            Message::Bounds3d(m) => Some(m),
            Message::ConvexHull(m) => Some(m),
            Message::OuterContour(m) => Some(m),
            Message::InnerContour(m) => Some(m),
            Message::Skeleton(m) => Some(m),
            Message::Skeleton3d(m) => Some(m),
            Message::Area(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_rotatable_mut(&mut self) -> Option<&mut dyn Rotatable2d> {
        match self {
            Message::Pointer(m) => Some(m),
            Message::Token(m) => Some(m),
            Message::Bounds(m) => Some(m),
            Message::Pointer3d(m) => Some(m),
            Message::Token3d(m) => Some(m),
            Message::Bounds3d(m) => Some(m),
            Message::ConvexHull(m) => Some(m),
            Message::OuterContour(m) => Some(m),
            Message::InnerContour(m) => Some(m),
            Message::Skeleton(m) => Some(m),
            Message::Skeleton3d(m) => Some(m),
            _ => None,
        }
    }
}
