//! Decoding of wire messages into the catalog
//!
//! A [`ConvertorRegistry`] binds OSC addresses to decode functions. Clients
//! can disable addresses they do not care about; disabled or unknown
//! addresses either pass through as [`GenericMessage`] or are dropped.

use std::collections::BTreeMap;
use std::fmt;

use rosc::{OscBundle, OscMessage, OscPacket};
use tracing::{debug, trace};

use crate::bundle::Bundle;
use crate::messages::*;
use crate::{Error, Result};

/// Decode function for one OSC address
pub type Convertor = fn(&OscMessage) -> Option<Message>;

fn convert<T: TypedMessage>(msg: &OscMessage) -> Option<Message> {
    T::from_args(&msg.args).map(Into::into)
}

#[derive(Clone, Copy)]
struct Binding {
    convertor: Convertor,
    enabled: bool,
}

/// Address-keyed decoder table
#[derive(Clone, Default)]
pub struct ConvertorRegistry {
    bindings: BTreeMap<String, Binding>,
}

impl fmt::Debug for ConvertorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(path, b)| (path, b.enabled)))
            .finish()
    }
}

impl ConvertorRegistry {
    /// An empty registry: every address is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every catalog message bound and enabled
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind_type::<FrameMessage>();
        registry.bind_type::<AliveMessage>();
        registry.bind_type::<Pointer>();
        registry.bind_type::<Token>();
        registry.bind_type::<Bounds>();
        registry.bind_type::<Symbol>();
        registry.bind_type::<Pointer3d>();
        registry.bind_type::<Token3d>();
        registry.bind_type::<Bounds3d>();
        registry.bind_type::<Control>();
        registry.bind_type::<Data>();
        registry.bind_type::<Signal>();
        registry.bind_type::<Raw>();
        registry.bind_type::<ConvexHull>();
        registry.bind_type::<OuterContour>();
        registry.bind_type::<InnerContour>();
        registry.bind_type::<Skeleton2d>();
        registry.bind_type::<Skeleton3d>();
        registry.bind_type::<SkeletonVolume>();
        registry.bind_type::<Area>();
        registry.bind_type::<AliveAssociation>();
        registry.bind_type::<ContainerAssociation>();
        registry.bind_type::<LinkAssociation>();
        registry.bind_type::<LinkedListAssociation>();
        registry.bind_type::<LinkedTreeAssociation>();
        registry
    }

    pub fn bind(&mut self, path: &str, convertor: Convertor) {
        self.bindings.insert(
            path.to_string(),
            Binding {
                convertor,
                enabled: true,
            },
        );
    }

    pub fn bind_type<T: TypedMessage>(&mut self) {
        self.bind(T::PATH, convert::<T>);
    }

    pub fn unbind(&mut self, path: &str) -> bool {
        self.bindings.remove(path).is_some()
    }

    /// Returns false if nothing is bound at `path`
    pub fn enable(&mut self, path: &str) -> bool {
        self.set_enabled(path, true)
    }

    pub fn disable(&mut self, path: &str) -> bool {
        self.set_enabled(path, false)
    }

    fn set_enabled(&mut self, path: &str, enabled: bool) -> bool {
        match self.bindings.get_mut(path) {
            Some(binding) => {
                binding.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enable exactly the listed paths. An empty list enables everything.
    pub fn restrict_to<S: AsRef<str>>(&mut self, paths: &[S]) {
        for (path, binding) in self.bindings.iter_mut() {
            binding.enabled = paths.is_empty() || paths.iter().any(|p| p.as_ref() == path);
        }
    }

    pub fn is_enabled(&self, path: &str) -> bool {
        self.bindings.get(path).is_some_and(|b| b.enabled)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.bindings.keys().map(String::as_str)
    }

    /// Decode one message.
    ///
    /// Known addresses that fail to decode are dropped. Unknown or disabled
    /// addresses become [`GenericMessage`] when `accept_unknown` is set.
    pub fn decode(&self, msg: &OscMessage, accept_unknown: bool) -> Option<Message> {
        match self.bindings.get(&msg.addr) {
            Some(binding) if binding.enabled => {
                let decoded = (binding.convertor)(msg);
                if decoded.is_none() {
                    debug!("Malformed {} message dropped", msg.addr);
                }
                decoded
            }
            _ if accept_unknown => Some(GenericMessage::from_osc(msg).into()),
            _ => {
                trace!("Ignoring {}", msg.addr);
                None
            }
        }
    }

    /// Decode every message of an OSC bundle, flattening nested bundles,
    /// into one catalog bundle in wire order.
    pub fn decode_bundle(&self, osc: &OscBundle, accept_unknown: bool) -> Bundle {
        let bundle = Bundle::new();
        self.collect(&osc.content, accept_unknown, &bundle);
        bundle
    }

    fn collect(&self, packets: &[OscPacket], accept_unknown: bool, into: &Bundle) {
        for packet in packets {
            match packet {
                OscPacket::Message(msg) => {
                    if let Some(message) = self.decode(msg, accept_unknown) {
                        into.push(message);
                    }
                }
                OscPacket::Bundle(inner) => self.collect(&inner.content, accept_unknown, into),
            }
        }
    }

    /// Decode raw wire bytes into a packet
    pub fn decode_packet(bytes: &[u8]) -> Result<OscPacket> {
        let (_, packet) =
            rosc::decoder::decode_udp(bytes).map_err(|e| Error::Decode(format!("{:?}", e)))?;
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OscCodec;
    use crate::time::Timetag;
    use rosc::OscType;

    #[test]
    fn test_defaults_cover_catalog() {
        let registry = ConvertorRegistry::with_defaults();
        assert_eq!(registry.paths().count(), 25);
        assert!(registry.is_enabled("/tuio2/lta"));
    }

    #[test]
    fn test_decode_known_and_unknown() {
        let registry = ConvertorRegistry::with_defaults();
        let ptr = Pointer::new(3, 0.5, 0.5).to_osc();
        assert_eq!(
            registry.decode(&ptr, false),
            Some(Message::Pointer(Pointer::new(3, 0.5, 0.5)))
        );

        let vendor = OscMessage {
            addr: "/vendor/x".into(),
            args: vec![OscType::Int(1)],
        };
        assert!(registry.decode(&vendor, false).is_none());
        assert_eq!(
            registry.decode(&vendor, true).map(|m| m.kind()),
            Some(MessageKind::Generic)
        );
    }

    #[test]
    fn test_disabled_path_passes_through() {
        let mut registry = ConvertorRegistry::with_defaults();
        registry.restrict_to(&["/tuio2/frm", "/tuio2/alv"]);
        let tok = Token::new(1, 2, 0.0, 0.0, 0.0).to_osc();
        assert!(registry.decode(&tok, false).is_none());
        assert_eq!(
            registry.decode(&tok, true).map(|m| m.kind()),
            Some(MessageKind::Generic)
        );
        assert!(registry.enable("/tuio2/tok"));
        assert!(!registry.enable("/tuio2/nope"));
    }

    #[test]
    fn test_malformed_known_message_dropped() {
        let registry = ConvertorRegistry::with_defaults();
        let bad = OscMessage {
            addr: "/tuio2/alv".into(),
            args: vec![OscType::Float(1.0)],
        };
        assert!(registry.decode(&bad, true).is_none());
    }

    #[test]
    fn test_decode_bundle_bytes() {
        let source = Bundle::new();
        source.push(FrameMessage::new(9, Timetag::new(5, 0)));
        source.push(Pointer::new(3, 0.5, 0.5));
        source.push(AliveMessage::new(vec![3]));
        let bytes = source.encode().unwrap();

        let OscPacket::Bundle(osc) = ConvertorRegistry::decode_packet(&bytes).unwrap() else {
            panic!("bundle expected");
        };
        let decoded = ConvertorRegistry::with_defaults().decode_bundle(&osc, false);
        assert_eq!(decoded, source);
    }
}
