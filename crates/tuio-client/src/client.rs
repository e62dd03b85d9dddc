//! OSC client
//!
//! Pulls packets off a [`Transport`], decodes them through a
//! [`ConvertorRegistry`] and assembles `frm … alv` sequences into bundles.
//! Each [`OscClient::load`] cycle starts from an empty stack; listeners are
//! notified synchronously once the cycle has gathered at least one bundle.

use std::time::Duration;

use rosc::OscPacket;
use tracing::{debug, trace, warn};
use tuio_core::{
    Bundle, BundleStack, ConvertorRegistry, FrameId, Message, OUT_OF_ORDER_FRAME_ID,
};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::listener::{BundleSource, ListenerSet};
use crate::transport::{Transport, UdpTransport};

pub struct OscClient<T: Transport> {
    transport: T,
    registry: ConvertorRegistry,
    accept_unknown: bool,
    stack: BundleStack,
    listeners: ListenerSet,
    /// Bundle under assembly, opened by a frame message
    pending: Option<Bundle>,
    last_frame_id: FrameId,
}

impl OscClient<UdpTransport> {
    /// Listen on the configured UDP address
    pub fn udp(config: &ClientConfig) -> Result<Self> {
        let transport = UdpTransport::bind_with_size(&config.bind_addr, config.max_packet_size)?;
        Ok(Self::from_config(transport, config))
    }
}

impl<T: Transport> OscClient<T> {
    /// Client decoding every catalog message and dropping unknown addresses
    pub fn new(transport: T) -> Self {
        Self::with_registry(transport, ConvertorRegistry::with_defaults(), false)
    }

    pub fn from_config(transport: T, config: &ClientConfig) -> Self {
        Self::with_registry(transport, config.registry(), config.accept_unknown)
    }

    pub fn with_registry(transport: T, registry: ConvertorRegistry, accept_unknown: bool) -> Self {
        Self {
            transport,
            registry,
            accept_unknown,
            stack: BundleStack::new(),
            listeners: ListenerSet::new(),
            pending: None,
            last_frame_id: OUT_OF_ORDER_FRAME_ID,
        }
    }

    pub fn registry(&self) -> &ConvertorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConvertorRegistry {
        &mut self.registry
    }

    pub fn set_accept_unknown(&mut self, accept: bool) {
        self.accept_unknown = accept;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Direct access for consuming bundles with `get_update`
    pub fn stack_mut(&mut self) -> &mut BundleStack {
        &mut self.stack
    }

    /// Frame id of the newest accepted bundle, 0 before the first one
    pub fn last_frame_id(&self) -> FrameId {
        self.last_frame_id
    }

    /// Run one load cycle.
    ///
    /// Purges the stack, then reads packets until `count` bundles have been
    /// accepted or the transport times out. A `count` of 0 reads until the
    /// transport times out. Packets that fail to decode are logged and
    /// skipped. Returns true, after notifying listeners, when at least one
    /// bundle was accepted.
    pub fn load(&mut self, count: usize, timeout: Option<Duration>) -> Result<bool> {
        self.purge();
        let mut loaded = 0;
        while count == 0 || loaded < count {
            let Some(packet) = self.transport.recv(timeout)? else {
                break;
            };
            match self.process_packet(&packet) {
                Ok(n) => loaded += n,
                Err(e) => warn!("Dropping packet of {} bytes: {}", packet.len(), e),
            }
        }

        if loaded == 0 {
            return Ok(false);
        }
        debug!("Loaded {} bundles", loaded);
        self.listeners.notify_all(&*self);
        Ok(true)
    }

    /// Decode one raw packet and push every bundle it completes.
    ///
    /// Returns how many bundles were accepted.
    pub fn process_packet(&mut self, data: &[u8]) -> Result<usize> {
        let messages = match ConvertorRegistry::decode_packet(data)? {
            OscPacket::Message(msg) => self
                .registry
                .decode(&msg, self.accept_unknown)
                .into_iter()
                .collect(),
            OscPacket::Bundle(osc) => {
                let decoded = self.registry.decode_bundle(&osc, self.accept_unknown);
                let messages: Vec<Message> = decoded.messages().to_vec();
                messages
            }
        };

        let mut accepted = 0;
        for message in messages {
            if self.assemble(message) {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Feed one message into bundle assembly; true when it closed an
    /// accepted bundle
    fn assemble(&mut self, message: Message) -> bool {
        if message.is_frame() {
            if let Some(stale) = self.pending.take() {
                debug!("Discarding unterminated bundle of {} messages", stale.len());
            }
            self.pending = Some(Bundle::from_messages(vec![message]));
            return false;
        }

        let Some(bundle) = self.pending.as_ref() else {
            trace!("Dropping {} outside a frame", message.path());
            return false;
        };
        let closes = message.is_alive();
        bundle.push(message);
        if !closes {
            return false;
        }

        match self.pending.take() {
            Some(bundle) => self.accept(bundle),
            None => false,
        }
    }

    fn accept(&mut self, bundle: Bundle) -> bool {
        let frame_id = match bundle.frame() {
            Some(frame) => frame.frame_id,
            None => return false,
        };

        if frame_id != OUT_OF_ORDER_FRAME_ID {
            if !is_newer(frame_id, self.last_frame_id) {
                debug!(
                    "Dropping stale frame {} (last {})",
                    frame_id, self.last_frame_id
                );
                return false;
            }
            self.last_frame_id = frame_id;
        }

        trace!("Accepted frame {} with {} messages", frame_id, bundle.len());
        self.stack.push_back(bundle);
        true
    }
}

/// Serial-number comparison so the id sequence survives wrap-around
fn is_newer(frame_id: FrameId, last: FrameId) -> bool {
    last == OUT_OF_ORDER_FRAME_ID || (frame_id.wrapping_sub(last) as i32) > 0
}

impl<T: Transport> BundleSource for OscClient<T> {
    fn get_stack(&self) -> BundleStack {
        self.stack.clone()
    }

    fn purge(&mut self) {
        self.stack.clear();
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for OscClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscClient")
            .field("transport", &self.transport)
            .field("stack", &self.stack.len())
            .field("listeners", &self.listeners.len())
            .field("last_frame_id", &self.last_frame_id)
            .finish()
    }
}
