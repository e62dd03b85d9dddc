//! Bundle server
//!
//! Messages are queued with [`Server::append_clone`]; [`Server::send`] then
//! wraps them in a fresh frame and an alive message built from the session
//! registry, runs the server-side adaptor chain, checks the framing and
//! transmits the encoded bundle.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};
use tuio_core::messages::{AliveMessage, FrameMessage};
use tuio_core::{Bundle, FrameManager, Message, SessionManager, Timetag};

use crate::adaptor::BundleProcessor;
use crate::config::ServerConfig;
use crate::error::{ClientError, Result};
use crate::transport::{Transport, UdpTransport};

pub type ProcessorRef = Rc<RefCell<dyn BundleProcessor>>;

pub struct Server<T: Transport> {
    transport: T,
    paranoid: bool,
    sessions: SessionManager,
    frames: FrameManager,
    /// Source fields copied into every outgoing frame
    frame_template: FrameMessage,
    pending: Vec<Message>,
    adaptors: Vec<ProcessorRef>,
}

impl Server<UdpTransport> {
    /// Send to the configured target over UDP
    pub fn udp(config: &ServerConfig) -> Result<Self> {
        let transport = UdpTransport::connect(&config.bind_addr, &config.target_addr)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> Server<T> {
    pub fn new(transport: T, config: &ServerConfig) -> Self {
        let [width, height] = config.dimension;
        let frame_template = FrameMessage::default()
            .with_source(
                &config.source_name,
                config.source_address,
                config.instance_id,
            )
            .with_dimension(width, height);
        Self {
            transport,
            paranoid: config.paranoid,
            sessions: SessionManager::new(),
            frames: FrameManager::new(),
            frame_template,
            pending: Vec::new(),
            adaptors: Vec::new(),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    pub fn frames(&self) -> &FrameManager {
        &self.frames
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_paranoid(&mut self, paranoid: bool) {
        self.paranoid = paranoid;
    }

    /// Source fields for subsequent frames; id and time are always fresh
    pub fn set_frame_template(&mut self, frame: FrameMessage) {
        self.frame_template = frame;
    }

    pub fn frame_template(&self) -> &FrameMessage {
        &self.frame_template
    }

    /// Messages queued for the next send
    pub fn pending(&self) -> &[Message] {
        &self.pending
    }

    /// Queue a copy of `message` for the next bundle.
    ///
    /// A frame replaces the frame template instead of being queued. Alive
    /// messages are rejected, the server derives them from its sessions.
    pub fn append_clone<M>(&mut self, message: &M) -> Result<()>
    where
        M: Clone + Into<Message>,
    {
        match message.clone().into() {
            Message::Alive(_) => Err(ClientError::AliveRejected),
            Message::Frame(frame) => {
                self.set_frame_template(frame);
                Ok(())
            }
            other => {
                self.pending.push(other);
                Ok(())
            }
        }
    }

    /// Idempotent; returns false when already attached
    pub fn add_adaptor(&mut self, adaptor: ProcessorRef) -> bool {
        if self.adaptors.iter().any(|a| Rc::ptr_eq(a, &adaptor)) {
            return false;
        }
        self.adaptors.push(adaptor);
        true
    }

    pub fn del_adaptor(&mut self, adaptor: &ProcessorRef) -> bool {
        let before = self.adaptors.len();
        self.adaptors.retain(|a| !Rc::ptr_eq(a, adaptor));
        self.adaptors.len() != before
    }

    pub fn adaptor_count(&self) -> usize {
        self.adaptors.len()
    }

    /// Frame, copies of the queued messages, then the alive message of
    /// registered sessions.
    ///
    /// Leaves the queue and the frame counter untouched; [`Server::send`]
    /// consumes both once the bundle has been committed.
    pub fn prepare_bundle(&self) -> Bundle {
        let frame = FrameMessage {
            frame_id: self.frames.peek_next_frame_id(),
            time: Timetag::now(),
            ..self.frame_template.clone()
        };
        let mut messages = Vec::with_capacity(self.pending.len() + 2);
        messages.push(frame.into());
        messages.extend(self.pending.iter().cloned());
        messages.push(AliveMessage::new(self.sessions.registered()).into());
        Bundle::from_messages(messages)
    }

    /// Pass the bundle through every adaptor in attach order.
    ///
    /// A failing adaptor is skipped, or aborts the chain in paranoid mode.
    pub fn run_adaptors(&self, bundle: Bundle) -> Result<Bundle> {
        let mut current = bundle;
        for (i, adaptor) in self.adaptors.iter().enumerate() {
            let output = Bundle::new();
            match adaptor.borrow_mut().process_bundle(&current, &output) {
                Ok(()) => current = output,
                Err(e) if self.paranoid => {
                    return Err(ClientError::Adaptor(format!("adaptor {}: {}", i, e)));
                }
                Err(e) => warn!("Skipping adaptor {}: {}", i, e),
            }
        }
        Ok(current)
    }

    pub fn output_check(&self, bundle: &Bundle) -> Result<()> {
        bundle.check_output()?;
        Ok(())
    }

    pub fn commit(&mut self, bundle: &Bundle) -> Result<()> {
        let data = bundle.encode()?;
        self.transport.send(&data)?;
        debug!("Sent bundle of {} messages ({} bytes)", bundle.len(), data.len());
        Ok(())
    }

    /// Build, transform, check and transmit one bundle.
    ///
    /// On error the queued messages stay queued and the frame id is not
    /// consumed, so a later send retries the same content.
    pub fn send(&mut self) -> Result<Bundle> {
        let bundle = self.prepare_bundle();
        let bundle = self.run_adaptors(bundle)?;
        self.output_check(&bundle)?;
        self.commit(&bundle)?;
        self.pending.clear();
        self.frames.get_next_frame_id();
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use tuio_core::messages::Pointer;

    fn server() -> (Server<MemoryTransport>, MemoryTransport) {
        let (tx, rx) = MemoryTransport::pair();
        (Server::new(tx, &ServerConfig::default()), rx)
    }

    #[test]
    fn test_alive_rejected() {
        let (mut server, _) = server();
        let err = server.append_clone(&AliveMessage::new(vec![1])).unwrap_err();
        assert!(matches!(err, ClientError::AliveRejected));
        assert!(server.pending().is_empty());
    }

    #[test]
    fn test_frame_becomes_template() {
        let (mut server, _) = server();
        let frame = FrameMessage::new(99, Timetag::new(1, 0)).with_dimension(640, 480);
        server.append_clone(&frame).unwrap();
        assert!(server.pending().is_empty());

        let bundle = server.prepare_bundle();
        let sent = bundle.frame().unwrap();
        assert_eq!(sent.frame_id, 1);
        assert_eq!((sent.width, sent.height), (640, 480));
    }

    #[test]
    fn test_prepare_wraps_pending() {
        let (mut server, _) = server();
        server.sessions_mut().register_session_id(4);
        server.append_clone(&Pointer::new(4, 0.2, 0.3)).unwrap();

        let bundle = server.prepare_bundle();
        assert_eq!(bundle.len(), 3);
        assert!(bundle.check_output().is_ok());
        assert_eq!(bundle.alive().unwrap().session_ids, vec![4]);
        assert_eq!(server.pending().len(), 1);
        assert_eq!(server.frames().get_current_frame_id(), 0);

        server.send().unwrap();
        assert!(server.pending().is_empty());
        assert_eq!(server.frames().get_current_frame_id(), 1);
    }

    #[test]
    fn test_send_transmits() {
        let (mut server, rx) = server();
        server.send().unwrap();
        server.send().unwrap();
        assert_eq!(rx.pending(), 2);
        assert_eq!(server.frames().get_current_frame_id(), 2);
    }
}
