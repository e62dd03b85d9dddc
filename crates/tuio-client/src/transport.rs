//! Packet transports
//!
//! The client and server only need to move whole OSC packets. [`Transport`]
//! is that seam; [`MemoryTransport`] loops packets back in-process and
//! [`UdpTransport`] is a thin blocking socket binding.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::rc::Rc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use crate::config::MAX_UDP_PAYLOAD;
use crate::error::{ClientError, Result};

pub trait Transport {
    /// Wait up to `timeout` for one packet. `None` timeout blocks.
    fn recv(&mut self, timeout: Option<Duration>) -> Result<Option<Bytes>>;

    fn send(&mut self, data: &[u8]) -> Result<()>;
}

type Queue = Rc<RefCell<VecDeque<Bytes>>>;

/// In-process packet pipe
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbox: Queue,
    outbox: Queue,
}

impl MemoryTransport {
    /// Two ends wired to each other
    pub fn pair() -> (MemoryTransport, MemoryTransport) {
        let a: Queue = Rc::default();
        let b: Queue = Rc::default();
        (
            MemoryTransport {
                inbox: a.clone(),
                outbox: b.clone(),
            },
            MemoryTransport {
                inbox: b,
                outbox: a,
            },
        )
    }

    /// Queue a packet for this end to receive
    pub fn inject(&self, data: impl Into<Bytes>) {
        self.inbox.borrow_mut().push_back(data.into());
    }

    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }
}

impl Transport for MemoryTransport {
    /// Never blocks: an empty inbox reads as a timeout
    fn recv(&mut self, _timeout: Option<Duration>) -> Result<Option<Bytes>> {
        Ok(self.inbox.borrow_mut().pop_front())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.outbox
            .borrow_mut()
            .push_back(Bytes::copy_from_slice(data));
        Ok(())
    }
}

/// Blocking UDP socket
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpTransport {
    /// Bind for receiving
    pub fn bind(addr: &str) -> Result<Self> {
        Self::bind_with_size(addr, MAX_UDP_PAYLOAD)
    }

    pub fn bind_with_size(addr: &str, max_packet_size: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .map_err(|e| ClientError::Setup(format!("bind {}: {}", addr, e)))?;
        if let Ok(local) = socket.local_addr() {
            info!("UDP bound to {}", local);
        }
        Ok(Self {
            socket,
            buf: vec![0u8; max_packet_size],
        })
    }

    /// Bind locally and fix the send target
    pub fn connect(bind_addr: &str, target: &str) -> Result<Self> {
        let transport = Self::bind(bind_addr)?;
        transport
            .socket
            .connect(target)
            .map_err(|e| ClientError::Setup(format!("connect {}: {}", target, e)))?;
        info!("UDP sending to {}", target);
        Ok(transport)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl Transport for UdpTransport {
    fn recv(&mut self, timeout: Option<Duration>) -> Result<Option<Bytes>> {
        self.socket.set_read_timeout(timeout)?;
        match self.socket.recv_from(&mut self.buf) {
            Ok((len, from)) => {
                debug!("UDP received {} bytes from {}", len, from);
                Ok(Some(Bytes::copy_from_slice(&self.buf[..len])))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.socket.send(data)?;
        Ok(())
    }
}
