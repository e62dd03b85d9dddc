//! TUIO 2.0 client and server
//!
//! Receive side: an [`OscClient`] reads packets from a [`Transport`],
//! assembles bundles and notifies its listeners. [`Adaptor`] nodes chain
//! behind a client to transform bundles before they reach the application.
//!
//! Send side: a [`Server`] wraps queued messages in frame and alive
//! messages, runs its own processor chain and transmits the result.
//!
//! # Example
//!
//! ```ignore
//! use tuio_client::{MemoryTransport, OscClient, Server, ServerConfig};
//! use tuio_core::messages::Pointer;
//!
//! let (tx, rx) = MemoryTransport::pair();
//! let mut server = Server::new(tx, &ServerConfig::default());
//! server.sessions_mut().register_session_id(1);
//! server.append_clone(&Pointer::new(1, 0.5, 0.5))?;
//! server.send()?;
//!
//! let mut client = OscClient::new(rx);
//! client.load(1, None)?;
//! let bundle = client.stack_mut().get_latest();
//! ```

pub mod adaptor;
pub mod adaptors;
pub mod client;
pub mod config;
pub mod error;
pub mod listener;
pub mod server;
pub mod transport;

pub use adaptor::{prepare_output, Adaptor, BundleProcessor};
pub use adaptors::ContainmentAdaptor;
pub use client::OscClient;
pub use config::{ClientConfig, ServerConfig, MAX_UDP_PAYLOAD};
pub use error::{ClientError, Result};
pub use listener::{BundleSource, Listener, ListenerRef, ListenerSet};
pub use server::{ProcessorRef, Server};
pub use transport::{MemoryTransport, Transport, UdpTransport};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adaptor::{Adaptor, BundleProcessor};
    pub use crate::client::OscClient;
    pub use crate::error::{ClientError, Result};
    pub use crate::listener::{BundleSource, Listener};
    pub use crate::server::Server;
    pub use tuio_core::{Bundle, BundleStack, Message};
}
