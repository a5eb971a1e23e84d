//! Transport host abstraction.
//!
//! A [`Host`] opens outbound streams to peers and dispatches inbound streams
//! to the handler registered for the negotiated protocol. [`MemoryNetwork`]
//! provides an in-process implementation.

mod memory;
mod stream;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use libp2p::{PeerId, StreamProtocol};
use thiserror::Error;

use crate::peerstore::PeerInfo;

pub use memory::{MemoryHost, MemoryNetwork};
pub use stream::{RoutingStream, StreamIo};

/// Callback invoked once per inbound stream. Invocations may run concurrently.
pub type StreamHandler = Arc<dyn Fn(RoutingStream) -> BoxFuture<'static, ()> + Send + Sync>;

/// Errors raised while dialing peers or opening streams
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no addresses known for peer {0}")]
    NoAddresses(PeerId),
    #[error("peer {0} is unreachable at every known address")]
    Unreachable(PeerId),
    #[error("peer {peer} does not support protocol {protocol}")]
    UnsupportedProtocol { peer: PeerId, protocol: StreamProtocol },
    #[error("cannot open a stream to the local peer {0}")]
    DialSelf(PeerId),
}

/// Stream dial/accept and protocol handler registration.
#[async_trait]
pub trait Host: Send + Sync {
    /// Peer id this host authenticates as
    fn peer_id(&self) -> PeerId;

    /// Route inbound streams for `protocol` to `handler`.
    ///
    /// No de-duplication happens here: a second registration for the same
    /// protocol replaces the first.
    fn set_stream_handler(&self, protocol: StreamProtocol, handler: StreamHandler);

    /// Ensure a connection to `peer`. Addresses in `peer` are added to the
    /// address book first; an empty list defers to what the book already knows.
    async fn connect(&self, peer: &PeerInfo) -> Result<(), HostError>;

    /// Open a stream to `peer` negotiated for `protocol`.
    async fn new_stream(
        &self,
        peer: PeerId,
        protocol: StreamProtocol,
    ) -> Result<RoutingStream, HostError>;
}
