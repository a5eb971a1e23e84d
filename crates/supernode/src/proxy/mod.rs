//! Routing proxies.
//!
//! A routing client never talks to a server directly; it goes through a
//! [`Proxy`]. Server nodes use the loopback variant so requests stay in the
//! process, client nodes use the standard variant which forwards over the
//! transport host. The same proxy also serves inbound routing streams.

mod loopback;
mod standard;

use std::sync::Arc;

use libp2p::PeerId;
use thiserror::Error;

use crate::{
    host::{Host, HostError, RoutingStream},
    peerstore::PeerInfo,
    protocol::RoutingMessage,
    server::RequestHandler,
};

pub use loopback::LoopbackProxy;
pub use standard::StandardProxy;

/// Errors raised while forwarding a routing message
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no response to {0} request")]
    NoResponse(&'static str),
    #[error("no remote routing servers configured")]
    NoRemotes,
    #[error("transport host has been dropped")]
    HostClosed,
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("routing stream failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The proxy a routing client sends through. Exactly one variant is chosen at
/// configuration time.
#[derive(Clone)]
pub enum Proxy {
    Loopback(LoopbackProxy),
    Standard(StandardProxy),
}

impl Proxy {
    pub fn loopback(handler: Arc<dyn RequestHandler>, local: PeerId) -> Self {
        Self::Loopback(LoopbackProxy::new(handler, local))
    }

    pub fn standard(host: &Arc<dyn Host>, remotes: Vec<PeerInfo>) -> Self {
        Self::Standard(StandardProxy::new(host, remotes))
    }

    pub fn as_loopback(&self) -> Option<&LoopbackProxy> {
        match self {
            Self::Loopback(proxy) => Some(proxy),
            Self::Standard(_) => None,
        }
    }

    pub fn as_standard(&self) -> Option<&StandardProxy> {
        match self {
            Self::Standard(proxy) => Some(proxy),
            Self::Loopback(_) => None,
        }
    }

    /// Send a message that expects no reply. `Ok` means a remote accepted
    /// and closed the stream, not that the message was applied.
    pub async fn send_message(&self, message: RoutingMessage) -> Result<(), ProxyError> {
        match self {
            Self::Loopback(proxy) => proxy.send_message(message).await,
            Self::Standard(proxy) => proxy.send_message(message).await,
        }
    }

    /// Send a request and wait for its reply
    pub async fn send_request(&self, message: RoutingMessage) -> Result<RoutingMessage, ProxyError> {
        match self {
            Self::Loopback(proxy) => proxy.send_request(message).await,
            Self::Standard(proxy) => proxy.send_request(message).await,
        }
    }

    /// Entry point registered on the host for the routing protocol
    pub async fn handle_stream(&self, stream: RoutingStream) {
        match self {
            Self::Loopback(proxy) => proxy.handle_stream(stream).await,
            Self::Standard(proxy) => proxy.handle_stream(stream).await,
        }
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loopback(proxy) => f.debug_struct("Loopback").field("local", &proxy.local()).finish(),
            Self::Standard(proxy) => f.debug_struct("Standard").field("remotes", &proxy.remotes()).finish(),
        }
    }
}
