//! Routing client handed to the rest of the node.
//!
//! All record-routing operations go through the configured [`Proxy`]: on a
//! server node they resolve in-process, on a client node they are forwarded to
//! the remote routing servers.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use libp2p::{kad::RecordKey, PeerId};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    host::Host,
    peerstore::{PeerInfo, Peerstore},
    protocol::{
        types::{decode_value, encode_key},
        MessageError, RoutingMessage,
    },
    proxy::{Proxy, ProxyError},
};

/// Errors returned by routing operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("host identity {host} does not match node identity {identity}")]
    IdentityMismatch { host: PeerId, identity: PeerId },
    #[error("routing: {0} not found")]
    NotFound(String),
    #[error("unexpected {got} reply to {request} request")]
    UnexpectedResponse { request: &'static str, got: &'static str },
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    #[error(transparent)]
    Message(#[from] MessageError),
}

/// The node's routing implementation
#[derive(Clone)]
pub struct RoutingClient {
    proxy: Arc<Proxy>,
    host: Arc<dyn Host>,
    peerstore: Arc<dyn Peerstore>,
    local: PeerId,
}

impl RoutingClient {
    /// Build a client sending through `proxy` on behalf of `local`.
    pub fn new(
        proxy: Arc<Proxy>,
        host: Arc<dyn Host>,
        peerstore: Arc<dyn Peerstore>,
        local: PeerId,
    ) -> Result<Self, ClientError> {
        if host.peer_id() != local {
            return Err(ClientError::IdentityMismatch { host: host.peer_id(), identity: local });
        }
        Ok(Self { proxy, host, peerstore, local })
    }

    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    pub fn local_peer_id(&self) -> PeerId {
        self.local
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Store `value` under `key` on the routing server.
    ///
    /// Delivery is unacknowledged, see [`Proxy::send_message`].
    pub async fn put_value(&self, key: &RecordKey, value: Vec<u8>) -> Result<(), ClientError> {
        self.proxy.send_message(RoutingMessage::put_value(key, &value)).await?;
        debug!("put_value {} ({} bytes)", encode_key(key), value.len());
        Ok(())
    }

    /// Fetch the value stored under `key`
    pub async fn get_value(&self, key: &RecordKey) -> Result<Vec<u8>, ClientError> {
        let request = RoutingMessage::get_value(key);
        match self.proxy.send_request(request).await? {
            RoutingMessage::Value { value: Some(value), .. } => Ok(decode_value(&value)?),
            RoutingMessage::Value { value: None, key } => Err(ClientError::NotFound(format!("value {key}"))),
            other => Err(unexpected("get_value", &other)),
        }
    }

    /// Announce this node as a provider of `key`, with its known addresses
    pub async fn provide(&self, key: &RecordKey) -> Result<(), ClientError> {
        let me = self.peerstore.peer_info(self.local);
        self.proxy.send_message(RoutingMessage::add_provider(key, &me)).await?;
        info!("Announced {} as provider of {}", self.local, encode_key(key));
        Ok(())
    }

    /// Providers of `key`, at most `limit`. Their addresses are added to the
    /// address book.
    pub async fn find_providers(
        &self,
        key: &RecordKey,
        limit: usize,
    ) -> Result<Vec<PeerInfo>, ClientError> {
        let request = RoutingMessage::get_providers(key);
        let providers = match self.proxy.send_request(request).await? {
            RoutingMessage::Providers { providers, .. } => providers,
            other => return Err(unexpected("get_providers", &other)),
        };

        let mut found = Vec::with_capacity(providers.len().min(limit));
        for provider in providers.iter().take(limit) {
            let info = PeerInfo::try_from(provider)?;
            self.peerstore.add_addrs(info.id, info.addrs.clone());
            found.push(info);
        }
        Ok(found)
    }

    /// Addresses of `peer` as known to the routing server
    pub async fn find_peer(&self, peer: PeerId) -> Result<PeerInfo, ClientError> {
        match self.proxy.send_request(RoutingMessage::find_peer(&peer)).await? {
            RoutingMessage::Peer { peer: Some(found) } => {
                let info = PeerInfo::try_from(&found)?;
                self.peerstore.add_addrs(info.id, info.addrs.clone());
                Ok(info)
            }
            RoutingMessage::Peer { peer: None } => Err(ClientError::NotFound(format!("peer {peer}"))),
            other => Err(unexpected("find_peer", &other)),
        }
    }

    /// Round trip to the routing server
    pub async fn ping(&self) -> Result<Duration, ClientError> {
        let started = Instant::now();
        match self.proxy.send_request(RoutingMessage::Ping).await? {
            RoutingMessage::Pong => Ok(started.elapsed()),
            other => Err(unexpected("ping", &other)),
        }
    }
}

impl std::fmt::Debug for RoutingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingClient")
            .field("local", &self.local)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

fn unexpected(request: &'static str, reply: &RoutingMessage) -> ClientError {
    ClientError::UnexpectedResponse { request, got: reply.kind() }
}
