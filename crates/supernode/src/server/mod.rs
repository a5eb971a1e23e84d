//! Authoritative routing record server.
//!
//! A [`RoutingServer`] answers routing requests from a [`RecordStore`] and the
//! node's address book. It never talks to the network itself: requests reach
//! it through a loopback proxy, either from the local client or from streams
//! accepted on the routing protocol.

use std::sync::Arc;

use async_trait::async_trait;
use libp2p::PeerId;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    peerstore::{PeerInfo, Peerstore},
    protocol::{
        types::{decode_key, decode_peer_id, decode_value, encode_key},
        MessageError, RoutingMessage, WirePeer,
    },
    store::{RecordStore, StoreError},
};

/// Namespace for value records
const RECORD_PREFIX: &str = "/routing/record/";
/// Namespace for provider sets
const PROVIDER_PREFIX: &str = "/routing/providers/";

/// Errors raised while constructing or running a routing server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error("corrupt provider set under {key}: {source}")]
    CorruptProviders {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Handles one routing request on behalf of `from`.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Returns the reply, or `None` for one-way messages and failures.
    async fn handle_request(&self, from: PeerId, message: RoutingMessage) -> Option<RoutingMessage>;
}

/// Routing server over a record store and an address book
pub struct RoutingServer {
    records: Arc<dyn RecordStore>,
    peerstore: Arc<dyn Peerstore>,
    local: PeerId,
    /// Serialises read-modify-write of provider sets
    provider_updates: Mutex<()>,
}

impl RoutingServer {
    /// Create a server for `local`, failing if the record store is unusable.
    pub fn new(
        records: Arc<dyn RecordStore>,
        peerstore: Arc<dyn Peerstore>,
        local: PeerId,
    ) -> Result<Self, ServerError> {
        records.check()?;
        Ok(Self { records, peerstore, local, provider_updates: Mutex::new(()) })
    }

    pub fn local_peer_id(&self) -> PeerId {
        self.local
    }

    async fn handle(
        &self,
        from: PeerId,
        message: RoutingMessage,
    ) -> Result<Option<RoutingMessage>, ServerError> {
        match message {
            RoutingMessage::PutValue { key, value } => {
                let key = canonical_key(&key)?;
                self.records.put(record_key(&key), decode_value(&value)?).await?;
                debug!("Stored value record {} from {}", key, from);
                Ok(None)
            }
            RoutingMessage::GetValue { key } => {
                let key = canonical_key(&key)?;
                let value = self.records.get(&record_key(&key)).await?.map(hex::encode);
                Ok(Some(RoutingMessage::Value { key, value }))
            }
            RoutingMessage::AddProvider { key, provider } => {
                let key = canonical_key(&key)?;
                let provider = PeerInfo::try_from(&provider)?;
                if provider.id != from {
                    warn!("Ignoring provider record for {} sent by {}", provider.id, from);
                    return Ok(None);
                }
                self.peerstore.add_addrs(provider.id, provider.addrs);
                self.add_provider(&key, provider.id).await?;
                Ok(None)
            }
            RoutingMessage::GetProviders { key } => {
                let key = canonical_key(&key)?;
                let providers = self
                    .providers(&key)
                    .await?
                    .into_iter()
                    .map(|id| WirePeer::from(&self.peerstore.peer_info(id)))
                    .collect();
                Ok(Some(RoutingMessage::Providers { key, providers }))
            }
            RoutingMessage::FindPeer { peer } => {
                let id = decode_peer_id(&peer)?;
                let info = self.peerstore.peer_info(id);
                let found = !info.addrs.is_empty() || id == self.local;
                Ok(Some(RoutingMessage::Peer { peer: found.then(|| WirePeer::from(&info)) }))
            }
            RoutingMessage::Ping => Ok(Some(RoutingMessage::Pong)),
            other => {
                warn!("Dropping {} message from {}: not a request", other.kind(), from);
                Ok(None)
            }
        }
    }

    async fn providers(&self, key: &str) -> Result<Vec<PeerId>, ServerError> {
        let store_key = provider_key(key);
        let Some(raw) = self.records.get(&store_key).await? else {
            return Ok(Vec::new());
        };
        let ids: Vec<String> = serde_json::from_slice(&raw)
            .map_err(|source| ServerError::CorruptProviders { key: store_key, source })?;
        Ok(ids.iter().map(|id| decode_peer_id(id)).collect::<Result<_, _>>()?)
    }

    async fn add_provider(&self, key: &str, provider: PeerId) -> Result<(), ServerError> {
        let _guard = self.provider_updates.lock().await;
        let mut providers = self.providers(key).await?;
        if providers.contains(&provider) {
            return Ok(());
        }
        providers.push(provider);

        let ids: Vec<String> = providers.iter().map(|p| p.to_base58()).collect();
        let raw = serde_json::to_vec(&ids)
            .map_err(|source| ServerError::CorruptProviders { key: provider_key(key), source })?;
        self.records.put(provider_key(key), raw).await?;
        debug!("Added provider {} for {}", provider, key);
        Ok(())
    }
}

#[async_trait]
impl RequestHandler for RoutingServer {
    async fn handle_request(&self, from: PeerId, message: RoutingMessage) -> Option<RoutingMessage> {
        let kind = message.kind();
        match self.handle(from, message).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!("Failed to handle {} request from {}: {}", kind, from, error);
                None
            }
        }
    }
}

/// Lower-case hex form of a wire key, so equal keys share one store entry
fn canonical_key(key: &str) -> Result<String, MessageError> {
    Ok(encode_key(&decode_key(key)?))
}

fn record_key(key: &str) -> String {
    format!("{RECORD_PREFIX}{key}")
}

fn provider_key(key: &str) -> String {
    format!("{PROVIDER_PREFIX}{key}")
}

/// Store key for the value record of `key`, as written by [`RoutingServer`]
pub fn value_record_key(key: &libp2p::kad::RecordKey) -> String {
    record_key(&encode_key(key))
}
