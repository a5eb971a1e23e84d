//! Wire message types for the supernode routing protocol.
//!
//! Keys and values travel hex-encoded, peer ids and multiaddrs as their
//! string forms.

use libp2p::{kad::RecordKey, Multiaddr, PeerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::peerstore::PeerInfo;

/// Errors converting between wire and domain representations
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid peer id `{0}`")]
    PeerId(String),
    #[error("invalid multiaddr `{0}`")]
    Multiaddr(String),
}

/// A peer as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePeer {
    pub id: String,
    pub addrs: Vec<String>,
}

impl From<&PeerInfo> for WirePeer {
    fn from(info: &PeerInfo) -> Self {
        Self {
            id: info.id.to_base58(),
            addrs: info.addrs.iter().map(ToString::to_string).collect(),
        }
    }
}

impl TryFrom<&WirePeer> for PeerInfo {
    type Error = MessageError;

    fn try_from(peer: &WirePeer) -> Result<Self, Self::Error> {
        let id = decode_peer_id(&peer.id)?;
        let addrs = peer
            .addrs
            .iter()
            .map(|addr| addr.parse::<Multiaddr>().map_err(|_| MessageError::Multiaddr(addr.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PeerInfo::with_addrs(id, addrs))
    }
}

/// Messages exchanged between routing clients and servers.
///
/// `PutValue` and `AddProvider` are one-way; every other request has a
/// matching reply variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutingMessage {
    PutValue { key: String, value: String },
    GetValue { key: String },
    Value { key: String, value: Option<String> },
    AddProvider { key: String, provider: WirePeer },
    GetProviders { key: String },
    Providers { key: String, providers: Vec<WirePeer> },
    FindPeer { peer: String },
    Peer { peer: Option<WirePeer> },
    Ping,
    Pong,
}

impl RoutingMessage {
    pub fn put_value(key: &RecordKey, value: &[u8]) -> Self {
        Self::PutValue { key: encode_key(key), value: hex::encode(value) }
    }

    pub fn get_value(key: &RecordKey) -> Self {
        Self::GetValue { key: encode_key(key) }
    }

    pub fn add_provider(key: &RecordKey, provider: &PeerInfo) -> Self {
        Self::AddProvider { key: encode_key(key), provider: provider.into() }
    }

    pub fn get_providers(key: &RecordKey) -> Self {
        Self::GetProviders { key: encode_key(key) }
    }

    pub fn find_peer(peer: &PeerId) -> Self {
        Self::FindPeer { peer: peer.to_base58() }
    }

    /// Short name used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PutValue { .. } => "put_value",
            Self::GetValue { .. } => "get_value",
            Self::Value { .. } => "value",
            Self::AddProvider { .. } => "add_provider",
            Self::GetProviders { .. } => "get_providers",
            Self::Providers { .. } => "providers",
            Self::FindPeer { .. } => "find_peer",
            Self::Peer { .. } => "peer",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

pub fn encode_key(key: &RecordKey) -> String {
    hex::encode(key.as_ref())
}

pub fn decode_key(key: &str) -> Result<RecordKey, MessageError> {
    Ok(RecordKey::from(hex::decode(key)?))
}

pub fn decode_value(value: &str) -> Result<Vec<u8>, MessageError> {
    Ok(hex::decode(value)?)
}

pub fn decode_peer_id(peer: &str) -> Result<PeerId, MessageError> {
    peer.parse().map_err(|_| MessageError::PeerId(peer.to_string()))
}
