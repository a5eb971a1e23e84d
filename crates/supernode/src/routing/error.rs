//! Routing configuration errors.

use libp2p::PeerId;
use thiserror::Error;

use crate::{client::ClientError, server::ServerError};

/// Why a routing option could not be applied.
///
/// All variants are terminal. Every precondition, including the identity
/// match between node and host, is checked before anything is registered.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("supernode routing requires a Host component")]
    MissingHost,
    #[error("supernode routing requires a peer ID identity")]
    MissingIdentity,
    #[error("supernode routing requires a peerstore")]
    MissingPeerstore,
    #[error("supernode routing client requires at least 1 server peer")]
    NoRemoteServers,
    #[error("host identity {host} does not match node identity {identity}")]
    IdentityMismatch { host: PeerId, identity: PeerId },
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl RoutingError {
    /// Whether the error is a missing node prerequisite rather than a
    /// failure propagated from server or client construction
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingHost
                | Self::MissingIdentity
                | Self::MissingPeerstore
                | Self::NoRemoteServers
                | Self::IdentityMismatch { .. }
        )
    }
}
