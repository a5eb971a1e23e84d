//! Role preconditions.
//!
//! Checks run in a fixed order per role and stop at the first failure. They
//! only inspect the context; nothing is built or registered here.

use std::sync::Arc;

use libp2p::PeerId;

use super::RoutingError;
use crate::{host::Host, node::NodeContext, peerstore::Peerstore};

/// A node context with every prerequisite present
#[derive(Clone)]
pub struct ValidatedNode {
    pub identity: PeerId,
    pub host: Arc<dyn Host>,
    pub peerstore: Arc<dyn Peerstore>,
}

/// Server role: peerstore, then host, then identity, then that the host
/// authenticates as the identity.
pub fn validate_server(node: &NodeContext) -> Result<ValidatedNode, RoutingError> {
    let peerstore = node.peerstore.clone().ok_or(RoutingError::MissingPeerstore)?;
    let host = node.host.clone().ok_or(RoutingError::MissingHost)?;
    let identity = node.identity.ok_or(RoutingError::MissingIdentity)?;
    ensure_host_identity(host.as_ref(), identity)?;
    Ok(ValidatedNode { identity, host, peerstore })
}

/// Client role: remote servers, then host, then identity, then peerstore,
/// then that the host authenticates as the identity.
pub fn validate_client(node: &NodeContext, remote_count: usize) -> Result<ValidatedNode, RoutingError> {
    if remote_count == 0 {
        return Err(RoutingError::NoRemoteServers);
    }
    let host = node.host.clone().ok_or(RoutingError::MissingHost)?;
    let identity = node.identity.ok_or(RoutingError::MissingIdentity)?;
    let peerstore = node.peerstore.clone().ok_or(RoutingError::MissingPeerstore)?;
    ensure_host_identity(host.as_ref(), identity)?;
    Ok(ValidatedNode { identity, host, peerstore })
}

fn ensure_host_identity(host: &dyn Host, identity: PeerId) -> Result<(), RoutingError> {
    let host = host.peer_id();
    if host != identity {
        return Err(RoutingError::IdentityMismatch { host, identity });
    }
    Ok(())
}
