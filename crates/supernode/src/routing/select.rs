//! Proxy selection per role.

use std::sync::Arc;

use super::validate::ValidatedNode;
use crate::{
    node::RemoteAddress,
    peerstore::PeerInfo,
    proxy::Proxy,
    server::{RoutingServer, ServerError},
    store::RecordStore,
};

/// Loopback proxy over a local routing server bound to the node identity.
/// Server construction errors are returned as-is.
pub fn server_proxy(
    records: &Arc<dyn RecordStore>,
    node: &ValidatedNode,
) -> Result<Proxy, ServerError> {
    let server = RoutingServer::new(Arc::clone(records), Arc::clone(&node.peerstore), node.identity)?;
    Ok(Proxy::loopback(Arc::new(server), node.identity))
}

/// Standard proxy over the remote servers, in the given order.
///
/// Only the peer ids are kept; addresses are resolved through the peerstore
/// when a connection is opened.
pub fn client_proxy(remotes: &[RemoteAddress], node: &ValidatedNode) -> Proxy {
    let infos = remotes.iter().map(|remote| PeerInfo::new(remote.id())).collect();
    Proxy::standard(&node.host, infos)
}
