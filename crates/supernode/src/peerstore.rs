//! Address book for known peers.
//!
//! Maps peer ids to the multiaddrs they were last seen at. Remote routing
//! servers are configured with an empty address list and resolved through the
//! peerstore when a connection is opened.

use std::collections::HashMap;

use libp2p::{Multiaddr, PeerId};
use parking_lot::RwLock;

/// A peer id together with the addresses known for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: PeerId,
    pub addrs: Vec<Multiaddr>,
}

impl PeerInfo {
    /// Peer info with no addresses; resolution is left to the peerstore.
    pub fn new(id: PeerId) -> Self {
        Self { id, addrs: Vec::new() }
    }

    pub fn with_addrs(id: PeerId, addrs: Vec<Multiaddr>) -> Self {
        Self { id, addrs }
    }
}

/// Shared address book. Implementations synchronise internally.
pub trait Peerstore: Send + Sync {
    /// Record addresses for `peer`. Already known addresses are ignored.
    fn add_addrs(&self, peer: PeerId, addrs: Vec<Multiaddr>);

    /// Addresses known for `peer`, in insertion order.
    fn addrs(&self, peer: &PeerId) -> Vec<Multiaddr>;

    fn peer_info(&self, peer: PeerId) -> PeerInfo {
        PeerInfo { addrs: self.addrs(&peer), id: peer }
    }
}

/// In-memory [`Peerstore`].
#[derive(Debug, Default)]
pub struct MemoryPeerstore {
    addrs: RwLock<HashMap<PeerId, Vec<Multiaddr>>>,
}

impl MemoryPeerstore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Peerstore for MemoryPeerstore {
    fn add_addrs(&self, peer: PeerId, addrs: Vec<Multiaddr>) {
        if addrs.is_empty() {
            return;
        }
        let mut book = self.addrs.write();
        let known = book.entry(peer).or_default();
        for addr in addrs {
            if !known.contains(&addr) {
                known.push(addr);
            }
        }
    }

    fn addrs(&self, peer: &PeerId) -> Vec<Multiaddr> {
        self.addrs.read().get(peer).cloned().unwrap_or_default()
    }
}
