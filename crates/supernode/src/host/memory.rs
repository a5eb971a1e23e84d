//! In-process transport host.
//!
//! Hosts attached to the same [`MemoryNetwork`] listen on `/memory/<port>`
//! multiaddrs and reach each other through duplex pipes. Addresses are
//! resolved through each host's peerstore, so a peer is only reachable once
//! its address has been learned.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Weak,
    },
};

use async_trait::async_trait;
use libp2p::{multiaddr::Protocol, Multiaddr, PeerId, StreamProtocol};
use parking_lot::RwLock;
use tracing::debug;

use super::{Host, HostError, RoutingStream, StreamHandler};
use crate::peerstore::{PeerInfo, Peerstore};

/// Buffer size of each direction of an in-memory stream
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Registry of in-process hosts keyed by memory port.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<NetworkInner>,
}

#[derive(Default)]
struct NetworkInner {
    next_port: AtomicU64,
    listeners: RwLock<HashMap<u64, Weak<HostShared>>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a host for `peer_id`, listening on a fresh `/memory/<port>`
    /// address that is recorded in its own peerstore.
    pub fn add_host(&self, peer_id: PeerId, peerstore: Arc<dyn Peerstore>) -> MemoryHost {
        let port = self.inner.next_port.fetch_add(1, Ordering::Relaxed) + 1;
        let listen_addr = Multiaddr::empty().with(Protocol::Memory(port));
        peerstore.add_addrs(peer_id, vec![listen_addr.clone()]);

        let shared = Arc::new(HostShared {
            peer_id,
            listen_addr: listen_addr.clone(),
            peerstore,
            handlers: RwLock::new(HashMap::new()),
            registrations: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            dials: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        });
        self.inner.listeners.write().insert(port, Arc::downgrade(&shared));
        debug!("Memory host {} listening on {}", peer_id, listen_addr);

        MemoryHost { shared, network: self.clone() }
    }

    fn lookup(&self, addr: &Multiaddr) -> Option<Arc<HostShared>> {
        let port = addr.iter().find_map(|protocol| match protocol {
            Protocol::Memory(port) => Some(port),
            _ => None,
        })?;
        let shared = self.inner.listeners.read().get(&port)?.upgrade()?;
        (!shared.closed.load(Ordering::Acquire)).then_some(shared)
    }

    fn unlisten(&self, addr: &Multiaddr) {
        for protocol in addr.iter() {
            if let Protocol::Memory(port) = protocol {
                self.inner.listeners.write().remove(&port);
            }
        }
    }
}

struct HostShared {
    peer_id: PeerId,
    listen_addr: Multiaddr,
    peerstore: Arc<dyn Peerstore>,
    handlers: RwLock<HashMap<StreamProtocol, StreamHandler>>,
    registrations: RwLock<HashMap<StreamProtocol, usize>>,
    connections: RwLock<HashMap<PeerId, Weak<HostShared>>>,
    dials: AtomicUsize,
    closed: AtomicBool,
}

/// A [`Host`] attached to a [`MemoryNetwork`]. Clones share state.
#[derive(Clone)]
pub struct MemoryHost {
    shared: Arc<HostShared>,
    network: MemoryNetwork,
}

impl MemoryHost {
    pub fn listen_addr(&self) -> &Multiaddr {
        &self.shared.listen_addr
    }

    /// The address book this host resolves peers through
    pub fn peerstore(&self) -> Arc<dyn Peerstore> {
        Arc::clone(&self.shared.peerstore)
    }

    /// How many times a handler was registered for `protocol`
    pub fn registration_count(&self, protocol: &StreamProtocol) -> usize {
        self.shared.registrations.read().get(protocol).copied().unwrap_or(0)
    }

    /// Protocols with an active handler, sorted
    pub fn protocols(&self) -> Vec<StreamProtocol> {
        let mut protocols: Vec<StreamProtocol> =
            self.shared.handlers.read().keys().cloned().collect();
        protocols.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        protocols
    }

    /// Number of `connect` and `new_stream` calls made through this host
    pub fn dial_count(&self) -> usize {
        self.shared.dials.load(Ordering::Relaxed)
    }

    /// Stop listening. Existing and future dials to this host fail.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        self.network.unlisten(&self.shared.listen_addr);
        self.shared.handlers.write().clear();
        debug!("Memory host {} closed", self.shared.peer_id);
    }

    fn dial(&self, peer: &PeerInfo) -> Result<Arc<HostShared>, HostError> {
        let peerstore = &self.shared.peerstore;
        peerstore.add_addrs(peer.id, peer.addrs.clone());

        let addrs = peerstore.addrs(&peer.id);
        if addrs.is_empty() {
            return Err(HostError::NoAddresses(peer.id));
        }

        for addr in &addrs {
            match self.network.lookup(addr) {
                Some(remote) if remote.peer_id == peer.id => {
                    // The remote learns our listen address, as identify would.
                    remote.peerstore.add_addrs(self.shared.peer_id, vec![self.shared.listen_addr.clone()]);
                    self.shared.connections.write().insert(peer.id, Arc::downgrade(&remote));
                    debug!("Connected to {} via {}", peer.id, addr);
                    return Ok(remote);
                }
                Some(remote) => {
                    debug!("Address {} belongs to {}, not {}", addr, remote.peer_id, peer.id);
                }
                None => debug!("Nothing listening on {}", addr),
            }
        }

        Err(HostError::Unreachable(peer.id))
    }

    fn connection(&self, peer: &PeerId) -> Option<Arc<HostShared>> {
        let remote = self.shared.connections.read().get(peer).and_then(Weak::upgrade)?;
        if remote.closed.load(Ordering::Acquire) {
            self.shared.connections.write().remove(peer);
            return None;
        }
        Some(remote)
    }
}

#[async_trait]
impl Host for MemoryHost {
    fn peer_id(&self) -> PeerId {
        self.shared.peer_id
    }

    fn set_stream_handler(&self, protocol: StreamProtocol, handler: StreamHandler) {
        self.shared.handlers.write().insert(protocol.clone(), handler);
        *self.shared.registrations.write().entry(protocol.clone()).or_insert(0) += 1;
        debug!("Registered stream handler for {} on {}", protocol, self.shared.peer_id);
    }

    async fn connect(&self, peer: &PeerInfo) -> Result<(), HostError> {
        self.shared.dials.fetch_add(1, Ordering::Relaxed);
        if peer.id == self.shared.peer_id {
            return Err(HostError::DialSelf(peer.id));
        }
        if self.connection(&peer.id).is_some() {
            return Ok(());
        }
        self.dial(peer).map(|_| ())
    }

    async fn new_stream(
        &self,
        peer: PeerId,
        protocol: StreamProtocol,
    ) -> Result<RoutingStream, HostError> {
        self.shared.dials.fetch_add(1, Ordering::Relaxed);
        if peer == self.shared.peer_id {
            return Err(HostError::DialSelf(peer));
        }

        let remote = match self.connection(&peer) {
            Some(remote) => remote,
            None => self.dial(&PeerInfo::new(peer))?,
        };

        let handler = remote
            .handlers
            .read()
            .get(&protocol)
            .cloned()
            .ok_or_else(|| HostError::UnsupportedProtocol { peer, protocol: protocol.clone() })?;

        let (local_io, remote_io) = tokio::io::duplex(STREAM_BUFFER_SIZE);
        tokio::spawn(handler(RoutingStream::new(self.shared.peer_id, protocol.clone(), remote_io)));

        Ok(RoutingStream::new(peer, protocol, local_io))
    }
}
