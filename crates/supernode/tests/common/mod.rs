//! Shared fixtures for the routing integration tests

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use supernode::{
    protocol::snr_protocol, MemoryHost, MemoryNetwork, MemoryPeerstore, NodeContext,
    PeerId, Peerstore, RecordStore, RemoteAddress, StoreError,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Fail the test instead of hanging when a network operation never completes
pub async fn bounded<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("operation timed out")
}

/// A node attached to a memory network, with its own address book
pub struct TestNode {
    pub id: PeerId,
    pub host: MemoryHost,
    pub peerstore: Arc<MemoryPeerstore>,
}

impl TestNode {
    pub fn new(network: &MemoryNetwork) -> Self {
        let id = PeerId::random();
        let peerstore = Arc::new(MemoryPeerstore::new());
        let host = network.add_host(id, peerstore.clone());
        Self { id, host, peerstore }
    }

    /// Context with identity, host and address book all present
    pub fn context(&self) -> NodeContext {
        NodeContext::from_host(Arc::new(self.host.clone()), self.peerstore.clone())
    }

    pub fn remote_address(&self) -> RemoteAddress {
        RemoteAddress::from_parts(self.host.listen_addr().clone(), self.id)
    }

    /// Record `other`'s listen address in this node's address book
    pub fn learn(&self, other: &TestNode) {
        self.peerstore.add_addrs(other.id, vec![other.host.listen_addr().clone()]);
    }

    pub fn registrations(&self) -> usize {
        self.host.registration_count(&snr_protocol())
    }

    pub fn has_routing_handler(&self) -> bool {
        self.host.protocols().contains(&snr_protocol())
    }
}

/// A record store whose backing storage is never usable
pub struct FailingStore;

pub const FAILING_STORE_REASON: &str = "datastore offline";

#[async_trait]
impl RecordStore for FailingStore {
    fn check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(FAILING_STORE_REASON.to_string()))
    }

    async fn put(&self, _key: String, _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(FAILING_STORE_REASON.to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Unavailable(FAILING_STORE_REASON.to_string()))
    }
}
