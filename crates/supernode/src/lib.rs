//! Supernode routing for peer-to-peer content routing.
//!
//! A node either acts as a routing *server*, holding routing records in a
//! record store and answering lookups, or as a routing *client* that keeps no
//! records and forwards every request to remote servers over
//! [`SNR_PROTOCOL`]. [`RoutingOption`] validates the node, picks the matching
//! proxy, registers it on the node's host and returns the node's
//! [`RoutingClient`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use supernode::{MemoryNetwork, MemoryPeerstore, MemoryRecordStore, NodeContext, Peerstore, RoutingOption};
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let network = MemoryNetwork::new();
//! let peerstore: Arc<dyn Peerstore> = Arc::new(MemoryPeerstore::new());
//! let host = network.add_host(supernode::PeerId::random(), peerstore.clone());
//! let node = NodeContext::from_host(Arc::new(host), peerstore);
//!
//! let routing = RoutingOption::server(Arc::new(MemoryRecordStore::new())).apply(&node)?;
//! routing.put_value(&supernode::RecordKey::new(&b"key"), b"value".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod host;
pub mod node;
pub mod peerstore;
pub mod protocol;
pub mod proxy;
pub mod routing;
pub mod server;
pub mod store;

pub use client::{ClientError, RoutingClient};
pub use config::{ConfigError, RoutingConfigFile, SupernodeRoutingConfig};
pub use host::{Host, HostError, MemoryHost, MemoryNetwork, RoutingStream, StreamHandler};
pub use libp2p::{identity::Keypair, kad::RecordKey, Multiaddr, PeerId, StreamProtocol};
pub use node::{NodeContext, RemoteAddress};
pub use peerstore::{MemoryPeerstore, PeerInfo, Peerstore};
pub use protocol::{RoutingMessage, SNR_PROTOCOL};
pub use proxy::{LoopbackProxy, Proxy, ProxyError, StandardProxy};
pub use routing::{Role, RoutingError, RoutingOption};
pub use server::{RequestHandler, RoutingServer, ServerError};
pub use store::{MemoryRecordStore, RecordStore, StoreError};
