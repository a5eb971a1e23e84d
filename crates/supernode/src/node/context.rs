//! Node context a routing option is applied to.

use std::{fmt, sync::Arc};

use libp2p::PeerId;

use crate::{host::Host, peerstore::Peerstore};

/// The parts of a node routing configuration depends on.
///
/// Every field is optional so an incompletely assembled node can be
/// represented; the routing option reports which part is missing.
#[derive(Clone, Default)]
pub struct NodeContext {
    /// The node's peer identity
    pub identity: Option<PeerId,>,

    /// Transport host used to open and accept streams
    pub host: Option<Arc<dyn Host,>,>,

    /// Address book of known peers
    pub peerstore: Option<Arc<dyn Peerstore,>,>,
}

impl NodeContext {
    /// Create a new context builder
    pub fn builder() -> NodeContextBuilder {
        NodeContextBuilder::default()
    }

    /// Context with identity taken from the host
    pub fn from_host(host: Arc<dyn Host,>, peerstore: Arc<dyn Peerstore,>,) -> Self {
        Self { identity: Some(host.peer_id(),), host: Some(host,), peerstore: Some(peerstore,), }
    }

    /// Replace the identity
    pub fn with_identity(mut self, identity: Option<PeerId,>,) -> Self {
        self.identity = identity;
        self
    }

    /// Replace the host
    pub fn with_host(mut self, host: Option<Arc<dyn Host,>,>,) -> Self {
        self.host = host;
        self
    }

    /// Replace the peerstore
    pub fn with_peerstore(mut self, peerstore: Option<Arc<dyn Peerstore,>,>,) -> Self {
        self.peerstore = peerstore;
        self
    }
}

impl fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        f.debug_struct("NodeContext",)
            .field("identity", &self.identity,)
            .field("host", &self.host.as_ref().map(|host| host.peer_id(),),)
            .field("peerstore", &self.peerstore.is_some(),)
            .finish()
    }
}

/// Builder for NodeContext
#[derive(Default,)]
pub struct NodeContextBuilder {
    context: NodeContext,
}

impl NodeContextBuilder {
    /// Build the context
    pub fn build(self,) -> NodeContext {
        self.context
    }

    /// Set the identity
    pub fn identity(mut self, identity: PeerId,) -> Self {
        self.context.identity = Some(identity,);
        self
    }

    /// Set the transport host
    pub fn host(mut self, host: Arc<dyn Host,>,) -> Self {
        self.context.host = Some(host,);
        self
    }

    /// Set the address book
    pub fn peerstore(mut self, peerstore: Arc<dyn Peerstore,>,) -> Self {
        self.context.peerstore = Some(peerstore,);
        self
    }
}
