//! Deferred routing configuration.

use std::{fmt, sync::Arc};

use tracing::info;

use super::{
    register::register_handler,
    select::{client_proxy, server_proxy},
    validate::{validate_client, validate_server},
    RoutingError,
};
use crate::{client::RoutingClient, node::{NodeContext, RemoteAddress}, store::RecordStore};

/// Routing role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => f.write_str("server"),
            Self::Client => f.write_str("client"),
        }
    }
}

/// A routing role and its inputs, applied to a node with [`RoutingOption::apply`].
#[derive(Clone)]
pub enum RoutingOption {
    /// Hold routing records in `records` and answer lookups locally
    Server { records: Arc<dyn RecordStore> },
    /// Forward every request to `remotes`
    Client { remotes: Vec<RemoteAddress> },
}

impl RoutingOption {
    /// Routing server storing records in `records`. Only routing records are
    /// written to the store.
    pub fn server(records: Arc<dyn RecordStore>) -> Self {
        Self::Server { records }
    }

    /// Routing client forwarding to `remotes`, tried in order
    pub fn client<I>(remotes: I) -> Self
    where
        I: IntoIterator<Item = RemoteAddress>,
    {
        Self::Client { remotes: remotes.into_iter().collect() }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Server { .. } => Role::Server,
            Self::Client { .. } => Role::Client,
        }
    }

    /// Configure routing on `node`.
    ///
    /// Validates the node, builds the proxy, registers it for the routing
    /// protocol on the node's host and returns the node's routing client. The
    /// handler is only registered once validation and proxy construction have
    /// succeeded. Applying an option twice to the same host registers twice.
    pub fn apply(&self, node: &NodeContext) -> Result<RoutingClient, RoutingError> {
        let (node, proxy) = match self {
            Self::Server { records } => {
                let node = validate_server(node)?;
                let proxy = server_proxy(records, &node)?;
                (node, proxy)
            }
            Self::Client { remotes } => {
                let node = validate_client(node, remotes.len())?;
                let proxy = client_proxy(remotes, &node);
                (node, proxy)
            }
        };

        let proxy = Arc::new(proxy);
        register_handler(node.host.as_ref(), &proxy);

        let client = RoutingClient::new(proxy, node.host, node.peerstore, node.identity)?;
        info!("Supernode routing {} configured for {}", self.role(), node.identity);
        Ok(client)
    }
}

impl fmt::Debug for RoutingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server { .. } => f.debug_struct("Server").finish_non_exhaustive(),
            Self::Client { remotes } => f.debug_struct("Client").field("remotes", remotes).finish(),
        }
    }
}
