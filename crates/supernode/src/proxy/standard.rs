//! Standard proxy: forwards routing requests to remote servers.

use std::sync::{Arc, Weak};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use super::ProxyError;
use crate::{
    host::{Host, RoutingStream},
    peerstore::PeerInfo,
    protocol::{read_message, snr_protocol, write_message, RoutingMessage},
};

/// Forwards each request to the first reachable remote server, trying them
/// in configured order.
///
/// The proxy is registered in its own host's handler table, so it only keeps
/// a weak handle to the host. The routing client holds the strong one.
#[derive(Clone)]
pub struct StandardProxy {
    host: Weak<dyn Host>,
    remotes: Vec<PeerInfo>,
}

impl StandardProxy {
    pub fn new(host: &Arc<dyn Host>, remotes: Vec<PeerInfo>) -> Self {
        Self { host: Arc::downgrade(host), remotes }
    }

    /// Remote servers in the order they are tried
    pub fn remotes(&self) -> &[PeerInfo] {
        &self.remotes
    }

    /// Deliver a one-way message to the first remote that accepts the stream.
    ///
    /// There is no acknowledgement: a remote that accepts the stream and
    /// closes it without handling the message, such as a node in the client
    /// role, still counts as delivered and later remotes are not tried.
    pub(crate) async fn send_message(&self, message: RoutingMessage) -> Result<(), ProxyError> {
        let mut last_error = ProxyError::NoRemotes;
        for remote in &self.remotes {
            match self.deliver(remote, &message).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    warn!("Failed to send {} to {}: {}", message.kind(), remote.id, error);
                    last_error = error;
                }
            }
        }
        Err(last_error)
    }

    /// Send a request, moving on to the next remote when one closes the
    /// stream without replying.
    pub(crate) async fn send_request(
        &self,
        message: RoutingMessage,
    ) -> Result<RoutingMessage, ProxyError> {
        let mut last_error = ProxyError::NoRemotes;
        for remote in &self.remotes {
            match self.request(remote, &message).await {
                Ok(reply) => return Ok(reply),
                Err(error) => {
                    warn!("Request {} to {} failed: {}", message.kind(), remote.id, error);
                    last_error = error;
                }
            }
        }
        Err(last_error)
    }

    /// Clients do not serve routing requests; inbound streams are dropped.
    pub(crate) async fn handle_stream(&self, mut stream: RoutingStream) {
        warn!(
            "Routing client received (dropped) a routing stream from {}",
            stream.remote_peer()
        );
        if let Err(error) = stream.shutdown().await {
            debug!("Failed to close dropped stream: {}", error);
        }
    }

    async fn open(&self, remote: &PeerInfo) -> Result<RoutingStream, ProxyError> {
        let host = self.host.upgrade().ok_or(ProxyError::HostClosed)?;
        host.connect(remote).await?;
        Ok(host.new_stream(remote.id, snr_protocol()).await?)
    }

    /// Write a one-way message and wait for the server to close the stream.
    async fn deliver(&self, remote: &PeerInfo, message: &RoutingMessage) -> Result<(), ProxyError> {
        let mut stream = self.open(remote).await?;
        write_message(&mut stream, message).await?;
        stream.shutdown().await?;

        let mut trailing = Vec::new();
        stream.read_to_end(&mut trailing).await?;
        if !trailing.is_empty() {
            debug!("Ignoring {} unexpected bytes from {}", trailing.len(), remote.id);
        }
        Ok(())
    }

    async fn request(
        &self,
        remote: &PeerInfo,
        message: &RoutingMessage,
    ) -> Result<RoutingMessage, ProxyError> {
        let mut stream = self.open(remote).await?;
        write_message(&mut stream, message).await?;
        match read_message(&mut stream).await {
            Ok(reply) => Ok(reply),
            Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(ProxyError::NoResponse(message.kind()))
            }
            Err(error) => Err(error.into()),
        }
    }
}
