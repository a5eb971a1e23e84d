//! Loopback proxy: serves routing requests in-process.

use std::sync::Arc;

use libp2p::PeerId;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::ProxyError;
use crate::{
    host::RoutingStream,
    protocol::{read_message, write_message, RoutingMessage},
    server::RequestHandler,
};

/// Hands every request to a local handler as if sent by `local`.
#[derive(Clone)]
pub struct LoopbackProxy {
    handler: Arc<dyn RequestHandler>,
    local: PeerId,
}

impl LoopbackProxy {
    pub fn new(handler: Arc<dyn RequestHandler>, local: PeerId) -> Self {
        Self { handler, local }
    }

    /// The identity requests are attributed to
    pub fn local(&self) -> PeerId {
        self.local
    }

    pub(crate) async fn send_message(&self, message: RoutingMessage) -> Result<(), ProxyError> {
        self.handler.handle_request(self.local, message).await;
        Ok(())
    }

    pub(crate) async fn send_request(
        &self,
        message: RoutingMessage,
    ) -> Result<RoutingMessage, ProxyError> {
        let kind = message.kind();
        self.handler
            .handle_request(self.local, message)
            .await
            .ok_or(ProxyError::NoResponse(kind))
    }

    /// Serve one request read from an inbound stream.
    pub(crate) async fn handle_stream(&self, mut stream: RoutingStream) {
        let remote = stream.remote_peer();
        let request = match read_message(&mut stream).await {
            Ok(request) => request,
            Err(error) => {
                warn!("Failed to read routing message from {}: {}", remote, error);
                return;
            }
        };
        debug!("Serving {} request from {}", request.kind(), remote);

        if let Some(response) = self.handler.handle_request(remote, request).await {
            if let Err(error) = write_message(&mut stream, &response).await {
                warn!("Failed to write {} response to {}: {}", response.kind(), remote, error);
                return;
            }
        }
        if let Err(error) = stream.shutdown().await {
            debug!("Failed to close routing stream with {}: {}", remote, error);
        }
    }
}
