//! Bidirectional stream handed to protocol handlers.

use std::{
    fmt, io,
    pin::Pin,
    task::{Context, Poll},
};

use libp2p::{PeerId, StreamProtocol};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Byte transport underneath a [`RoutingStream`]
pub trait StreamIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> StreamIo for T {}

/// A negotiated stream with a remote peer
pub struct RoutingStream {
    remote: PeerId,
    protocol: StreamProtocol,
    io: Box<dyn StreamIo>,
}

impl RoutingStream {
    pub fn new(remote: PeerId, protocol: StreamProtocol, io: impl StreamIo + 'static) -> Self {
        Self { remote, protocol, io: Box::new(io) }
    }

    /// The peer on the other end of the stream
    pub fn remote_peer(&self) -> PeerId {
        self.remote
    }

    pub fn protocol(&self) -> &StreamProtocol {
        &self.protocol
    }
}

impl fmt::Debug for RoutingStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingStream")
            .field("remote", &self.remote)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for RoutingStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_read(cx, buf)
    }
}

impl AsyncWrite for RoutingStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.io).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_shutdown(cx)
    }
}
