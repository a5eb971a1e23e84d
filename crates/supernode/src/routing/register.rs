//! Binding a proxy to the routing protocol on a host.

use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use crate::{
    host::{Host, RoutingStream, StreamHandler},
    protocol::snr_protocol,
    proxy::Proxy,
};

/// Dispatch inbound [`SNR_PROTOCOL`](crate::protocol::SNR_PROTOCOL) streams
/// on `host` to `proxy`.
///
/// Calling this twice for the same host registers twice.
pub fn register_handler(host: &dyn Host, proxy: &Arc<Proxy>) {
    let proxy = Arc::clone(proxy);
    let handler: StreamHandler = Arc::new(move |stream: RoutingStream| {
        let proxy = Arc::clone(&proxy);
        async move { proxy.handle_stream(stream).await }.boxed()
    });

    host.set_stream_handler(snr_protocol(), handler);
    debug!("Routing proxy registered on {}", host.peer_id());
}
