//! Supernode routing wire protocol.
//!
//! Message types, framing and the protocol identifier both roles register
//! their proxy under.

pub mod codec;
pub mod types;

use libp2p::StreamProtocol;

pub use codec::{read_message, write_message, MAX_MESSAGE_SIZE};
pub use types::{MessageError, RoutingMessage, WirePeer};

/// Protocol name for supernode routing streams
pub const SNR_PROTOCOL: &str = "/supernode/routing/1.0.0";

/// [`SNR_PROTOCOL`] as a stream protocol
pub const fn snr_protocol() -> StreamProtocol {
    StreamProtocol::new(SNR_PROTOCOL)
}
