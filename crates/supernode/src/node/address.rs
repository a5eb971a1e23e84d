//! Remote routing server addresses.

use std::{fmt, str::FromStr};

use libp2p::{multiaddr::Protocol, Multiaddr, PeerId};
use thiserror::Error;

/// Errors parsing a remote server address
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid multiaddr: {0}")]
    Multiaddr(#[from] libp2p::multiaddr::Error),
    #[error("address {0} does not end in a /p2p/<peer-id> component")]
    MissingPeerId(Multiaddr),
}

/// A multiaddr ending in `/p2p/<peer-id>`, naming a remote routing server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteAddress {
    addr: Multiaddr,
    id: PeerId,
}

impl RemoteAddress {
    pub fn new(addr: Multiaddr) -> Result<Self, AddressError> {
        match extract_peer_id(&addr) {
            Some(id) => Ok(Self { addr, id }),
            None => Err(AddressError::MissingPeerId(addr)),
        }
    }

    /// Address of a peer at `transport`
    pub fn from_parts(transport: Multiaddr, id: PeerId) -> Self {
        Self { addr: transport.with(Protocol::P2p(id)), id }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    /// The full address, including the peer id
    pub fn multiaddr(&self) -> &Multiaddr {
        &self.addr
    }

    /// The address with the trailing `/p2p` component removed
    pub fn transport(&self) -> Multiaddr {
        let mut transport = self.addr.clone();
        transport.pop();
        transport
    }
}

impl TryFrom<Multiaddr> for RemoteAddress {
    type Error = AddressError;

    fn try_from(addr: Multiaddr) -> Result<Self, Self::Error> {
        Self::new(addr)
    }
}

impl FromStr for RemoteAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse()?)
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.addr, f)
    }
}

/// Peer id from the last component of `addr`
fn extract_peer_id(addr: &Multiaddr) -> Option<PeerId> {
    match addr.iter().last()? {
        Protocol::P2p(peer_id) => Some(peer_id),
        _ => None,
    }
}
