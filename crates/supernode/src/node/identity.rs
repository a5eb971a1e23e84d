//! Node identity keypairs.
//!
//! Keypairs are stored protobuf-encoded, the format libp2p uses.

use std::{fs, io, path::Path};

use libp2p::{
    identity::{DecodingError, Keypair},
    PeerId,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("keypair file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid keypair encoding: {0}")]
    Decoding(#[from] DecodingError),
}

/// Load or generate a keypair from the specified path
pub fn load_or_generate_keypair<P: AsRef<Path,>,>(path: P,) -> Result<Keypair, IdentityError,> {
    let path = path.as_ref();

    if path.exists() {
        load_keypair(path,)
    } else {
        let keypair = generate_keypair();
        save_keypair(&keypair, path,)?;
        Ok(keypair,)
    }
}

/// Generate a new Ed25519 keypair
pub fn generate_keypair() -> Keypair {
    Keypair::generate_ed25519()
}

/// Save a keypair to a file, creating parent directories
pub fn save_keypair<P: AsRef<Path,>,>(keypair: &Keypair, path: P,) -> Result<(), IdentityError,> {
    let path = path.as_ref();
    let io_error = |source: io::Error| IdentityError::Io { path: path.display().to_string(), source, };

    if let Some(parent,) = path.parent() {
        fs::create_dir_all(parent,).map_err(io_error,)?;
    }

    let bytes = keypair.to_protobuf_encoding()?;
    fs::write(path, &bytes,).map_err(io_error,)
}

/// Load a keypair from a file
pub fn load_keypair<P: AsRef<Path,>,>(path: P,) -> Result<Keypair, IdentityError,> {
    let path = path.as_ref();
    let bytes = fs::read(path,)
        .map_err(|source| IdentityError::Io { path: path.display().to_string(), source, },)?;
    Ok(Keypair::from_protobuf_encoding(&bytes,)?,)
}

/// Peer id of a keypair
pub fn peer_id(keypair: &Keypair,) -> PeerId {
    keypair.public().to_peer_id()
}
