//! Node-side inputs to routing configuration.
//!
//! The context a routing option is applied to, remote server addresses and
//! identity keypair handling.

pub mod address;
pub mod context;
pub mod identity;

pub use address::{AddressError, RemoteAddress};
pub use context::{NodeContext, NodeContextBuilder};
pub use identity::{generate_keypair, load_keypair, load_or_generate_keypair, save_keypair, IdentityError};
