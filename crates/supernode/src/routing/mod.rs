//! Supernode routing configuration.
//!
//! A [`RoutingOption`] decides whether a node serves routing records itself or
//! forwards every request to remote routing servers. Applying it runs
//!
//! 1. precondition validation ([`validate`]),
//! 2. proxy selection ([`select`]),
//! 3. handler registration for the routing protocol ([`register`]),
//! 4. routing client construction,
//!
//! stopping at the first error.

mod error;
mod option;
pub mod register;
pub mod select;
pub mod validate;

pub use error::RoutingError;
pub use option::{Role, RoutingOption};
pub use validate::ValidatedNode;
