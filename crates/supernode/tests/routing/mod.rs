//! Routing option behaviour on a single node

mod client_role_tests;
mod precondition_tests;
