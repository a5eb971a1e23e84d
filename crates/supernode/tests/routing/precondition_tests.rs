//! Precondition failures leave the host untouched

use std::sync::Arc;

use supernode::{
    MemoryNetwork, MemoryRecordStore, NodeContext, PeerId, RoutingError, RoutingOption,
    ServerError, StoreError,
};

use crate::common::{init_tracing, FailingStore, TestNode, FAILING_STORE_REASON};

fn server_option() -> RoutingOption {
    RoutingOption::server(Arc::new(MemoryRecordStore::new()))
}

fn client_option() -> RoutingOption {
    RoutingOption::client([TestNode::new(&MemoryNetwork::new()).remote_address()])
}

#[test]
fn test_missing_host_fails_for_both_roles() {
    init_tracing();
    let node = TestNode::new(&MemoryNetwork::new());
    let context = node.context().with_host(None);

    let server = server_option().apply(&context).unwrap_err();
    let client = client_option().apply(&context).unwrap_err();

    assert!(matches!(server, RoutingError::MissingHost));
    assert!(matches!(client, RoutingError::MissingHost));
    assert_eq!(node.registrations(), 0);
}

#[test]
fn test_missing_identity_fails_for_both_roles() {
    init_tracing();
    let node = TestNode::new(&MemoryNetwork::new());
    let context = node.context().with_identity(None);

    let server = server_option().apply(&context).unwrap_err();
    let client = client_option().apply(&context).unwrap_err();

    assert!(matches!(server, RoutingError::MissingIdentity));
    assert!(matches!(client, RoutingError::MissingIdentity));
    assert_eq!(node.registrations(), 0);
    assert!(!node.has_routing_handler());
}

#[test]
fn test_missing_peerstore_fails_for_both_roles() {
    init_tracing();
    let node = TestNode::new(&MemoryNetwork::new());
    let context = node.context().with_peerstore(None);

    let server = server_option().apply(&context).unwrap_err();
    let client = client_option().apply(&context).unwrap_err();

    assert!(matches!(server, RoutingError::MissingPeerstore));
    assert!(matches!(client, RoutingError::MissingPeerstore));
    assert_eq!(node.registrations(), 0);
}

#[test]
fn test_server_checks_peerstore_first() {
    let error = server_option().apply(&NodeContext::default()).unwrap_err();

    assert!(matches!(error, RoutingError::MissingPeerstore));
}

#[test]
fn test_client_checks_remotes_first() {
    let error = RoutingOption::client(Vec::new()).apply(&NodeContext::default()).unwrap_err();

    assert!(matches!(error, RoutingError::NoRemoteServers));
}

#[test]
fn test_empty_remotes_leave_handler_table_unchanged() {
    init_tracing();
    let node = TestNode::new(&MemoryNetwork::new());

    let error = RoutingOption::client(Vec::new()).apply(&node.context()).unwrap_err();

    assert!(matches!(error, RoutingError::NoRemoteServers));
    assert!(error.is_precondition());
    assert!(node.host.protocols().is_empty());
    assert_eq!(node.registrations(), 0);
}

#[test]
fn test_server_construction_error_is_propagated() {
    init_tracing();
    let node = TestNode::new(&MemoryNetwork::new());

    let error = RoutingOption::server(Arc::new(FailingStore)).apply(&node.context()).unwrap_err();

    assert!(!error.is_precondition());
    assert_eq!(
        error.to_string(),
        StoreError::Unavailable(FAILING_STORE_REASON.to_string()).to_string()
    );
    assert!(matches!(
        error,
        RoutingError::Server(ServerError::Store(StoreError::Unavailable(ref reason)))
            if reason == FAILING_STORE_REASON
    ));
    assert_eq!(node.registrations(), 0);
}

#[test]
fn test_identity_not_matching_host_registers_nothing() {
    init_tracing();
    let node = TestNode::new(&MemoryNetwork::new());
    let stranger = PeerId::random();
    let context = node.context().with_identity(Some(stranger));
    let remote = TestNode::new(&MemoryNetwork::new()).remote_address();

    let server = server_option().apply(&context).unwrap_err();
    let client = RoutingOption::client([remote]).apply(&context).unwrap_err();

    for error in [server, client] {
        assert!(error.is_precondition());
        assert!(matches!(
            error,
            RoutingError::IdentityMismatch { host, identity } if host == node.id && identity == stranger
        ));
    }
    assert_eq!(node.registrations(), 0);
    assert!(!node.has_routing_handler());
}
