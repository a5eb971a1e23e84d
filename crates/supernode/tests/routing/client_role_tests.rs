//! Client role: requests go to the configured remote servers

use std::sync::Arc;

use supernode::{
    ClientError, Host, HostError, MemoryNetwork, MemoryRecordStore, PeerId, PeerInfo, ProxyError,
    RecordKey, RoutingOption, SupernodeRoutingConfig,
};

use crate::common::{bounded, init_tracing, TestNode};

#[test]
fn test_client_uses_standard_proxy_with_remotes_in_order() {
    init_tracing();
    let network = MemoryNetwork::new();
    let node = TestNode::new(&network);
    let servers: Vec<TestNode> = (0..3).map(|_| TestNode::new(&network)).collect();

    let client = RoutingOption::client(servers.iter().map(TestNode::remote_address))
        .apply(&node.context())
        .unwrap();

    let standard = client.proxy().as_standard().expect("client role uses standard proxy");
    let remote_ids: Vec<PeerId> = standard.remotes().iter().map(|remote| remote.id).collect();
    let server_ids: Vec<PeerId> = servers.iter().map(|server| server.id).collect();
    assert_eq!(remote_ids, server_ids);
    assert!(standard.remotes().iter().all(|remote| remote.addrs.is_empty()));
    assert!(client.proxy().as_loopback().is_none());
    assert_eq!(node.registrations(), 1);
}

#[test]
fn test_duplicate_remotes_are_kept() {
    let network = MemoryNetwork::new();
    let node = TestNode::new(&network);
    let server = TestNode::new(&network);

    let client = RoutingOption::client([server.remote_address(), server.remote_address()])
        .apply(&node.context())
        .unwrap();

    assert_eq!(client.proxy().as_standard().unwrap().remotes().len(), 2);
}

#[test]
fn test_client_from_config_file() {
    let network = MemoryNetwork::new();
    let node = TestNode::new(&network);
    let server = TestNode::new(&network);
    let config = SupernodeRoutingConfig::with_servers([server.remote_address().to_string()]);

    let client = config.client_option().unwrap().apply(&node.context()).unwrap();

    assert_eq!(client.proxy().as_standard().unwrap().remotes()[0].id, server.id);
}

#[tokio::test]
async fn test_client_without_known_addresses_fails_to_reach_server() {
    init_tracing();
    let network = MemoryNetwork::new();
    let node = TestNode::new(&network);
    let server = TestNode::new(&network);
    RoutingOption::server(Arc::new(MemoryRecordStore::new())).apply(&server.context()).unwrap();

    // The remote address is not added to the address book.
    let client = RoutingOption::client([server.remote_address()]).apply(&node.context()).unwrap();
    let error = bounded(client.get_value(&RecordKey::new(&b"k"))).await.unwrap_err();

    assert!(matches!(error, ClientError::Proxy(ProxyError::Host(_))));
}

#[tokio::test]
async fn test_client_node_host_is_released_with_its_client() {
    init_tracing();
    let network = MemoryNetwork::new();
    let server = TestNode::new(&network);
    let observer = TestNode::new(&network);
    let node = TestNode::new(&network);
    observer.learn(&node);
    let id = node.id;

    let client = RoutingOption::client([server.remote_address()]).apply(&node.context()).unwrap();
    assert!(node.has_routing_handler());
    drop(client);
    drop(node);

    let error = bounded(observer.host.connect(&PeerInfo::new(id))).await.unwrap_err();
    assert!(matches!(error, HostError::Unreachable(peer) if peer == id));
}
