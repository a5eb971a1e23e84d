//! Requests forwarded from client nodes to a routing server

use std::sync::Arc;

use supernode::{
    protocol::{read_message, snr_protocol, write_message},
    server::value_record_key,
    ClientError, Host, MemoryNetwork, MemoryRecordStore, PeerId, PeerInfo, Peerstore, RecordKey,
    RecordStore, RoutingClient, RoutingMessage, RoutingOption,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::common::{bounded, init_tracing, TestNode};

struct Deployment {
    network: MemoryNetwork,
    server: TestNode,
    records: Arc<MemoryRecordStore>,
}

impl Deployment {
    fn new() -> Self {
        let network = MemoryNetwork::new();
        let server = TestNode::new(&network);
        let records = Arc::new(MemoryRecordStore::new());
        RoutingOption::server(records.clone()).apply(&server.context()).unwrap();
        Self { network, server, records }
    }

    /// A new client node that knows where the server listens
    fn client(&self) -> (TestNode, RoutingClient) {
        let node = TestNode::new(&self.network);
        node.learn(&self.server);
        let client = RoutingOption::client([self.server.remote_address()])
            .apply(&node.context())
            .unwrap();
        (node, client)
    }
}

#[tokio::test]
async fn test_put_then_get_through_server() {
    init_tracing();
    let deployment = Deployment::new();
    let (_node, client) = deployment.client();
    let key = RecordKey::new(&b"/ipns/alice");

    bounded(client.put_value(&key, b"record".to_vec())).await.unwrap();
    let value = bounded(client.get_value(&key)).await.unwrap();

    assert_eq!(value, b"record");
    assert_eq!(
        deployment.records.get(&value_record_key(&key)).await.unwrap(),
        Some(b"record".to_vec())
    );
}

#[tokio::test]
async fn test_value_visible_to_other_clients() {
    let deployment = Deployment::new();
    let (_writer_node, writer) = deployment.client();
    let (_reader_node, reader) = deployment.client();
    let key = RecordKey::new(&b"shared");

    bounded(writer.put_value(&key, b"v".to_vec())).await.unwrap();

    assert_eq!(bounded(reader.get_value(&key)).await.unwrap(), b"v");
}

#[tokio::test]
async fn test_missing_value_is_not_found() {
    let deployment = Deployment::new();
    let (_node, client) = deployment.client();

    let error = bounded(client.get_value(&RecordKey::new(&b"nothing"))).await.unwrap_err();

    assert!(matches!(error, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_provide_then_find_providers() {
    init_tracing();
    let deployment = Deployment::new();
    let (provider_node, provider) = deployment.client();
    let (seeker_node, seeker) = deployment.client();
    let key = RecordKey::new(&b"block-cid");

    bounded(provider.provide(&key)).await.unwrap();
    let found = bounded(seeker.find_providers(&key, 5)).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, provider_node.id);
    assert_eq!(found[0].addrs, vec![provider_node.host.listen_addr().clone()]);
    // The seeker's address book learned the provider.
    assert_eq!(
        seeker_node.peerstore.addrs(&provider_node.id),
        vec![provider_node.host.listen_addr().clone()]
    );
}

#[tokio::test]
async fn test_find_providers_respects_limit() {
    let deployment = Deployment::new();
    let key = RecordKey::new(&b"popular");
    let mut nodes = Vec::new();
    for _ in 0..3 {
        let (node, client) = deployment.client();
        bounded(client.provide(&key)).await.unwrap();
        nodes.push(node);
    }
    let (_seeker_node, seeker) = deployment.client();

    let found = bounded(seeker.find_providers(&key, 2)).await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, nodes[0].id);
    assert_eq!(found[1].id, nodes[1].id);
}

#[tokio::test]
async fn test_find_peer_returns_addresses_known_to_server() {
    let deployment = Deployment::new();
    let (first_node, first) = deployment.client();
    let (_second_node, second) = deployment.client();

    // Any exchange with the server makes this node's address known to it.
    bounded(first.ping()).await.unwrap();
    let found = bounded(second.find_peer(first_node.id)).await.unwrap();

    assert_eq!(found.id, first_node.id);
    assert_eq!(found.addrs, vec![first_node.host.listen_addr().clone()]);
}

#[tokio::test]
async fn test_find_unknown_peer_is_not_found() {
    let deployment = Deployment::new();
    let (_node, client) = deployment.client();

    let error = bounded(client.find_peer(PeerId::random())).await.unwrap_err();

    assert!(matches!(error, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_puts_are_all_stored() {
    let deployment = Deployment::new();
    let (_node, client) = deployment.client();

    let mut tasks = Vec::new();
    for i in 0..16u8 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.put_value(&RecordKey::new(&[i]), vec![i; 4]).await
        }));
    }
    for task in tasks {
        bounded(task).await.unwrap().unwrap();
    }

    for i in 0..16u8 {
        assert_eq!(bounded(client.get_value(&RecordKey::new(&[i]))).await.unwrap(), vec![i; 4]);
    }
    assert_eq!(deployment.records.len().await, 16);
}

#[tokio::test]
async fn test_client_node_drops_inbound_routing_streams() {
    init_tracing();
    let deployment = Deployment::new();
    let (client_node, _client) = deployment.client();
    let caller = TestNode::new(&deployment.network);
    caller.learn(&client_node);

    let mut stream = bounded(caller.host.new_stream(client_node.id, snr_protocol())).await.unwrap();
    write_message(&mut stream, &RoutingMessage::Ping).await.unwrap();
    stream.shutdown().await.unwrap();
    let reply = bounded(read_message(&mut stream)).await;

    assert_eq!(reply.unwrap_err().kind(), std::io::ErrorKind::UnexpectedEof);
}

#[tokio::test]
async fn test_server_rejects_provider_records_for_other_peers() {
    let deployment = Deployment::new();
    let (_node, client) = deployment.client();
    let key = RecordKey::new(&b"spoofed");
    let victim = TestNode::new(&deployment.network);

    let mut stream = bounded(client.host().new_stream(deployment.server.id, snr_protocol()))
        .await
        .unwrap();
    let spoofed = PeerInfo::with_addrs(victim.id, vec![victim.host.listen_addr().clone()]);
    write_message(&mut stream, &RoutingMessage::add_provider(&key, &spoofed)).await.unwrap();
    stream.shutdown().await.unwrap();
    // The server closes the stream once the message is handled.
    let mut trailing = Vec::new();
    bounded(stream.read_to_end(&mut trailing)).await.unwrap();

    let found = bounded(client.find_providers(&key, 10)).await.unwrap();
    assert!(found.is_empty());
}
