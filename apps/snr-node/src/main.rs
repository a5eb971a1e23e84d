#![warn(clippy::all, clippy::pedantic)]

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use supernode::{
    node::{identity, RemoteAddress},
    MemoryNetwork, MemoryPeerstore, MemoryRecordStore, NodeContext, PeerId, Peerstore, RecordKey,
    RoutingClient, RoutingConfigFile, RoutingOption,
};
use tracing::{info, warn};

/// Start supernode routing servers and a routing client on an in-process
/// network, then run a put/get/provide/find round trip through the client.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML config with a `[SupernodeRouting]` section
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of local routing servers to start
    #[arg(long, default_value_t = 1)]
    servers: usize,

    /// Client keypair file, generated if missing
    #[arg(long, default_value = "snr-node.key")]
    keypair: PathBuf,

    #[arg(long, default_value = "/snr/demo")]
    key: String,

    #[arg(long, default_value = "hello from a supernode client")]
    value: String,

    /// Maximum number of providers to look up
    #[arg(long, default_value_t = 20)]
    provider_limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RoutingConfigFile::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RoutingConfigFile::default(),
    };
    let mut remotes = config
        .supernode_routing
        .server_addresses()
        .context("invalid SupernodeRouting.Servers")?;

    let network = MemoryNetwork::new();
    let mut servers = Vec::with_capacity(args.servers);
    for _ in 0..args.servers {
        let (address, routing) = start_server(&network)?;
        remotes.push(address);
        servers.push(routing);
    }

    let routing = start_client(&network, &args, &remotes)?;
    run_round_trip(&routing, &args).await?;

    info!("Round trip complete, {} local server(s) shutting down", servers.len());
    Ok(())
}

/// A routing server node with a fresh identity and in-memory record store
fn start_server(network: &MemoryNetwork) -> Result<(RemoteAddress, RoutingClient)> {
    let id = PeerId::random();
    let peerstore: Arc<dyn Peerstore> = Arc::new(MemoryPeerstore::new());
    let host = network.add_host(id, Arc::clone(&peerstore));
    let address = RemoteAddress::from_parts(host.listen_addr().clone(), id);

    let node = NodeContext::from_host(Arc::new(host), peerstore);
    let routing = RoutingOption::server(Arc::new(MemoryRecordStore::new()))
        .apply(&node)
        .context("failed to configure routing server")?;

    info!("Routing server listening at {address}");
    Ok((address, routing))
}

fn start_client(network: &MemoryNetwork, args: &Args, remotes: &[RemoteAddress]) -> Result<RoutingClient> {
    let keypair = identity::load_or_generate_keypair(&args.keypair)
        .with_context(|| format!("failed to load keypair {}", args.keypair.display()))?;
    let id = identity::peer_id(&keypair);

    let peerstore: Arc<dyn Peerstore> = Arc::new(MemoryPeerstore::new());
    for remote in remotes {
        let transport = remote.transport();
        if transport.is_empty() {
            warn!("No transport address for routing server {}", remote.id());
            continue;
        }
        peerstore.add_addrs(remote.id(), vec![transport]);
    }

    let host = network.add_host(id, Arc::clone(&peerstore));
    let node = NodeContext::builder()
        .identity(id)
        .host(Arc::new(host))
        .peerstore(peerstore)
        .build();

    RoutingOption::client(remotes.iter().cloned())
        .apply(&node)
        .context("failed to configure routing client")
}

async fn run_round_trip(routing: &RoutingClient, args: &Args) -> Result<()> {
    let key = RecordKey::new(&args.key);

    let rtt = routing.ping().await.context("ping failed")?;
    info!("Routing server answered in {rtt:?}");

    routing
        .put_value(&key, args.value.clone().into_bytes())
        .await
        .context("put_value failed")?;
    let value = routing.get_value(&key).await.context("get_value failed")?;
    info!("{} = {}", args.key, String::from_utf8_lossy(&value));

    routing.provide(&key).await.context("provide failed")?;
    let providers = routing
        .find_providers(&key, args.provider_limit)
        .await
        .context("find_providers failed")?;
    for provider in &providers {
        info!("Provider of {}: {} {:?}", args.key, provider.id, provider.addrs);
    }

    let me = routing
        .find_peer(routing.local_peer_id())
        .await
        .context("find_peer failed")?;
    info!("Server knows this node at {:?}", me.addrs);

    Ok(())
}
