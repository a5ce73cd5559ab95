//! Peer ASN Chart
//!
//! Shows how a Tendermint/CometBFT node's peers are spread across autonomous
//! systems.
//!
//! ```text
//! net_info (RPC) ──► IP-to-ASN lookup ──► count per ASN ──► bar chart
//! ```

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

mod aggregate;
mod asn;
mod chart;
mod config;
mod error;
mod rpc;
mod types;
mod ui;

use config::{AsnSource, Config, EnvFile, RPC_URL_ENV};
use rpc::RpcClient;

/// Chart the ASN distribution of a node's peers
#[derive(Parser, Debug)]
#[command(name = "peer-asn-chart")]
#[command(version)]
#[command(about = "Chart a node's peers per autonomous system", long_about = None)]
struct Args {
    /// Node RPC base URL (defaults to http://localhost:26657)
    #[arg(long, env = RPC_URL_ENV)]
    rpc_url: Option<String>,

    /// IP-to-ASN lookup service
    #[arg(long, value_enum, default_value_t = AsnSource::Iptoasn)]
    asn_source: AsnSource,

    /// Timeout for each HTTP request or WHOIS query (seconds)
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Print the summary without drawing the chart
    #[arg(long)]
    no_chart: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    // .env must be applied before clap reads RPC_URL
    let env_file = EnvFile::load();
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    env_file.log();

    let config = Config::default()
        .with_rpc_url(args.rpc_url)
        .with_asn_source(args.asn_source)
        .with_timeout_secs(args.timeout_secs)
        .with_chart(!args.no_chart);

    config.validate()?;

    if let Err(e) = run(&config) {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Fetch, resolve, aggregate and display
fn run(config: &Config) -> anyhow::Result<()> {
    let client = RpcClient::new(&config.rpc_url, config.timeout())?;
    let net_info = client
        .net_info()
        .with_context(|| format!("Error querying RPC endpoint {}", client.url()))?;

    info!(
        n_peers = %net_info.n_peers,
        listed = net_info.peers.len(),
        outbound = net_info.outbound_count(),
        listening = net_info.listening,
        "fetched peer list"
    );
    debug!(listeners = ?net_info.listeners, "node listeners");
    for peer in &net_info.peers {
        debug!(
            id = %peer.node_info.id,
            moniker = %peer.node_info.moniker,
            network = %peer.node_info.network,
            version = %peer.node_info.version,
            listen_addr = %peer.node_info.listen_addr,
            remote_ip = %peer.remote_ip,
            "peer"
        );
    }

    let lookup = asn::lookup_for(config.asn_source, config.timeout())?;
    let progress = ui::create_progress(net_info.peers.len());
    let resolved = asn::resolve_peers(lookup.as_ref(), &net_info.peers, &progress);

    let summaries = aggregate::aggregate(&resolved);
    info!(
        resolved = resolved.len(),
        failed = net_info.peers.len() - resolved.len(),
        asns = summaries.len(),
        counted = aggregate::total_count(&summaries),
        "aggregated peers"
    );

    ui::print_summary(&net_info.n_peers, &summaries);

    if config.show_chart {
        ui::show_chart(&summaries)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_run_fails_when_rpc_unreachable() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = Config::default()
            .with_rpc_url(Some(format!("http://127.0.0.1:{}", port)))
            .with_timeout_secs(2)
            .with_chart(false);

        let err = run(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("Error querying RPC endpoint"));
        assert!(matches!(
            err.downcast_ref::<error::Error>(),
            Some(error::Error::Network(_))
        ));
    }
}
