//! CLI argument parsing.
//!
//! The only flag the node understands is `-p/--port`; everything else
//! about node configuration is derived from it via
//! [`chain::NodeConfig::for_port`].

use clap::Parser;

use chain::NodeConfig;

/// Peer-to-peer proof-of-work node.
#[derive(Parser, Debug)]
#[command(name = "api-gateway", about = "Peer-to-peer proof-of-work node")]
pub struct Cli {
    /// Port to listen on. Also selects the wallet/chain file suffixes and
    /// the metrics exporter port.
    #[arg(short, long, default_value_t = 5001)]
    pub port: u16,
}

impl Cli {
    /// Builds the node's top-level configuration from parsed CLI flags.
    pub fn into_node_config(self) -> NodeConfig {
        NodeConfig::for_port(self.port)
    }
}
