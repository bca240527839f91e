//! Command-line interfaces for the demo server and client.

use clap::{Args, Parser, Subcommand};

use crate::policy::Policy;

/// Address options shared by server and client.
#[derive(Args, Debug, Clone)]
pub struct Endpoint {
    /// Host to bind or connect to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// TCP port.
    #[arg(long, default_value_t = 3000)]
    pub port: u16,
}

impl Endpoint {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// In-memory cache server.
#[derive(Parser, Debug)]
#[command(name = "cache-server")]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    #[command(flatten)]
    pub endpoint: Endpoint,

    /// Eviction policy: lru or lfu.
    #[arg(long, default_value = "lru")]
    pub policy: Policy,

    /// Maximum number of entries.
    #[arg(long, default_value_t = 10_000)]
    pub capacity: usize,

    /// Default TTL in seconds for `set` without an explicit TTL (0 = none).
    #[arg(long, default_value_t = 0)]
    pub ttl: u64,

    /// Refresh an entry's TTL on every hit.
    #[arg(long)]
    pub sliding: bool,

    /// Background sweep interval in milliseconds (0 disables the sweep).
    #[arg(long, default_value_t = 1_000)]
    pub cleanup_interval_ms: u64,
}

/// In-memory cache client.
///
/// A CLI tool for interacting with the cache server.
#[derive(Parser, Debug)]
#[command(name = "cache-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub endpoint: Endpoint,

    /// The command to execute.
    #[command(subcommand)]
    pub command: ClientCommand,
}

/// Available client commands.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Get a value by key.
    Get {
        /// The key to look up.
        key: String,
    },

    /// Set a key-value pair.
    ///
    /// Overwriting an existing key replaces its value and TTL.
    Set {
        /// The key to store the value under.
        key: String,
        /// The value to store.
        value: String,
        /// Seconds until the entry expires (0 = never).
        #[arg(long, allow_negative_numbers = true)]
        ttl: Option<i64>,
    },

    /// Delete a key.
    Delete {
        /// The key to delete.
        key: String,
    },

    /// Ping the server.
    Ping,

    /// Show cache statistics.
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::parse_from(["test", "get", "mykey"]);
        match cli.command {
            ClientCommand::Get { key } => assert_eq!(key, "mykey"),
            _ => panic!("Expected Get command"),
        }
        assert_eq!(cli.endpoint.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_set_with_ttl() {
        let cli = Cli::parse_from(["test", "set", "mykey", "myvalue", "--ttl", "-3"]);
        match cli.command {
            ClientCommand::Set { key, value, ttl } => {
                assert_eq!(key, "mykey");
                assert_eq!(value, "myvalue");
                assert_eq!(ttl, Some(-3));
            }
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_parse_endpoint() {
        let cli = Cli::parse_from(["test", "--port", "4000", "ping"]);
        assert!(matches!(cli.command, ClientCommand::Ping));
        assert_eq!(cli.endpoint.addr(), "127.0.0.1:4000");
    }

    #[test]
    fn test_server_args() {
        let args = ServerArgs::parse_from(["server", "--policy", "lfu", "--capacity", "2"]);
        assert_eq!(args.policy, Policy::Lfu);
        assert_eq!(args.capacity, 2);
        assert_eq!(args.cleanup_interval_ms, 1_000);

        assert!(ServerArgs::try_parse_from(["server", "--policy", "fifo"]).is_err());
    }
}
