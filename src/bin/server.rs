//! Policy cache server.
//!
//! This binary runs a TCP server that accepts cache commands from clients.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use clap::Parser;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    signal,
};
use tracing_subscriber::EnvFilter;

use policy_cache::{Cache, CacheConfig, Request, ServerArgs, TracingLogger};

type SharedCache = Cache<String, Bytes>;

/// Entry point for the cache server.
#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();

    let mut cache_config = CacheConfig::new()
        .policy(args.policy)
        .capacity(args.capacity)
        .default_ttl(Duration::from_secs(args.ttl))
        .sliding_expiration(args.sliding);
    if args.cleanup_interval_ms > 0 {
        cache_config = cache_config
            .cleanup_interval(Duration::from_millis(args.cleanup_interval_ms))
            .background_cleanup(true);
    }

    let cache: SharedCache = Cache::with_config(cache_config.build())?;
    cache.set_logger(std::sync::Arc::new(TracingLogger));

    let addr = args.endpoint.addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        %addr,
        policy = %args.policy,
        capacity = args.capacity,
        "cache server listening"
    );

    // Stop the sweep and report on Ctrl-C.
    let shutdown_cache = cache.clone();
    tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            shutdown_cache.shutdown();
            let stats = shutdown_cache.stats();
            tracing::info!(
                hits = stats.hits,
                misses = stats.misses,
                size = stats.size,
                "shutting down"
            );
            std::process::exit(0);
        }
    });

    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                tracing::debug!(%peer, "connection accepted");
                let cache = cache.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, cache).await {
                        tracing::warn!(%peer, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to accept connection");
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    mut socket: TcpStream,
    cache: SharedCache,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = BytesMut::with_capacity(1024);

    let n = socket.read_buf(&mut buf).await?;
    if n == 0 {
        return Ok(());
    }

    let response = match Request::decode(&mut buf) {
        Ok(request) => process_request(request, &cache),
        Err(e) => format!("ERR {}", e),
    };

    socket.write_all(response.as_bytes()).await?;
    Ok(())
}

/// Apply a request to the cache and return the response line.
fn process_request(request: Request, cache: &SharedCache) -> String {
    match request {
        Request::Get { key } => match cache.get(&key) {
            Some(value) => match std::str::from_utf8(&value) {
                Ok(s) => s.to_string(),
                Err(_) => format!("(binary data: {} bytes)", value.len()),
            },
            // Empty response for a miss.
            None => String::new(),
        },

        Request::Set { key, value, ttl } => {
            let existed = cache.contains(&key);
            let value = Bytes::from(value);
            match ttl {
                Some(ttl) => cache.put_with_ttl(key, value, ttl),
                None => cache.put(key, value),
            }
            if existed {
                "r Ok".to_string()
            } else {
                "Ok".to_string()
            }
        }

        Request::Delete { key } => {
            if cache.remove(&key) {
                "Ok".to_string()
            } else {
                String::new()
            }
        }

        Request::Ping => "PONG".to_string(),

        Request::Stats => {
            let stats = cache.stats();
            format!(
                "policy:{} hits:{} misses:{} evictions:{} expirations:{} size:{} hit_rate:{:.1}%",
                cache.policy(),
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.expirations,
                stats.size,
                stats.hit_rate
            )
        }
    }
}
