//! Policy cache client.
//!
//! This binary provides a CLI for interacting with a running cache server.

use std::process;

use bytes::BytesMut;
use clap::Parser;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use policy_cache::cli::{Cli, ClientCommand};
use policy_cache::protocol::{ttl_from_secs, Request};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let request = match into_request(args.command) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let addr = args.endpoint.addr();
    let mut stream = match TcpStream::connect(&addr).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to server at {}: {}", addr, e);
            eprintln!("Make sure the server is running with: cargo run --bin server");
            process::exit(1);
        }
    };

    stream.write_all(request.to_string().as_bytes()).await?;

    let mut buf = BytesMut::with_capacity(1024);
    let _ = stream.read_buf(&mut buf).await?;

    let response = match std::str::from_utf8(&buf) {
        Ok(resp) => resp,
        Err(e) => {
            eprintln!("Failed to parse response: {}", e);
            process::exit(1);
        }
    };
    if response.starts_with("ERR") {
        eprintln!("Error: {}", response);
        process::exit(1);
    }

    match (&request, response) {
        (Request::Set { key, .. }, "r Ok") => println!("Updated key '{}'", key),
        (Request::Set { key, .. }, "Ok") => println!("Set key '{}'", key),
        (Request::Get { key }, "") => println!("Key '{}' not found", key),
        (Request::Delete { key }, "Ok") => println!("Deleted key '{}'", key),
        (Request::Delete { key }, "") => println!("Key '{}' not found", key),
        (Request::Stats, resp) => {
            println!("Cache Statistics:");
            for part in resp.split_whitespace() {
                if let Some((key, value)) = part.split_once(':') {
                    println!("  {}: {}", key, value);
                }
            }
        }
        (Request::Get { .. }, value) | (Request::Ping, value) => println!("{}", value),
        (_, resp) => println!("Response: {}", resp),
    }

    Ok(())
}

fn into_request(command: ClientCommand) -> policy_cache::CacheResult<Request> {
    Ok(match command {
        ClientCommand::Get { key } => Request::Get { key },
        ClientCommand::Set { key, value, ttl } => Request::Set {
            key,
            value,
            ttl: ttl.map(ttl_from_secs).transpose()?,
        },
        ClientCommand::Delete { key } => Request::Delete { key },
        ClientCommand::Ping => Request::Ping,
        ClientCommand::Stats => Request::Stats,
    })
}
