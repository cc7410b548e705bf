//! Line-oriented TCP chat server.
//!
//! Asks every client for the server secret and a nickname, then relays each
//! line a client sends to all other connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin linechat-server
//! cargo run --bin linechat-server -- --host 127.0.0.1 --port 4000 --secret hunter2
//! SERVER_PORT=4000 CHAT_SECRET=hunter2 cargo run --bin linechat-server
//! ```

use std::{io::BufRead, time::Duration};

use clap::Parser;

use linechat_server::{
    ChatServer, Secret, ServerConfig,
    config::{DEFAULT_HOST, DEFAULT_PORT},
    signal::shutdown_signal,
};
use linechat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "linechat-server")]
#[command(about = "Line-oriented TCP chat server with shared-secret access", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "SERVER_IP", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "SERVER_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Secret key clients must send to join; prompted on stdin when omitted
    #[arg(short = 's', long, env = "CHAT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Seconds a client may take to send the secret and its nickname
    #[arg(long, default_value_t = 30)]
    handshake_timeout: u64,
}

/// Ask the operator for the secret, like the server always did without flags.
fn prompt_secret() -> std::io::Result<String> {
    println!("Define a server secret key:");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let secret = match args.secret {
        Some(secret) => secret,
        None => match prompt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                tracing::error!("Failed to read secret key: {}", e);
                std::process::exit(1);
            }
        },
    };

    let config = ServerConfig::new(args.host, args.port, Secret::new(secret))
        .with_handshake_timeout(Duration::from_secs(args.handshake_timeout));

    let server = match ChatServer::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(shutdown_signal()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
