//! Interactive line-oriented chat client.
//!
//! Connects to a linechat server, answers the secret and nickname prompts
//! with what the user types, then prints incoming lines and sends typed ones.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin linechat-client
//! cargo run --bin linechat-client -- --host 192.168.0.10 --port 4000
//! ```

use clap::Parser;

use linechat_client::{ClientError, run_client, server_addr};
use linechat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "linechat-client")]
#[command(about = "Interactive client for the linechat server", long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 'H', long, env = "SERVER_IP", default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, env = "SERVER_PORT", default_value_t = 3333)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();
    let addr = server_addr(&args.host, args.port);

    match run_client(&addr).await {
        Ok(()) => {}
        Err(ClientError::Rejected(_)) => {
            println!("Authentication failed. Exiting.");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Client error: {}", e);
            std::process::exit(1);
        }
    }
}
