//! CLI chat client for the hiroba relay.
//!
//! Connects to a relay server, claims a display name, then creates or
//! joins rooms and sends messages from stdin. Slash commands drive the
//! hub events; plain lines are chat messages for the current room.
//! Automatically reconnects on disconnection (max 5 attempts with
//! 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --name Alice
//! cargo run --bin hiroba-client -- -n Bob -u ws://127.0.0.1:8080/ws
//! ```

use clap::Parser;

use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "CLI chat client for the hiroba relay", long_about = None)]
struct Args {
    /// Display name to claim after connecting (optional; use /name later)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = hiroba_client::run_client(args.url, args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
