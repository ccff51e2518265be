//! WebSocket chat relay server with named rooms.
//!
//! Clients connect, claim a display name, then create or join rooms and
//! exchange messages scoped to their current room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use hiroba_server::{
    domain::Timestamp,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        registry::{InMemoryIdentityRegistry, InMemoryRoomRegistry},
    },
    ui::Server,
    usecase::{
        CreateRoomUseCase, DisconnectUseCase, GetRoomUsersUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase, SetNameUseCase,
    },
};
use hiroba_shared::{
    logger::setup_logger,
    time::{SystemClock, get_jst_timestamp},
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "WebSocket chat relay server with named rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registries
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create the registries (the lobby room exists from startup)
    let identity = Arc::new(InMemoryIdentityRegistry::new());
    let rooms = Arc::new(InMemoryRoomRegistry::new(Timestamp::new(
        get_jst_timestamp(),
    )));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let clock = Arc::new(SystemClock);
    let set_name_usecase = Arc::new(SetNameUseCase::new(identity.clone()));
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(
        identity.clone(),
        rooms.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        identity.clone(),
        rooms.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        identity.clone(),
        rooms.clone(),
        message_pusher.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        rooms.clone(),
        message_pusher.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        identity.clone(),
        rooms.clone(),
        message_pusher.clone(),
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(rooms.clone()));
    let get_room_users_usecase = Arc::new(GetRoomUsersUseCase::new(rooms.clone()));

    // 4. Create and run the server
    let server = Server::new(
        set_name_usecase,
        create_room_usecase,
        join_room_usecase,
        leave_room_usecase,
        send_message_usecase,
        disconnect_usecase,
        get_rooms_usecase,
        get_room_users_usecase,
        message_pusher,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
