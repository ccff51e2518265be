//! WebSocket connection handlers: the hub controller event loop.
//!
//! One connection maps to one socket and one receive loop, so every
//! event a connection triggers is handled in order on its own lane.
//! Cross-connection interleaving is serialized inside the registries.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ChatMessage, ConnectionId, ConnectionIdFactory, RoomCode, Username},
    infrastructure::dto::websocket::{
        ClientEvent, MessageDto, MessageType, MoveToRoomMessage, NameExistsErrorMessage,
        NameSetMessage, NotInRoomMessage, ReceiveMessageMessage, RoomDoesNotExistMessage,
        RoomListMessage, RoomUsersMessage, UserChangeMessage,
    },
    usecase::{CreateRoomError, JoinRoomError, LeaveRoomError, SendMessageError, SetNameError},
};

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Identity is claimed later via set-name; the connection itself only
    // gets an opaque server-issued id.
    let connection_id = ConnectionIdFactory::generate();
    tracing::info!("Connection '{}' accepted", connection_id.as_str());

    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that receives payloads from the rx channel and pushes
/// them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();

    // Register the outbound channel first: all notifications, including
    // ones addressed to this connection, flow through the pusher.
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection_id.clone(), tx)
        .await;

    let mut send_task = pusher_loop(rx, sender);

    let state_for_recv = state.clone();
    let connection_id_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        handle_event(&state_for_recv, &connection_id_for_recv, event).await;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Unparseable event from '{}': {} ({})",
                            connection_id_for_recv.as_str(),
                            text,
                            e
                        );
                    }
                },
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!(
                        "Connection '{}' requested close",
                        connection_id_for_recv.as_str()
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    handle_disconnect(&state, &connection_id).await;
}

async fn handle_event(state: &Arc<AppState>, connection_id: &ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::SetName { name } => handle_set_name(state, connection_id, name).await,
        ClientEvent::CreateRoom => handle_create_room(state, connection_id).await,
        ClientEvent::JoinRoom { code } => handle_join_room(state, connection_id, code).await,
        ClientEvent::LeaveRoom { code } => handle_leave_room(state, connection_id, code).await,
        ClientEvent::GetRooms => handle_get_rooms(state, connection_id).await,
        ClientEvent::GetRoomsWithUsers { code } => {
            handle_get_room_users(state, connection_id, code).await;
        }
        ClientEvent::SendMessage { code, message } => {
            handle_send_message(state, connection_id, code, message).await;
        }
    }
}

async fn unicast(state: &AppState, connection_id: &ConnectionId, payload: String) {
    if let Err(e) = state.message_pusher.push_to(connection_id, &payload).await {
        tracing::warn!(
            "Failed to push to connection '{}': {}",
            connection_id.as_str(),
            e
        );
    }
}

fn wire_rooms(rooms: BTreeMap<RoomCode, Vec<Username>>) -> BTreeMap<String, Vec<String>> {
    rooms
        .into_iter()
        .map(|(code, users)| {
            (
                code.into_string(),
                users.into_iter().map(Username::into_string).collect(),
            )
        })
        .collect()
}

/// Push the canonical room list to every connection. Sent whenever the
/// set of live rooms (or their membership) changed.
async fn broadcast_room_list(state: &AppState) {
    let rooms = state.get_rooms_usecase.execute().await;
    let msg = RoomListMessage {
        r#type: MessageType::RoomList,
        rooms: wire_rooms(rooms),
    };
    let json = serde_json::to_string(&msg).unwrap();
    state.message_pusher.push_to_all(&json).await;
}

async fn handle_set_name(state: &Arc<AppState>, connection_id: &ConnectionId, name: String) {
    let username = match Username::new(name.clone()) {
        Ok(username) => username,
        Err(e) => {
            tracing::warn!("Rejected display name '{}': {}", name, e);
            let msg = NameExistsErrorMessage {
                r#type: MessageType::NameExistsError,
                name,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
            return;
        }
    };

    match state.set_name_usecase.execute(connection_id, username).await {
        Ok(username) => {
            tracing::info!(
                "Connection '{}' set name '{}'",
                connection_id.as_str(),
                username
            );

            let set_msg = NameSetMessage {
                r#type: MessageType::NameSet,
                name: username.as_str().to_string(),
            };
            unicast(state, connection_id, serde_json::to_string(&set_msg).unwrap()).await;

            let change = UserChangeMessage {
                r#type: MessageType::UserChange,
                content: format!("connected: {}", username),
            };
            state
                .message_pusher
                .push_to_all(&serde_json::to_string(&change).unwrap())
                .await;
        }
        Err(e) => {
            tracing::warn!(
                "Connection '{}' failed to claim a name: {}",
                connection_id.as_str(),
                e
            );
            let name = match e {
                SetNameError::NameTaken(name) | SetNameError::AlreadyNamed(name) => name,
            };
            let msg = NameExistsErrorMessage {
                r#type: MessageType::NameExistsError,
                name,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
        }
    }
}

async fn handle_create_room(state: &Arc<AppState>, connection_id: &ConnectionId) {
    match state.create_room_usecase.execute(connection_id).await {
        Ok(created) => {
            tracing::info!(
                "Connection '{}' ('{}') created room '{}'",
                connection_id.as_str(),
                created.username,
                created.code
            );

            let move_msg = MoveToRoomMessage {
                r#type: MessageType::MoveToRoom,
                code: created.code.as_str().to_string(),
            };
            unicast(state, connection_id, serde_json::to_string(&move_msg).unwrap()).await;

            let change = UserChangeMessage {
                r#type: MessageType::UserChange,
                content: format!("connected: {}", created.username),
            };
            state
                .message_pusher
                .push_to_group(&created.code, &serde_json::to_string(&change).unwrap())
                .await;

            broadcast_room_list(state).await;
        }
        Err(CreateRoomError::NoName) => {
            tracing::warn!(
                "Connection '{}' tried to create a room before setting a name",
                connection_id.as_str()
            );
        }
    }
}

async fn handle_join_room(state: &Arc<AppState>, connection_id: &ConnectionId, code: String) {
    let code = match RoomCode::new(code.clone()) {
        Ok(code) => code,
        Err(_) => {
            let msg = RoomDoesNotExistMessage {
                r#type: MessageType::RoomDoesNotExist,
                code,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
            return;
        }
    };

    match state.join_room_usecase.execute(connection_id, code).await {
        Ok(joined) => {
            tracing::info!(
                "Connection '{}' ('{}') joined room '{}'",
                connection_id.as_str(),
                joined.username,
                joined.code
            );

            let move_msg = MoveToRoomMessage {
                r#type: MessageType::MoveToRoom,
                code: joined.code.as_str().to_string(),
            };
            unicast(state, connection_id, serde_json::to_string(&move_msg).unwrap()).await;

            let change = UserChangeMessage {
                r#type: MessageType::UserChange,
                content: format!("connected: {}", joined.username),
            };
            state
                .message_pusher
                .push_to_group(&joined.code, &serde_json::to_string(&change).unwrap())
                .await;

            broadcast_room_list(state).await;

            let users_msg = RoomUsersMessage {
                r#type: MessageType::RoomUsers,
                code: joined.code.as_str().to_string(),
                users: joined
                    .members
                    .into_iter()
                    .map(Username::into_string)
                    .collect(),
            };
            state
                .message_pusher
                .push_to_group(&joined.code, &serde_json::to_string(&users_msg).unwrap())
                .await;
        }
        Err(JoinRoomError::RoomNotFound(code)) => {
            let msg = RoomDoesNotExistMessage {
                r#type: MessageType::RoomDoesNotExist,
                code,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
        }
        Err(JoinRoomError::NoName) => {
            tracing::warn!(
                "Connection '{}' tried to join a room before setting a name",
                connection_id.as_str()
            );
        }
    }
}

async fn handle_leave_room(state: &Arc<AppState>, connection_id: &ConnectionId, code: String) {
    let code = match RoomCode::new(code) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!("Rejected leave-room code: {}", e);
            return;
        }
    };

    match state.leave_room_usecase.execute(connection_id, &code).await {
        Ok(left) if left.outcome.left => {
            tracing::info!(
                "Connection '{}' ('{}') left room '{}'",
                connection_id.as_str(),
                left.username,
                code
            );

            // Addressed from the pre-removal snapshot so members at the
            // time of leave, the leaver included, still get the notice.
            let targets: Vec<ConnectionId> = left
                .outcome
                .members_at_leave
                .iter()
                .map(|m| m.connection_id.clone())
                .collect();
            let change = UserChangeMessage {
                r#type: MessageType::UserChange,
                content: format!("disconnected from room: {}", left.username),
            };
            state
                .message_pusher
                .broadcast(targets, &serde_json::to_string(&change).unwrap())
                .await;

            if left.outcome.room_deleted {
                broadcast_room_list(state).await;
            }
        }
        Ok(_) => {
            tracing::debug!(
                "Connection '{}' left room '{}' it was not in",
                connection_id.as_str(),
                code
            );
        }
        Err(LeaveRoomError::NoName) => {
            tracing::warn!(
                "Connection '{}' tried to leave a room before setting a name",
                connection_id.as_str()
            );
        }
    }
}

async fn handle_send_message(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    code: String,
    message: MessageDto,
) {
    let code = match RoomCode::new(code.clone()) {
        Ok(code) => code,
        Err(_) => {
            let msg = RoomDoesNotExistMessage {
                r#type: MessageType::RoomDoesNotExist,
                code,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
            return;
        }
    };

    // Validate against domain rules, but relay the original DTO so the
    // payload round-trips exactly.
    if let Err(e) = ChatMessage::try_from(message.clone()) {
        tracing::warn!(
            "Rejected message payload from '{}': {}",
            connection_id.as_str(),
            e
        );
        return;
    }

    let relay = ReceiveMessageMessage {
        r#type: MessageType::ReceiveMessage,
        code: code.as_str().to_string(),
        message,
    };
    let json = serde_json::to_string(&relay).unwrap();

    match state
        .send_message_usecase
        .execute(connection_id, &code, json)
        .await
    {
        Ok(()) => {}
        Err(SendMessageError::RoomNotFound(code)) => {
            let msg = RoomDoesNotExistMessage {
                r#type: MessageType::RoomDoesNotExist,
                code,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
        }
        Err(SendMessageError::NotInRoom(code)) => {
            let msg = NotInRoomMessage {
                r#type: MessageType::NotInRoom,
                code,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
        }
    }
}

async fn handle_get_rooms(state: &Arc<AppState>, connection_id: &ConnectionId) {
    let rooms = state.get_rooms_usecase.execute().await;
    let msg = RoomListMessage {
        r#type: MessageType::RoomList,
        rooms: wire_rooms(rooms),
    };
    unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
}

async fn handle_get_room_users(state: &Arc<AppState>, connection_id: &ConnectionId, code: String) {
    let code = match RoomCode::new(code.clone()) {
        Ok(code) => code,
        Err(_) => {
            let msg = RoomDoesNotExistMessage {
                r#type: MessageType::RoomDoesNotExist,
                code,
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
            return;
        }
    };

    match state.get_room_users_usecase.execute(&code).await {
        Ok(users) => {
            let msg = RoomUsersMessage {
                r#type: MessageType::RoomUsers,
                code: code.as_str().to_string(),
                users: users.into_iter().map(Username::into_string).collect(),
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
        }
        Err(_) => {
            let msg = RoomDoesNotExistMessage {
                r#type: MessageType::RoomDoesNotExist,
                code: code.as_str().to_string(),
            };
            unicast(state, connection_id, serde_json::to_string(&msg).unwrap()).await;
        }
    }
}

async fn handle_disconnect(state: &Arc<AppState>, connection_id: &ConnectionId) {
    let outcome = state.disconnect_usecase.execute(connection_id).await;

    let Some(username) = outcome.username else {
        tracing::info!(
            "Connection '{}' disconnected before setting a name",
            connection_id.as_str()
        );
        return;
    };

    let change = UserChangeMessage {
        r#type: MessageType::UserChange,
        content: format!("disconnected: {}", username),
    };
    let json = serde_json::to_string(&change).unwrap();

    match outcome.left_room {
        Some((code, leave)) => {
            tracing::info!(
                "Connection '{}' ('{}') disconnected from room '{}'",
                connection_id.as_str(),
                username,
                code
            );

            let targets: Vec<ConnectionId> = leave
                .members_at_leave
                .iter()
                .map(|m| m.connection_id.clone())
                .filter(|c| c != connection_id)
                .collect();
            state.message_pusher.broadcast(targets, &json).await;

            if leave.room_deleted {
                broadcast_room_list(state).await;
            }
        }
        None => {
            tracing::info!(
                "Connection '{}' ('{}') disconnected",
                connection_id.as_str(),
                username
            );
            state.message_pusher.push_to_all(&json).await;
        }
    }
}
