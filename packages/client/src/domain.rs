//! Domain logic for client-side operations.
//!
//! This module contains pure functions and types that implement the
//! client's decision logic without side effects, making them easy to
//! test.

use serde::Deserialize;
use std::collections::BTreeMap;

use hiroba_server::infrastructure::dto::websocket::{ClientEvent, MessageDto};

/// Server events as the client sees them: the tagged union of every
/// outbound notification the relay emits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    NameSet { name: String },
    NameExistsError { name: String },
    UserChange { content: String },
    MoveToRoom { code: String },
    RoomDoesNotExist { code: String },
    NotInRoom { code: String },
    ReceiveMessage { code: String, message: MessageDto },
    RoomList { rooms: BTreeMap<String, Vec<String>> },
    RoomUsers { code: String, users: Vec<String> },
}

/// Session-local view of what the server confirmed so far.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub username: Option<String>,
    pub current_room: Option<String>,
}

impl SessionState {
    /// Fold a server event into the session state.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::NameSet { name } => self.username = Some(name.clone()),
            ServerEvent::MoveToRoom { code } => self.current_room = Some(code.clone()),
            _ => {}
        }
    }
}

/// What the user asked for on one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetName(String),
    CreateRoom,
    JoinRoom(String),
    LeaveRoom,
    GetRooms,
    GetRoomUsers,
    Chat(String),
    Help,
    Invalid(String),
}

/// Parse one input line into a command. Lines starting with `/` are
/// slash commands; anything else is a chat message for the current room.
pub fn parse_input(line: &str) -> Command {
    let line = line.trim();
    if !line.starts_with('/') {
        return Command::Chat(line.to_string());
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "/name" if !rest.is_empty() => Command::SetName(rest.to_string()),
        "/create" => Command::CreateRoom,
        "/join" if !rest.is_empty() => Command::JoinRoom(rest.to_string()),
        "/leave" => Command::LeaveRoom,
        "/rooms" => Command::GetRooms,
        "/users" => Command::GetRoomUsers,
        "/help" => Command::Help,
        _ => Command::Invalid(line.to_string()),
    }
}

/// Turn a command into the event to send, given the session state.
/// Returns `Err` with a user-facing hint when the command cannot be sent
/// yet (e.g. chatting before claiming a name or joining a room).
pub fn to_client_event(
    command: Command,
    state: &SessionState,
    sent_at: i64,
) -> Result<ClientEvent, String> {
    match command {
        Command::SetName(name) => Ok(ClientEvent::SetName { name }),
        Command::CreateRoom => Ok(ClientEvent::CreateRoom),
        Command::JoinRoom(code) => Ok(ClientEvent::JoinRoom { code }),
        Command::LeaveRoom => match &state.current_room {
            Some(code) => Ok(ClientEvent::LeaveRoom { code: code.clone() }),
            None => Err("you are not in a room".to_string()),
        },
        Command::GetRooms => Ok(ClientEvent::GetRooms),
        Command::GetRoomUsers => match &state.current_room {
            Some(code) => Ok(ClientEvent::GetRoomsWithUsers { code: code.clone() }),
            None => Err("you are not in a room".to_string()),
        },
        Command::Chat(content) => {
            let Some(owner) = state.username.clone() else {
                return Err("set a name first with /name <name>".to_string());
            };
            let Some(code) = state.current_room.clone() else {
                return Err("join a room first with /join <code>".to_string());
            };
            Ok(ClientEvent::SendMessage {
                code,
                message: MessageDto {
                    owner,
                    content,
                    sent_at,
                },
            })
        }
        Command::Help | Command::Invalid(_) => {
            Err("commands: /name <name>, /create, /join <code>, /leave, /rooms, /users".to_string())
        }
    }
}
