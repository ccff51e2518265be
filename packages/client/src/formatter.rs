//! Message formatting utilities for client display.

use std::collections::BTreeMap;

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::ServerEvent;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one server event for the terminal.
    pub fn format_event(event: &ServerEvent) -> String {
        match event {
            ServerEvent::NameSet { name } => {
                format!("\n* You are now '{}'\n", name)
            }
            ServerEvent::NameExistsError { name } => {
                format!("\n! The name '{}' is already taken, pick another\n", name)
            }
            ServerEvent::UserChange { content } => {
                format!("\n* {}\n", content)
            }
            ServerEvent::MoveToRoom { code } => {
                format!("\n* Moved to room '{}'\n", code)
            }
            ServerEvent::RoomDoesNotExist { code } => {
                format!("\n! No room with code '{}'\n", code)
            }
            ServerEvent::NotInRoom { code } => {
                format!("\n! You are not in room '{}'\n", code)
            }
            ServerEvent::ReceiveMessage { message, .. } => Self::format_chat_message(
                &message.owner,
                &message.content,
                message.sent_at,
            ),
            ServerEvent::RoomList { rooms } => Self::format_room_list(rooms),
            ServerEvent::RoomUsers { code, users } => Self::format_room_users(code, users),
        }
    }

    /// Format a chat message
    pub fn format_chat_message(from: &str, content: &str, sent_at: i64) -> String {
        let timestamp_str = timestamp_to_jst_rfc3339(sent_at);
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            from, content, timestamp_str
        )
    }

    /// Format the room list with member names
    pub fn format_room_list(rooms: &BTreeMap<String, Vec<String>>) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str("Rooms:\n");

        if rooms.is_empty() {
            output.push_str("(No rooms)\n");
        } else {
            for (code, users) in rooms {
                output.push_str(&format!("{} ({}): {}\n", code, users.len(), users.join(", ")));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format the member list of one room
    pub fn format_room_users(code: &str, users: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nUsers in '{}':\n", code));
        if users.is_empty() {
            output.push_str("(No users)\n");
        } else {
            for user in users {
                output.push_str(&format!("- {}\n", user));
            }
        }
        output
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    /// Format a local hint (input that could not be sent yet)
    pub fn format_hint(hint: &str) -> String {
        format!("\n! {}\n", hint)
    }
}
