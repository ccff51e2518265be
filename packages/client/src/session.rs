//! WebSocket client session management.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use hiroba_server::infrastructure::dto::websocket::ClientEvent;
use hiroba_shared::time::get_jst_timestamp;

use crate::{
    domain::{ServerEvent, SessionState, parse_input, to_client_event},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

fn prompt_name(state: &SessionState) -> String {
    state.username.clone().unwrap_or_default()
}

/// Run the WebSocket client session
pub async fn run_client_session(
    url: &str,
    initial_name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| Box::new(ClientError::ConnectionError(e.to_string())))?;

    tracing::info!("Connected to chat relay!");
    println!(
        "\nConnected. Claim a name with /name <name>, then /join General or /create a room.\n\
         Type a message and press Enter to send. Press Ctrl+C to exit.\n"
    );

    let (mut write, mut read) = ws_stream.split();

    let state = Arc::new(Mutex::new(SessionState::default()));

    // Claim the name right away when it was passed on the command line
    if let Some(name) = initial_name {
        let event = ClientEvent::SetName {
            name: name.to_string(),
        };
        let json = serde_json::to_string(&event)?;
        write.send(Message::Text(json.into())).await?;
    }

    // Spawn a task to handle incoming server events
    let state_for_read = state.clone();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            let name = {
                                let mut state = state_for_read.lock().await;
                                state.apply(&event);
                                prompt_name(&state)
                            };
                            print!("{}", MessageFormatter::format_event(&event));
                            redisplay_prompt(&name);
                        }
                        Err(_) => {
                            // Unknown event shape, display as raw text
                            let name = prompt_name(&*state_for_read.lock().await);
                            print!("{}", MessageFormatter::format_raw_message(&text));
                            redisplay_prompt(&name);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline("> ") {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into client events
    let state_for_write = state.clone();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let command = parse_input(&line);
            let event = {
                let state = state_for_write.lock().await;
                to_client_event(command, &state, get_jst_timestamp())
            };

            match event {
                Ok(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to serialize event: {}", e);
                            continue;
                        }
                    };

                    if let Err(e) = write.send(Message::Text(json.into())).await {
                        tracing::warn!("Failed to send event: {}", e);
                        write_error = true;
                        break;
                    }
                }
                Err(hint) => {
                    let name = prompt_name(&*state_for_write.lock().await);
                    print!("{}", MessageFormatter::format_hint(&hint));
                    redisplay_prompt(&name);
                }
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            let connection_error = read_result.unwrap_or(false);
            if connection_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            let write_error = write_result.unwrap_or(false);
            if write_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}
