//! WebSocket command API — request/response commands matched by id.
//!
//! Client frames look like `{"id": 5, "type": "conversation/attribution"}`.
//! Every command gets exactly one `result` frame back carrying the same id.
//! Commands run in their own tasks, so a slow command never blocks the
//! connection or other in-flight commands.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::error::CommandError;

/// Handles one command type.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command. `msg` is the full client frame.
    ///
    /// `Ok(value)` is sent as a successful result (`null` for commands with
    /// no payload); `Err` as an error result.
    async fn handle(&self, msg: serde_json::Value) -> Result<serde_json::Value, CommandError>;
}

/// Deserialize a client frame into a typed command, mapping failures to
/// `InvalidFormat`.
pub fn parse_command<T: serde::de::DeserializeOwned>(
    msg: serde_json::Value,
) -> Result<T, CommandError> {
    serde_json::from_value(msg).map_err(|e| CommandError::InvalidFormat(e.to_string()))
}

/// Registry of command handlers, keyed by command type.
pub struct CommandRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, command_type: &str, handler: Arc<dyn CommandHandler>) {
        self.handlers
            .write()
            .await
            .insert(command_type.to_string(), handler);
        debug!("Registered websocket command: {}", command_type);
    }

    pub async fn has(&self, command_type: &str) -> bool {
        self.handlers.read().await.contains_key(command_type)
    }

    pub async fn get(&self, command_type: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.read().await.get(command_type).cloned()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ── JSON Protocol ───────────────────────────────────────────────────────

/// The fields every client frame must carry.
#[derive(Debug, Deserialize)]
struct CommandEnvelope {
    id: u64,
    #[serde(rename = "type")]
    command_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Message from server → client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Result {
        id: u64,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<ErrorBody>,
    },
    Pong {
        id: u64,
    },
}

impl ServerMessage {
    pub fn result(id: u64, result: serde_json::Value) -> Self {
        Self::Result {
            id,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, err: &CommandError) -> Self {
        Self::Result {
            id,
            success: false,
            result: None,
            error: Some(ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

// ── Connection ──────────────────────────────────────────────────────────

/// Build the Axum router with the `/api/websocket` endpoint.
pub fn websocket_routes(commands: Arc<CommandRegistry>) -> Router {
    Router::new()
        .route("/api/websocket", get(ws_handler))
        .with_state(commands)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(commands): State<Arc<CommandRegistry>>,
) -> impl IntoResponse {
    debug!("Command connection upgrade requested");
    ws.on_upgrade(|socket| handle_socket(socket, commands))
}

async fn handle_socket(mut socket: WebSocket, commands: Arc<CommandRegistry>) {
    info!("Command connection opened");

    // Command tasks report back through this channel.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    loop {
        tokio::select! {
            Some(reply) = rx.recv() => {
                let json = match serde_json::to_string(&reply) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "Dropping unserializable command reply");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!("Command reply not delivered, peer gone");
                    break;
                }
            }

            frame = socket.recv() => match frame {
                Some(Ok(Message::Text(text))) => dispatch(&text, &commands, &tx).await,
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(error = %e, "Command connection read failed");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Command connection closed");
}

/// Parse one client frame and start the matching command.
async fn dispatch(
    text: &str,
    commands: &CommandRegistry,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) {
    let msg: serde_json::Value = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(error = %e, "Received invalid JSON");
            let err = CommandError::InvalidFormat(e.to_string());
            let _ = tx.send(ServerMessage::error(0, &err));
            return;
        }
    };

    let envelope: CommandEnvelope = match serde_json::from_value(msg.clone()) {
        Ok(envelope) => envelope,
        Err(e) => {
            let id = msg.get("id").and_then(|v| v.as_u64()).unwrap_or(0);
            let err = CommandError::InvalidFormat(e.to_string());
            let _ = tx.send(ServerMessage::error(id, &err));
            return;
        }
    };

    if envelope.command_type == "ping" {
        let _ = tx.send(ServerMessage::Pong { id: envelope.id });
        return;
    }

    let Some(handler) = commands.get(&envelope.command_type).await else {
        warn!(command = %envelope.command_type, "Unknown websocket command");
        let _ = tx.send(ServerMessage::error(envelope.id, &CommandError::UnknownCommand));
        return;
    };

    let tx = tx.clone();
    tokio::spawn(async move {
        let reply = match handler.handle(msg).await {
            Ok(value) => ServerMessage::result(envelope.id, value),
            Err(e) => {
                debug!(id = envelope.id, error = %e, "Command failed");
                ServerMessage::error(envelope.id, &e)
            }
        };
        // Receiver is gone once the client disconnects.
        let _ = tx.send(reply);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_result_with_null_payload_keeps_result_field() {
        let json = serde_json::to_value(ServerMessage::result(7, serde_json::Value::Null)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "type": "result", "success": true, "result": null})
        );
    }

    #[test]
    fn error_result_shape() {
        let json =
            serde_json::to_value(ServerMessage::error(3, &CommandError::UnknownCommand)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "type": "result",
                "success": false,
                "error": {"code": "unknown_command", "message": "Unknown command."}
            })
        );
    }

    #[test]
    fn pong_shape() {
        let json = serde_json::to_value(ServerMessage::Pong { id: 9 }).unwrap();
        assert_eq!(json, serde_json::json!({"id": 9, "type": "pong"}));
    }

    #[derive(Debug, Deserialize)]
    struct WithData {
        data: serde_json::Map<String, serde_json::Value>,
    }

    #[test]
    fn parse_command_reports_invalid_format() {
        let ok: WithData = parse_command(serde_json::json!({"id": 1, "data": {"a": 1}})).unwrap();
        assert_eq!(ok.data["a"], 1);

        let err = parse_command::<WithData>(serde_json::json!({"id": 1, "data": [1]})).unwrap_err();
        assert_eq!(err.code(), "invalid_format");
    }

    struct EchoCommand;

    #[async_trait]
    impl CommandHandler for EchoCommand {
        async fn handle(&self, msg: serde_json::Value) -> Result<serde_json::Value, CommandError> {
            Ok(msg["payload"].clone())
        }
    }

    #[tokio::test]
    async fn dispatch_routes_to_handler() {
        let commands = CommandRegistry::new();
        commands.register("test/echo", Arc::new(EchoCommand)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        dispatch(r#"{"id": 4, "type": "test/echo", "payload": "hi"}"#, &commands, &tx).await;
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::result(4, serde_json::json!("hi")));
    }

    #[tokio::test]
    async fn dispatch_unknown_and_malformed() {
        let commands = CommandRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        dispatch(r#"{"id": 1, "type": "nope"}"#, &commands, &tx).await;
        assert_eq!(
            rx.recv().await.unwrap(),
            ServerMessage::error(1, &CommandError::UnknownCommand)
        );

        dispatch(r#"{"id": 2}"#, &commands, &tx).await;
        match rx.recv().await.unwrap() {
            ServerMessage::Result { id, success, error, .. } => {
                assert_eq!(id, 2);
                assert!(!success);
                assert_eq!(error.unwrap().code, "invalid_format");
            }
            other => panic!("expected result, got {other:?}"),
        }

        dispatch("not json", &commands, &tx).await;
        assert!(matches!(rx.recv().await.unwrap(), ServerMessage::Result { success: false, .. }));

        dispatch(r#"{"id": 3, "type": "ping"}"#, &commands, &tx).await;
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::Pong { id: 3 });
    }
}
