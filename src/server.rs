//! Host application state and the HTTP/WebSocket server.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ConversationConfig, ServerConfig};
use crate::conversation::{self, AgentRegistry};
use crate::intent::IntentRegistry;
use crate::services::{ServiceRegistry, service_routes};
use crate::websocket::{CommandRegistry, websocket_routes};

/// Everything the host owns and hands to integrations.
#[derive(Clone)]
pub struct AppState {
    pub intents: Arc<IntentRegistry>,
    pub agents: Arc<AgentRegistry>,
    pub services: Arc<ServiceRegistry>,
    pub commands: Arc<CommandRegistry>,
}

impl AppState {
    /// State whose agent registry creates a default agent over a fresh
    /// intent registry.
    pub fn new(config: ConversationConfig) -> Self {
        let intents = Arc::new(IntentRegistry::new());
        let agents = Arc::new(AgentRegistry::new(config, Arc::clone(&intents)));
        Self::with_agents(intents, agents)
    }

    pub fn with_agents(intents: Arc<IntentRegistry>, agents: Arc<AgentRegistry>) -> Self {
        Self {
            intents,
            agents,
            services: Arc::new(ServiceRegistry::new()),
            commands: Arc::new(CommandRegistry::new()),
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "conversation-hub"
    }))
}

/// Set up the conversation integration and build the full router.
pub async fn build_router(state: &AppState, config: &ServerConfig) -> Router {
    let conversation = conversation::setup(
        Arc::clone(&state.agents),
        &state.services,
        &state.commands,
    )
    .await;

    let router = Router::new()
        .route("/health", get(health))
        .merge(conversation)
        .merge(service_routes(Arc::clone(&state.services)))
        .merge(websocket_routes(Arc::clone(&state.commands)))
        .layer(TraceLayer::new_for_http());

    match build_cors_layer(&config.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the configured origins; none configured means no CORS layer.
fn build_cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::error!("All configured CORS origins are invalid, CORS disabled");
        return None;
    }

    tracing::info!("CORS configured with {} origins", parsed.len());
    Some(
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Bind and serve until the listener fails.
pub async fn serve(state: AppState, config: ServerConfig) -> crate::Result<()> {
    let app = build_router(&state, &config).await;
    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    tracing::info!(addr = %config.socket_addr(), "Conversation server started");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_only_for_valid_origins() {
        assert!(build_cors_layer(&[]).is_none());
        assert!(build_cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(build_cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }

    #[tokio::test]
    async fn build_router_registers_conversation_integration() {
        let state = AppState::new(ConversationConfig::default());
        let _router = build_router(&state, &ServerConfig::default()).await;

        assert!(state.services.has("conversation", "process").await);
        assert!(state.commands.has("conversation/onboarding/get").await);
        assert!(state.commands.has("conversation/onboarding/set").await);
        assert!(state.commands.has("conversation/attribution").await);
        // Nothing has asked for the agent yet.
        assert!(state.agents.current().is_none());
    }
}
