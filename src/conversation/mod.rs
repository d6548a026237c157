//! Conversation integration — a pluggable agent behind a service, an HTTP
//! endpoint, and WebSocket commands.
//!
//! Every entry point asks the [`AgentRegistry`] for the active agent, creating
//! the default one on first use, and never assumes another entry point ran
//! first.

pub mod agent;
pub mod commands;
pub mod default_agent;
pub mod http;
pub mod registry;
pub mod service;
pub mod translate;

pub use agent::{Attribution, ConversationAgent, ProcessOutcome};
pub use default_agent::DefaultAgent;
pub use http::conversation_routes;
pub use registry::{AgentFactory, AgentRegistry};
pub use translate::FALLBACK_SPEECH;

use std::sync::Arc;

use axum::Router;

use commands::{AttributionCommand, GetOnboardingCommand, SetOnboardingCommand};
use service::ProcessService;

use crate::services::ServiceRegistry;
use crate::websocket::CommandRegistry;

pub const DOMAIN: &str = "conversation";
pub const SERVICE_PROCESS: &str = "process";

pub const WS_TYPE_GET_ONBOARDING: &str = "conversation/onboarding/get";
pub const WS_TYPE_SET_ONBOARDING: &str = "conversation/onboarding/set";
pub const WS_TYPE_GET_ATTRIBUTION: &str = "conversation/attribution";

/// Register the `process` service and the WebSocket commands, and return the
/// HTTP routes.
pub async fn setup(
    agents: Arc<AgentRegistry>,
    services: &ServiceRegistry,
    commands: &CommandRegistry,
) -> Router {
    services
        .register(
            DOMAIN,
            SERVICE_PROCESS,
            Arc::new(ProcessService::new(Arc::clone(&agents))),
        )
        .await;

    commands
        .register(
            WS_TYPE_GET_ATTRIBUTION,
            Arc::new(AttributionCommand::new(Arc::clone(&agents))),
        )
        .await;
    commands
        .register(
            WS_TYPE_GET_ONBOARDING,
            Arc::new(GetOnboardingCommand::new(Arc::clone(&agents))),
        )
        .await;
    commands
        .register(
            WS_TYPE_SET_ONBOARDING,
            Arc::new(SetOnboardingCommand::new(Arc::clone(&agents))),
        )
        .await;

    conversation_routes(agents)
}
