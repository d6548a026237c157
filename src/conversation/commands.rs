//! WebSocket commands for onboarding and attribution.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::registry::AgentRegistry;
use crate::error::CommandError;
use crate::websocket::{CommandHandler, parse_command};

/// `conversation/onboarding/get`
pub struct GetOnboardingCommand {
    agents: Arc<AgentRegistry>,
}

impl GetOnboardingCommand {
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl CommandHandler for GetOnboardingCommand {
    async fn handle(&self, _msg: serde_json::Value) -> Result<serde_json::Value, CommandError> {
        let agent = self.agents.get_or_create().await?;
        Ok(agent.get_onboarding().await)
    }
}

#[derive(Debug, Deserialize)]
struct SetOnboardingMessage {
    data: serde_json::Map<String, serde_json::Value>,
}

/// `conversation/onboarding/set`
///
/// Answers a bare success when the agent accepts the data, an error otherwise.
pub struct SetOnboardingCommand {
    agents: Arc<AgentRegistry>,
}

impl SetOnboardingCommand {
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl CommandHandler for SetOnboardingCommand {
    async fn handle(&self, msg: serde_json::Value) -> Result<serde_json::Value, CommandError> {
        let SetOnboardingMessage { data } = parse_command(msg)?;
        let agent = self.agents.get_or_create().await?;

        if agent.set_onboarding(serde_json::Value::Object(data)).await {
            Ok(serde_json::Value::Null)
        } else {
            Err(CommandError::Unknown)
        }
    }
}

/// `conversation/attribution`
pub struct AttributionCommand {
    agents: Arc<AgentRegistry>,
}

impl AttributionCommand {
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl CommandHandler for AttributionCommand {
    async fn handle(&self, _msg: serde_json::Value) -> Result<serde_json::Value, CommandError> {
        let agent = self.agents.get_or_create().await?;
        serde_json::to_value(agent.attribution()).map_err(|e| {
            warn!(error = %e, "Failed to serialize attribution");
            CommandError::Unknown
        })
    }
}
