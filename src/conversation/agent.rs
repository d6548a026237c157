//! The conversation agent contract.
//!
//! Every backend implements [`ConversationAgent`]. Only [`process`] is
//! required; attribution and onboarding have defaults so a minimal agent is a
//! single method.
//!
//! [`process`]: ConversationAgent::process

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ConversationConfig;
use crate::error::{AgentError, IntentHandleError};
use crate::intent::IntentResponse;

/// Display metadata naming the source behind an agent's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Outcome of processing one line of text.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// The agent produced a response.
    Handled(IntentResponse),
    /// Nothing matched; the agent has no response.
    NoMatch,
    /// An intent was recognised but could not be carried out.
    Failed(IntentHandleError),
}

#[async_trait]
pub trait ConversationAgent: Send + Sync {
    /// Attribution shown alongside responses, if any.
    fn attribution(&self) -> Option<Attribution> {
        None
    }

    /// Onboarding data; `false` means no onboarding is needed.
    async fn get_onboarding(&self) -> serde_json::Value {
        serde_json::Value::Bool(false)
    }

    /// Store new onboarding data. Returns whether the update was accepted.
    async fn set_onboarding(&self, _data: serde_json::Value) -> bool {
        true
    }

    /// One-time setup, run by the registry before the agent is first used.
    async fn initialize(&mut self, _config: &ConversationConfig) -> Result<(), AgentError> {
        Ok(())
    }

    /// Process a sentence.
    async fn process(&self, text: &str) -> Result<ProcessOutcome, AgentError>;
}
