//! Intent handler registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{Intent, IntentResponse, Slot};
use crate::error::IntentError;

/// Handles one intent type.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// Intent type this handler answers, e.g. `HassTurnOn`.
    fn intent_type(&self) -> &str;

    /// Slots that must be present before `handle` is called.
    fn required_slots(&self) -> &[String] {
        &[]
    }

    async fn handle(&self, intent: &Intent) -> Result<IntentResponse, IntentError>;
}

/// Registry of intent handlers, keyed by intent type.
pub struct IntentRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn IntentHandler>>>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler. A later registration for the same type replaces
    /// the earlier one.
    pub async fn register(&self, handler: Arc<dyn IntentHandler>) {
        let intent_type = handler.intent_type().to_string();
        let previous = self
            .handlers
            .write()
            .await
            .insert(intent_type.clone(), handler);
        if previous.is_some() {
            tracing::warn!(intent = %intent_type, "Overwriting already registered intent handler");
        } else {
            tracing::debug!("Registered intent handler: {}", intent_type);
        }
    }

    pub async fn has(&self, intent_type: &str) -> bool {
        self.handlers.read().await.contains_key(intent_type)
    }

    /// List registered intent types.
    pub async fn list(&self) -> Vec<String> {
        self.handlers.read().await.keys().cloned().collect()
    }

    /// Build an intent and dispatch it to its handler.
    pub async fn handle(
        &self,
        intent_type: &str,
        slots: HashMap<String, Slot>,
        text: &str,
    ) -> Result<IntentResponse, IntentError> {
        let handler = self.handlers.read().await.get(intent_type).cloned().ok_or_else(|| {
            IntentError::UnknownIntent {
                intent_type: intent_type.to_string(),
            }
        })?;

        if let Some(missing) = handler
            .required_slots()
            .iter()
            .find(|name| !slots.contains_key(name.as_str()))
        {
            return Err(IntentError::InvalidSlotInfo {
                intent_type: intent_type.to_string(),
                slot: missing.clone(),
            });
        }

        let intent = Intent {
            intent_type: intent_type.to_string(),
            slots,
            text: text.to_string(),
        };

        tracing::info!(intent = %intent_type, "Handling intent");
        handler.handle(&intent).await
    }
}

impl Default for IntentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
