//! `conversation.process` service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::registry::AgentRegistry;
use super::translate::log_service_outcome;
use super::{DOMAIN, SERVICE_PROCESS};
use crate::error::{AgentError, ServiceError};
use crate::services::{ServiceHandler, parse_service_data};

#[derive(Debug, Deserialize)]
struct ProcessData {
    text: String,
}

/// Processes text with the active agent and discards the response.
pub struct ProcessService {
    agents: Arc<AgentRegistry>,
}

impl ProcessService {
    pub fn new(agents: Arc<AgentRegistry>) -> Self {
        Self { agents }
    }

    fn failed(source: AgentError) -> ServiceError {
        ServiceError::Failed {
            domain: DOMAIN.to_string(),
            service: SERVICE_PROCESS.to_string(),
            source,
        }
    }
}

#[async_trait]
impl ServiceHandler for ProcessService {
    async fn call(&self, data: serde_json::Value) -> Result<(), ServiceError> {
        let ProcessData { text } = parse_service_data(DOMAIN, SERVICE_PROCESS, data)?;
        debug!("Processing: <{}>", text);

        let agent = self.agents.get_or_create().await.map_err(Self::failed)?;
        let outcome = agent.process(&text).await.map_err(Self::failed)?;
        log_service_outcome(&text, outcome);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use crate::config::ConversationConfig;
    use crate::conversation::agent::{ConversationAgent, ProcessOutcome};
    use crate::conversation::registry::AgentFactory;
    use crate::error::IntentHandleError;

    struct FailingAgent;

    #[async_trait]
    impl ConversationAgent for FailingAgent {
        async fn process(&self, _text: &str) -> Result<ProcessOutcome, AgentError> {
            Ok(ProcessOutcome::Failed(IntentHandleError::new("foo")))
        }
    }

    struct ExplodingAgent;

    #[async_trait]
    impl ConversationAgent for ExplodingAgent {
        async fn process(&self, _text: &str) -> Result<ProcessOutcome, AgentError> {
            Err(AgentError::Backend("connection reset".into()))
        }
    }

    /// Collects formatted log output.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn registry_with(agent: Arc<dyn ConversationAgent>) -> Arc<AgentRegistry> {
        let factory: AgentFactory = Arc::new(|| -> Box<dyn ConversationAgent> {
            panic!("default agent must not be created")
        });
        let registry = AgentRegistry::with_factory(ConversationConfig::default(), factory);
        registry.set_agent(agent);
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_intent_failure_is_logged_not_returned() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let service = ProcessService::new(registry_with(Arc::new(FailingAgent)));
        let result = service
            .call(serde_json::json!({"text": "turn on the oven"}))
            .await;

        assert!(result.is_ok());
        let output = logs.contents();
        assert!(output.contains("ERROR"), "log output: {output}");
        assert!(
            output.contains("Error processing turn on the oven: foo"),
            "log output: {output}"
        );
    }

    #[tokio::test]
    async fn test_missing_text_is_invalid_data() {
        let service = ProcessService::new(registry_with(Arc::new(FailingAgent)));
        let err = service.call(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidData { .. }));
    }

    #[tokio::test]
    async fn test_unexpected_agent_error_propagates() {
        let service = ProcessService::new(registry_with(Arc::new(ExplodingAgent)));
        let err = service
            .call(serde_json::json!({"text": "hello"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Failed { .. }));
    }
}
