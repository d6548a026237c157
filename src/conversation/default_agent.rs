//! Default agent — matches text against registered sentence templates and
//! dispatches the matching intent to the intent registry.
//!
//! Template syntax:
//! - `{name}` captures a slot called `name`
//! - `[the]` is an optional word or phrase
//! - runs of whitespace match any whitespace
//!
//! Matching is anchored and case-insensitive. The first template to match, in
//! registration order, wins.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::RwLock;
use tracing::debug;

use super::agent::{ConversationAgent, ProcessOutcome};
use crate::config::ConversationConfig;
use crate::error::{AgentError, IntentError};
use crate::intent::{IntentRegistry, ScriptedIntentHandler, Slot};

/// Splits a template into slot placeholders, optional groups, and literals.
static TEMPLATE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}|\[([\w ]+)\]\s*").expect("valid template regex"));

/// A compiled sentence template for one intent type.
#[derive(Debug)]
struct SentenceMatcher {
    intent_type: String,
    pattern: Regex,
}

impl SentenceMatcher {
    fn compile(intent_type: &str, template: &str) -> Result<Self, AgentError> {
        let mut pattern = String::from("(?i)^");
        let mut last = 0;

        for caps in TEMPLATE_PART.captures_iter(template) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            push_literal(&mut pattern, &template[last..whole.start]);
            if let Some(slot) = caps.get(1) {
                pattern.push_str(&format!(r"(?P<{}>[\w ]+?)\s*", slot.as_str()));
            } else if let Some(optional) = caps.get(2) {
                let words: Vec<String> = optional
                    .as_str()
                    .split_whitespace()
                    .map(regex::escape)
                    .collect();
                pattern.push_str(&format!(r"(?:{}\s*)?", words.join(r"\s+")));
            }
            last = whole.end;
        }
        push_literal(&mut pattern, &template[last..]);
        pattern.push('$');

        let pattern = Regex::new(&pattern).map_err(|e| AgentError::InvalidTemplate {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            intent_type: intent_type.to_string(),
            pattern,
        })
    }

    fn matches(&self, text: &str) -> Option<(String, HashMap<String, Slot>)> {
        let caps = self.pattern.captures(text)?;
        let slots = self
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), Slot::new(m.as_str().trim())))
            })
            .collect();
        Some((self.intent_type.clone(), slots))
    }
}

fn push_literal(pattern: &mut String, literal: &str) {
    let mut in_space = false;
    for ch in literal.chars() {
        if ch.is_whitespace() {
            if !in_space {
                pattern.push_str(r"\s+");
                in_space = true;
            }
        } else {
            in_space = false;
            pattern.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4])));
        }
    }
}

/// The agent the registry creates when no custom agent is installed.
pub struct DefaultAgent {
    intents: Arc<IntentRegistry>,
    matchers: RwLock<Vec<SentenceMatcher>>,
}

impl DefaultAgent {
    pub fn new(intents: Arc<IntentRegistry>) -> Self {
        Self {
            intents,
            matchers: RwLock::new(Vec::new()),
        }
    }

    /// Register sentence templates for an intent type.
    pub async fn register(
        &self,
        intent_type: &str,
        sentences: &[String],
    ) -> Result<(), AgentError> {
        let compiled = sentences
            .iter()
            .map(|s| SentenceMatcher::compile(intent_type, s))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(intent = %intent_type, count = compiled.len(), "Registered sentences");
        self.matchers.write().await.extend(compiled);
        Ok(())
    }

    /// Number of registered sentence templates.
    pub async fn sentence_count(&self) -> usize {
        self.matchers.read().await.len()
    }
}

#[async_trait]
impl ConversationAgent for DefaultAgent {
    async fn initialize(&mut self, config: &ConversationConfig) -> Result<(), AgentError> {
        for (intent_type, sentences) in &config.intents {
            self.register(intent_type, sentences).await?;
        }
        for (intent_type, template) in &config.responses {
            self.intents
                .register(Arc::new(ScriptedIntentHandler::new(intent_type, template)))
                .await;
        }
        tracing::info!(
            intents = config.intents.len(),
            responses = config.responses.len(),
            "Default conversation agent initialized"
        );
        Ok(())
    }

    async fn process(&self, text: &str) -> Result<ProcessOutcome, AgentError> {
        let text = text.trim();
        let matched = {
            let matchers = self.matchers.read().await;
            matchers.iter().find_map(|m| m.matches(text))
        };

        let Some((intent_type, slots)) = matched else {
            debug!(text = %text, "No sentence matched");
            return Ok(ProcessOutcome::NoMatch);
        };

        match self.intents.handle(&intent_type, slots, text).await {
            Ok(response) => Ok(ProcessOutcome::Handled(response)),
            Err(IntentError::Handle(err)) => Ok(ProcessOutcome::Failed(err)),
            Err(other) => Err(other.into()),
        }
    }
}
