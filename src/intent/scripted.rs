//! Handler that answers an intent with a configured speech template.

use async_trait::async_trait;

use super::model::{Intent, IntentResponse};
use super::registry::IntentHandler;
use crate::error::{IntentError, IntentHandleError};

/// Speaks a fixed template, substituting `{slot}` placeholders with slot values.
pub struct ScriptedIntentHandler {
    intent_type: String,
    template: String,
    required: Vec<String>,
}

impl ScriptedIntentHandler {
    pub fn new(intent_type: impl Into<String>, template: impl Into<String>) -> Self {
        let template = template.into();
        let required = placeholders(&template);
        Self {
            intent_type: intent_type.into(),
            template,
            required,
        }
    }

    /// Replace every placeholder, `{ name }` included, with its slot value.
    fn render(&self, intent: &Intent) -> Result<String, IntentHandleError> {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some((start, end, name)) = next_placeholder(rest) {
            out.push_str(&rest[..start]);
            if name.is_empty() {
                out.push_str(&rest[start..end]);
            } else {
                let value = intent.slot_value(name).ok_or_else(|| {
                    IntentHandleError::new(format!("Missing value for {name}"))
                })?;
                out.push_str(value);
            }
            rest = &rest[end..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[async_trait]
impl IntentHandler for ScriptedIntentHandler {
    fn intent_type(&self) -> &str {
        &self.intent_type
    }

    fn required_slots(&self) -> &[String] {
        &self.required
    }

    async fn handle(&self, intent: &Intent) -> Result<IntentResponse, IntentError> {
        let speech = self.render(intent)?;
        Ok(IntentResponse::new().with_speech(speech))
    }
}

/// The first `{...}` in `text`: its byte range and trimmed name.
fn next_placeholder(text: &str) -> Option<(usize, usize, &str)> {
    let start = text.find('{')?;
    let len = text[start + 1..].find('}')?;
    let end = start + 1 + len + 1;
    Some((start, end, text[start + 1..end - 1].trim()))
}

/// Placeholder names in `template`, in order of first appearance.
fn placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some((_, end, name)) = next_placeholder(rest) {
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &rest[end..];
    }
    names
}
