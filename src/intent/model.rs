//! Intent data model — recognised intents and the responses they produce.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A single slot value extracted from the user's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub value: String,
}

impl Slot {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A recognised user request, ready to be handled.
#[derive(Debug, Clone)]
pub struct Intent {
    /// Intent type, e.g. `HassTurnOn`.
    pub intent_type: String,
    /// Slot values keyed by slot name.
    pub slots: HashMap<String, Slot>,
    /// The raw text the intent was recognised from.
    pub text: String,
}

impl Intent {
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(|s| s.value.as_str())
    }
}

/// How a speech payload should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechType {
    Plain,
    Ssml,
}

impl Default for SpeechType {
    fn default() -> Self {
        Self::Plain
    }
}

/// Speech payload for one speech type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speech {
    pub speech: String,
    #[serde(default)]
    pub extra_data: Option<serde_json::Value>,
}

/// A card payload for visual frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub content: String,
}

/// Result of handling an intent.
///
/// Serialises as `{"speech": {"plain": {...}}, "card": {"simple": {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentResponse {
    #[serde(default)]
    pub speech: BTreeMap<SpeechType, Speech>,
    #[serde(default)]
    pub card: BTreeMap<String, Card>,
}

impl IntentResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set plain speech.
    pub fn set_speech(&mut self, speech: impl Into<String>) {
        self.set_speech_with(SpeechType::Plain, speech, None);
    }

    pub fn set_speech_with(
        &mut self,
        speech_type: SpeechType,
        speech: impl Into<String>,
        extra_data: Option<serde_json::Value>,
    ) {
        self.speech.insert(
            speech_type,
            Speech {
                speech: speech.into(),
                extra_data,
            },
        );
    }

    /// Set a `simple` card.
    pub fn set_card(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.card.insert(
            "simple".to_string(),
            Card {
                title: title.into(),
                content: content.into(),
            },
        );
    }

    /// Builder form of [`set_speech`](Self::set_speech).
    pub fn with_speech(mut self, speech: impl Into<String>) -> Self {
        self.set_speech(speech);
        self
    }

    /// The plain speech text, if any.
    pub fn speech_text(&self) -> Option<&str> {
        self.speech
            .get(&SpeechType::Plain)
            .map(|s| s.speech.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_serializes_empty_maps() {
        let json = serde_json::to_value(IntentResponse::new()).unwrap();
        assert_eq!(json, serde_json::json!({"speech": {}, "card": {}}));
    }

    #[test]
    fn plain_speech_shape() {
        let response = IntentResponse::new().with_speech("Turned on the lights");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["speech"]["plain"]["speech"], "Turned on the lights");
        assert!(json["speech"]["plain"]["extra_data"].is_null());
        assert_eq!(response.speech_text(), Some("Turned on the lights"));
    }

    #[test]
    fn ssml_and_card() {
        let mut response = IntentResponse::new();
        response.set_speech_with(
            SpeechType::Ssml,
            "<speak>Hi</speak>",
            Some(serde_json::json!({"voice": "en"})),
        );
        response.set_card("Lights", "Kitchen light is on");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["speech"]["ssml"]["speech"], "<speak>Hi</speak>");
        assert_eq!(json["speech"]["ssml"]["extra_data"]["voice"], "en");
        assert_eq!(json["card"]["simple"]["title"], "Lights");
        assert_eq!(response.speech_text(), None);
    }

    #[test]
    fn set_speech_overwrites_previous_plain_speech() {
        let mut response = IntentResponse::new();
        response.set_speech("first");
        response.set_speech("second");
        assert_eq!(response.speech.len(), 1);
        assert_eq!(response.speech_text(), Some("second"));
    }
}
