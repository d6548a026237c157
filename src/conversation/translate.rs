//! Turns agent outcomes into what each transport sends back.

use tracing::error;

use super::agent::ProcessOutcome;
use crate::intent::IntentResponse;

/// Speech used when the agent has nothing to say.
pub const FALLBACK_SPEECH: &str = "Sorry, I didn't understand that";

/// HTTP always answers with an intent response. Failures become speech.
pub fn to_http_response(outcome: ProcessOutcome) -> IntentResponse {
    match outcome {
        ProcessOutcome::Handled(response) => response,
        ProcessOutcome::NoMatch => IntentResponse::new().with_speech(FALLBACK_SPEECH),
        ProcessOutcome::Failed(err) => IntentResponse::new().with_speech(err.message),
    }
}

/// Service calls have no response channel: failures are logged and the
/// response is dropped.
pub fn log_service_outcome(text: &str, outcome: ProcessOutcome) {
    if let ProcessOutcome::Failed(err) = outcome {
        error!("Error processing {}: {}", text, err);
    }
}
