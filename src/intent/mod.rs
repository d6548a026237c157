//! Intent subsystem — intent types, responses, and handler dispatch.

pub mod model;
pub mod registry;
pub mod scripted;

pub use model::{Card, Intent, IntentResponse, Slot, Speech, SpeechType};
pub use registry::{IntentHandler, IntentRegistry};
pub use scripted::ScriptedIntentHandler;
