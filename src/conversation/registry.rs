//! Agent registry — the single slot holding the active conversation agent.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use super::agent::ConversationAgent;
use super::default_agent::DefaultAgent;
use crate::config::ConversationConfig;
use crate::error::AgentError;
use crate::intent::IntentRegistry;

/// Builds a fresh, uninitialized agent.
pub type AgentFactory = Arc<dyn Fn() -> Box<dyn ConversationAgent> + Send + Sync>;

/// Holds the process-wide conversation agent.
///
/// The slot starts empty. The first caller of [`get_or_create`] builds an
/// agent with the factory, initializes it with the conversation config and
/// stores it. [`set_agent`] replaces the slot outright.
///
/// No lock is held while an agent initializes. Two callers that both find the
/// slot empty will each build and initialize an agent; each uses its own for
/// that call and the last one stored stays in the slot. An agent installed
/// with [`set_agent`] while a creation is in flight is never overwritten by it.
///
/// [`get_or_create`]: AgentRegistry::get_or_create
/// [`set_agent`]: AgentRegistry::set_agent
pub struct AgentRegistry {
    slot: RwLock<Slot>,
    factory: AgentFactory,
    config: ConversationConfig,
}

#[derive(Default)]
struct Slot {
    agent: Option<Arc<dyn ConversationAgent>>,
    /// Bumped by every `set_agent`.
    generation: u64,
}

impl AgentRegistry {
    /// Registry whose default agent is a [`DefaultAgent`] over `intents`.
    pub fn new(config: ConversationConfig, intents: Arc<IntentRegistry>) -> Self {
        let factory: AgentFactory = Arc::new(move || -> Box<dyn ConversationAgent> {
            Box::new(DefaultAgent::new(Arc::clone(&intents)))
        });
        Self::with_factory(config, factory)
    }

    pub fn with_factory(config: ConversationConfig, factory: AgentFactory) -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            factory,
            config,
        }
    }

    /// The installed agent, without creating one.
    pub fn current(&self) -> Option<Arc<dyn ConversationAgent>> {
        self.slot
            .read()
            .expect("Agent slot lock poisoned")
            .agent
            .clone()
    }

    /// Install `agent` for all subsequent requests.
    pub fn set_agent(&self, agent: Arc<dyn ConversationAgent>) {
        let mut slot = self.slot.write().expect("Agent slot lock poisoned");
        slot.agent = Some(agent);
        slot.generation += 1;
        drop(slot);
        info!("Conversation agent installed");
    }

    /// Return the installed agent, creating and initializing the default one
    /// if the slot is empty.
    ///
    /// An initialization failure leaves the slot empty. If an agent was
    /// installed with `set_agent` while this one initialized, the installed
    /// agent is kept and returned instead.
    pub async fn get_or_create(&self) -> Result<Arc<dyn ConversationAgent>, AgentError> {
        let generation = {
            let slot = self.slot.read().expect("Agent slot lock poisoned");
            if let Some(agent) = &slot.agent {
                return Ok(Arc::clone(agent));
            }
            slot.generation
        };

        let mut agent = (self.factory)();
        agent.initialize(&self.config).await?;
        let agent: Arc<dyn ConversationAgent> = Arc::from(agent);

        let mut slot = self.slot.write().expect("Agent slot lock poisoned");
        if slot.generation != generation {
            if let Some(installed) = &slot.agent {
                debug!("Agent installed during creation, discarding default");
                return Ok(Arc::clone(installed));
            }
        }
        slot.agent = Some(Arc::clone(&agent));
        drop(slot);
        info!("Default conversation agent created");
        Ok(agent)
    }
}
