use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::store::{StateStore, StoreError, keys};

/// Onboarding flags as seen by the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub onboarded: bool,
    pub agent_name: String,
}

/// Owns the onboarding flags and writes them through to the injected store.
pub struct SessionController {
    store: Arc<dyn StateStore>,
    state: SessionState,
}

impl SessionController {
    /// Read the session flags from the store.
    /// Anything but the literal `"true"` counts as not onboarded.
    pub async fn load(store: Arc<dyn StateStore>) -> Result<Self, StoreError> {
        let onboarded = store.get(keys::ONBOARDED).await?.as_deref() == Some("true");
        let agent_name = store.get(keys::AGENT_NAME).await?.unwrap_or_default();
        debug!(
            "Loaded session: onboarded={}, agent_name='{}'",
            onboarded, agent_name
        );

        Ok(Self {
            store,
            state: SessionState {
                onboarded,
                agent_name,
            },
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_onboarded(&self) -> bool {
        self.state.onboarded
    }

    pub fn agent_name(&self) -> &str {
        &self.state.agent_name
    }

    /// Complete onboarding with the given agent name.
    ///
    /// Returns `Ok(false)` without touching the store when the trimmed name is
    /// empty or onboarding already happened. Only `reset` reopens onboarding.
    pub async fn submit_agent_name(&mut self, name: &str) -> Result<bool, StoreError> {
        if self.state.onboarded {
            debug!("Already onboarded, ignoring agent name");
            return Ok(false);
        }
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring empty agent name");
            return Ok(false);
        }

        self.store.set(keys::AGENT_NAME, name).await?;
        self.store.set(keys::ONBOARDED, "true").await?;
        self.state = SessionState {
            onboarded: true,
            agent_name: name.to_string(),
        };

        info!("Onboarding complete for agent '{}'", name);
        Ok(true)
    }

    /// Wipe the whole store and return to the pre-onboarding state.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.store.clear().await?;
        self.state = SessionState::default();
        info!("Session reset, all persisted state cleared");
        Ok(())
    }
}
