//! Application commands
//!
//! Plain functions over [`AppState`] that a UI shell binds to. Gated commands
//! check the entitlement before calling the AI and record usage only after the
//! call succeeded. Locks are never held across an `.await`.

pub mod analysis;
pub mod billing;
pub mod chat;
pub mod notes;
pub mod settings;

pub use analysis::*;
pub use billing::*;
pub use chat::*;
pub use notes::*;
pub use settings::*;

use tracing::debug;

use crate::billing::{Feature, LimitCheckResult};
use crate::error::CommandError;
use crate::state::AppState;
use crate::utils::lock_or_recover;

/// Fail with the denial reason unless the feature may be used
fn require(state: &AppState, feature: Feature) -> Result<(), CommandError> {
    let result = lock_or_recover(&state.entitlements).check(feature);
    match result {
        LimitCheckResult::Allowed { remaining } => {
            debug!(feature = %feature, remaining = %remaining, "Limit check passed");
            Ok(())
        }
        LimitCheckResult::Denied { reason, .. } => {
            debug!(feature = %reason.feature(), "Command blocked by limit");
            Err(CommandError::LimitReached(reason))
        }
    }
}

fn record_success(state: &AppState, feature: Feature) {
    lock_or_recover(&state.entitlements).track_feature(feature);
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    use crate::ai::TextGenerator;
    use crate::billing::EntitlementPolicy;
    use crate::clock::ManualClock;
    use crate::error::AiError;
    use crate::state::AppState;
    use crate::storage::MemoryStore;

    /// Replays queued replies and records every prompt
    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, AiError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn push_ok(&self, reply: &str) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(reply.to_string()));
        }

        pub fn push_err(&self, error: AiError) {
            self.replies.lock().unwrap().push_back(Err(error));
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("ok".to_string()))
        }
    }

    pub struct Harness {
        pub state: AppState,
        pub generator: Arc<ScriptedGenerator>,
        pub clock: Arc<ManualClock>,
        pub store: Arc<MemoryStore>,
    }

    /// Holds every reply until the test hands out a permit
    pub struct GatedGenerator {
        pub started: Semaphore,
        pub release: Semaphore,
    }

    impl Default for GatedGenerator {
        fn default() -> Self {
            Self {
                started: Semaphore::new(0),
                release: Semaphore::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for GatedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.started.add_permits(1);
            self.release
                .acquire()
                .await
                .map_err(|e| AiError::Network(e.to_string()))?
                .forget();
            let question = prompt.lines().last().unwrap_or_default();
            Ok(format!("reply to {}", question))
        }
    }

    pub fn state_with(generator: Arc<dyn TextGenerator>) -> AppState {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at("2025-03-10T09:00:00Z").unwrap());
        AppState::with_parts(store, clock, generator, EntitlementPolicy::default())
    }

    pub fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at("2025-03-10T09:00:00Z").unwrap());
        let generator = Arc::new(ScriptedGenerator::default());
        let state = AppState::with_parts(
            store.clone(),
            clock.clone(),
            generator.clone(),
            EntitlementPolicy::default(),
        );
        Harness {
            state,
            generator,
            clock,
            store,
        }
    }
}
