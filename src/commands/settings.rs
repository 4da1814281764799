//! Settings commands

use tracing::info;

use crate::ai;
use crate::error::CommandError;
use crate::state::AppState;
use crate::storage::{KeyValueStore, API_KEY_KEY};

/// Save the AI API key; a blank key clears it
pub fn set_api_key(state: &AppState, key: &str) -> Result<(), CommandError> {
    let key = key.trim();
    if key.is_empty() {
        state.store.remove(API_KEY_KEY)?;
        info!("Cleared API key");
    } else {
        state.store.set(API_KEY_KEY, key)?;
        info!("Saved API key");
    }
    Ok(())
}

pub fn has_api_key(state: &AppState) -> Result<bool, CommandError> {
    Ok(state
        .store
        .get(API_KEY_KEY)?
        .is_some_and(|k| !k.trim().is_empty()))
}

/// Check the AI connection; does not count against any quota
pub async fn test_ai_connection(state: &AppState) -> Result<String, CommandError> {
    let preview = ai::test_connection(state.generator.as_ref()).await?;
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::get_subscription_info;
    use crate::commands::testing::harness;

    #[test]
    fn test_set_and_clear_api_key() {
        let h = harness();
        assert!(!has_api_key(&h.state).unwrap());

        set_api_key(&h.state, "  AIza-test  ").unwrap();
        assert_eq!(
            h.store.get(API_KEY_KEY).unwrap().as_deref(),
            Some("AIza-test")
        );
        assert!(has_api_key(&h.state).unwrap());

        set_api_key(&h.state, "").unwrap();
        assert!(!has_api_key(&h.state).unwrap());
    }

    #[tokio::test]
    async fn test_connection_preview() {
        let h = harness();
        h.generator.push_ok(&"x".repeat(150));

        let preview = test_ai_connection(&h.state).await.unwrap();
        assert_eq!(preview.len(), 100);
        assert_eq!(get_subscription_info(&h.state).usage.chat_messages_today, 0);
    }
}
