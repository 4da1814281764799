//! Chat commands
//!
//! - send_chat_message: global assistant chat with selected notes as context
//! - send_note_chat_message: chat about a single note
//! - session management for the global chat history drawer

use tracing::{debug, info};

use super::{record_success, require};
use crate::ai;
use crate::billing::Feature;
use crate::error::CommandError;
use crate::notes::{ChatMessage, ChatSession};
use crate::state::AppState;
use crate::utils::lock_or_recover;

fn non_empty(message: &str) -> Result<&str, CommandError> {
    let message = message.trim();
    if message.is_empty() {
        Err(CommandError::EmptyMessage)
    } else {
        Ok(message)
    }
}

/// Send a message in the current session and save the exchange to history
///
/// The reply is appended to the session the message was sent from, even if
/// another session became current while waiting.
pub async fn send_chat_message(
    state: &AppState,
    message: &str,
) -> Result<ChatSession, CommandError> {
    let message = non_empty(message)?;

    // === BILLING: Check limits before API call ===
    require(state, Feature::Chat)?;

    let session = lock_or_recover(&state.chats).current_or_create();
    let context = lock_or_recover(&state.notes).selected();
    debug!(
        session = %session.id,
        context_notes = context.len(),
        "Sending chat message"
    );

    let reply = ai::chat_reply(state.generator.as_ref(), message, &context).await?;

    let updated = lock_or_recover(&state.chats)
        .append_exchange(&session, ChatMessage::user(message), ChatMessage::ai(reply))
        .ok_or_else(|| CommandError::SessionNotFound(session.id.clone()))?;

    // === BILLING: Record usage on success ===
    record_success(state, Feature::Chat);

    Ok(updated)
}

/// Send a message about one note and append the exchange to its thread
pub async fn send_note_chat_message(
    state: &AppState,
    note_id: &str,
    message: &str,
) -> Result<Vec<ChatMessage>, CommandError> {
    let message = non_empty(message)?;
    let note = lock_or_recover(&state.notes)
        .get(note_id)
        .cloned()
        .ok_or_else(|| CommandError::NoteNotFound(note_id.to_string()))?;

    require(state, Feature::Chat)?;

    let reply = ai::chat_reply(state.generator.as_ref(), message, &[note]).await?;

    let thread = {
        let mut notes = lock_or_recover(&state.notes);
        let mut thread = notes.chat_history(note_id);
        thread.push(ChatMessage::user(message));
        thread.push(ChatMessage::ai(reply));
        if !notes.update_chat_history(note_id, thread.clone()) {
            return Err(CommandError::NoteNotFound(note_id.to_string()));
        }
        thread
    };

    record_success(state, Feature::Chat);
    Ok(thread)
}

/// Save the current session and start a fresh one
pub fn new_chat_session(state: &AppState) -> ChatSession {
    let mut chats = lock_or_recover(&state.chats);
    chats.save_current_to_history();
    let session = chats.create_session();
    info!(session = %session.id, "Started new chat session");
    session
}

/// Current session, creating one on first use
pub fn current_chat_session(state: &AppState) -> ChatSession {
    lock_or_recover(&state.chats).current_or_create()
}

pub fn load_chat_session(state: &AppState, id: &str) -> Result<ChatSession, CommandError> {
    let mut chats = lock_or_recover(&state.chats);
    if !chats.load_session(id) {
        return Err(CommandError::SessionNotFound(id.to_string()));
    }
    chats
        .current()
        .cloned()
        .ok_or_else(|| CommandError::SessionNotFound(id.to_string()))
}

pub fn delete_chat_session(state: &AppState, id: &str) -> Result<(), CommandError> {
    if lock_or_recover(&state.chats).delete_session(id) {
        info!(session = %id, "Deleted chat session");
        Ok(())
    } else {
        Err(CommandError::SessionNotFound(id.to_string()))
    }
}

/// Saved sessions, most recent first
pub fn chat_history(state: &AppState) -> Vec<ChatSession> {
    lock_or_recover(&state.chats).history().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::LimitDenialReason;
    use crate::commands::testing::{harness, state_with, GatedGenerator};
    use crate::commands::{create_note_from_transcript, get_subscription_info, toggle_note_selection};
    use crate::error::AiError;
    use crate::notes::ChatRole;
    use chrono::Duration;
    use std::sync::Arc;

    fn contents(session: &ChatSession) -> Vec<&str> {
        session.messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[tokio::test]
    async fn test_chat_exchange_saved_to_history() {
        let h = harness();
        h.generator.push_ok("Sure, here is what you said.");

        let session = send_chat_message(&h.state, "What did I record?").await.unwrap();
        let roles: Vec<_> = session.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [ChatRole::Ai, ChatRole::User, ChatRole::Ai]);
        assert_eq!(session.messages[2].content, "Sure, here is what you said.");

        let history = chat_history(&h.state);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].title, "What did I record?");
        assert!(h.generator.last_prompt().contains("No notes selected"));
    }

    #[tokio::test]
    async fn test_selected_notes_are_context() {
        let h = harness();
        h.generator.push_ok("Summary of the budget meeting");
        let kept = create_note_from_transcript(&h.state, "We agreed on the budget")
            .await
            .unwrap();
        h.generator.push_ok("Summary of a private thought");
        let hidden = create_note_from_transcript(&h.state, "Something private")
            .await
            .unwrap();
        toggle_note_selection(&h.state, &hidden.id).unwrap();

        send_chat_message(&h.state, "What was agreed?").await.unwrap();
        let prompt = h.generator.last_prompt();
        assert!(prompt.contains(&kept.summary));
        assert!(!prompt.contains(&hidden.summary));
    }

    #[tokio::test]
    async fn test_daily_chat_limit_and_reset() {
        let h = harness();
        for i in 0..10 {
            send_chat_message(&h.state, &format!("message {}", i))
                .await
                .unwrap();
        }

        let result = send_chat_message(&h.state, "one more").await;
        assert!(matches!(
            result,
            Err(CommandError::LimitReached(LimitDenialReason::DailyLimitReached {
                limit: 10,
                used: 10,
                ..
            }))
        ));
        assert_eq!(h.generator.calls(), 10);

        h.clock.advance(Duration::days(1));
        send_chat_message(&h.state, "next day").await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_reply_leaves_session_untouched() {
        let h = harness();
        let before = current_chat_session(&h.state);
        h.generator
            .push_err(AiError::QuotaExceeded("rate limited".to_string()));

        let result = send_chat_message(&h.state, "Hello?").await;
        assert!(matches!(result, Err(CommandError::Ai(_))));
        assert_eq!(current_chat_session(&h.state).messages, before.messages);
        assert!(chat_history(&h.state).is_empty());
        assert!(send_chat_message(&h.state, "   ").await.is_err());
    }

    #[tokio::test]
    async fn test_note_chat_thread() {
        let h = harness();
        let note = create_note_from_transcript(&h.state, "Notes about the garden plan")
            .await
            .unwrap();
        h.generator.push_ok("Plant tomatoes in May.");

        let thread = send_note_chat_message(&h.state, &note.id, "When do I plant?")
            .await
            .unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1].content, "Plant tomatoes in May.");

        assert!(matches!(
            send_note_chat_message(&h.state, "missing", "hi").await,
            Err(CommandError::NoteNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_session_management() {
        let h = harness();
        send_chat_message(&h.state, "First conversation").await.unwrap();
        let first = current_chat_session(&h.state);

        let fresh = new_chat_session(&h.state);
        assert_ne!(fresh.id, first.id);
        assert_eq!(fresh.messages.len(), 1);

        let loaded = load_chat_session(&h.state, &first.id).unwrap();
        assert_eq!(loaded.id, first.id);

        delete_chat_session(&h.state, &first.id).unwrap();
        assert!(chat_history(&h.state).is_empty());
        assert!(matches!(
            load_chat_session(&h.state, &first.id),
            Err(CommandError::SessionNotFound(_))
        ));
        assert!(delete_chat_session(&h.state, "missing").is_err());
    }

    #[tokio::test]
    async fn test_reply_lands_in_originating_session() {
        let generator = Arc::new(GatedGenerator::default());
        let state = state_with(generator.clone());

        let groceries = {
            let mut chats = lock_or_recover(&state.chats);
            let session = chats.create_session();
            let mut messages = session.messages.clone();
            messages.push(ChatMessage::user("about groceries"));
            messages.push(ChatMessage::ai("buy milk"));
            chats.update_current(messages, None);
            chats.save_current_to_history();
            session.id
        };
        let taxes = new_chat_session(&state).id;

        let send = send_chat_message(&state, "about taxes");
        let switch = async {
            generator.started.acquire().await.unwrap().forget();
            load_chat_session(&state, &groceries).unwrap();
            generator.release.add_permits(1);
        };
        let (sent, ()) = tokio::join!(send, switch);

        let sent = sent.unwrap();
        assert_eq!(sent.id, taxes);
        assert_eq!(
            contents(&sent)[1..],
            ["about taxes", "reply to about taxes"]
        );

        let current = current_chat_session(&state);
        assert_eq!(current.id, groceries);
        assert_eq!(contents(&current)[1..], ["about groceries", "buy milk"]);

        let history = chat_history(&state);
        let saved = history.iter().find(|s| s.id == groceries).unwrap();
        assert_eq!(contents(saved)[1..], ["about groceries", "buy milk"]);
        let saved = history.iter().find(|s| s.id == taxes).unwrap();
        assert_eq!(saved.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_sends_keep_both_exchanges() {
        let generator = Arc::new(GatedGenerator::default());
        let state = state_with(generator.clone());

        let first = send_chat_message(&state, "first question");
        let second = send_chat_message(&state, "second question");
        let release = async {
            generator.started.acquire_many(2).await.unwrap().forget();
            generator.release.add_permits(2);
        };
        let (first, second, ()) = tokio::join!(first, second, release);
        first.unwrap();
        second.unwrap();

        let current = current_chat_session(&state);
        assert_eq!(current.messages.len(), 5);
        assert!(contents(&current).contains(&"reply to first question"));
        assert!(contents(&current).contains(&"reply to second question"));
        assert_eq!(chat_history(&state)[0].messages.len(), 5);
        assert_eq!(get_subscription_info(&state).usage.chat_messages_today, 2);
    }

    #[tokio::test]
    async fn test_session_deleted_while_waiting_is_not_charged() {
        let generator = Arc::new(GatedGenerator::default());
        let state = state_with(generator.clone());
        let id = {
            let mut chats = lock_or_recover(&state.chats);
            let session = chats.create_session();
            let mut messages = session.messages.clone();
            messages.push(ChatMessage::user("about groceries"));
            messages.push(ChatMessage::ai("buy milk"));
            chats.update_current(messages, None);
            chats.save_current_to_history();
            session.id
        };

        let send = send_chat_message(&state, "and eggs?");
        let delete = async {
            generator.started.acquire().await.unwrap().forget();
            delete_chat_session(&state, &id).unwrap();
            generator.release.add_permits(1);
        };
        let (sent, ()) = tokio::join!(send, delete);

        assert!(matches!(sent, Err(CommandError::SessionNotFound(_))));
        assert!(chat_history(&state).is_empty());
        assert_eq!(get_subscription_info(&state).usage.chat_messages_today, 0);
    }
}
