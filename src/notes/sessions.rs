//! Assistant chat sessions
//!
//! One session is current; finished sessions are kept in a bounded history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatMessage, ChatRole};
use crate::clock::SharedClock;
use crate::storage::{self, SharedStore, CHAT_HISTORY_KEY, CURRENT_CHAT_KEY};
use crate::utils::truncate_with_ellipsis;

/// Saved sessions beyond this are dropped, oldest first
pub const MAX_SAVED_SESSIONS: usize = 50;

/// Length of a title derived from the first user message
pub const TITLE_MAX_CHARS: usize = 40;

const NEW_SESSION_TITLE: &str = "New conversation";
const FALLBACK_TITLE: &str = "Conversation";
const GREETING: &str = "👋 **Hello!** I'm your notes assistant.\n\n\
                        Select notes to give our conversation more context.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Title taken from the first user message
    pub fn derived_title(&self) -> String {
        self.messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| truncate_with_ellipsis(&m.content, TITLE_MAX_CHARS))
            .unwrap_or_else(|| FALLBACK_TITLE.to_string())
    }
}

pub struct ChatSessions {
    history: Vec<ChatSession>,
    current: Option<ChatSession>,
    store: SharedStore,
    clock: SharedClock,
}

impl ChatSessions {
    pub fn load(store: SharedStore, clock: SharedClock) -> Self {
        let history = storage::load_or_default(store.as_ref(), CHAT_HISTORY_KEY, Vec::new);
        let current = storage::load_or_default(store.as_ref(), CURRENT_CHAT_KEY, || None);
        Self {
            history,
            current,
            store,
            clock,
        }
    }

    /// Saved sessions, most recent first
    pub fn history(&self) -> &[ChatSession] {
        &self.history
    }

    pub fn current(&self) -> Option<&ChatSession> {
        self.current.as_ref()
    }

    /// Start a new current session with a greeting
    pub fn create_session(&mut self) -> ChatSession {
        let now = self.now();
        let session = ChatSession {
            id: uuid::Uuid::new_v4().to_string(),
            title: NEW_SESSION_TITLE.to_string(),
            messages: vec![ChatMessage::ai(GREETING)],
            created_at: now,
            updated_at: now,
        };
        self.current = Some(session.clone());
        self.persist_current();
        debug!(session = %session.id, "Created chat session");
        session
    }

    /// Current session, creating one if needed
    pub fn current_or_create(&mut self) -> ChatSession {
        match &self.current {
            Some(session) => session.clone(),
            None => self.create_session(),
        }
    }

    /// Replace the current session's messages; no-op without a current session
    pub fn update_current(&mut self, messages: Vec<ChatMessage>, title: Option<String>) -> bool {
        let now = self.now();
        let Some(session) = self.current.as_mut() else {
            return false;
        };
        session.messages = messages;
        session.updated_at = now;
        if let Some(title) = title {
            session.title = title;
        }
        self.persist_current();
        true
    }

    /// Save the current session into history
    ///
    /// Sessions holding only the greeting are not saved.
    pub fn save_current_to_history(&mut self) -> bool {
        match self.current.clone() {
            Some(current) => self.save_to_history(current),
            None => false,
        }
    }

    /// Append a user message and its reply to the session `origin` was taken from
    ///
    /// The session is looked up by id when the reply arrives, so it does not
    /// need to be current any more. A fresh session that was never saved is
    /// rebuilt from `origin`. The updated session is saved to history. Returns
    /// `None` when the session was deleted in the meantime.
    pub fn append_exchange(
        &mut self,
        origin: &ChatSession,
        user: ChatMessage,
        reply: ChatMessage,
    ) -> Option<ChatSession> {
        let id = origin.id.as_str();
        let now = self.now();
        let is_current = self.current.as_ref().is_some_and(|s| s.id == id);
        let saved = self.history.iter().find(|s| s.id == id).cloned();
        let mut session = match (is_current, saved) {
            (true, _) => self.current.clone()?,
            (false, Some(saved)) => saved,
            // Sessions holding only the greeting never reach history
            (false, None) if origin.messages.len() <= 1 => origin.clone(),
            (false, None) => return None,
        };

        session.messages.push(user);
        session.messages.push(reply);
        session.updated_at = now;

        if is_current {
            self.current = Some(session.clone());
            self.persist_current();
        }
        self.save_to_history(session.clone());
        debug!(session = %id, messages = session.messages.len(), "Appended chat exchange");
        Some(session)
    }

    fn save_to_history(&mut self, mut session: ChatSession) -> bool {
        if session.messages.len() <= 1 {
            return false;
        }
        session.title = session.derived_title();

        self.history.retain(|s| s.id != session.id);
        self.history.insert(0, session);
        self.history.truncate(MAX_SAVED_SESSIONS);
        self.persist_history();
        true
    }

    pub fn load_session(&mut self, id: &str) -> bool {
        let Some(session) = self.history.iter().find(|s| s.id == id).cloned() else {
            return false;
        };
        self.current = Some(session);
        self.persist_current();
        true
    }

    pub fn delete_session(&mut self, id: &str) -> bool {
        let before = self.history.len();
        self.history.retain(|s| s.id != id);
        let removed = self.history.len() != before;
        if removed {
            self.persist_history();
        }

        if self.current.as_ref().is_some_and(|s| s.id == id) {
            self.current = None;
            if let Err(e) = self.store.remove(CURRENT_CHAT_KEY) {
                warn!(error = %e, "Failed to clear current chat");
            }
            return true;
        }
        removed
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn persist_history(&self) {
        storage::persist_or_warn(self.store.as_ref(), CHAT_HISTORY_KEY, &self.history);
    }

    fn persist_current(&self) {
        if let Some(current) = &self.current {
            storage::persist_or_warn(self.store.as_ref(), CURRENT_CHAT_KEY, current);
        }
    }
}
