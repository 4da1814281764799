//! Notes and chat sessions
//!
//! Notes are kept newest first in a single persisted list. Each note carries
//! its own chat thread; the global assistant chat lives in [`ChatSessions`].

mod sessions;

pub use sessions::{ChatSession, ChatSessions, MAX_SAVED_SESSIONS, TITLE_MAX_CHARS};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::billing::Quota;
use crate::storage::{self, SharedStore, NOTES_KEY};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

/// A transcribed voice note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub summary: String,
    /// Selected notes are sent as context to the assistant chat
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

impl Note {
    pub fn new(created_at: DateTime<Utc>, text: String, summary: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            text,
            summary,
            selected: true,
            chat_history: Vec::new(),
        }
    }
}

pub struct NotesStore {
    notes: Vec<Note>,
    store: SharedStore,
}

impl NotesStore {
    pub fn load(store: SharedStore) -> Self {
        let notes = storage::load_or_default(store.as_ref(), NOTES_KEY, Vec::new);
        debug!(count = notes.len(), "Loaded notes");
        Self { notes, store }
    }

    /// All notes, newest first
    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Add a note at the front with an empty chat thread
    pub fn add(&mut self, mut note: Note) {
        note.chat_history.clear();
        self.notes.insert(0, note);
        self.persist();
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        let removed = self.notes.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Flip selection; returns the new state
    pub fn toggle_select(&mut self, id: &str) -> Option<bool> {
        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        note.selected = !note.selected;
        let selected = note.selected;
        self.persist();
        Some(selected)
    }

    pub fn selected(&self) -> Vec<Note> {
        self.notes.iter().filter(|n| n.selected).cloned().collect()
    }

    pub fn chat_history(&self, id: &str) -> Vec<ChatMessage> {
        self.get(id)
            .map(|n| n.chat_history.clone())
            .unwrap_or_default()
    }

    pub fn update_chat_history(&mut self, id: &str, messages: Vec<ChatMessage>) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        note.chat_history = messages;
        self.persist();
        true
    }

    /// Notes created within the history window ending at `now`
    pub fn within_history(&self, window: Quota, now: DateTime<Utc>) -> Vec<Note> {
        match window {
            Quota::Unlimited => self.notes.clone(),
            Quota::Limited(days) => {
                let cutoff = now - Duration::days(i64::from(days));
                self.notes
                    .iter()
                    .filter(|n| n.created_at >= cutoff)
                    .cloned()
                    .collect()
            }
        }
    }

    fn persist(&self) {
        storage::persist_or_warn(self.store.as_ref(), NOTES_KEY, &self.notes);
    }
}
