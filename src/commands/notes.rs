//! Note commands

use chrono::Utc;
use tracing::info;

use super::{record_success, require};
use crate::ai;
use crate::billing::Feature;
use crate::error::CommandError;
use crate::notes::Note;
use crate::state::AppState;
use crate::utils::lock_or_recover;

/// Transcripts shorter than this are discarded
pub const MIN_TRANSCRIPT_CHARS: usize = 5;

/// Summarise a finished recording and save it as a note
///
/// Counts against the transcription quota only when the note was saved.
pub async fn create_note_from_transcript(
    state: &AppState,
    transcript: &str,
) -> Result<Note, CommandError> {
    let text = transcript.trim();
    let len = text.chars().count();
    if len < MIN_TRANSCRIPT_CHARS {
        return Err(CommandError::TranscriptTooShort { len });
    }

    require(state, Feature::Transcription)?;

    let summary = ai::generate_summary(state.generator.as_ref(), text).await?;

    let note = Note::new(
        state.clock.now().with_timezone(&Utc),
        text.to_string(),
        summary,
    );
    lock_or_recover(&state.notes).add(note.clone());
    record_success(state, Feature::Transcription);

    info!(note = %note.id, chars = len, "Created note");
    Ok(note)
}

/// Notes visible under the current tier's history window, newest first
pub fn list_notes(state: &AppState) -> Vec<Note> {
    let window = lock_or_recover(&state.entitlements)
        .effective_limits()
        .history_days;
    let now = state.clock.now().with_timezone(&Utc);
    lock_or_recover(&state.notes).within_history(window, now)
}

pub fn get_note(state: &AppState, id: &str) -> Result<Note, CommandError> {
    lock_or_recover(&state.notes)
        .get(id)
        .cloned()
        .ok_or_else(|| CommandError::NoteNotFound(id.to_string()))
}

pub fn delete_note(state: &AppState, id: &str) -> Result<(), CommandError> {
    if lock_or_recover(&state.notes).delete(id) {
        info!(note = %id, "Deleted note");
        Ok(())
    } else {
        Err(CommandError::NoteNotFound(id.to_string()))
    }
}

/// Flip whether a note is used as chat context; returns the new state
pub fn toggle_note_selection(state: &AppState, id: &str) -> Result<bool, CommandError> {
    lock_or_recover(&state.notes)
        .toggle_select(id)
        .ok_or_else(|| CommandError::NoteNotFound(id.to_string()))
}
