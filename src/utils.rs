//! Small shared helpers

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Helper to acquire a mutex with poison recovery
pub fn lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned: PoisonError<MutexGuard<'_, T>>| {
        warn!("Mutex was poisoned, recovering inner value");
        poisoned.into_inner()
    })
}

/// Truncate to at most `max_chars` characters, appending "..." when cut
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
