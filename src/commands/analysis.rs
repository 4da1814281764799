//! Analysis commands for a single note

use tracing::info;

use super::{record_success, require};
use crate::ai::{self, AnalysisKind, AnalysisReport, SummaryMode};
use crate::billing::Feature;
use crate::error::CommandError;
use crate::notes::Note;
use crate::state::AppState;
use crate::utils::lock_or_recover;

fn find_note(state: &AppState, id: &str) -> Result<Note, CommandError> {
    lock_or_recover(&state.notes)
        .get(id)
        .cloned()
        .ok_or_else(|| CommandError::NoteNotFound(id.to_string()))
}

/// Run a meeting, conversation or brainstorm analysis of a note's transcript
pub async fn analyze_note(
    state: &AppState,
    note_id: &str,
    kind: AnalysisKind,
) -> Result<AnalysisReport, CommandError> {
    let note = find_note(state, note_id)?;
    require(state, Feature::Analysis)?;

    let report = ai::analysis::analyze(state.generator.as_ref(), kind, &note.text).await?;
    record_success(state, Feature::Analysis);

    info!(note = %note_id, kind = ?kind, "Analysed note");
    Ok(report)
}

/// Summarise a note's transcript in the requested style
pub async fn summarize_note(
    state: &AppState,
    note_id: &str,
    mode: SummaryMode,
) -> Result<String, CommandError> {
    let note = find_note(state, note_id)?;
    require(state, Feature::Analysis)?;

    let summary = ai::analysis::advanced_summary(state.generator.as_ref(), &note.text, mode).await?;
    record_success(state, Feature::Analysis);

    info!(note = %note_id, mode = %mode, "Summarised note");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{LimitDenialReason, SubscriptionTier};
    use crate::commands::testing::{harness, Harness};
    use crate::commands::{create_note_from_transcript, get_subscription_info, start_trial};
    use crate::error::AiError;

    async fn harness_with_note() -> (Harness, Note) {
        let h = harness();
        let note = create_note_from_transcript(&h.state, "Alice: ship Friday. Bob: agreed.")
            .await
            .unwrap();
        (h, note)
    }

    #[tokio::test]
    async fn test_free_tier_has_no_analysis() {
        let (h, note) = harness_with_note().await;
        let calls = h.generator.calls();

        let result = analyze_note(&h.state, &note.id, AnalysisKind::Meeting).await;
        match result {
            Err(CommandError::LimitReached(LimitDenialReason::FeatureNotIncluded {
                required_tier,
                ..
            })) => assert_eq!(required_tier, SubscriptionTier::Premium),
            other => panic!("expected feature not included, got {:?}", other),
        }
        assert!(summarize_note(&h.state, &note.id, SummaryMode::Qa)
            .await
            .is_err());
        assert_eq!(h.generator.calls(), calls);
    }

    #[tokio::test]
    async fn test_premium_analysis_is_counted() {
        let (h, note) = harness_with_note().await;
        start_trial(&h.state);
        h.generator
            .push_ok(r#"```json
{"summary": "Ship on Friday", "decisions": [{"text": "Ship Friday", "importance": "high"}]}
```"#);

        let report = analyze_note(&h.state, &note.id, AnalysisKind::Meeting)
            .await
            .unwrap();
        let AnalysisReport::Meeting(meeting) = report else {
            panic!("expected a meeting report");
        };
        assert_eq!(meeting.decisions[0].text, "Ship Friday");
        assert!(h.generator.last_prompt().contains("Alice: ship Friday."));

        h.generator.push_ok("- Ship on Friday");
        let summary = summarize_note(&h.state, &note.id, SummaryMode::Actionable)
            .await
            .unwrap();
        assert_eq!(summary, "- Ship on Friday");
        assert!(h
            .generator
            .last_prompt()
            .contains(SummaryMode::Actionable.instruction()));

        assert_eq!(get_subscription_info(&h.state).usage.analysis_this_month, 2);
    }

    #[tokio::test]
    async fn test_unreadable_analysis_not_counted() {
        let (h, note) = harness_with_note().await;
        start_trial(&h.state);
        h.generator.push_ok("I'm sorry, I can't do that.");

        let result = analyze_note(&h.state, &note.id, AnalysisKind::Brainstorm).await;
        assert!(matches!(result, Err(CommandError::Ai(AiError::InvalidJson(_)))));
        assert_eq!(get_subscription_info(&h.state).usage.analysis_this_month, 0);

        assert!(matches!(
            analyze_note(&h.state, "missing", AnalysisKind::Meeting).await,
            Err(CommandError::NoteNotFound(_))
        ));
    }
}
