//! Prompt templates

use crate::notes::Note;

/// Transcripts shorter than this are not worth summarising
pub const MIN_SUMMARY_CHARS: usize = 10;

pub const SHORT_TRANSCRIPT_REPLY: &str = "📝 *Transcript too short to summarise.*";

pub const CONNECTION_TEST_PROMPT: &str = "Say 'Hello' in one sentence.";

/// Characters of the test reply shown in Settings
pub const CONNECTION_TEST_PREVIEW_CHARS: usize = 100;

pub fn summary_prompt(transcript: &str) -> String {
    format!(
        r#"You are an expert note-taking assistant. Analyse this voice transcript and produce a **richly formatted** Markdown summary.

## Formatting rules:
- Use **headings** (## or ###) to structure
- Use **bullet lists** for key points
- Put important words in **bold**
- Use *italics* for nuance
- Add relevant emojis (📌 💡 ⚠️ ✅ 📝 🎯 💬 📊 🔑 ⏰)

## Expected structure:

### 🎯 Summary
A 2-3 sentence paragraph with the essentials.

### 📌 Key Points
- Point 1
- Point 2

### 💡 Ideas / Actions (if any)
- Action or idea to remember

---

**Transcript to analyse:**
"{transcript}"

Output only the formatted summary, without extra commentary."#
    )
}

/// Chat prompt with selected notes as context
pub fn chat_prompt(message: &str, context_notes: &[Note]) -> String {
    let mut prompt = String::from(
        r#"You are a smart, friendly assistant. You help the user understand and use their voice notes.

## Instructions:
- Answer **clearly and with structure**
- Use **Markdown** to format answers (bold, italics, lists, emojis)
- Be concise but complete
- Use relevant emojis (💡 ✅ 📌 🎯 💬)

"#,
    );

    if context_notes.is_empty() {
        prompt.push_str("*(No notes selected for context)*\n\n");
    } else {
        prompt.push_str("## 📚 User notes (context):\n\n");
        for (index, note) in context_notes.iter().enumerate() {
            let body = if !note.summary.is_empty() {
                note.summary.as_str()
            } else if !note.text.is_empty() {
                note.text.as_str()
            } else {
                "Empty note"
            };
            prompt.push_str(&format!(
                "### Note {} - {}\n{}\n\n---\n\n",
                index + 1,
                note.created_at.format("%Y-%m-%d %H:%M"),
                body
            ));
        }
    }

    prompt.push_str("## 💬 User question:\n");
    prompt.push_str(message);
    prompt
}

pub fn meeting_prompt(transcript: &str) -> String {
    format!(
        r#"You are an expert in analysing professional meetings.

Analyse this transcript and return **valid, parseable** JSON with exactly this structure:

{{
  "participants": [
    {{ "id": "A", "label": "Participant A", "speakingPercent": 50, "keyPoints": ["point 1"] }}
  ],
  "topics": [
    {{ "title": "Topic", "summary": "Short summary", "importance": "high|medium|low" }}
  ],
  "decisions": [
    {{ "text": "Decision taken", "importance": "high|medium|low" }}
  ],
  "actionItems": [
    {{ "task": "Task to do", "assignee": "Participant A", "priority": "high|medium|low" }}
  ],
  "overallMood": "positive|neutral|tense",
  "duration": "estimated duration",
  "summary": "Executive summary of the meeting in 2-3 sentences"
}}

RULES:
- Reply ONLY with the JSON, no Markdown or commentary
- Use an empty array [] for anything not detected
- Speaking percentages must add up to 100
- Estimate the number of participants from changes in tone and style

TRANSCRIPT TO ANALYSE:
"""
{transcript}
""""#
    )
}

pub fn conversation_prompt(transcript: &str) -> String {
    format!(
        r#"You are an expert in conversation analysis.

Analyse this transcript and return **valid, parseable** JSON with exactly this structure:

{{
  "sentiment": {{
    "overall": "positive|neutral|negative",
    "score": 75,
    "evolution": ["positive", "neutral", "positive"]
  }},
  "keyArguments": [
    {{ "speaker": "A", "argument": "Main point", "strength": "strong|medium|weak" }}
  ],
  "agreements": ["Point of agreement"],
  "disagreements": ["Point of disagreement"],
  "questions": [
    {{ "question": "Question asked", "answered": true, "answer": "Answer given" }}
  ],
  "tone": "formal|relaxed|tense|friendly",
  "insights": ["Observation 1", "Observation 2"],
  "summary": "Summary of the conversation in 2-3 sentences"
}}

RULES:
- Reply ONLY with the JSON, no Markdown or commentary
- Use an empty array [] for anything not detected

TRANSCRIPT TO ANALYSE:
"""
{transcript}
""""#
    )
}

pub fn brainstorm_prompt(transcript: &str) -> String {
    format!(
        r#"You are an expert in creative thinking and idea development.

Analyse this brainstorming session and return **valid, parseable** JSON with exactly this structure:

{{
  "summary": "Summary of the session in 2-3 sentences",
  "main_theme": "The central theme of the session",
  "creativity_score": 7,
  "ideas": [
    {{ "text": "Idea expressed", "potential": "high|medium|low" }}
  ],
  "connections": ["Link between two concepts or ideas"],
  "categories": [
    {{ "name": "Category name", "type": "idea|problem|solution|question|reflection", "count": 3 }}
  ],
  "questions": ["Question raised during the session"],
  "insights": ["Moment of clarity or realisation"],
  "next_steps": ["Suggested next action"],
  "emotional_journey": "neutral|exploratory|frustrated|enthusiastic|confused|enlightened"
}}

RULES:
- Reply ONLY with the JSON, no Markdown or commentary
- creativity_score is between 1 and 10
- Use an empty array [] for anything not detected

TRANSCRIPT TO ANALYSE:
"""
{transcript}
""""#
    )
}

pub fn advanced_summary_prompt(transcript: &str, instruction: &str) -> String {
    format!(
        r#"You are an expert at summarising voice recordings.

{instruction}

Format the answer in Markdown with relevant emojis.

TRANSCRIPT:
"""
{transcript}
""""#
    )
}
