//! Structured transcript analyses
//!
//! Each kind asks the model for a fixed JSON shape. Fields default when the
//! model leaves them out so a partial answer still renders.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::json_parser::extract_json;
use super::prompts;
use super::TextGenerator;
use crate::error::AiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Meeting,
    Conversation,
    Brainstorm,
}

/// Style of an advanced summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    UltraShort,
    #[default]
    Executive,
    Detailed,
    Timeline,
    Qa,
    Actionable,
}

impl SummaryMode {
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::UltraShort => {
                "Summarise in ONE punchy sentence (tweet style, max 280 characters)."
            }
            Self::Executive => {
                "Give an executive summary with 3-5 bullet points of the essential information."
            }
            Self::Detailed => {
                "Give a detailed summary in several structured paragraphs with subheadings."
            }
            Self::Timeline => {
                "Give a chronological summary with the key moments and estimated timestamps."
            }
            Self::Qa => "Turn the content into a Question/Answer format to help learning.",
            Self::Actionable => {
                "List only the concrete actions to take following this recording."
            }
        }
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UltraShort => "ultrashort",
            Self::Executive => "executive",
            Self::Detailed => "detailed",
            Self::Timeline => "timeline",
            Self::Qa => "qa",
            Self::Actionable => "actionable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub id: String,
    pub label: String,
    pub speaking_percent: f64,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    pub title: String,
    pub summary: String,
    pub importance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decision {
    pub text: String,
    pub importance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionItem {
    pub task: String,
    pub assignee: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingAnalysis {
    pub participants: Vec<Participant>,
    pub topics: Vec<Topic>,
    pub decisions: Vec<Decision>,
    pub action_items: Vec<ActionItem>,
    pub overall_mood: String,
    pub duration: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentiment {
    pub overall: String,
    pub score: f64,
    pub evolution: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyArgument {
    pub speaker: String,
    pub argument: String,
    pub strength: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionAsked {
    pub question: String,
    pub answered: bool,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationAnalysis {
    pub sentiment: Sentiment,
    pub key_arguments: Vec<KeyArgument>,
    pub agreements: Vec<String>,
    pub disagreements: Vec<String>,
    pub questions: Vec<QuestionAsked>,
    pub tone: String,
    pub insights: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Idea {
    pub text: String,
    pub potential: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainstormAnalysis {
    pub summary: String,
    pub main_theme: String,
    pub creativity_score: f64,
    pub ideas: Vec<Idea>,
    pub connections: Vec<String>,
    pub categories: Vec<IdeaCategory>,
    pub questions: Vec<String>,
    pub insights: Vec<String>,
    pub next_steps: Vec<String>,
    pub emotional_journey: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum AnalysisReport {
    Meeting(MeetingAnalysis),
    Conversation(ConversationAnalysis),
    Brainstorm(BrainstormAnalysis),
}

impl AnalysisReport {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Meeting(_) => AnalysisKind::Meeting,
            Self::Conversation(_) => AnalysisKind::Conversation,
            Self::Brainstorm(_) => AnalysisKind::Brainstorm,
        }
    }

    /// Parse a model reply for the given kind
    pub fn parse(kind: AnalysisKind, reply: &str) -> Result<Self, AiError> {
        Ok(match kind {
            AnalysisKind::Meeting => Self::Meeting(extract_json(reply)?),
            AnalysisKind::Conversation => Self::Conversation(extract_json(reply)?),
            AnalysisKind::Brainstorm => Self::Brainstorm(extract_json(reply)?),
        })
    }
}

/// Run a structured analysis of a transcript
pub async fn analyze(
    generator: &dyn TextGenerator,
    kind: AnalysisKind,
    transcript: &str,
) -> Result<AnalysisReport, AiError> {
    let prompt = match kind {
        AnalysisKind::Meeting => prompts::meeting_prompt(transcript),
        AnalysisKind::Conversation => prompts::conversation_prompt(transcript),
        AnalysisKind::Brainstorm => prompts::brainstorm_prompt(transcript),
    };
    let reply = generator.generate(&prompt).await?;
    AnalysisReport::parse(kind, &reply)
}

/// Markdown summary in the requested style
pub async fn advanced_summary(
    generator: &dyn TextGenerator,
    transcript: &str,
    mode: SummaryMode,
) -> Result<String, AiError> {
    let prompt = prompts::advanced_summary_prompt(transcript, mode.instruction());
    generator.generate(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_meeting() {
        let reply = r#"```json
{
  "participants": [{"id": "A", "label": "Participant A", "speakingPercent": 60, "keyPoints": ["budget"]}],
  "actionItems": [{"task": "Send minutes", "assignee": "Participant A", "priority": "high"}],
  "overallMood": "positive",
  "summary": "Budget agreed."
}
```"#;
        let report = AnalysisReport::parse(AnalysisKind::Meeting, reply).unwrap();
        let AnalysisReport::Meeting(meeting) = report else {
            panic!("expected a meeting report");
        };
        assert_eq!(meeting.participants[0].speaking_percent, 60.0);
        assert_eq!(meeting.action_items[0].task, "Send minutes");
        assert!(meeting.decisions.is_empty());
        assert_eq!(meeting.summary, "Budget agreed.");
    }

    #[test]
    fn test_parse_brainstorm_snake_case() {
        let reply = r#"{"main_theme": "Onboarding", "creativity_score": 8,
            "categories": [{"name": "Fixes", "type": "solution", "count": 2}],
            "next_steps": ["Prototype"]}"#;
        let report = AnalysisReport::parse(AnalysisKind::Brainstorm, reply).unwrap();
        assert_eq!(report.kind(), AnalysisKind::Brainstorm);
        let AnalysisReport::Brainstorm(brainstorm) = report else {
            panic!("expected a brainstorm report");
        };
        assert_eq!(brainstorm.main_theme, "Onboarding");
        assert_eq!(brainstorm.categories[0].category_type, "solution");
        assert_eq!(brainstorm.next_steps, ["Prototype"]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        let result = AnalysisReport::parse(AnalysisKind::Conversation, "I could not analyse this.");
        assert!(matches!(result, Err(AiError::InvalidJson(_))));
    }

    #[test]
    fn test_report_serializes_with_kind_tag() {
        let report = AnalysisReport::Conversation(ConversationAnalysis::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "conversation");
        assert!(json["data"]["keyArguments"].is_array());
    }

    #[test]
    fn test_summary_mode_names() {
        assert_eq!(SummaryMode::UltraShort.to_string(), "ultrashort");
        assert_eq!(
            serde_json::to_string(&SummaryMode::UltraShort).unwrap(),
            "\"ultrashort\""
        );
        assert_eq!(SummaryMode::default(), SummaryMode::Executive);
    }
}
