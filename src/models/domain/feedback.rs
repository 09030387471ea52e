use serde::{Deserialize, Serialize};

/// Structured feedback report stored on a test attempt.
///
/// Field names follow the wire schema the generation backend is prompted to
/// produce, so the parsed model output deserializes straight into this type.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub overall_feedback: String,
    #[serde(default)]
    pub question_feedback: Vec<QuestionFeedback>,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub graph_data: GraphData,
    #[serde(default)]
    pub interactive: Option<InteractiveBlock>,
    /// Raw model text, only populated on the degraded fallback report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub question_id: String,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub concept: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub correct: i16,
    pub incorrect: i16,
    #[serde(default)]
    pub concept_breakdown: Vec<ConceptBreakdown>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptBreakdown {
    pub concept: String,
    pub correct: i16,
    pub incorrect: i16,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveBlock {
    pub concept_explanation: String,
    pub practice_question: PracticeQuestion,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: u8,
    #[serde(default)]
    pub explanation: String,
}
