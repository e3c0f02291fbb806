use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Word, character and sentence counts for a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TextStats {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub words: usize,
    pub unique_words: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub average_word_length: f64,
    /// Estimated minutes at 200 words per minute, rounded up
    pub reading_time_minutes: usize,
}

/// Kind of issue reported by the grammar checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GrammarIssueKind {
    RepeatedWord,
    DoubleSpace,
    LowercaseSentenceStart,
    ArticleMisuse,
    MissingTerminalPunctuation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GrammarIssue {
    pub kind: GrammarIssueKind,
    /// Byte offset of the issue in the submitted text
    pub offset: usize,
    pub excerpt: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GrammarReport {
    pub issue_count: usize,
    pub issues: Vec<GrammarIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Summary {
    pub summary: String,
    /// Indices of the chosen sentences in the original order
    pub sentence_indices: Vec<usize>,
    pub original_sentences: usize,
}
