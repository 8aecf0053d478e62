//! Post-processing of raw completions into what each mode displays.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatterKind {
    PassThrough,
    Flashcards,
    ExamMarkup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FormattedOutput {
    Text(String),
    Flashcards(Vec<Flashcard>),
}

const QUESTION_PREFIX: &str = "Q:";
const ANSWER_PREFIX: &str = "A:";

impl FormatterKind {
    pub fn apply(self, raw: &str) -> FormattedOutput {
        match self {
            FormatterKind::PassThrough => FormattedOutput::Text(raw.to_string()),
            FormatterKind::ExamMarkup => FormattedOutput::Text(normalize_exam_markup(raw)),
            FormatterKind::Flashcards => FormattedOutput::Flashcards(parse_flashcards(raw)),
        }
    }
}

/// Extract question/answer pairs from `Q:` / `A:` prefixed lines.
///
/// A new `Q:` replaces a question that never got its answer, and an `A:`
/// with no pending question is skipped.
pub fn parse_flashcards(raw: &str) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut pending: Option<String> = None;

    for line in raw.trim().lines() {
        if let Some(rest) = line.strip_prefix(QUESTION_PREFIX) {
            pending = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(ANSWER_PREFIX) {
            if let Some(question) = pending.take() {
                cards.push(Flashcard {
                    question,
                    answer: rest.trim().to_string(),
                });
            }
        }
    }

    cards
}

/// Collapse bold markers to single emphasis for display.
pub fn normalize_exam_markup(raw: &str) -> String {
    raw.replace("**", "*")
}
