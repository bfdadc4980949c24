// src/models/question.rs

use serde::{Deserialize, Serialize};

/// One multiple-choice question as stored in the question bank and
/// snapshotted into a room at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The prompt text.
    pub question: String,

    /// The candidate answers (four per question in the shipped bank).
    pub options: Vec<String>,

    /// The exact string among `options` that is correct.
    pub correct: String,
}

impl Question {
    /// A question is well-formed when its correct answer is one of its options.
    pub fn is_well_formed(&self) -> bool {
        !self.options.is_empty() && self.options.iter().any(|opt| opt == &self.correct)
    }
}

/// DTO for sending a question to a participant (excludes the correct answer).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}
