use crate::error::{Result, TddError};
use serde::{Deserialize, Serialize};

/// Minimum number of whitespace-delimited words in a reflection answer.
pub const MIN_ANSWER_WORDS: usize = 5;

const QUESTIONS: [&str; 7] = [
    "Can I make my test suite more expressive?",
    "Does my test suite provide reliable feedback?",
    "Are my tests isolated?",
    "Can I reduce duplication in my test suite or implementation code?",
    "Can I make my implementation code more descriptive?",
    "Can I implement something more efficiently?",
    "Should any new test scenarios be added to the test list based on what I learned?",
];

/// A structured prompt that must be answered before leaving REFACTOR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionQuestion {
    pub id: u32,
    pub question: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub answer: String,
}

impl ReflectionQuestion {
    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }
}

/// The seven reflection questions with ids 1..=7 and no answers.
pub fn default_questions() -> Vec<ReflectionQuestion> {
    QUESTIONS
        .iter()
        .zip(1..)
        .map(|(q, id)| ReflectionQuestion {
            id,
            question: (*q).to_string(),
            answer: String::new(),
        })
        .collect()
}

pub fn validate_answer(answer: &str) -> Result<()> {
    let got = answer.split_whitespace().count();
    if got < MIN_ANSWER_WORDS {
        return Err(TddError::AnswerTooShort {
            min: MIN_ANSWER_WORDS,
            got,
        });
    }
    Ok(())
}
