use std::collections::HashSet;

use crate::error::GenerationError;

pub const OPTION_COUNT: usize = 4;

/// A fully formed multiple-choice question. Only constructible through
/// [`Question::new`], so every instance has four distinct options and an
/// answer that is one of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    answer: String,
    explanation: String,
    main_topic: String,
    sub_topic: String,
}

impl Question {
    pub fn new(
        text: String,
        options: Vec<String>,
        answer: String,
        explanation: String,
        main_topic: String,
        sub_topic: String,
    ) -> Result<Self, GenerationError> {
        if text.trim().is_empty() {
            return Err(invalid("question text is empty"));
        }
        if options.len() != OPTION_COUNT {
            return Err(invalid(&format!(
                "expected {OPTION_COUNT} options, got {}",
                options.len()
            )));
        }
        if options.iter().any(|o| o.trim().is_empty()) {
            return Err(invalid("an option is empty"));
        }
        let distinct: HashSet<&str> = options.iter().map(String::as_str).collect();
        if distinct.len() != OPTION_COUNT {
            return Err(invalid("options are not distinct"));
        }
        if !options.contains(&answer) {
            return Err(invalid(&format!("answer {answer:?} is not one of the options")));
        }

        Ok(Self {
            text,
            options,
            answer,
            explanation,
            main_topic,
            sub_topic,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn main_topic(&self) -> &str {
        &self.main_topic
    }

    pub fn sub_topic(&self) -> &str {
        &self.sub_topic
    }

    pub fn answer_index(&self) -> usize {
        self.options
            .iter()
            .position(|o| *o == self.answer)
            .unwrap_or_default()
    }

    /// Exact string comparison, no normalization.
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.answer
    }
}

fn invalid(reason: &str) -> GenerationError {
    GenerationError::InvalidQuestion(reason.to_string())
}
