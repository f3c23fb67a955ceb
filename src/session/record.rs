use chrono::{DateTime, Utc};

use crate::session::question::Question;

/// One submitted answer. Append-only history entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerRecord {
    pub main_topic: String,
    pub sub_topic: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub user_choice: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn from_answer(question: &Question, user_choice: &str, is_correct: bool) -> Self {
        Self {
            main_topic: question.main_topic().to_string(),
            sub_topic: question.sub_topic().to_string(),
            question_text: question.text().to_string(),
            options: question.options().to_vec(),
            correct_answer: question.answer().to_string(),
            explanation: question.explanation().to_string(),
            user_choice: user_choice.to_string(),
            is_correct,
            answered_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExamResult {
    pub total: usize,
    pub correct: usize,
    pub rate: f64,
    pub finished_at: DateTime<Utc>,
}

/// `correct / total * 100`, or 0.0 for an empty denominator.
pub fn rate_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}
