use serde::Deserialize;

use crate::engine::selector::TopicChoice;
use crate::error::GenerationError;
use crate::session::question::Question;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionPayload {
    question: String,
    options: Vec<String>,
    answer: String,
    explanation: String,
}

/// Drop a surrounding ``` / ```json fence if the model added one.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Only the info string (e.g. "json") goes; JSON may start on the fence line.
        body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

pub fn parse_question(text: &str, choice: &TopicChoice) -> Result<Question, GenerationError> {
    let payload: QuestionPayload = serde_json::from_str(strip_code_fence(text))?;
    Question::new(
        payload.question,
        payload.options,
        payload.answer,
        payload.explanation,
        choice.main_topic.clone(),
        choice.keyword.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"question": "What does dropout do?", "options": ["a", "b", "c", "d"], "answer": "b", "explanation": "b because"}"#;

    fn choice() -> TopicChoice {
        TopicChoice {
            main_topic: "Deep Learning Overview".to_string(),
            keyword: "Dropout".to_string(),
        }
    }

    #[test]
    fn strips_json_fence() {
        let fenced = format!("```json\n{BODY}\n```");
        assert_eq!(strip_code_fence(&fenced), BODY);
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        let fenced = format!("  ```\n{BODY}\n```  \n");
        assert_eq!(strip_code_fence(&fenced), BODY);
    }

    #[test]
    fn strips_single_line_fence() {
        let fenced = format!("```json{BODY}```");
        assert_eq!(strip_code_fence(&fenced), BODY);
    }

    #[test]
    fn keeps_json_opening_on_the_fence_line() {
        let fenced = "```json {\n\"question\": \"q\", \"options\": [\"a\", \"b\", \"c\", \"d\"], \"answer\": \"a\", \"explanation\": \"e\"}\n```";
        assert!(strip_code_fence(fenced).starts_with('{'));
        let q = parse_question(fenced, &choice()).unwrap();
        assert_eq!(q.text(), "q");
        assert_eq!(q.answer(), "a");
    }

    #[test]
    fn unfenced_text_is_untouched() {
        assert_eq!(strip_code_fence(BODY), BODY);
    }

    #[test]
    fn parses_and_attaches_topic_metadata() {
        let q = parse_question(&format!("```json\n{BODY}\n```"), &choice()).unwrap();
        assert_eq!(q.text(), "What does dropout do?");
        assert_eq!(q.answer(), "b");
        assert_eq!(q.main_topic(), "Deep Learning Overview");
        assert_eq!(q.sub_topic(), "Dropout");
    }

    #[test]
    fn missing_field_is_an_error() {
        let text = r#"{"question": "q", "options": ["a", "b", "c", "d"], "answer": "a"}"#;
        assert!(matches!(
            parse_question(text, &choice()),
            Err(GenerationError::Json(_))
        ));
    }

    #[test]
    fn unknown_field_is_an_error() {
        let text = r#"{"question": "q", "options": ["a", "b", "c", "d"], "answer": "a", "explanation": "e", "difficulty": 3}"#;
        assert!(parse_question(text, &choice()).is_err());
    }

    #[test]
    fn answer_outside_options_is_invalid() {
        let text = r#"{"question": "q", "options": ["a", "b", "c", "d"], "answer": "B", "explanation": "e"}"#;
        assert!(matches!(
            parse_question(text, &choice()),
            Err(GenerationError::InvalidQuestion(_))
        ));
    }

    #[test]
    fn prose_is_an_error() {
        assert!(parse_question("Sure! Here is a question.", &choice()).is_err());
    }
}
