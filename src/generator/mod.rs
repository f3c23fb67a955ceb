pub mod gemini;
pub mod parse;
pub mod prompt;

use crate::engine::selector::TopicChoice;
use crate::error::GenerationError;
use crate::session::question::Question;

/// External text generation service: prompt in, raw text out.
pub trait GenerativeModel {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    fn name(&self) -> &str;
}

/// Build the prompt, call the model once, and parse its reply. No retries.
pub fn generate_question<M: GenerativeModel + ?Sized>(
    model: &M,
    choice: &TopicChoice,
    language: &str,
) -> Result<Question, GenerationError> {
    let prompt = prompt::build_prompt(&choice.main_topic, &choice.keyword, language);
    tracing::info!(
        model = model.name(),
        topic = %choice.main_topic,
        keyword = %choice.keyword,
        "generating question"
    );
    let text = model.generate(&prompt)?;
    let question = parse::parse_question(&text, choice);
    if let Err(ref err) = question {
        tracing::warn!(%err, "model reply rejected");
        tracing::debug!(reply = %text, "rejected reply");
    }
    question
}
