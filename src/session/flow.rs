use rand::Rng;

use crate::catalog::TopicCatalog;
use crate::engine::selector::{self, Selection};
use crate::error::QuizError;
use crate::generator::{self, GenerativeModel};
use crate::session::state::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextQuestion {
    /// A missed question shown again from the wrong-answer list.
    Replayed,
    Generated,
}

/// Select, then replay or generate, then install the next question.
///
/// On any error the session is untouched: the previous question stays on
/// screen and keeps its answered lock.
pub fn next_question<M, R>(
    state: &mut SessionState,
    catalog: &TopicCatalog,
    model: &M,
    rng: &mut R,
    language: &str,
) -> Result<NextQuestion, QuizError>
where
    M: GenerativeModel + ?Sized,
    R: Rng + ?Sized,
{
    state.ready_for_next()?;

    match selector::select(&state.selector_input(), catalog, rng) {
        Selection::Replay(question) => {
            tracing::info!(topic = question.main_topic(), "replaying missed question");
            state.install_question(question);
            Ok(NextQuestion::Replayed)
        }
        Selection::Generate(choice) => {
            let question = generator::generate_question(model, &choice, language)?;
            state.install_question(question);
            Ok(NextQuestion::Generated)
        }
    }
}
