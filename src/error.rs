use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "no Gemini API key configured; add GEMINI_API_KEY under [general] in {secrets}, \
         export GEMINI_API_KEY, or enter one in Settings"
    )]
    MissingApiKey { secrets: PathBuf },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Anything that stops a generated question from reaching the session.
/// Always recoverable: the current question is left in place.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[cfg(feature = "network")]
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[cfg(not(feature = "network"))]
    #[error("built without network support")]
    Offline,
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("the model returned no text")]
    EmptyResponse,
    #[error("response is not valid question JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
}

/// A user action the session state machine refused. State is unchanged.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("there is no question on screen")]
    NoQuestion,
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("answer the current question first")]
    NotAnswered,
    #[error("that choice is not one of the options")]
    InvalidChoice,
    #[error("an exam is already running")]
    ExamAlreadyActive,
    #[error("no exam is running")]
    ExamNotActive,
    #[error("the exam is over; save the result to continue")]
    ExamAwaitingFinalize,
    #[error("the exam still has unanswered questions")]
    ExamNotFinished,
    #[error("exam length must be at least one question")]
    InvalidExamLength,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl QuizError {
    /// Short hint shown under the error in the status line.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            QuizError::Config(ConfigError::MissingApiKey { .. }) => {
                Some("Open Settings with [c] to enter an API key.")
            }
            QuizError::Generation(_) => Some("Try another model in Settings, then press [n] to retry."),
            _ => None,
        }
    }
}
