use chrono::Utc;

use crate::error::TransitionError;
use crate::session::record::{ExamResult, rate_percent};

pub const DEFAULT_EXAM_LENGTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamPhase {
    Inactive,
    InProgress,
    AwaitingFinalize,
}

/// Fixed-length scored run layered over the normal question flow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExamSession {
    active: bool,
    total_planned: usize,
    answered: usize,
    correct: usize,
}

impl ExamSession {
    pub fn phase(&self) -> ExamPhase {
        if !self.active {
            ExamPhase::Inactive
        } else if self.answered < self.total_planned {
            ExamPhase::InProgress
        } else {
            ExamPhase::AwaitingFinalize
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn total_planned(&self) -> usize {
        self.total_planned
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn start(&mut self, total_planned: usize) -> Result<(), TransitionError> {
        if self.active {
            return Err(TransitionError::ExamAlreadyActive);
        }
        if total_planned == 0 {
            return Err(TransitionError::InvalidExamLength);
        }
        *self = Self {
            active: true,
            total_planned,
            answered: 0,
            correct: 0,
        };
        Ok(())
    }

    /// Counts one answer. Ignored unless the exam is in progress, so the
    /// answered count can never pass the planned total.
    pub fn record(&mut self, is_correct: bool) {
        if self.phase() != ExamPhase::InProgress {
            return;
        }
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    pub fn finalize(&mut self) -> Result<ExamResult, TransitionError> {
        match self.phase() {
            ExamPhase::Inactive => Err(TransitionError::ExamNotActive),
            ExamPhase::InProgress => Err(TransitionError::ExamNotFinished),
            ExamPhase::AwaitingFinalize => {
                let result = ExamResult {
                    total: self.total_planned,
                    correct: self.correct,
                    rate: rate_percent(self.correct, self.total_planned),
                    finished_at: Utc::now(),
                };
                self.clear();
                Ok(result)
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
