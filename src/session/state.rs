use crate::engine::selector::SelectorInput;
use crate::engine::topic_stats::TopicStatsStore;
use crate::error::TransitionError;
use crate::session::exam::{ExamPhase, ExamSession};
use crate::session::question::Question;
use crate::session::record::{AnswerRecord, ExamResult, rate_percent};

/// Everything one quiz session knows. Memory only; dropped on reset or exit.
///
/// Every transition either applies completely or returns a
/// [`TransitionError`] without touching any field.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    current: Option<Question>,
    answered: bool,
    total_count: usize,
    correct_count: usize,
    wrong_history: Vec<Question>,
    all_history: Vec<AnswerRecord>,
    topic_stats: TopicStatsStore,
    exam: ExamSession,
    exam_history: Vec<ExamResult>,
    selected_topic: String,
    review_mode: bool,
    weak_mode: bool,
}

impl SessionState {
    pub fn new(selected_topic: &str) -> Self {
        Self {
            selected_topic: selected_topic.to_string(),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn rate_percent(&self) -> f64 {
        rate_percent(self.correct_count, self.total_count)
    }

    pub fn wrong_history(&self) -> &[Question] {
        &self.wrong_history
    }

    pub fn all_history(&self) -> &[AnswerRecord] {
        &self.all_history
    }

    pub fn history_newest_first(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.all_history.iter().rev()
    }

    pub fn last_record(&self) -> Option<&AnswerRecord> {
        self.all_history.last()
    }

    pub fn topic_stats(&self) -> &TopicStatsStore {
        &self.topic_stats
    }

    pub fn exam(&self) -> &ExamSession {
        &self.exam
    }

    pub fn exam_history(&self) -> &[ExamResult] {
        &self.exam_history
    }

    pub fn latest_exam(&self) -> Option<&ExamResult> {
        self.exam_history.last()
    }

    pub fn selected_topic(&self) -> &str {
        &self.selected_topic
    }

    pub fn review_mode(&self) -> bool {
        self.review_mode
    }

    pub fn weak_mode(&self) -> bool {
        self.weak_mode
    }

    pub fn set_selected_topic(&mut self, topic: &str) {
        self.selected_topic = topic.to_string();
    }

    pub fn set_review_mode(&mut self, on: bool) {
        self.review_mode = on;
    }

    pub fn set_weak_mode(&mut self, on: bool) {
        self.weak_mode = on;
    }

    pub fn selector_input(&self) -> SelectorInput<'_> {
        SelectorInput {
            review_mode: self.review_mode,
            weak_mode: self.weak_mode,
            selected_topic: &self.selected_topic,
            wrong_history: &self.wrong_history,
            topic_stats: &self.topic_stats,
        }
    }

    /// Score the current question. Locks it until the next one is installed,
    /// so a second submission is rejected instead of double counted.
    pub fn submit_answer(&mut self, choice: &str) -> Result<&AnswerRecord, TransitionError> {
        let question = self.current.as_ref().ok_or(TransitionError::NoQuestion)?;
        if self.answered {
            return Err(TransitionError::AlreadyAnswered);
        }
        if !question.options().iter().any(|o| o == choice) {
            return Err(TransitionError::InvalidChoice);
        }

        let is_correct = question.is_correct(choice);
        let record = AnswerRecord::from_answer(question, choice, is_correct);

        self.total_count += 1;
        if is_correct {
            self.correct_count += 1;
        } else {
            self.wrong_history.push(question.clone());
        }
        self.topic_stats.record(question.main_topic(), is_correct);
        self.all_history.push(record);
        if self.exam.is_active() {
            self.exam.record(is_correct);
        }
        self.answered = true;

        Ok(&self.all_history[self.all_history.len() - 1])
    }

    /// Whether a new question may replace the current one.
    pub fn ready_for_next(&self) -> Result<(), TransitionError> {
        if self.exam.phase() == ExamPhase::AwaitingFinalize {
            return Err(TransitionError::ExamAwaitingFinalize);
        }
        if self.current.is_some() && !self.answered {
            return Err(TransitionError::NotAnswered);
        }
        Ok(())
    }

    /// Show `question` and reopen answering. Callers check [`Self::ready_for_next`] first.
    pub fn install_question(&mut self, question: Question) {
        self.current = Some(question);
        self.answered = false;
    }

    pub fn start_exam(&mut self, total_planned: usize) -> Result<(), TransitionError> {
        self.exam.start(total_planned)?;
        self.clear_question();
        Ok(())
    }

    /// Leave exam mode at any point, discarding its counters.
    pub fn stop_exam(&mut self) -> Result<(), TransitionError> {
        if !self.exam.is_active() {
            return Err(TransitionError::ExamNotActive);
        }
        self.exam.clear();
        self.clear_question();
        Ok(())
    }

    pub fn finalize_exam(&mut self) -> Result<&ExamResult, TransitionError> {
        let result = self.exam.finalize()?;
        self.exam_history.push(result);
        self.clear_question();
        Ok(&self.exam_history[self.exam_history.len() - 1])
    }

    /// Back to a fresh session. The chosen topic is configuration and survives.
    pub fn reset(&mut self) {
        let topic = std::mem::take(&mut self.selected_topic);
        *self = Self::new(&topic);
    }

    fn clear_question(&mut self) {
        self.current = None;
        self.answered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, topic: &str) -> Question {
        Question::new(
            text.to_string(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            "a".to_string(),
            "a is right".to_string(),
            topic.to_string(),
            "kw".to_string(),
        )
        .unwrap()
    }

    fn answer(state: &mut SessionState, text: &str, topic: &str, correct: bool) {
        state.ready_for_next().unwrap();
        state.install_question(question(text, topic));
        state.submit_answer(if correct { "a" } else { "b" }).unwrap();
    }

    #[test]
    fn submit_without_question_is_rejected() {
        let mut state = SessionState::new("A");
        assert_eq!(state.submit_answer("a").unwrap_err(), TransitionError::NoQuestion);
    }

    #[test]
    fn correct_answer_updates_counters_and_stats() {
        let mut state = SessionState::new("A");
        state.install_question(question("q1", "A"));
        let record = state.submit_answer("a").unwrap();
        assert!(record.is_correct);
        assert_eq!(record.user_choice, "a");
        assert_eq!(state.total_count(), 1);
        assert_eq!(state.correct_count(), 1);
        assert!(state.wrong_history().is_empty());
        let stat = state.topic_stats().get("A").unwrap();
        assert_eq!((stat.total, stat.correct), (1, 1));
        assert!(state.is_answered());
    }

    #[test]
    fn wrong_answer_goes_to_wrong_history() {
        let mut state = SessionState::new("A");
        state.install_question(question("q1", "B"));
        let record = state.submit_answer("c").unwrap();
        assert!(!record.is_correct);
        assert_eq!(record.correct_answer, "a");
        assert_eq!(state.wrong_history().len(), 1);
        assert_eq!(state.wrong_history()[0].text(), "q1");
        assert_eq!(state.topic_stats().get("B").unwrap().correct, 0);
    }

    #[test]
    fn second_submission_is_blocked() {
        let mut state = SessionState::new("A");
        state.install_question(question("q1", "A"));
        state.submit_answer("b").unwrap();
        assert_eq!(state.submit_answer("a").unwrap_err(), TransitionError::AlreadyAnswered);
        assert_eq!(state.total_count(), 1);
        assert_eq!(state.all_history().len(), 1);
        assert_eq!(state.wrong_history().len(), 1);
    }

    #[test]
    fn choice_outside_options_is_rejected() {
        let mut state = SessionState::new("A");
        state.install_question(question("q1", "A"));
        assert_eq!(state.submit_answer("z").unwrap_err(), TransitionError::InvalidChoice);
        assert!(!state.is_answered());
        assert_eq!(state.total_count(), 0);
    }

    #[test]
    fn cannot_skip_an_unanswered_question() {
        let mut state = SessionState::new("A");
        assert!(state.ready_for_next().is_ok());
        state.install_question(question("q1", "A"));
        assert_eq!(state.ready_for_next().unwrap_err(), TransitionError::NotAnswered);
        state.submit_answer("a").unwrap();
        assert!(state.ready_for_next().is_ok());
    }

    #[test]
    fn three_answers_two_correct() {
        let mut state = SessionState::new("A");
        answer(&mut state, "q1", "A", true);
        answer(&mut state, "q2", "A", false);
        answer(&mut state, "q3", "A", true);
        assert_eq!(state.total_count(), 3);
        assert_eq!(state.correct_count(), 2);
        assert_eq!(format!("{:.1}", state.rate_percent()), "66.7");
        let newest: Vec<&str> = state
            .history_newest_first()
            .map(|r| r.question_text.as_str())
            .collect();
        assert_eq!(newest, vec!["q3", "q2", "q1"]);
    }

    #[test]
    fn exam_runs_to_finalize() {
        let mut state = SessionState::new("A");
        state.start_exam(10).unwrap();
        for i in 0..10 {
            answer(&mut state, &format!("q{i}"), "A", i < 7);
        }
        assert_eq!(state.exam().phase(), ExamPhase::AwaitingFinalize);
        assert_eq!(state.ready_for_next().unwrap_err(), TransitionError::ExamAwaitingFinalize);

        let result = state.finalize_exam().unwrap().clone();
        assert_eq!((result.total, result.correct), (10, 7));
        assert_eq!(result.rate, 70.0);
        assert_eq!(state.exam_history().len(), 1);
        assert_eq!(state.exam().phase(), ExamPhase::Inactive);
        assert_eq!(state.exam().answered(), 0);
        assert!(state.current().is_none());
        assert!(!state.is_answered());
    }

    #[test]
    fn starting_exam_clears_current_question() {
        let mut state = SessionState::new("A");
        answer(&mut state, "q1", "A", true);
        state.start_exam(3).unwrap();
        assert!(state.current().is_none());
        assert!(!state.is_answered());
        assert_eq!(state.exam().answered(), 0);
        assert_eq!(state.total_count(), 1);
    }

    #[test]
    fn stop_exam_discards_counters() {
        let mut state = SessionState::new("A");
        assert_eq!(state.stop_exam().unwrap_err(), TransitionError::ExamNotActive);
        state.start_exam(5).unwrap();
        answer(&mut state, "q1", "A", true);
        state.stop_exam().unwrap();
        assert_eq!(state.exam().phase(), ExamPhase::Inactive);
        assert_eq!(state.exam().correct(), 0);
        assert!(state.current().is_none());
        assert!(state.exam_history().is_empty());
    }

    #[test]
    fn reset_clears_everything_but_topic() {
        let mut state = SessionState::new("B");
        state.set_review_mode(true);
        state.set_weak_mode(true);
        answer(&mut state, "q1", "A", false);
        state.start_exam(2).unwrap();
        answer(&mut state, "q2", "A", true);
        state.reset();

        assert_eq!(state.total_count(), 0);
        assert_eq!(state.correct_count(), 0);
        assert!(state.all_history().is_empty());
        assert!(state.wrong_history().is_empty());
        assert!(state.topic_stats().is_empty());
        assert!(state.exam_history().is_empty());
        assert!(!state.exam().is_active());
        assert!(!state.review_mode());
        assert!(!state.weak_mode());
        assert!(state.current().is_none());
        assert!(!state.is_answered());
        assert_eq!(state.selected_topic(), "B");
    }
}
