use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use dlquiz::catalog::TopicCatalog;
use dlquiz::error::{GenerationError, QuizError, TransitionError};
use dlquiz::generator::GenerativeModel;
use dlquiz::session::exam::ExamPhase;
use dlquiz::session::flow::{NextQuestion, next_question};
use dlquiz::session::state::SessionState;

const CATALOG: &str = r#"
[[topic]]
name = "History"
keywords = ["Dartmouth workshop", "Turing test"]

[[topic]]
name = "Methods"
keywords = ["SVM", "k-means", "PCA"]

[[topic]]
name = "Ethics"
keywords = ["XAI"]
"#;

/// Replies in order; falls back to a valid question whose answer is "a".
struct ScriptedModel {
    replies: RefCell<VecDeque<Result<String, GenerationError>>>,
    calls: Cell<usize>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedModel {
    fn new() -> Self {
        Self {
            replies: RefCell::new(VecDeque::new()),
            calls: Cell::new(0),
            prompts: RefCell::new(Vec::new()),
        }
    }

    fn push(&self, reply: Result<String, GenerationError>) {
        self.replies.borrow_mut().push_back(reply);
    }

    fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl GenerativeModel for ScriptedModel {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.set(self.calls.get() + 1);
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(payload(&format!("Question {}", self.calls.get()), "a")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn payload(question: &str, answer: &str) -> String {
    format!(
        r#"{{"question": "{question}", "options": ["a", "b", "c", "d"], "answer": "{answer}", "explanation": "{answer} is right"}}"#
    )
}

fn catalog() -> TopicCatalog {
    TopicCatalog::from_toml(CATALOG).unwrap()
}

struct Harness {
    state: SessionState,
    catalog: TopicCatalog,
    model: ScriptedModel,
    rng: SmallRng,
}

impl Harness {
    fn new(topic: &str) -> Self {
        Self {
            state: SessionState::new(topic),
            catalog: catalog(),
            model: ScriptedModel::new(),
            rng: SmallRng::seed_from_u64(42),
        }
    }

    fn next(&mut self) -> Result<NextQuestion, QuizError> {
        next_question(
            &mut self.state,
            &self.catalog,
            &self.model,
            &mut self.rng,
            "English",
        )
    }

    /// Fetch a question and answer it; `correct` picks "a" (the scripted answer) or "b".
    fn answer(&mut self, correct: bool) {
        self.next().unwrap();
        let answer = self.state.current().unwrap().answer().to_string();
        let choice = if correct {
            answer
        } else {
            self.state
                .current()
                .unwrap()
                .options()
                .iter()
                .find(|o| **o != answer)
                .unwrap()
                .clone()
        };
        self.state.submit_answer(&choice).unwrap();
    }
}

#[test]
fn three_answers_two_correct_reports_66_7() {
    let mut h = Harness::new("History");
    h.answer(true);
    h.answer(false);
    h.answer(true);

    assert_eq!(h.state.total_count(), 3);
    assert_eq!(h.state.correct_count(), 2);
    assert_eq!(format!("{:.1}%", h.state.rate_percent()), "66.7%");
    assert_eq!(h.model.calls(), 3);
}

#[test]
fn ten_question_exam_with_seven_correct() {
    let mut h = Harness::new("Methods");
    h.state.start_exam(10).unwrap();
    for i in 0..10 {
        h.answer(i % 10 < 7);
        assert!(h.state.exam().answered() <= h.state.exam().total_planned());
    }
    assert_eq!(h.state.exam().phase(), ExamPhase::AwaitingFinalize);

    // No new question until the result is saved.
    let calls = h.model.calls();
    let err = h.next().unwrap_err();
    assert!(matches!(
        err,
        QuizError::Transition(TransitionError::ExamAwaitingFinalize)
    ));
    assert_eq!(h.model.calls(), calls);

    let result = h.state.finalize_exam().unwrap().clone();
    assert_eq!(result.total, 10);
    assert_eq!(result.correct, 7);
    assert_eq!(result.rate, 70.0);
    assert_eq!(h.state.exam_history().len(), 1);
    assert_eq!(h.state.exam().phase(), ExamPhase::Inactive);
    assert_eq!(h.state.exam().answered(), 0);
    assert_eq!(h.state.exam().correct(), 0);
}

#[test]
fn review_mode_replays_the_missed_question_without_generating() {
    let mut h = Harness::new("History");
    h.model.push(Ok(payload("What did Turing propose?", "c")));
    h.answer(false);
    let missed = h.state.current().unwrap().clone();

    h.state.set_review_mode(true);
    let calls = h.model.calls();
    assert_eq!(h.next().unwrap(), NextQuestion::Replayed);
    assert_eq!(h.model.calls(), calls);
    assert_eq!(h.state.current(), Some(&missed));
    assert!(!h.state.is_answered());
}

#[test]
fn review_mode_with_nothing_missed_generates() {
    let mut h = Harness::new("History");
    h.state.set_review_mode(true);
    assert_eq!(h.next().unwrap(), NextQuestion::Generated);
    assert_eq!(h.model.calls(), 1);
}

#[test]
fn weak_mode_targets_lowest_accuracy_topic() {
    let mut h = Harness::new("History");
    h.answer(true);
    h.state.set_selected_topic("Methods");
    h.answer(false);
    h.state.set_selected_topic("History");

    h.state.set_weak_mode(true);
    h.next().unwrap();
    assert_eq!(h.state.current().unwrap().main_topic(), "Methods");
    let prompts = h.model.prompts.borrow();
    assert!(prompts.last().unwrap().contains("Methods"));
}

#[test]
fn reset_mid_session_clears_everything() {
    let mut h = Harness::new("Ethics");
    h.answer(false);
    h.state.set_review_mode(true);
    h.state.set_weak_mode(true);
    h.state.start_exam(3).unwrap();
    h.answer(true);

    h.state.reset();
    assert_eq!(h.state.total_count(), 0);
    assert_eq!(h.state.correct_count(), 0);
    assert!(h.state.all_history().is_empty());
    assert!(h.state.wrong_history().is_empty());
    assert!(h.state.topic_stats().is_empty());
    assert!(h.state.exam_history().is_empty());
    assert_eq!(h.state.exam().phase(), ExamPhase::Inactive);
    assert!(!h.state.review_mode());
    assert!(!h.state.weak_mode());
    assert!(h.state.current().is_none());
}

#[test]
fn failed_generation_keeps_the_answered_question() {
    let mut h = Harness::new("History");
    h.answer(true);
    let before = h.state.current().unwrap().clone();

    h.model.push(Err(GenerationError::HttpStatus {
        status: 404,
        body: "model not found".to_string(),
    }));
    let err = h.next().unwrap_err();
    assert!(matches!(err, QuizError::Generation(_)));
    assert!(err.hint().is_some());

    assert_eq!(h.state.current(), Some(&before));
    assert!(h.state.is_answered());
    assert_eq!(h.state.submit_answer("a").unwrap_err(), TransitionError::AlreadyAnswered);
    assert_eq!(h.state.total_count(), 1);

    // The next attempt succeeds and reopens answering.
    h.next().unwrap();
    assert!(!h.state.is_answered());
}

#[test]
fn malformed_reply_is_rejected_whole() {
    let mut h = Harness::new("History");
    h.model.push(Ok(r#"{"question": "q", "options": ["a", "b", "c"], "answer": "a", "explanation": "e"}"#.to_string()));
    assert!(h.next().is_err());
    assert!(h.state.current().is_none());

    h.model.push(Ok(format!("```json\n{}\n```", payload("fenced", "d"))));
    h.next().unwrap();
    assert_eq!(h.state.current().unwrap().text(), "fenced");
}

#[test]
fn unanswered_question_blocks_advance() {
    let mut h = Harness::new("History");
    h.next().unwrap();
    let err = h.next().unwrap_err();
    assert!(matches!(err, QuizError::Transition(TransitionError::NotAnswered)));
    assert_eq!(h.model.calls(), 1);
}

#[test]
fn random_sessions_keep_counters_consistent() {
    let mut driver = SmallRng::seed_from_u64(2024);
    for seed in 0..20u64 {
        let mut h = Harness::new("History");
        h.rng = SmallRng::seed_from_u64(seed);
        let topics = ["History", "Methods", "Ethics"];
        let mut last_exam_answered = 0;

        for _ in 0..60 {
            match driver.gen_range(0..10) {
                0 => h.state.set_review_mode(!h.state.review_mode()),
                1 => h.state.set_weak_mode(!h.state.weak_mode()),
                2 => h.state.set_selected_topic(topics[driver.gen_range(0..topics.len())]),
                3 => {
                    if h.state.start_exam(driver.gen_range(1..5)).is_ok() {
                        last_exam_answered = 0;
                    }
                }
                4 => {
                    if h.state.exam().phase() == ExamPhase::AwaitingFinalize {
                        let result = h.state.finalize_exam().unwrap();
                        let expected = result.correct as f64 / result.total as f64 * 100.0;
                        assert_eq!(result.rate, expected);
                        last_exam_answered = 0;
                    }
                }
                _ => {
                    let _ = h.next();
                    if h.state.current().is_some() && !h.state.is_answered() {
                        let idx = driver.gen_range(0..4);
                        let choice = h.state.current().unwrap().options()[idx].clone();
                        h.state.submit_answer(&choice).unwrap();
                        // Double submission never counts.
                        assert!(h.state.submit_answer(&choice).is_err());
                    }
                }
            }

            let exam = h.state.exam();
            if exam.is_active() {
                assert!(exam.answered() >= last_exam_answered);
                assert!(exam.answered() <= exam.total_planned());
                last_exam_answered = exam.answered();
            }

            let history = h.state.all_history();
            assert_eq!(h.state.total_count(), history.len());
            assert_eq!(
                h.state.correct_count(),
                history.iter().filter(|r| r.is_correct).count()
            );
            assert_eq!(
                h.state.wrong_history().len(),
                h.state.total_count() - h.state.correct_count()
            );
            let stat_total: usize = h.state.topic_stats().iter().map(|s| s.total).sum();
            assert_eq!(stat_total, h.state.total_count());
            for stat in h.state.topic_stats().iter() {
                assert!(stat.total >= stat.correct);
            }
        }
    }
}
