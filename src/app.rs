use std::path::PathBuf;

use rand::rngs::SmallRng;

use crate::catalog::TopicCatalog;
use crate::config::{Config, Credential, CredentialSource, MAX_EXAM_LENGTH};
use crate::error::{QuizError, TransitionError};
use crate::generator::GenerativeModel;
use crate::generator::gemini::{GeminiClient, KNOWN_MODELS, normalize_model};
use crate::session::exam::ExamPhase;
use crate::session::flow::{self, NextQuestion};
use crate::session::question::OPTION_COUNT;
use crate::session::state::SessionState;
use crate::ui::components::tab_bar::QuizTab;
use crate::ui::line_input::{InputResult, LineInput, SettingsField};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Quiz,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
    pub hint: Option<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsItem {
    ApiKey,
    Model,
    Language,
    ExamLength,
    Theme,
    ResetSettings,
}

impl SettingsItem {
    pub const ALL: [SettingsItem; 6] = [
        SettingsItem::ApiKey,
        SettingsItem::Model,
        SettingsItem::Language,
        SettingsItem::ExamLength,
        SettingsItem::Theme,
        SettingsItem::ResetSettings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsItem::ApiKey => "API key",
            SettingsItem::Model => "Model",
            SettingsItem::Language => "Question language",
            SettingsItem::ExamLength => "Exam length",
            SettingsItem::Theme => "Theme",
            SettingsItem::ResetSettings => "Reset question settings",
        }
    }

    fn text_field(self) -> Option<SettingsField> {
        match self {
            SettingsItem::ApiKey => Some(SettingsField::ApiKey),
            SettingsItem::Model => Some(SettingsField::Model),
            SettingsItem::Language => Some(SettingsField::Language),
            _ => None,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub tab: QuizTab,
    pub session: SessionState,
    pub catalog: TopicCatalog,
    pub config: Config,
    pub theme: &'static Theme,
    pub status: Option<StatusLine>,
    pub option_cursor: usize,
    pub scroll: u16,
    pub confirm_reset: bool,
    /// Set when a question request is queued; the run loop draws one
    /// "Generating" frame and then performs the call.
    pub generating: bool,
    pub settings_selected: usize,
    pub settings_edit: Option<(SettingsField, LineInput)>,
    pub should_quit: bool,
    stored_credential: Credential,
    key_override: Option<Credential>,
    model_override: Option<String>,
    config_path: Option<PathBuf>,
    rng: SmallRng,
}

impl App {
    /// `config_path` of None keeps settings in memory only.
    pub fn new(
        mut config: Config,
        catalog: TopicCatalog,
        credential: Credential,
        rng: SmallRng,
        config_path: Option<PathBuf>,
    ) -> Self {
        config.normalize(&catalog);
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let session = SessionState::new(&config.topic);

        Self {
            screen: AppScreen::Quiz,
            tab: QuizTab::Challenge,
            session,
            catalog,
            config,
            theme,
            status: None,
            option_cursor: 0,
            scroll: 0,
            confirm_reset: false,
            generating: false,
            settings_selected: 0,
            settings_edit: None,
            should_quit: false,
            stored_credential: credential,
            key_override: None,
            model_override: None,
            config_path,
            rng,
        }
    }

    pub fn active_credential(&self) -> &Credential {
        self.key_override.as_ref().unwrap_or(&self.stored_credential)
    }

    pub fn credential_source(&self) -> CredentialSource {
        self.active_credential().source
    }

    pub fn credential_missing(&self) -> bool {
        !self.active_credential().is_available()
    }

    pub fn active_model(&self) -> &str {
        self.model_override.as_deref().unwrap_or(&self.config.model)
    }

    /// Session-only model choice; never written to the config file.
    pub fn set_model_override(&mut self, model: &str) {
        if model.trim().is_empty() {
            self.model_override = None;
        } else {
            self.model_override = Some(normalize_model(model));
        }
    }

    pub fn set_theme(&mut self, name: &str) -> bool {
        match Theme::load(name) {
            Some(theme) => {
                self.config.theme = name.to_string();
                self.theme = Box::leak(Box::new(theme));
                true
            }
            None => false,
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            kind: StatusKind::Info,
            text: text.into(),
            hint: None,
        });
    }

    fn success(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            kind: StatusKind::Success,
            text: text.into(),
            hint: None,
        });
    }

    fn report(&mut self, err: QuizError) {
        tracing::warn!(%err, "action failed");
        self.status = Some(StatusLine {
            kind: StatusKind::Error,
            hint: err.hint(),
            text: err.to_string(),
        });
    }

    // --- question flow ---

    /// Check that a new question may be fetched and mark it pending.
    pub fn queue_next_question(&mut self) {
        if let Err(err) = self.active_credential().require() {
            self.report(err.into());
            return;
        }
        if let Err(err) = self.session.ready_for_next() {
            self.report(err.into());
            return;
        }
        self.generating = true;
    }

    /// Queue a question without complaining when no key is set; the
    /// Challenge tab already explains that.
    fn auto_advance(&mut self) {
        if !self.credential_missing() {
            self.queue_next_question();
        }
    }

    /// Perform the pending request against the configured Gemini model.
    pub fn request_next_question(&mut self) {
        let key = match self.active_credential().require() {
            Ok(key) => key.clone(),
            Err(err) => {
                self.generating = false;
                self.report(err.into());
                return;
            }
        };
        match GeminiClient::new(key, self.active_model(), &self.config.api_endpoint) {
            Ok(client) => self.advance_with(&client),
            Err(err) => {
                self.generating = false;
                self.report(err.into());
            }
        }
    }

    /// Replay or generate the next question using `model`.
    pub fn advance_with<M: GenerativeModel + ?Sized>(&mut self, model: &M) {
        self.generating = false;
        let outcome = flow::next_question(
            &mut self.session,
            &self.catalog,
            model,
            &mut self.rng,
            &self.config.language,
        );
        match outcome {
            Ok(kind) => {
                self.option_cursor = 0;
                if self.tab == QuizTab::Challenge {
                    self.scroll = 0;
                }
                match kind {
                    NextQuestion::Replayed => self.info("Replaying a question you missed."),
                    NextQuestion::Generated => self.status = None,
                }
            }
            Err(err) => self.report(err),
        }
    }

    pub fn cursor_up(&mut self) {
        self.option_cursor = self.option_cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        self.option_cursor = (self.option_cursor + 1).min(OPTION_COUNT - 1);
    }

    /// Enter on the Challenge tab: answer when a question is open,
    /// otherwise move on.
    pub fn confirm(&mut self) {
        match self.session.current() {
            Some(_) if !self.session.is_answered() => self.submit_answer(),
            _ => self.queue_next_question(),
        }
    }

    pub fn choose_option(&mut self, index: usize) {
        if index < OPTION_COUNT {
            self.option_cursor = index;
            self.submit_answer();
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(choice) = self
            .session
            .current()
            .and_then(|q| q.options().get(self.option_cursor))
            .cloned()
        else {
            self.report(TransitionError::NoQuestion.into());
            return;
        };

        match self.session.submit_answer(&choice) {
            Ok(record) => {
                tracing::info!(
                    topic = %record.main_topic,
                    keyword = %record.sub_topic,
                    correct = record.is_correct,
                    "answer submitted"
                );
                self.status = None;
                if self.session.exam().phase() == ExamPhase::AwaitingFinalize {
                    self.info("Exam complete. Press [f] to save the result.");
                }
            }
            Err(err) => self.report(err.into()),
        }
    }

    // --- exam ---

    pub fn start_exam(&mut self) {
        let length = self.config.exam_length;
        match self.session.start_exam(length) {
            Ok(()) => {
                tracing::info!(questions = length, "exam started");
                self.option_cursor = 0;
                self.info(format!("Exam started: {length} questions."));
                self.auto_advance();
            }
            Err(err) => self.report(err.into()),
        }
    }

    pub fn stop_exam(&mut self) {
        match self.session.stop_exam() {
            Ok(()) => {
                tracing::info!("exam discarded");
                self.info("Back to practice mode. The exam was not saved.");
                self.auto_advance();
            }
            Err(err) => self.report(err.into()),
        }
    }

    pub fn finalize_exam(&mut self) {
        match self.session.finalize_exam() {
            Ok(result) => {
                tracing::info!(
                    total = result.total,
                    correct = result.correct,
                    rate = result.rate,
                    "exam saved"
                );
                let text = format!(
                    "Exam saved: {}/{} correct ({:.1}%).",
                    result.correct, result.total, result.rate
                );
                self.success(text);
                self.auto_advance();
            }
            Err(err) => self.report(err.into()),
        }
    }

    // --- question settings ---

    pub fn toggle_review_mode(&mut self) {
        let on = !self.session.review_mode();
        self.session.set_review_mode(on);
        if on && self.session.wrong_history().is_empty() {
            self.info("Review mode on. Nothing missed yet, so new questions are generated.");
        } else {
            self.info(format!("Review mode {}.", if on { "on" } else { "off" }));
        }
    }

    pub fn toggle_weak_mode(&mut self) {
        let on = !self.session.weak_mode();
        self.session.set_weak_mode(on);
        self.info(format!("Weak-topic priority {}.", if on { "on" } else { "off" }));
    }

    pub fn next_topic(&mut self) {
        let topic = self
            .catalog
            .next_topic(self.session.selected_topic())
            .to_string();
        self.session.set_selected_topic(&topic);
        self.info(format!("Topic: {topic}"));
    }

    pub fn prev_topic(&mut self) {
        let topic = self
            .catalog
            .prev_topic(self.session.selected_topic())
            .to_string();
        self.session.set_selected_topic(&topic);
        self.info(format!("Topic: {topic}"));
    }

    // --- reset ---

    pub fn request_reset(&mut self) {
        self.confirm_reset = true;
    }

    pub fn cancel_reset(&mut self) {
        self.confirm_reset = false;
    }

    pub fn confirm_reset_all(&mut self) {
        self.confirm_reset = false;
        self.session.reset();
        self.option_cursor = 0;
        self.scroll = 0;
        tracing::info!("session reset");
        self.success("Started over. Scores and history were cleared.");
        self.auto_advance();
    }

    // --- tabs ---

    pub fn set_tab(&mut self, tab: QuizTab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    // --- settings screen ---

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.settings_edit = None;
        self.screen = AppScreen::Settings;
    }

    pub fn selected_setting(&self) -> SettingsItem {
        SettingsItem::ALL[self.settings_selected.min(SettingsItem::ALL.len() - 1)]
    }

    pub fn settings_up(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_down(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SettingsItem::ALL.len() - 1);
    }

    pub fn settings_activate(&mut self) {
        let item = self.selected_setting();
        match item.text_field() {
            Some(field) => self.open_editor(field),
            None if item == SettingsItem::ResetSettings => self.reset_settings(),
            None => self.settings_cycle_forward(),
        }
    }

    fn open_editor(&mut self, field: SettingsField) {
        let input = match field {
            // Start blank: the stored key is never echoed back.
            SettingsField::ApiKey => LineInput::new("").masked(),
            SettingsField::Model => {
                LineInput::new(self.active_model()).with_candidates(KNOWN_MODELS.iter().copied())
            }
            SettingsField::Language => LineInput::new(&self.config.language),
        };
        self.settings_edit = Some((field, input));
    }

    pub fn settings_edit_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some((field, input)) = self.settings_edit.as_mut() else {
            return;
        };
        match input.handle(key) {
            InputResult::Continue => {}
            InputResult::Cancel => self.settings_edit = None,
            InputResult::Submit => {
                let field = *field;
                let value = input.value().to_string();
                self.settings_edit = None;
                self.apply_text_setting(field, &value);
            }
        }
    }

    pub fn apply_text_setting(&mut self, field: SettingsField, value: &str) {
        match field {
            SettingsField::ApiKey => {
                if value.trim().is_empty() {
                    self.key_override = None;
                    self.info(format!(
                        "Using the key from {}.",
                        self.stored_credential.source.label()
                    ));
                } else {
                    self.key_override = Some(Credential::entered(value));
                    tracing::info!("api key entered for this session");
                    self.success("API key set for this session.");
                }
            }
            SettingsField::Model => {
                self.set_model_override(value);
                tracing::info!(model = self.active_model(), "model changed");
                self.info(format!("Model: {}", self.active_model()));
            }
            SettingsField::Language => {
                let language = value.trim();
                if !language.is_empty() {
                    self.config.language = language.to_string();
                }
            }
        }
    }

    pub fn settings_cycle_forward(&mut self) {
        match self.selected_setting() {
            SettingsItem::ExamLength => {
                self.config.exam_length = (self.config.exam_length + 1).min(MAX_EXAM_LENGTH);
            }
            SettingsItem::Theme => self.cycle_theme(true),
            _ => {}
        }
    }

    pub fn settings_cycle_backward(&mut self) {
        match self.selected_setting() {
            SettingsItem::ExamLength => {
                self.config.exam_length = self.config.exam_length.saturating_sub(1).max(1);
            }
            SettingsItem::Theme => self.cycle_theme(false),
            _ => {}
        }
    }

    fn cycle_theme(&mut self, forward: bool) {
        let themes = Theme::available_themes();
        if themes.is_empty() {
            return;
        }
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) if forward => (idx + 1) % themes.len(),
            Some(idx) => (idx + themes.len() - 1) % themes.len(),
            None => 0,
        };
        let name = themes[next].clone();
        self.set_theme(&name);
    }

    /// Question flags back to off, topic and model back to the configured
    /// values, entered key dropped.
    pub fn reset_settings(&mut self) {
        self.session.set_review_mode(false);
        self.session.set_weak_mode(false);
        self.session.set_selected_topic(&self.config.topic);
        self.model_override = None;
        self.key_override = None;
        tracing::info!("question settings reset");
        self.success("Question settings restored.");
    }

    pub fn leave_settings(&mut self) {
        self.settings_edit = None;
        self.screen = AppScreen::Quiz;
        if let Some(path) = &self.config_path {
            if let Err(err) = self.config.save_to(path) {
                tracing::warn!(%err, "failed to save config");
                self.status = Some(StatusLine {
                    kind: StatusKind::Error,
                    text: format!("Could not save settings: {err}"),
                    hint: None,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use rand::SeedableRng;

    use super::*;
    use crate::error::GenerationError;

    struct Scripted(RefCell<VecDeque<Result<String, GenerationError>>>);

    impl Scripted {
        fn replies(replies: Vec<Result<String, GenerationError>>) -> Self {
            Self(RefCell::new(replies.into()))
        }
    }

    impl GenerativeModel for Scripted {
        fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.0
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyResponse))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn reply(answer: &str) -> Result<String, GenerationError> {
        Ok(format!(
            r#"{{"question": "Which?", "options": ["a", "b", "c", "d"], "answer": "{answer}", "explanation": "because"}}"#
        ))
    }

    fn app_with(credential: Credential) -> App {
        App::new(
            Config::default(),
            TopicCatalog::bundled().unwrap(),
            credential,
            SmallRng::seed_from_u64(7),
            None,
        )
    }

    fn app() -> App {
        app_with(Credential::entered("test-key"))
    }

    #[test]
    fn missing_key_refuses_to_queue() {
        let mut app = app_with(Credential::missing());
        assert!(app.credential_missing());
        app.queue_next_question();
        assert!(!app.generating);
        let status = app.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.hint.is_some());
    }

    #[test]
    fn answer_then_advance() {
        let mut app = app();
        app.queue_next_question();
        assert!(app.generating);
        app.advance_with(&Scripted::replies(vec![reply("c")]));
        assert!(!app.generating);
        assert!(app.session.current().is_some());

        app.choose_option(2);
        assert!(app.session.is_answered());
        assert_eq!(app.session.correct_count(), 1);

        // A second submission is refused and reported.
        app.choose_option(1);
        assert_eq!(app.session.total_count(), 1);
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn failed_generation_keeps_previous_question() {
        let mut app = app();
        app.advance_with(&Scripted::replies(vec![reply("a")]));
        app.choose_option(0);
        app.advance_with(&Scripted::replies(vec![Ok("not json".to_string())]));
        assert_eq!(app.session.current().map(|q| q.answer()), Some("a"));
        assert!(app.session.is_answered());
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn enter_on_unanswered_question_submits_cursor_choice() {
        let mut app = app();
        app.advance_with(&Scripted::replies(vec![reply("b")]));
        app.cursor_down();
        app.confirm();
        assert_eq!(app.session.last_record().map(|r| r.user_choice.as_str()), Some("b"));
        assert_eq!(app.session.correct_count(), 1);
    }

    #[test]
    fn session_key_override_and_settings_reset() {
        let mut app = app_with(Credential::missing());
        app.apply_text_setting(SettingsField::ApiKey, "  typed-key ");
        assert_eq!(app.credential_source(), CredentialSource::Session);
        assert!(!app.credential_missing());

        app.apply_text_setting(SettingsField::Model, "gemini-2.5-pro");
        assert_eq!(app.active_model(), "models/gemini-2.5-pro");
        app.toggle_weak_mode();
        app.next_topic();

        app.reset_settings();
        assert!(app.credential_missing());
        assert_eq!(app.active_model(), app.config.model);
        assert!(!app.session.weak_mode());
        assert_eq!(app.session.selected_topic(), app.config.topic);
    }

    #[test]
    fn exam_length_clamped_in_settings() {
        let mut app = app();
        app.settings_selected = SettingsItem::ALL
            .iter()
            .position(|i| *i == SettingsItem::ExamLength)
            .unwrap();
        app.config.exam_length = 1;
        app.settings_cycle_backward();
        assert_eq!(app.config.exam_length, 1);
        app.config.exam_length = MAX_EXAM_LENGTH;
        app.settings_cycle_forward();
        assert_eq!(app.config.exam_length, MAX_EXAM_LENGTH);
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut app = app();
        app.advance_with(&Scripted::replies(vec![reply("a")]));
        app.choose_option(1);
        app.request_reset();
        app.cancel_reset();
        assert_eq!(app.session.total_count(), 1);
        app.request_reset();
        app.confirm_reset_all();
        assert_eq!(app.session.total_count(), 0);
        assert!(app.session.wrong_history().is_empty());
    }
}
