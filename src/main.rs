use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use dlquiz::app::{App, AppScreen, SettingsItem, StatusKind};
use dlquiz::catalog::TopicCatalog;
use dlquiz::config::{Config, Credential};
use dlquiz::event::{AppEvent, EventHandler};
use dlquiz::logging;
use dlquiz::session::exam::ExamPhase;
use dlquiz::ui;
use dlquiz::ui::components::exam_result::ExamResultCard;
use dlquiz::ui::components::notes_panel::NotesPanel;
use dlquiz::ui::components::progress_bar::ProgressBar;
use dlquiz::ui::components::question_card::{CardNotice, QuestionCard};
use dlquiz::ui::components::question_list::QuestionList;
use dlquiz::ui::components::quiz_sidebar::QuizSidebar;
use dlquiz::ui::components::score_panel::ScorePanel;
use dlquiz::ui::components::tab_bar::{QuizTab, TabBar};
use dlquiz::ui::components::topic_progress::TopicProgress;
use dlquiz::ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(
    name = "dlquiz",
    version,
    about = "Multiple-choice AI and deep learning quiz with generated questions"
)]
struct Cli {
    #[arg(short, long, help = "Gemini model id for this session")]
    model: Option<String>,

    #[arg(long, help = "Topic to draw questions from")]
    topic: Option<String>,

    #[arg(short, long, help = "Number of questions per exam")]
    exam_length: Option<usize>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Language of generated questions")]
    language: Option<String>,

    #[arg(long, help = "Disable the log file")]
    no_log: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_err) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    let _log_guard = if cli.no_log {
        None
    } else {
        logging::init_tracing(&config.log_level)
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dlquiz starting");
    if let Some(err) = config_err {
        tracing::warn!(%err, "config unreadable, using defaults");
    }

    let catalog = TopicCatalog::load().context("failed to load the topic catalog")?;

    if let Some(topic) = cli.topic {
        if !catalog.contains(&topic) {
            tracing::warn!(%topic, "unknown topic on command line");
        }
        config.topic = topic;
    }
    if let Some(length) = cli.exam_length {
        config.exam_length = length;
    }
    if let Some(language) = cli.language {
        config.language = language;
    }

    let credential = Credential::resolve();
    tracing::info!(source = credential.source.label(), "api key resolved");

    let mut app = App::new(
        config,
        catalog,
        credential,
        SmallRng::from_entropy(),
        Some(Config::config_path()),
    );
    if let Some(model) = cli.model {
        app.set_model_override(&model);
    }
    if let Some(theme_name) = cli.theme {
        if !app.set_theme(&theme_name) {
            tracing::warn!(theme = %theme_name, "unknown theme on command line");
        }
    }
    if !app.credential_missing() {
        app.queue_next_question();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "run loop failed");
        eprintln!("Error: {err:?}");
    }
    tracing::info!("dlquiz exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        // The frame above showed the "Generating" notice; now block on the call.
        if app.generating {
            app.request_next_question();
            let dropped = events.discard_pending_keys();
            if dropped > 0 {
                tracing::debug!(dropped, "ignored keys pressed during generation");
            }
            continue;
        }

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.confirm_reset {
        match key.code {
            KeyCode::Char('y') => app.confirm_reset_all(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_reset(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.set_tab(app.tab.next()),
        KeyCode::BackTab => app.set_tab(app.tab.prev()),
        KeyCode::F(n) => {
            if let Some(tab) = QuizTab::from_number(n.into()) {
                app.set_tab(tab);
            }
        }
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Char('R') => app.request_reset(),
        KeyCode::Char('r') => app.toggle_review_mode(),
        KeyCode::Char('w') => app.toggle_weak_mode(),
        KeyCode::Char('t') => app.next_topic(),
        KeyCode::Char('T') => app.prev_topic(),
        KeyCode::Char('e') => app.start_exam(),
        KeyCode::Char('x') => app.stop_exam(),
        KeyCode::Char('f') => app.finalize_exam(),
        KeyCode::Char('n') => app.queue_next_question(),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::PageUp => app.scroll_up(10),
        _ if app.tab == QuizTab::Challenge => handle_challenge_key(app, key),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        _ => {}
    }
}

fn handle_challenge_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm(),
        KeyCode::Char(ch @ '1'..='4') => {
            if let Some(digit) = ch.to_digit(10) {
                app.choose_option(digit as usize - 1);
            }
        }
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    if app.settings_edit.is_some() {
        app.settings_edit_key(key);
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_up(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_down(),
        KeyCode::Enter => app.settings_activate(),
        KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = AppLayout::new(area);

    let mut header = vec![
        Span::styled(
            " dlquiz ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " AI & Deep Learning Quiz",
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ),
    ];
    if !layout.tier.show_sidebar() {
        header.push(Span::styled(
            format!("  | {}", app.session.selected_topic()),
            Style::default().fg(colors.tag()).bg(colors.header_bg()),
        ));
    }
    Paragraph::new(Line::from(header))
        .style(Style::default().bg(colors.header_bg()))
        .render(layout.header, frame.buffer_mut());

    frame.render_widget(TabBar::new(app.tab, app.theme), layout.tabs);

    match app.tab {
        QuizTab::Challenge => render_challenge(frame, app, layout.main),
        QuizTab::Score => frame.render_widget(
            ScorePanel::new(&app.session, app.scroll, app.theme),
            layout.main,
        ),
        QuizTab::Notes => frame.render_widget(
            NotesPanel::new(app.session.all_history(), app.scroll, app.theme),
            layout.main,
        ),
        QuizTab::Progress => frame.render_widget(
            TopicProgress::new(
                app.session.topic_stats(),
                app.session.weak_mode(),
                app.scroll,
                app.theme,
            ),
            layout.main,
        ),
        QuizTab::QuestionList => frame.render_widget(
            QuestionList::new(app.session.all_history(), app.scroll, app.theme),
            layout.main,
        ),
    }

    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(
            QuizSidebar::new(
                &app.session,
                app.active_model(),
                app.credential_source(),
                app.theme,
            ),
            sidebar,
        );
    }

    render_status(frame, app, layout.status);

    let hints: &[&str] = match app.tab {
        QuizTab::Challenge => &[
            "[1-4/Enter] Answer",
            "[n] Next",
            "[e] Exam",
            "[x] Stop exam",
            "[f] Save exam",
            "[t/T] Topic",
            "[r] Review",
            "[w] Weak",
            "[Tab] Tabs",
            "[c] Settings",
            "[R] Reset",
            "[q] Quit",
        ],
        _ => &[
            "[j/k/PgUp/PgDn] Scroll",
            "[Tab/F1-F5] Tabs",
            "[c] Settings",
            "[R] Reset",
            "[q] Quit",
        ],
    };
    let footer_lines = pack_hint_lines(hints, layout.footer.width as usize);
    if let Some(first) = footer_lines.first() {
        Paragraph::new(Line::from(Span::styled(
            first.clone(),
            Style::default().fg(colors.accent()),
        )))
        .render(layout.footer, frame.buffer_mut());
    }

    if app.confirm_reset {
        render_reset_confirm(frame, app);
    }
}

fn render_challenge(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let exam = app.session.exam();
    let secrets = Config::secrets_path();
    let notice = if app.credential_missing() {
        CardNotice::MissingKey { secrets: &secrets }
    } else if app.generating {
        CardNotice::Generating
    } else {
        CardNotice::None
    };
    let card = QuestionCard::new(&app.session, app.option_cursor, notice, app.scroll, app.theme);

    match exam.phase() {
        ExamPhase::Inactive => frame.render_widget(card, area),
        ExamPhase::InProgress => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(5)])
                .split(area);
            frame.render_widget(
                ProgressBar::counted("Exam", exam.answered(), exam.total_planned(), app.theme),
                rows[0],
            );
            frame.render_widget(card, rows[1]);
        }
        ExamPhase::AwaitingFinalize => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(8)])
                .split(area);
            frame.render_widget(card, rows[0]);
            frame.render_widget(ExamResultCard::from_exam(exam, app.theme), rows[1]);
        }
    }
}

fn render_status(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let Some(status) = &app.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => colors.accent(),
        StatusKind::Success => colors.success(),
        StatusKind::Error => colors.error(),
    };
    let mut lines = vec![Line::from(Span::styled(
        format!(" {}", status.text),
        Style::default().fg(color),
    ))];
    if let Some(hint) = status.hint {
        lines.push(Line::from(Span::styled(
            format!(" {hint}"),
            Style::default().fg(colors.text_muted()),
        )));
    }
    Paragraph::new(lines).render(area, frame.buffer_mut());
}

fn render_reset_confirm(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = ui::layout::centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Start Over ")
        .border_style(Style::default().fg(colors.warning()))
        .style(Style::default().bg(colors.bg()));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Clear all scores, history, notes and exam results?",
            Style::default().fg(colors.fg()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  [y] Yes, start over   [n] Cancel",
            Style::default().fg(colors.accent()),
        )),
    ];
    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .render(area, frame.buffer_mut());
}

fn settings_value(app: &App, item: SettingsItem) -> String {
    match item {
        SettingsItem::ApiKey => {
            let credential = app.active_credential();
            if credential.is_available() {
                format!("{} ({})", credential.key.masked(), credential.source.label())
            } else {
                "not set".to_string()
            }
        }
        SettingsItem::Model => app.active_model().to_string(),
        SettingsItem::Language => app.config.language.clone(),
        SettingsItem::ExamLength => format!("< {} >", app.config.exam_length),
        SettingsItem::Theme => format!("< {} >", app.config.theme),
        SettingsItem::ResetSettings => "press Enter".to_string(),
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let items = SettingsItem::ALL;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(items.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Key and model apply to this session only. Other settings are saved on exit.",
        Style::default().fg(colors.text_muted()),
    )))
    .wrap(Wrap { trim: false });
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(items.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, item) in items.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.selection_fg()
        } else {
            colors.text_muted()
        });

        let editing = app
            .settings_edit
            .as_ref()
            .filter(|_| is_selected)
            .map(|(_, input)| input);
        let value_line = match editing {
            Some(input) => {
                let (before, cursor, after) = input.render_parts();
                let cursor_style = Style::default()
                    .fg(colors.bg())
                    .bg(colors.accent());
                Line::from(vec![
                    Span::styled("    ", value_style),
                    Span::styled(before, Style::default().fg(colors.fg())),
                    Span::styled(cursor.map(String::from).unwrap_or_else(|| " ".to_string()), cursor_style),
                    Span::styled(after, Style::default().fg(colors.fg())),
                ])
            }
            None => Line::from(Span::styled(
                format!("    {}", settings_value(app, *item)),
                value_style,
            )),
        };

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{}:", item.label()), label_style)),
            value_line,
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer_text = if app.settings_edit.is_some() {
        "  [Enter] Apply  [Esc] Cancel  [Tab] Complete model name"
    } else {
        "  [Esc] Save & back  [Enter] Edit  [Left/Right] Change value"
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}
