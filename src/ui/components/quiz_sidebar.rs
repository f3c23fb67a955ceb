use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::config::CredentialSource;
use crate::session::exam::ExamPhase;
use crate::session::state::SessionState;
use crate::ui::theme::Theme;

pub struct QuizSidebar<'a> {
    session: &'a SessionState,
    model: &'a str,
    credential: CredentialSource,
    theme: &'a Theme,
}

impl<'a> QuizSidebar<'a> {
    pub fn new(
        session: &'a SessionState,
        model: &'a str,
        credential: CredentialSource,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            model,
            credential,
            theme,
        }
    }
}

fn flag_span<'a>(on: bool, theme: &Theme) -> Span<'a> {
    if on {
        Span::styled("on", Style::default().fg(theme.colors.success()))
    } else {
        Span::styled("off", Style::default().fg(theme.colors.text_muted()))
    }
}

impl Widget for QuizSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.fg());

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(7)])
            .split(area);

        {
            let review_waiting = self.session.review_mode() && self.session.wrong_history().is_empty();
            let mut lines = vec![
                Line::from(Span::styled("Topic", label)),
                Line::from(Span::styled(
                    self.session.selected_topic().to_string(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Review missed: ", label),
                    flag_span(self.session.review_mode(), self.theme),
                ]),
            ];
            if review_waiting {
                lines.push(Line::from(Span::styled(
                    "  nothing missed yet",
                    Style::default().fg(colors.text_muted()),
                )));
            }
            lines.push(Line::from(vec![
                Span::styled("Weak topics:    ", label),
                flag_span(self.session.weak_mode(), self.theme),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Model", label)));
            lines.push(Line::from(Span::styled(
                self.model.to_string(),
                Style::default().fg(colors.tag()),
            )));
            lines.push(Line::from(vec![
                Span::styled("API key: ", label),
                Span::styled(
                    self.credential.label(),
                    Style::default().fg(if self.credential == CredentialSource::Missing {
                        colors.error()
                    } else {
                        colors.success()
                    }),
                ),
            ]));

            let block = Block::bordered()
                .title(" Question Settings ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .render(sections[0], buf);
        }

        {
            let exam = self.session.exam();
            let status = match exam.phase() {
                ExamPhase::Inactive => Span::styled(
                    "not running",
                    Style::default().fg(colors.text_muted()),
                ),
                ExamPhase::InProgress => Span::styled(
                    format!("{} / {}", exam.answered(), exam.total_planned()),
                    Style::default().fg(colors.accent()),
                ),
                ExamPhase::AwaitingFinalize => Span::styled(
                    "finished, unsaved",
                    Style::default().fg(colors.warning()),
                ),
            };
            let rate = self.session.rate_percent();
            let lines = vec![
                Line::from(vec![Span::styled("Exam: ", label), status]),
                Line::from(vec![
                    Span::styled("Score: ", label),
                    Span::styled(
                        format!(
                            "{}/{}",
                            self.session.correct_count(),
                            self.session.total_count()
                        ),
                        Style::default().fg(colors.fg()),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Rate:  ", label),
                    Span::styled(format!("{rate:.1}%"), Style::default().fg(colors.rate(rate))),
                ]),
                Line::from(vec![
                    Span::styled("Missed: ", label),
                    Span::styled(
                        self.session.wrong_history().len().to_string(),
                        Style::default().fg(colors.error()),
                    ),
                ]),
            ];

            let block = Block::bordered()
                .title(" Session ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            Paragraph::new(lines).block(block).render(sections[1], buf);
        }
    }
}
