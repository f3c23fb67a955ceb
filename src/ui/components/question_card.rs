use std::path::Path;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::exam::ExamPhase;
use crate::session::state::SessionState;
use crate::ui::theme::Theme;

/// What the Challenge tab shows besides the question itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardNotice<'a> {
    None,
    Generating,
    MissingKey { secrets: &'a Path },
}

pub struct QuestionCard<'a> {
    session: &'a SessionState,
    cursor: usize,
    notice: CardNotice<'a>,
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(
        session: &'a SessionState,
        cursor: usize,
        notice: CardNotice<'a>,
        scroll: u16,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            cursor,
            notice,
            scroll,
            theme,
        }
    }

    fn banner(&self) -> Line<'a> {
        let colors = &self.theme.colors;
        let exam = self.session.exam();
        match exam.phase() {
            ExamPhase::Inactive => Line::from(Span::styled(
                "Practice mode: one question at a time",
                Style::default().fg(colors.text_muted()),
            )),
            ExamPhase::InProgress | ExamPhase::AwaitingFinalize => Line::from(vec![
                Span::styled(
                    "Exam mode ",
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} / {} answered", exam.answered(), exam.total_planned()),
                    Style::default().fg(colors.fg()),
                ),
            ]),
        }
    }

    fn notice_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        match self.notice {
            CardNotice::None => Vec::new(),
            CardNotice::Generating => vec![Line::from(Span::styled(
                "Generating question\u{2026}",
                Style::default()
                    .fg(colors.warning())
                    .add_modifier(Modifier::BOLD),
            ))],
            CardNotice::MissingKey { secrets } => vec![
                Line::from(Span::styled(
                    "No Gemini API key is configured.",
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!(
                        "Add GEMINI_API_KEY under [general] in {},",
                        secrets.display()
                    ),
                    Style::default().fg(colors.fg()),
                )),
                Line::from(Span::styled(
                    "export GEMINI_API_KEY, or press [c] to enter a key for this session.",
                    Style::default().fg(colors.fg()),
                )),
            ],
        }
    }

    fn question_lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let Some(question) = self.session.current() else {
            if self.notice != CardNotice::None {
                return Vec::new();
            }
            let hint = if self.session.exam().phase() == ExamPhase::AwaitingFinalize {
                "The exam is complete. Press [f] to save the result."
            } else {
                "Press [n] for a question."
            };
            return vec![Line::from(Span::styled(
                hint,
                Style::default().fg(colors.text_muted()),
            ))];
        };

        let answered = self.session.is_answered();
        let user_choice = if answered {
            self.session.last_record().map(|r| r.user_choice.as_str())
        } else {
            None
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Theme: {}", question.sub_topic()),
                Style::default().fg(colors.tag()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("Q. {}", question.text()),
                Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (i, option) in question.options().iter().enumerate() {
            let is_answer = option == question.answer();
            let is_choice = user_choice == Some(option.as_str());
            let (marker, style) = if answered {
                if is_answer {
                    ("\u{2713}", Style::default().fg(colors.success()).add_modifier(Modifier::BOLD))
                } else if is_choice {
                    ("\u{2717}", Style::default().fg(colors.error()))
                } else {
                    (" ", Style::default().fg(colors.text_muted()))
                }
            } else if i == self.cursor {
                (
                    ">",
                    Style::default()
                        .fg(colors.selection_fg())
                        .bg(colors.selection_bg())
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (" ", Style::default().fg(colors.fg()))
            };
            lines.push(Line::from(Span::styled(
                format!(" {marker} {}) {option}", i + 1),
                style,
            )));
        }

        if !answered {
            return lines;
        }

        lines.push(Line::from(""));
        let verdict = if user_choice == Some(question.answer()) {
            Line::from(Span::styled(
                "Correct!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(vec![
                Span::styled(
                    "Incorrect. ",
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("Answer: ", Style::default().fg(colors.fg())),
                Span::styled(
                    question.answer().to_string(),
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        };
        lines.push(verdict);
        lines.push(Line::from(Span::styled(
            format!(
                "{} answered, {} correct ({:.1}%)",
                self.session.total_count(),
                self.session.correct_count(),
                self.session.rate_percent()
            ),
            Style::default().fg(colors.accent()),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Explanation",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            question.explanation().to_string(),
            Style::default().fg(colors.fg()),
        )));
        lines
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Challenge ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let mut lines = vec![self.banner(), Line::from("")];
        let notice = self.notice_lines();
        let has_notice = !notice.is_empty();
        lines.extend(notice);
        if has_notice {
            lines.push(Line::from(""));
        }
        if !matches!(self.notice, CardNotice::MissingKey { .. }) {
            lines.extend(self.question_lines());
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
