use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::state::SessionState;
use crate::ui::theme::Theme;

pub struct ScorePanel<'a> {
    session: &'a SessionState,
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> ScorePanel<'a> {
    pub fn new(session: &'a SessionState, scroll: u16, theme: &'a Theme) -> Self {
        Self {
            session,
            scroll,
            theme,
        }
    }
}

fn heading<'a>(text: &'static str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(theme.colors.accent())
            .add_modifier(Modifier::BOLD),
    ))
}

fn stat_row<'a>(label: &'static str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(theme.colors.fg())),
        Span::styled(
            value,
            Style::default()
                .fg(theme.colors.fg())
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

impl Widget for ScorePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let muted = Style::default().fg(colors.text_muted());
        let mut lines: Vec<Line> = Vec::new();

        lines.push(heading("Current score", self.theme));
        if self.session.total_count() == 0 {
            lines.push(Line::from(Span::styled(
                "  Answer a question to start your score.",
                muted,
            )));
        } else {
            let rate = self.session.rate_percent();
            lines.push(stat_row(
                "  Answered: ",
                self.session.total_count().to_string(),
                self.theme,
            ));
            lines.push(stat_row(
                "  Correct:  ",
                self.session.correct_count().to_string(),
                self.theme,
            ));
            lines.push(Line::from(vec![
                Span::styled("  Rate:     ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{rate:.1}%"),
                    Style::default()
                        .fg(colors.rate(rate))
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(heading("Latest exam", self.theme));
        match self.session.latest_exam() {
            Some(exam) => {
                lines.push(stat_row("  Questions: ", exam.total.to_string(), self.theme));
                lines.push(stat_row("  Correct:   ", exam.correct.to_string(), self.theme));
                lines.push(Line::from(vec![
                    Span::styled("  Rate:      ", Style::default().fg(colors.fg())),
                    Span::styled(
                        format!("{:.1}%", exam.rate),
                        Style::default()
                            .fg(colors.rate(exam.rate))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(
                            "  ({} exams saved)",
                            self.session.exam_history().len()
                        ),
                        muted,
                    ),
                ]));
            }
            None => lines.push(Line::from(Span::styled(
                "  Finish an exam to see its result here.",
                muted,
            ))),
        }

        lines.push(Line::from(""));
        lines.push(heading("History", self.theme));
        if self.session.all_history().is_empty() {
            lines.push(Line::from(Span::styled("  No answers yet.", muted)));
        }
        for (i, record) in self.session.history_newest_first().enumerate() {
            let (mark, mark_color) = if record.is_correct {
                ("\u{2713}", colors.success())
            } else {
                ("\u{2717}", colors.error())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", i + 1), Style::default().fg(colors.fg())),
                Span::styled(mark, Style::default().fg(mark_color)),
                Span::styled(
                    format!(" {} | {}", record.main_topic, record.sub_topic),
                    Style::default()
                        .fg(colors.fg())
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("     Q. {}", record.question_text),
                muted,
            )));
        }

        let block = Block::bordered()
            .title(" Score & History ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
