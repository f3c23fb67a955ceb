use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::exam::ExamSession;
use crate::session::record::rate_percent;
use crate::ui::theme::Theme;

/// Result card shown once the last exam question is answered.
pub struct ExamResultCard<'a> {
    pub total: usize,
    pub correct: usize,
    pub theme: &'a Theme,
}

impl<'a> ExamResultCard<'a> {
    pub fn from_exam(exam: &ExamSession, theme: &'a Theme) -> Self {
        Self {
            total: exam.total_planned(),
            correct: exam.correct(),
            theme,
        }
    }
}

impl Widget for ExamResultCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Exam Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            "Results",
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let rate = rate_percent(self.correct, self.total);
        let rows = [
            ("  Questions: ", format!("{}", self.total), colors.fg()),
            ("  Correct:   ", format!("{}", self.correct), colors.success()),
            ("  Rate:      ", format!("{rate:.1}%"), colors.rate(rate)),
        ];
        for (i, (label, value, color)) in rows.into_iter().enumerate() {
            Paragraph::new(Line::from(vec![
                Span::styled(label, Style::default().fg(colors.fg())),
                Span::styled(
                    value,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]))
            .render(layout[i + 1], buf);
        }

        let help = Paragraph::new(Line::from(vec![
            Span::styled(
                "  [f] Save result and return to practice  ",
                Style::default().fg(colors.accent()),
            ),
            Span::styled("[x] Discard exam", Style::default().fg(colors.text_muted())),
        ]));
        help.render(layout[5], buf);
    }
}
