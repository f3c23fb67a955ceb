use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::record::AnswerRecord;
use crate::ui::theme::Theme;

/// Every asked question, newest first, with the chosen and the right answer.
pub struct QuestionList<'a> {
    records: &'a [AnswerRecord],
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> QuestionList<'a> {
    pub fn new(records: &'a [AnswerRecord], scroll: u16, theme: &'a Theme) -> Self {
        Self {
            records,
            scroll,
            theme,
        }
    }
}

impl Widget for QuestionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let muted = Style::default().fg(colors.text_muted());
        let mut lines: Vec<Line> = Vec::new();

        if self.records.is_empty() {
            lines.push(Line::from(Span::styled("No questions asked yet.", muted)));
        }

        for (i, record) in self.records.iter().rev().enumerate() {
            let (mark, mark_color) = if record.is_correct {
                ("\u{2713}", colors.success())
            } else {
                ("\u{2717}", colors.error())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(colors.fg())),
                Span::styled(mark, Style::default().fg(mark_color)),
                Span::styled(
                    format!(" {} | {}", record.main_topic, record.sub_topic),
                    Style::default().fg(colors.tag()),
                ),
                Span::styled(
                    format!("  {}", record.answered_at.format("%H:%M")),
                    muted,
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("   Q. {}", record.question_text),
                Style::default().fg(colors.fg()),
            )));
            if !record.is_correct {
                lines.push(Line::from(vec![
                    Span::styled("   You chose: ", muted),
                    Span::styled(record.user_choice.clone(), Style::default().fg(colors.error())),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled("   Answer:    ", muted),
                Span::styled(
                    record.correct_answer.clone(),
                    Style::default().fg(colors.success()),
                ),
            ]));
        }

        let block = Block::bordered()
            .title(format!(" Question List ({}) ", self.records.len()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
