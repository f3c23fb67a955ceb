use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::record::AnswerRecord;
use crate::ui::theme::Theme;

/// Explanations of every answered question, newest first.
pub struct NotesPanel<'a> {
    records: &'a [AnswerRecord],
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> NotesPanel<'a> {
    pub fn new(records: &'a [AnswerRecord], scroll: u16, theme: &'a Theme) -> Self {
        Self {
            records,
            scroll,
            theme,
        }
    }
}

impl Widget for NotesPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines: Vec<Line> = Vec::new();

        if self.records.is_empty() {
            lines.push(Line::from(Span::styled(
                "Explanations collect here as you answer questions.",
                Style::default().fg(colors.text_muted()),
            )));
        }

        for (i, record) in self.records.iter().rev().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("{}. {} | {}", i + 1, record.main_topic, record.sub_topic),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Q. {}", record.question_text),
                Style::default().fg(colors.fg()),
            )));
            lines.push(Line::from(vec![
                Span::styled("Explanation: ", Style::default().fg(colors.tag())),
                Span::styled(
                    record.explanation.clone(),
                    Style::default().fg(colors.fg()),
                ),
            ]));
            lines.push(Line::from(""));
        }

        let block = Block::bordered()
            .title(" Notes ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
