use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::topic_stats::TopicStatsStore;
use crate::ui::components::progress_bar::bar_parts;
use crate::ui::theme::Theme;

const BAR_WIDTH: usize = 20;

pub struct TopicProgress<'a> {
    stats: &'a TopicStatsStore,
    weak_mode: bool,
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> TopicProgress<'a> {
    pub fn new(stats: &'a TopicStatsStore, weak_mode: bool, scroll: u16, theme: &'a Theme) -> Self {
        Self {
            stats,
            weak_mode,
            scroll,
            theme,
        }
    }
}

impl Widget for TopicProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let mut lines: Vec<Line> = Vec::new();

        if self.stats.is_empty() {
            lines.push(Line::from(Span::styled(
                "No per-topic statistics yet. They are collected as you answer.",
                Style::default().fg(colors.text_muted()),
            )));
        }

        let weakest = self.stats.weakest().map(|s| s.topic.as_str());
        for stat in self.stats.iter() {
            let rate = stat.rate_percent();
            let is_weakest = self.weak_mode && weakest == Some(stat.topic.as_str());
            let mut title = vec![Span::styled(
                stat.topic.clone(),
                Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD),
            )];
            if is_weakest {
                title.push(Span::styled(
                    "  (next in weak mode)",
                    Style::default().fg(colors.warning()),
                ));
            }
            lines.push(Line::from(title));

            let (filled, empty) = bar_parts(stat.accuracy(), BAR_WIDTH);
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(filled, Style::default().fg(colors.rate(rate))),
                Span::styled(empty, Style::default().fg(colors.bar_empty())),
                Span::styled(
                    format!(
                        "  {} answered, {} correct, {rate:.1}%",
                        stat.total, stat.correct
                    ),
                    Style::default().fg(colors.text_muted()),
                ),
            ]));
            lines.push(Line::from(""));
        }

        let block = Block::bordered()
            .title(" Progress by Topic ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
