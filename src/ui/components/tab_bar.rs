use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizTab {
    Challenge,
    Score,
    Notes,
    Progress,
    QuestionList,
}

impl QuizTab {
    pub const ALL: [QuizTab; 5] = [
        QuizTab::Challenge,
        QuizTab::Score,
        QuizTab::Notes,
        QuizTab::Progress,
        QuizTab::QuestionList,
    ];

    pub fn title(self) -> &'static str {
        match self {
            QuizTab::Challenge => "Challenge",
            QuizTab::Score => "Score & History",
            QuizTab::Notes => "Notes",
            QuizTab::Progress => "Progress",
            QuizTab::QuestionList => "Question List",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Tabs are numbered from 1 on screen.
    pub fn from_number(n: u32) -> Option<Self> {
        (n as usize)
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct TabBar<'a> {
    pub selected: QuizTab,
    pub theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(selected: QuizTab, theme: &'a Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let mut spans: Vec<Span> = Vec::new();
        for (i, tab) in QuizTab::ALL.iter().enumerate() {
            let is_selected = *tab == self.selected;
            let text = format!(" [F{}] {} ", i + 1, tab.title());
            let style = if is_selected {
                Style::default()
                    .fg(colors.selection_fg())
                    .bg(colors.selection_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_muted())
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(colors.bg()))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(QuizTab::Challenge.prev(), QuizTab::QuestionList);
        assert_eq!(QuizTab::QuestionList.next(), QuizTab::Challenge);
        assert_eq!(QuizTab::Score.next(), QuizTab::Notes);
    }

    #[test]
    fn tab_numbers_start_at_one() {
        assert_eq!(QuizTab::from_number(1), Some(QuizTab::Challenge));
        assert_eq!(QuizTab::from_number(5), Some(QuizTab::QuestionList));
        assert_eq!(QuizTab::from_number(0), None);
        assert_eq!(QuizTab::from_number(6), None);
    }
}
