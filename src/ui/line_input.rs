use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which settings text field is being edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    ApiKey,
    Model,
    Language,
}

impl SettingsField {
    pub fn label(self) -> &'static str {
        match self {
            SettingsField::ApiKey => "API key",
            SettingsField::Model => "Model",
            SettingsField::Language => "Question language",
        }
    }

    pub fn is_secret(self) -> bool {
        self == SettingsField::ApiKey
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    masked: bool,
    /// Fixed candidates offered by Tab, matched by prefix.
    candidates: Vec<String>,
    completions: Vec<String>,
    completion_index: Option<usize>,
    /// Text snapshot when Tab was first pressed.
    completion_seed: String,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        let cursor = text.chars().count();
        Self {
            text: text.to_string(),
            cursor,
            masked: false,
            candidates: Vec::new(),
            completions: Vec::new(),
            completion_index: None,
            completion_seed: String::new(),
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// Masked inputs render every char as `*`.
    pub fn render_parts(&self) -> (String, Option<char>, String) {
        let chars: Vec<char> = self
            .text
            .chars()
            .map(|c| if self.masked { '*' } else { c })
            .collect();
        let before: String = chars[..self.cursor.min(chars.len())].iter().collect();
        match chars.get(self.cursor) {
            Some(&ch) => {
                let after: String = chars[self.cursor + 1..].iter().collect();
                (before, Some(ch), after)
            }
            None => (before, None, String::new()),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,

            KeyCode::Left => {
                self.reset_completion();
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.reset_completion();
                if self.cursor < self.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.reset_completion();
                self.cursor = 0;
            }
            KeyCode::End => {
                self.reset_completion();
                self.cursor = self.len();
            }
            KeyCode::Backspace => {
                self.reset_completion();
                if self.cursor > 0 {
                    self.remove_char_at(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                self.reset_completion();
                if self.cursor < self.len() {
                    self.remove_char_at(self.cursor);
                }
            }
            KeyCode::Tab => self.tab_complete(true),
            KeyCode::BackTab => self.tab_complete(false),
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.cursor = 0;
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.cursor = self.len();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.delete_word_back();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                let byte_offset = self.char_to_byte(self.cursor);
                self.text.insert(byte_offset, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_char_at(&mut self, char_idx: usize) {
        let start = self.char_to_byte(char_idx);
        let end = self.char_to_byte(char_idx + 1);
        self.text.replace_range(start..end, "");
    }

    /// Delete word before cursor (unix-word-rubout: skip whitespace, then non-whitespace).
    fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;

        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }

        let start_byte = self.char_to_byte(pos);
        let end_byte = self.char_to_byte(self.cursor);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
        self.completion_seed.clear();
    }

    fn tab_complete(&mut self, forward: bool) {
        // Only activate when cursor is at end of line
        if self.cursor < self.len() {
            return;
        }

        match self.completion_index {
            None => {
                self.completion_seed = self.text.clone();
                self.completions = self.build_completions();
                if self.completions.is_empty() {
                    return;
                }
                self.completion_index = Some(0);
                self.apply_completion(0);
            }
            Some(idx) => {
                let count = self.completions.len();
                if count == 0 {
                    return;
                }
                let next = if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                };
                self.completion_index = Some(next);
                self.apply_completion(next);
            }
        }
    }

    fn apply_completion(&mut self, idx: usize) {
        if let Some(text) = self.completions.get(idx) {
            self.text = text.clone();
            self.cursor = self.len();
        }
    }

    fn build_completions(&self) -> Vec<String> {
        let seed = self.completion_seed.as_str();
        // Accept both "gemini-..." and "models/gemini-..." as prefixes.
        let bare_seed = seed.strip_prefix("models/").unwrap_or(seed);
        let mut out: Vec<String> = self
            .candidates
            .iter()
            .filter(|c| {
                let bare = c.strip_prefix("models/").unwrap_or(c);
                c.starts_with(seed) || bare.starts_with(bare_seed)
            })
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
