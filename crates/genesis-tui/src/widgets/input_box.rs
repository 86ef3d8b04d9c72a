//! Single-line message input

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input.
///
/// When disabled, the border dims and the disabled placeholder replaces the
/// normal one; editing still works so a message can be drafted meanwhile.
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    /// Cursor position in chars, not bytes
    cursor: usize,
    /// Horizontal scroll offset in display columns
    scroll: usize,
    placeholder: String,
    disabled_placeholder: String,
    enabled: bool,
}

impl InputBox {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            enabled: true,
            ..Default::default()
        }
    }

    /// Placeholder shown while the box is disabled
    pub fn set_disabled_placeholder(&mut self, placeholder: impl Into<String>) {
        self.disabled_placeholder = placeholder.into();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content and move the cursor to the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
        self.scroll = 0;
    }

    /// Take the content out, leaving the box empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.scroll = 0;
        std::mem::take(&mut self.content)
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn width_before(&self, char_index: usize) -> usize {
        self.content
            .chars()
            .take(char_index)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn remove_range(&mut self, start: usize, end: usize) {
        let (start, end) = (self.byte_offset(start), self.byte_offset(end));
        self.content.drain(start..end);
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Apply an editing action. Returns whether anything changed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let len = self.content.chars().count();
        let changed = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.remove_range(self.cursor - 1, self.cursor);
                self.cursor -= 1;
                true
            }
            Action::Delete if self.cursor < len => {
                self.remove_range(self.cursor, self.cursor + 1);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < len => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = len;
                true
            }
            Action::ClearLine => {
                self.take();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                self.remove_range(start, self.cursor);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && !self.content.ends_with(' ') {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };
        if changed {
            self.update_scroll(width as usize);
        }
        changed
    }

    fn update_scroll(&mut self, width: usize) {
        let visible = width.saturating_sub(4).max(1);
        let cursor = self.width_before(self.cursor);
        if cursor < self.scroll {
            self.scroll = cursor;
        } else if cursor >= self.scroll + visible {
            self.scroll = cursor + 1 - visible;
        }
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default().borders(Borders::ALL).border_style(if self.enabled {
            theme.accent_style()
        } else {
            theme.border_style()
        });
        let inner = block.inner(area);
        block.render(area, buf);

        if self.content.is_empty() {
            let placeholder = if self.enabled || self.disabled_placeholder.is_empty() {
                &self.placeholder
            } else {
                &self.disabled_placeholder
            };
            Paragraph::new(placeholder.as_str())
                .style(theme.dim_style())
                .render(inner, buf);
        } else {
            let mut skipped = 0;
            let mut used = 0;
            let visible: String = self
                .content
                .chars()
                .skip_while(|c| {
                    let skip = skipped < self.scroll;
                    if skip {
                        skipped += c.width().unwrap_or(0);
                    }
                    skip
                })
                .take_while(|c| {
                    used += c.width().unwrap_or(0);
                    used <= inner.width as usize
                })
                .collect();
            Paragraph::new(visible)
                .style(theme.base_style())
                .render(inner, buf);
        }

        if self.enabled && inner.width > 0 {
            let x = self.width_before(self.cursor).saturating_sub(self.scroll);
            if x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new("Ask something...");
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
        input
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("dockr");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Char('e'), 80);
        assert_eq!(input.content(), "docker");

        input.handle_action(&Action::End, 80);
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "docke");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("añb");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "ab");
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("python async  ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "python ");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = typed("a");
        input.handle_action(&Action::Paste("b\r\nc".into()), 80);
        assert_eq!(input.content(), "ab c");
    }

    #[test]
    fn test_take_empties_box() {
        let mut input = typed("Kubernetes pods");
        assert_eq!(input.take(), "Kubernetes pods");
        assert_eq!(input.content(), "");
        assert!(!input.handle_action(&Action::Backspace, 80));
    }
}
