//! Transcript widget

use crate::theme::Theme;
use chrono::Local;
use genesis_core::{Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Renders the transcript, oldest first
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset in lines from the top
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn header(&self, msg: &Message) -> Line<'static> {
        let (prefix, label, style) = match (msg.role, msg.is_error) {
            (Role::System, true) => ("● ", "System", self.theme.error_style()),
            (Role::System, false) => ("● ", "System", self.theme.dim_style()),
            (_, true) => ("⚠ ", "Warning", self.theme.error_style().add_modifier(Modifier::BOLD)),
            (Role::User, _) => ("▶ ", "You", self.theme.accent_bold()),
            (Role::Assistant, _) => (
                "◀ ",
                "GENESIS AI",
                Style::default()
                    .fg(self.theme.assistant)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        let time = msg.created_at.with_timezone(&Local).format("%H:%M");

        Line::from(vec![
            Span::styled(format!("{prefix}{label}"), style),
            Span::styled(format!("  {time}"), self.theme.dim_style()),
        ])
    }

    fn render_message(&self, msg: &Message, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![self.header(msg)];

        let style = if msg.is_error {
            self.theme.error_style()
        } else if msg.role == Role::System {
            self.theme.dim_style()
        } else {
            self.theme.base_style()
        };
        for line in wrap(&msg.text, width) {
            lines.push(Line::from(Span::styled(format!("  {line}"), style)));
        }

        lines.push(Line::from(""));
        lines
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width.saturating_sub(2).max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible: Vec<Line> = self
            .messages
            .iter()
            .flat_map(|msg| self.render_message(msg, width))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of the transcript at the given width
pub fn calculate_message_height(messages: &[Message], width: usize) -> usize {
    messages
        .iter()
        .map(|msg| 2 + wrap(&msg.text, width).len())
        .sum()
}
