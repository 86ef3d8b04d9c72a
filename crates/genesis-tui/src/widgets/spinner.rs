//! Animated spinner shown while a message is in flight

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Animated spinner widget
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> Spinner<'a> {
    pub fn new(label: &'a str, theme: &'a Theme, start_time: Instant) -> Self {
        Self {
            label,
            theme,
            start_time,
        }
    }

    fn current_frame(&self) -> &'static str {
        let index = self.start_time.elapsed().as_millis() / FRAME_DURATION.as_millis();
        SPINNER_FRAMES[index as usize % SPINNER_FRAMES.len()]
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let text = format!("{} {}", self.current_frame(), self.label);
        buf.set_span(area.x, area.y, &Span::styled(text, self.theme.accent_style()), area.width);
    }
}
