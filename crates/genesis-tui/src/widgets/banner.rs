//! One-line "backend not connected" banner

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Shown while the connectivity flag is set
pub struct ConnectivityBanner<'a> {
    backend_url: &'a str,
    theme: &'a Theme,
}

impl<'a> ConnectivityBanner<'a> {
    pub fn new(backend_url: &'a str, theme: &'a Theme) -> Self {
        Self { backend_url, theme }
    }
}

impl Widget for ConnectivityBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" ● Backend not connected ", self.theme.banner_style()),
            Span::styled(
                format!("  expected at {}  │  Ctrl+R: retry", self.backend_url),
                self.theme.error_style(),
            ),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}
