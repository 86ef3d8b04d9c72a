//! Retrieved-context panel

use crate::theme::Theme;
use genesis_core::views::RetrievalView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Passage previews are cut to this many lines
const PREVIEW_LINES: usize = 3;

pub struct RetrievalPanel<'a> {
    view: &'a RetrievalView,
    theme: &'a Theme,
}

impl<'a> RetrievalPanel<'a> {
    pub fn new(view: &'a RetrievalView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let theme = self.theme;
        if self.view.is_empty() {
            return vec![
                Line::from(Span::styled("No context retrieved", theme.dim_style())),
                Line::from(Span::styled(
                    "Send a message to see relevant knowledge",
                    theme.dim_style(),
                )),
            ];
        }

        let mut lines = vec![
            Line::from(Span::styled(self.view.header(), theme.accent_bold())),
            Line::from(Span::styled(self.view.max_similarity_line(), theme.dim_style())),
        ];

        for (i, item) in self.view.items.iter().enumerate() {
            let style = theme.relevance_style(item.relevance);
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(format!("#{} ", i + 1), theme.dim_style()),
                Span::styled(item.category.clone(), theme.accent_style()),
                Span::raw("  "),
                Span::styled(format!("{}% {}", item.percent(), item.relevance.label()), style),
            ]));

            let wrapped = textwrap::wrap(&item.content, width.saturating_sub(2).max(1));
            let truncated = wrapped.len() > PREVIEW_LINES;
            for (n, line) in wrapped.iter().take(PREVIEW_LINES).enumerate() {
                let ellipsis = if truncated && n + 1 == PREVIEW_LINES { "…" } else { "" };
                lines.push(Line::from(Span::styled(
                    format!("  {line}{ellipsis}"),
                    theme.base_style(),
                )));
            }
        }
        lines
    }
}

impl Widget for RetrievalPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(" Retrieved Context ", self.theme.accent_bold()));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.lines(inner.width as usize)).render(inner, buf);
    }
}
