//! Four-stage pipeline panel

use crate::theme::Theme;
use genesis_core::views::{PipelineView, StageStatus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct PipelinePanel<'a> {
    view: &'a PipelineView,
    theme: &'a Theme,
}

impl<'a> PipelinePanel<'a> {
    pub fn new(view: &'a PipelineView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();

        for (i, row) in self.view.stages.iter().enumerate() {
            let dot = match row.status {
                StageStatus::Active => "●",
                StageStatus::Idle => "○",
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{dot} "), theme.status_style(row.status)),
                Span::styled(format!("{}. {}", i + 1, row.stage.name()), theme.base_style()),
                Span::raw("  "),
                Span::styled(row.display_score(), theme.band_style(row.band)),
                Span::raw(" "),
                Span::styled(row.band.label(), theme.band_style(row.band)),
            ]));
            lines.push(Line::from(Span::styled(
                format!("    {}", row.stage.description()),
                theme.dim_style(),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            self.view.summary.headline(),
            theme.accent_style(),
        )));
        if let Some(context) = self.view.summary.context_line() {
            lines.push(Line::from(Span::styled(context, theme.dim_style())));
        }
        lines
    }
}

impl Widget for PipelinePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(" Agent Pipeline ", self.theme.accent_bold()));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.lines()).render(inner, buf);
    }
}
