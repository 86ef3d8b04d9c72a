//! Color theme support

use genesis_core::views::{Relevance, ScoreBand, StageStatus};
use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub dim: Color,
    /// Highlights, prompts, user messages
    pub accent: Color,
    /// Assistant messages
    pub assistant: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Magenta,
            assistant: Color::Cyan,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::DarkGray,
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent_style().add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Badge color for a stage score band
    pub fn band_style(&self, band: ScoreBand) -> Style {
        match band {
            ScoreBand::Excellent => Style::default().fg(self.success),
            ScoreBand::Good => Style::default().fg(self.warning),
            ScoreBand::NeedsWork => Style::default().fg(self.error),
            ScoreBand::Unscored => self.dim_style(),
        }
    }

    /// Badge color for a retrieval result
    pub fn relevance_style(&self, relevance: Relevance) -> Style {
        match relevance {
            Relevance::High => Style::default().fg(self.success),
            Relevance::Medium => Style::default().fg(self.warning),
            Relevance::Low => Style::default().fg(self.error),
        }
    }

    /// Status dot color for a pipeline stage
    pub fn status_style(&self, status: StageStatus) -> Style {
        match status {
            StageStatus::Active => Style::default().fg(self.success),
            StageStatus::Idle => self.dim_style(),
        }
    }

    /// Connectivity banner
    pub fn banner_style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.error)
            .add_modifier(Modifier::BOLD)
    }
}
