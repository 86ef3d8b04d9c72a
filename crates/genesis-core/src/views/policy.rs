//! Score thresholds.
//!
//! Stage scores and per-result relevance use separate bands on purpose; they
//! are tuned independently.

/// Quality band for a pipeline stage score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsWork,
    Unscored,
}

impl ScoreBand {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::NeedsWork => "Needs Work",
            ScoreBand::Unscored => "—",
        }
    }
}

/// Bands for pipeline stage scores. Lower bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageScorePolicy {
    pub excellent_above: f64,
    pub good_above: f64,
}

impl StageScorePolicy {
    pub const DEFAULT: Self = Self {
        excellent_above: 0.7,
        good_above: 0.5,
    };

    pub fn band(&self, score: Option<f64>) -> ScoreBand {
        match score {
            None => ScoreBand::Unscored,
            Some(s) if s > self.excellent_above => ScoreBand::Excellent,
            Some(s) if s > self.good_above => ScoreBand::Good,
            Some(_) => ScoreBand::NeedsWork,
        }
    }
}

impl Default for StageScorePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Relevance of a single retrieved passage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    pub fn label(&self) -> &'static str {
        match self {
            Relevance::High => "High relevance",
            Relevance::Medium => "Medium relevance",
            Relevance::Low => "Low relevance",
        }
    }
}

/// Bands for retrieval similarity. Lower bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevancePolicy {
    pub high_above: f64,
    pub medium_above: f64,
}

impl RelevancePolicy {
    pub const DEFAULT: Self = Self {
        high_above: 0.6,
        medium_above: 0.4,
    };

    pub fn relevance(&self, similarity: f64) -> Relevance {
        if similarity > self.high_above {
            Relevance::High
        } else if similarity > self.medium_above {
            Relevance::Medium
        } else {
            Relevance::Low
        }
    }
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A 0..=1 score as a whole percentage, rounded half away from zero
pub fn percent(score: f64) -> u32 {
    (score * 100.0).round().clamp(0.0, u32::MAX as f64) as u32
}
