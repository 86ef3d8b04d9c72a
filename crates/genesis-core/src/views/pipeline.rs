//! Pipeline stage panel

use genesis_api::RunState;

use super::policy::{ScoreBand, StageScorePolicy, percent};

/// A displayed step of the backend pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieval,
    Reasoning,
    Critique,
    Improvement,
}

impl Stage {
    /// Display order
    pub const ALL: [Stage; 4] = [
        Stage::Retrieval,
        Stage::Reasoning,
        Stage::Critique,
        Stage::Improvement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Retrieval => "Retrieval",
            Stage::Reasoning => "Reasoning",
            Stage::Critique => "Critique",
            Stage::Improvement => "Improvement",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::Retrieval => "Semantic Search & Context",
            Stage::Reasoning => "Generates Response",
            Stage::Critique => "Quality Analysis",
            Stage::Improvement => "Optimization",
        }
    }

    /// The score shown for this stage.
    ///
    /// Reasoning has no metric of its own in the payload and reuses the
    /// retrieval similarity; Improvement reuses the critic score.
    fn score(&self, run: &RunState) -> Option<f64> {
        match self {
            Stage::Retrieval | Stage::Reasoning => run.max_similarity(),
            Stage::Critique | Stage::Improvement => run.critic_score(),
        }
    }

    fn is_active(&self, run: &RunState) -> bool {
        match self {
            Stage::Retrieval => run.rag_context.is_some(),
            Stage::Reasoning => !run.final_response.is_empty(),
            Stage::Critique | Stage::Improvement => run.critic_review.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Active,
    Idle,
}

/// One row of the pipeline panel
#[derive(Debug, Clone, PartialEq)]
pub struct StageView {
    pub stage: Stage,
    pub status: StageStatus,
    pub score: Option<f64>,
    pub band: ScoreBand,
}

impl StageView {
    /// `82%`, or an em dash when unscored
    pub fn display_score(&self) -> String {
        match self.score {
            Some(score) => format!("{}%", percent(score)),
            None => "—".to_string(),
        }
    }
}

/// Footer line of the pipeline panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary {
    AwaitingFirstRun,
    Completed { results_count: u32 },
}

impl RunSummary {
    pub fn headline(&self) -> &'static str {
        match self {
            RunSummary::AwaitingFirstRun => "Ready for first query",
            RunSummary::Completed { .. } => "Last run completed",
        }
    }

    pub fn context_line(&self) -> Option<String> {
        match self {
            RunSummary::AwaitingFirstRun => None,
            RunSummary::Completed { results_count } => {
                Some(format!("Context: {} results", results_count))
            }
        }
    }
}

/// The whole pipeline panel
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineView {
    pub stages: [StageView; 4],
    pub summary: RunSummary,
}

impl PipelineView {
    pub fn stage(&self, stage: Stage) -> &StageView {
        &self.stages[stage as usize]
    }
}

/// Project the latest run onto the four pipeline stages
pub fn map_pipeline(run: Option<&RunState>, policy: &StageScorePolicy) -> PipelineView {
    let stages = Stage::ALL.map(|stage| {
        let (status, score) = match run {
            Some(run) if stage.is_active(run) => (StageStatus::Active, stage.score(run)),
            Some(run) => (StageStatus::Idle, stage.score(run)),
            None => (StageStatus::Idle, None),
        };
        StageView {
            stage,
            status,
            score,
            band: policy.band(score),
        }
    });

    let summary = match run {
        None => RunSummary::AwaitingFirstRun,
        Some(run) => RunSummary::Completed {
            results_count: run
                .rag_context
                .as_ref()
                .and_then(|rag| rag.results_count)
                .unwrap_or(0),
        },
    };

    PipelineView { stages, summary }
}
