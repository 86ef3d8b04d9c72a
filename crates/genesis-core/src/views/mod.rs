//! Pure projections of the store into display models
//!
//! Every view here is recomputed from `last_run` alone. Nothing keeps
//! incremental state, so two views built from the same snapshot always agree.

pub mod pipeline;
pub mod policy;
pub mod retrieval;

pub use pipeline::{PipelineView, RunSummary, Stage, StageStatus, StageView, map_pipeline};
pub use policy::{Relevance, RelevancePolicy, ScoreBand, StageScorePolicy, percent};
pub use retrieval::{RetrievalItem, RetrievalView, map_retrieval};

use crate::store::ConversationSnapshot;

/// Threshold policies used by the mappers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewPolicies {
    pub stage: StageScorePolicy,
    pub relevance: RelevancePolicy,
}

/// All derived views for one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedViews {
    pub pipeline: PipelineView,
    pub retrieval: RetrievalView,
}

impl DerivedViews {
    pub fn from_snapshot(snapshot: &ConversationSnapshot, policies: &ViewPolicies) -> Self {
        let run = snapshot.last_run();
        Self {
            pipeline: map_pipeline(run, &policies.stage),
            retrieval: map_retrieval(run, &policies.relevance),
        }
    }
}
