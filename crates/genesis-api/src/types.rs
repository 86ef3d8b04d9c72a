//! Wire types for the chat backend

use serde::{Deserialize, Serialize};

/// Category shown for retrieval results that carry no label
pub const DEFAULT_CATEGORY: &str = "Technical";

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// Create a request for a single message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: None,
        }
    }

    /// Attach the user id the backend should file the turn under
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// One complete backend turn.
///
/// A run is produced once per successful `/chat` call and is never patched
/// afterwards; a newer turn replaces it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// The assistant's final answer
    pub final_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_context: Option<RagContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_review: Option<CriticReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement: Option<Improvement>,
    /// Backend timestamp, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RunState {
    /// Create a run with only a final answer
    pub fn new(final_response: impl Into<String>) -> Self {
        Self {
            final_response: final_response.into(),
            request_id: None,
            rag_context: None,
            critic_review: None,
            improvement: None,
            timestamp: None,
        }
    }

    pub fn with_rag_context(mut self, rag_context: RagContext) -> Self {
        self.rag_context = Some(rag_context);
        self
    }

    pub fn with_critic_review(mut self, critic_review: CriticReview) -> Self {
        self.critic_review = Some(critic_review);
        self
    }

    /// Highest retrieval similarity, if the backend reported one
    pub fn max_similarity(&self) -> Option<f64> {
        self.rag_context.as_ref().and_then(|rag| rag.max_similarity)
    }

    /// Critic score, if the backend reported one
    pub fn critic_score(&self) -> Option<f64> {
        self.critic_review.as_ref().and_then(|review| review.score)
    }

    /// Retrieved passages in backend order (empty without a retrieval context)
    pub fn results(&self) -> &[RetrievalResult] {
        self.rag_context
            .as_ref()
            .map(|rag| rag.results.as_slice())
            .unwrap_or(&[])
    }
}

/// Retrieval stage output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_count: Option<u32>,
    #[serde(default)]
    pub results: Vec<RetrievalResult>,
}

/// A single retrieved passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub content: String,
    pub similarity: f64,
}

impl RetrievalResult {
    pub fn new(category: Option<&str>, content: impl Into<String>, similarity: f64) -> Self {
        Self {
            category: category.map(str::to_string),
            content: content.into(),
            similarity,
        }
    }

    /// Category label, falling back to [`DEFAULT_CATEGORY`]
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Critique stage output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl CriticReview {
    pub fn scored(score: f64) -> Self {
        Self { score: Some(score) }
    }
}

/// Improvement stage output: the reasoner draft and the rewritten answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved: Option<String>,
}

/// Body of `GET /health`. Advisory only; reachability depends on the status code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: Option<String>,
    pub service: Option<String>,
}
