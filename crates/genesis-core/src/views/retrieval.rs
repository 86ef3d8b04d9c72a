//! Retrieved-context panel

use genesis_api::RunState;

use super::policy::{Relevance, RelevancePolicy, percent};

/// One retrieved passage, ready to display
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalItem {
    pub category: String,
    pub content: String,
    pub similarity: f64,
    pub relevance: Relevance,
}

impl RetrievalItem {
    pub fn percent(&self) -> u32 {
        percent(self.similarity)
    }
}

/// The retrieved-context list, in backend order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalView {
    pub items: Vec<RetrievalItem>,
    pub max_similarity: Option<f64>,
}

impl RetrievalView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn header(&self) -> String {
        format!("Found {} results", self.items.len())
    }

    pub fn max_similarity_line(&self) -> String {
        format!(
            "Max similarity: {}%",
            self.max_similarity.map(percent).unwrap_or(0)
        )
    }
}

/// Project the latest run's retrieval results into a display list
pub fn map_retrieval(run: Option<&RunState>, policy: &RelevancePolicy) -> RetrievalView {
    let Some(run) = run else {
        return RetrievalView::default();
    };

    RetrievalView {
        items: run
            .results()
            .iter()
            .map(|result| RetrievalItem {
                category: result.category_or_default().to_string(),
                content: result.content.clone(),
                similarity: result.similarity,
                relevance: policy.relevance(result.similarity),
            })
            .collect(),
        max_similarity: run.max_similarity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_api::{RagContext, RetrievalResult};

    fn run_with_results(results: Vec<RetrievalResult>) -> RunState {
        RunState::new("answer").with_rag_context(RagContext {
            max_similarity: results.first().map(|r| r.similarity),
            results_count: Some(results.len() as u32),
            results,
        })
    }

    #[test]
    fn test_absent_context_is_empty() {
        let view = map_retrieval(None, &RelevancePolicy::default());
        assert!(view.is_empty());

        let run = RunState::new("no retrieval");
        let view = map_retrieval(Some(&run), &RelevancePolicy::default());
        assert!(view.is_empty());
        assert_eq!(view.max_similarity_line(), "Max similarity: 0%");
    }

    #[test]
    fn test_items_keep_backend_order_and_labels() {
        let run = run_with_results(vec![
            RetrievalResult::new(Some("kubernetes"), "pods", 0.3),
            RetrievalResult::new(None, "fastapi", 0.95),
            RetrievalResult::new(Some("docker"), "images", 0.5),
        ]);
        let view = map_retrieval(Some(&run), &RelevancePolicy::default());

        let contents: Vec<_> = view.items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, ["pods", "fastapi", "images"]);
        assert_eq!(view.items[0].relevance, Relevance::Low);
        assert_eq!(view.items[1].relevance, Relevance::High);
        assert_eq!(view.items[1].category, "Technical");
        assert_eq!(view.items[2].relevance, Relevance::Medium);
        assert_eq!(view.header(), "Found 3 results");
        assert_eq!(view.max_similarity_line(), "Max similarity: 30%");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let item = RetrievalResult::new(Some("docker"), "same", 0.7);
        let run = run_with_results(vec![item.clone(), item]);
        let view = map_retrieval(Some(&run), &RelevancePolicy::default());
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let run = run_with_results(vec![RetrievalResult::new(None, "x", 0.42)]);
        let policy = RelevancePolicy::default();
        assert_eq!(
            map_retrieval(Some(&run), &policy),
            map_retrieval(Some(&run), &policy)
        );
    }
}
