//! Plain-text rendering of the derived views for the line-oriented modes

use genesis_core::DerivedViews;
use std::fmt::Write;

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// The pipeline and retrieval panels as indented text
pub fn format_views(views: &DerivedViews) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Pipeline:");
    for (i, row) in views.pipeline.stages.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<12} {:>4}  {}",
            i + 1,
            row.stage.name(),
            row.display_score(),
            row.band.label()
        );
    }
    let _ = writeln!(out, "  {}", views.pipeline.summary.headline());
    if let Some(context) = views.pipeline.summary.context_line() {
        let _ = writeln!(out, "  {}", context);
    }

    let retrieval = &views.retrieval;
    if retrieval.is_empty() {
        let _ = writeln!(out, "Context: none retrieved");
        return out;
    }
    let _ = writeln!(
        out,
        "Context: {} ({})",
        retrieval.header(),
        retrieval.max_similarity_line()
    );
    for item in &retrieval.items {
        let _ = writeln!(
            out,
            "  [{}] {}% {}: {}",
            item.category,
            item.percent(),
            item.relevance.label(),
            truncate_chars(&item.content.replace('\n', " "), 80)
        );
    }
    out
}
