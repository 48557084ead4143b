//! Evidence retrieval: bounded text searches, dedup by `href`, capped volume.

use std::collections::HashSet;

use tracing::{debug, instrument};

use coursegen_search::SearchBackend;
use coursegen_shared::{EvidenceItem, Outline, Result};

/// Results requested for the raw query.
pub const MAIN_QUERY_RESULTS: usize = 5;

/// Number of leading topics that get their own search.
pub const TOPIC_QUERY_LIMIT: usize = 3;

/// Results requested per topic search.
pub const TOPIC_QUERY_RESULTS: usize = 2;

/// Upper bound on evidence handed to synthesis.
pub const MAX_EVIDENCE: usize = 10;

/// Gather grounding material for `query`.
///
/// Searches the raw query, then `"{query} {headline}"` for the first
/// [`TOPIC_QUERY_LIMIT`] topics, one call at a time. Search failures are
/// returned unchanged.
#[instrument(skip_all, fields(query = %query, topics = outline.topics.len()))]
pub async fn retrieve_evidence(
    search: &dyn SearchBackend,
    query: &str,
    outline: &Outline,
) -> Result<Vec<EvidenceItem>> {
    let mut batches = vec![search.search_text(query, MAIN_QUERY_RESULTS).await?];

    for topic in outline.topics.iter().take(TOPIC_QUERY_LIMIT) {
        let topic_query = format!("{query} {}", topic.headline_or_empty());
        batches.push(search.search_text(&topic_query, TOPIC_QUERY_RESULTS).await?);
    }

    Ok(dedupe_and_cap(batches))
}

/// Flatten batches in order, keep the first item per `href`, and cap the
/// result at [`MAX_EVIDENCE`].
pub fn dedupe_and_cap(batches: impl IntoIterator<Item = Vec<EvidenceItem>>) -> Vec<EvidenceItem> {
    let mut seen = HashSet::new();
    let mut raw_count = 0usize;
    let mut unique = Vec::new();

    for item in batches.into_iter().flatten() {
        raw_count += 1;
        if seen.insert(item.href.clone()) {
            unique.push(item);
        }
    }

    let unique_count = unique.len();
    unique.truncate(MAX_EVIDENCE);

    debug!(
        raw = raw_count,
        duplicates = raw_count - unique_count,
        kept = unique.len(),
        "evidence deduplicated"
    );

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedSearch, SearchKind, text_hit};
    use coursegen_shared::{CourseGenError, Topic};

    fn outline_with(headlines: &[&str]) -> Outline {
        Outline {
            main_headline: Some("Course".into()),
            topics: headlines
                .iter()
                .map(|h| Topic {
                    headline: Some(h.to_string()),
                    subtopics: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let first = vec![text_hit("From main", "https://x"), text_hit("Other", "https://y")];
        let second = vec![text_hit("From topic", "https://x"), text_hit("New", "https://z")];
        let merged = dedupe_and_cap(vec![first, second]);

        let hrefs: Vec<&str> = merged.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs, vec!["https://x", "https://y", "https://z"]);
        assert_eq!(merged[0].title, "From main");
    }

    #[test]
    fn duplicates_within_one_batch_are_dropped() {
        let batch = vec![text_hit("A", "https://a"), text_hit("A again", "https://a")];
        let merged = dedupe_and_cap(vec![batch]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "A");
    }

    #[test]
    fn capped_at_ten() {
        let batch: Vec<_> = (0..25)
            .map(|i| text_hit(&format!("T{i}"), &format!("https://site/{i}")))
            .collect();
        let merged = dedupe_and_cap(vec![batch]);
        assert_eq!(merged.len(), MAX_EVIDENCE);
        assert_eq!(merged[9].href, "https://site/9");
    }

    #[tokio::test]
    async fn issues_main_then_first_three_topic_searches() {
        let search = ScriptedSearch::new();
        let outline = outline_with(&["A", "B", "C", "D", "E"]);
        retrieve_evidence(&search, "Rust", &outline).await.unwrap();

        let calls = search.calls();
        let issued: Vec<(&str, usize)> = calls
            .iter()
            .map(|c| (c.query.as_str(), c.max_results))
            .collect();
        assert_eq!(
            issued,
            vec![("Rust", 5), ("Rust A", 2), ("Rust B", 2), ("Rust C", 2)]
        );
        assert!(calls.iter().all(|c| c.kind == SearchKind::Text));
    }

    #[tokio::test]
    async fn fewer_topics_means_fewer_searches() {
        let search = ScriptedSearch::new();
        retrieve_evidence(&search, "Rust", &outline_with(&["Only"]))
            .await
            .unwrap();
        assert_eq!(search.calls().len(), 2);

        let search = ScriptedSearch::new();
        retrieve_evidence(&search, "Rust", &Outline::default())
            .await
            .unwrap();
        assert_eq!(search.calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_headline_and_subtopics_are_tolerated() {
        let search = ScriptedSearch::new();
        let outline = Outline {
            main_headline: None,
            topics: vec![Topic::default()],
        };
        retrieve_evidence(&search, "Rust", &outline).await.unwrap();
        assert_eq!(search.calls()[1].query, "Rust ");
    }

    #[tokio::test]
    async fn merges_batches_across_searches() {
        let search = ScriptedSearch::new()
            .with_text(
                "Rust",
                vec![text_hit("Book", "https://x"), text_hit("Site", "https://y")],
            )
            .with_text(
                "Rust Ownership",
                vec![text_hit("Book again", "https://x"), text_hit("Blog", "https://w")],
            );
        let evidence = retrieve_evidence(&search, "Rust", &outline_with(&["Ownership"]))
            .await
            .unwrap();
        let titles: Vec<&str> = evidence.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Book", "Site", "Blog"]);
    }

    #[tokio::test]
    async fn search_error_propagates() {
        let search = ScriptedSearch::new().failing_text("HTTP 503");
        let err = retrieve_evidence(&search, "Rust", &outline_with(&["A"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CourseGenError::SearchBackend(ref m) if m == "HTTP 503"));
        assert_eq!(search.calls().len(), 1);
    }
}
