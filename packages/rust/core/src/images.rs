//! Image retrieval: a few bounded image searches projected into
//! [`ImageRecord`]s with dense ids.

use tracing::{debug, instrument};

use coursegen_search::{ImageHit, SearchBackend};
use coursegen_shared::{ImageRecord, Outline, Result};

/// Results requested for the course-title image search.
pub const MAIN_QUERY_IMAGES: usize = 2;

/// Number of leading topics that get their own image search.
pub const TOPIC_QUERY_LIMIT: usize = 2;

/// Results requested per topic image search.
pub const TOPIC_QUERY_IMAGES: usize = 1;

/// Upper bound on image records per run.
pub const MAX_IMAGES: usize = 4;

/// Find images for the course.
///
/// Raw hits are concatenated in issue order and not deduplicated.
#[instrument(skip_all, fields(query = %query))]
pub async fn retrieve_images(
    search: &dyn SearchBackend,
    query: &str,
    outline: &Outline,
) -> Result<Vec<ImageRecord>> {
    let main_query = format!("{} diagram educational", outline.title_or(query));
    let mut raw = search.search_images(&main_query, MAIN_QUERY_IMAGES).await?;

    for topic in outline.topics.iter().take(TOPIC_QUERY_LIMIT) {
        let topic_query = format!("{} {query} illustration", topic.headline_or_empty());
        raw.extend(search.search_images(&topic_query, TOPIC_QUERY_IMAGES).await?);
    }

    let records = project_images(query, raw);
    debug!(images = records.len(), "image records produced");
    Ok(records)
}

/// Turn the first [`MAX_IMAGES`] raw hits into records with ids `1..=N`.
pub fn project_images(query: &str, raw: Vec<ImageHit>) -> Vec<ImageRecord> {
    raw.into_iter()
        .take(MAX_IMAGES)
        .zip(1u32..)
        .map(|(hit, id)| ImageRecord {
            id,
            url: hit.image.unwrap_or_default(),
            title: hit
                .title
                .unwrap_or_else(|| format!("Image related to {query}")),
            source: hit.url.unwrap_or_default(),
        })
        .collect()
}
