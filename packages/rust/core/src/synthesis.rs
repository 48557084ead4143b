//! Content synthesis: render the gathered material into one prompt, call the
//! model once, then bind image placeholders to their resolved URLs.

use std::fmt::Write as _;

use tracing::{debug, info, instrument};

use coursegen_llm::LanguageModel;
use coursegen_shared::{EvidenceItem, ImageRecord, Outline, Result};

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Numbered `--- SOURCE i ---` blocks, one per evidence item.
pub fn render_evidence(evidence: &[EvidenceItem]) -> String {
    evidence
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "--- SOURCE {} ---\nTitle: {}\nContent: {}\nURL: {}",
                i + 1,
                item.title,
                item.body,
                item.href
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One `IMAGE {id}: {title} (from {source})` line per record.
pub fn render_images(images: &[ImageRecord]) -> String {
    images
        .iter()
        .map(|img| format!("IMAGE {}: {} (from {})", img.id, img.title, img.source))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The outline as a numbered syllabus.
pub fn render_outline(query: &str, outline: &Outline) -> String {
    let mut out = format!("Course Title: {}\n\n", outline.title_or(query));

    for (i, topic) in outline.topics.iter().enumerate() {
        let _ = writeln!(out, "Topic {}: {}", i + 1, topic.headline_or_empty());
        for (j, subtopic) in topic.subtopics.iter().enumerate() {
            let _ = writeln!(out, "  - Subtopic {}.{}: {subtopic}", i + 1, j + 1);
        }
    }

    out
}

/// Assemble the synthesis prompt.
pub fn build_synthesis_prompt(
    query: &str,
    outline: &Outline,
    evidence: &[EvidenceItem],
    images: &[ImageRecord],
) -> String {
    let syllabus = render_outline(query, outline);
    let sources = render_evidence(evidence);
    let image_list = render_images(images);

    format!(
        r#"Create a comprehensive educational course about "{query}".

Use the provided course structure, web search results, and image descriptions to create
a well-formatted, educational course.

COURSE OUTLINE:
{syllabus}
WEB SEARCH RESULTS:
{sources}

AVAILABLE IMAGES:
{image_list}

Please create a well-structured course following these guidelines:
1. Begin with an engaging introduction to the topic
2. Follow the provided course outline structure
3. For each main topic:
   - Provide clear explanations using information from the search results
   - Cite the facts you use by their SOURCE number
   - Reference relevant images where appropriate using: ![IMAGE X](image_url_X)
   - Include examples, facts, and interesting information
4. End with a summary and suggestions for further learning

Format the content in Markdown with proper headings and sections.
"#
    )
}

// ---------------------------------------------------------------------------
// Placeholder substitution
// ---------------------------------------------------------------------------

/// The marker the model is asked to emit for image `id`.
pub fn placeholder(id: u32) -> String {
    format!("![IMAGE {id}](image_url_{id})")
}

/// Replace every exact placeholder for a known image with its Markdown
/// image reference. Placeholders for unknown ids are left as they are.
pub fn substitute_placeholders(content: &str, images: &[ImageRecord]) -> String {
    let mut content = content.to_string();

    for img in images {
        let marker = placeholder(img.id);
        if content.contains(&marker) {
            content = content.replace(&marker, &format!("![{}]({})", img.title, img.url));
        }
    }

    let unresolved = content.matches("](image_url_").count();
    if unresolved > 0 {
        debug!(unresolved, "image placeholders left unresolved");
    }

    content
}

/// Generate the course body.
#[instrument(skip_all, fields(query = %query, evidence = evidence.len(), images = images.len()))]
pub async fn synthesize(
    model: &dyn LanguageModel,
    query: &str,
    outline: &Outline,
    evidence: &[EvidenceItem],
    images: &[ImageRecord],
) -> Result<String> {
    let prompt = build_synthesis_prompt(query, outline, evidence, images);
    let content = model.generate(&prompt).await?;
    let content = substitute_placeholders(&content, images);

    info!(chars = content.len(), "course content synthesized");
    Ok(content)
}
