//! Guide markdown synthesis.
//!
//! Renders a [`GuideMetadata`] header block plus [`GuideSections`] body into the
//! single markdown document published for a guide. Rendering is a pure function:
//! the same inputs always produce byte-identical output.

mod images;

use guidegen_shared::{GuideMetadata, GuideSections, Step};
use tracing::{debug, instrument};

pub use images::convert_img_tags;

/// Header keys, in the order they are rendered.
pub const HEADER_KEYS: [&str; 10] = [
    "author",
    "id",
    "language",
    "summary",
    "categories",
    "environments",
    "status",
    "feedback link",
    "fork repo link",
    "open in snowflake",
];

/// H1 used when the guide has no title.
pub const DEFAULT_TITLE: &str = "Snowflake Guide";

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Render a complete guide document.
///
/// Layout:
/// ```text
/// author: ...            ┐
/// ...                    │ ten header lines, fixed order
/// open in snowflake: ... ┘
///
/// # Title
/// ## Overview
/// ### What You'll Learn / Need / Build
/// ## Process (## Step n: ...)
/// ## Conclusion And Resources
/// ```
/// Body sections with no content are left out entirely.
#[instrument(skip_all, fields(id = %metadata.id))]
pub fn assemble(metadata: &GuideMetadata, sections: &GuideSections) -> String {
    let sections = prepare_sections(sections);

    let mut parts = header_lines(metadata);
    parts.push(String::new());
    parts.extend(body_parts(&sections));

    let markdown = parts.join("\n");
    debug!(
        len = markdown.len(),
        steps = sections.steps.len(),
        "guide markdown assembled"
    );
    markdown
}

/// Rewrite `<img>` tags in the free-text sections and drop blank steps.
fn prepare_sections(sections: &GuideSections) -> GuideSections {
    GuideSections {
        title: sections.title.clone(),
        overview: convert_img_tags(&sections.overview).into_owned(),
        learn: sections.learn.clone(),
        need: sections.need.clone(),
        build: convert_img_tags(&sections.build).into_owned(),
        steps: sections
            .steps
            .iter()
            .filter(|s| !s.is_blank())
            .map(|s| Step {
                title: s.title.trim().to_string(),
                content: convert_img_tags(&s.content).into_owned(),
            })
            .collect(),
        conclusion: convert_img_tags(&sections.conclusion).into_owned(),
        resources: sections.resources.clone(),
    }
}

fn header_lines(m: &GuideMetadata) -> Vec<String> {
    let categories = m
        .categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let values = [
        single_line(&m.author),
        m.id.to_string(),
        m.language.to_string(),
        single_line(&m.summary),
        single_line(&categories),
        single_line(&m.environments),
        m.status.to_string(),
        single_line(&m.feedback_link),
        single_line(&m.fork_repo_link),
        single_line(&m.open_in_link),
    ];

    HEADER_KEYS
        .iter()
        .zip(values)
        .map(|(key, value)| format!("{key}: {value}"))
        .collect()
}

fn body_parts(s: &GuideSections) -> Vec<String> {
    let mut body = Vec::new();

    let title = single_line(&s.title);
    let title = if title.is_empty() { DEFAULT_TITLE } else { title.as_str() };
    body.push(format!("# {title}\n"));

    if let Some(overview) = non_blank(&s.overview) {
        body.push(format!("## Overview\n{overview}\n"));
    }

    let learn = bullets(&s.learn);
    if !learn.is_empty() {
        body.push(format!("### What You'll Learn\n{}\n", learn.join("\n")));
    }

    let need = bullets(&s.need);
    if !need.is_empty() {
        body.push(format!("### What You'll Need\n{}\n", need.join("\n")));
    }

    if let Some(build) = non_blank(&s.build) {
        body.push(format!("### What You'll Build\n{build}\n"));
    }

    if !s.steps.is_empty() {
        let steps: Vec<String> = s
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| render_step(i + 1, step))
            .collect();
        body.push(format!("## Process\n{}\n", steps.join("\n\n")));
    }

    let conclusion = non_blank(&s.conclusion);
    let resources: Vec<String> = lines(&s.resources).map(render_resource).collect();
    if conclusion.is_some() || !resources.is_empty() {
        body.push("## Conclusion And Resources\n".to_string());
        if let Some(conclusion) = conclusion {
            body.push(format!("### Conclusion\n{conclusion}\n"));
        }
        if !resources.is_empty() {
            body.push(format!("### Related Resources\n{}\n", resources.join("\n")));
        }
    }

    body
}

/// `n` is the position in the already-filtered step list.
fn render_step(n: usize, step: &Step) -> String {
    let title = single_line(&step.title);
    let title = if title.is_empty() {
        format!("Step {n}")
    } else {
        title
    };
    format!("## Step {n}: {title}\n\n{}", step.content.trim())
}

/// `label | url` becomes a link; anything else a plain bullet.
fn render_resource(line: &str) -> String {
    match line.split_once(" | ") {
        Some((label, url)) => format!("- [{}]({})", label.trim(), url.trim()),
        None => format!("- {line}"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trimmed, non-blank lines; entries that themselves contain newlines are split.
fn lines(entries: &[String]) -> impl Iterator<Item = &str> {
    entries
        .iter()
        .flat_map(|e| e.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

fn bullets(entries: &[String]) -> Vec<String> {
    lines(entries).map(|l| format!("- {l}")).collect()
}

fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Header values and headings must stay on one line.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
