use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::client::{ContentClient, ContentError};
use crate::config::Config;
use crate::images::ImageOutcome;
use crate::keywords::{KeywordExtractor, DEFAULT_KEYWORD_COUNT};
use crate::models::LectureRecord;
use crate::writer::{self, CourseReport};

/// Export teaching kit lectures as markdown folders with local images.
#[derive(Debug, Parser)]
#[command(name = "teachingkit-export")]
#[command(about = "Export teaching kit courses as markdown folder trees", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write every lecture of a course to a folder tree, downloading images.
    Course {
        /// Course identifier.
        id: u64,
        /// Output folder (defaults to `course_<id>`).
        destination: Option<PathBuf>,
    },

    /// Print a lecture's title, blocks, creators and learning outcomes.
    Lecture {
        /// Lecture identifier.
        id: u64,
    },

    /// Print the most frequent keywords of a lecture.
    Keywords {
        /// Lecture identifier.
        id: u64,
        /// Number of keywords to print.
        #[arg(short = 'n', long, default_value_t = DEFAULT_KEYWORD_COUNT)]
        count: usize,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let client = ContentClient::new(&self.config).context("invalid configuration")?;

        match self.command {
            Command::Course { id, destination } => {
                let destination =
                    destination.unwrap_or_else(|| PathBuf::from(format!("course_{}", id)));
                let report = writer::write_course(&client, id, &destination)
                    .await
                    .with_context(|| format!("failed to write course {}", id))?;
                print!("{}", render_course_report(&report));
            }
            Command::Lecture { id } => {
                let lecture = client
                    .lecture(id)
                    .await
                    .with_context(|| format!("failed to fetch lecture {}", id))?;
                print!("{}", render_lecture_summary(&lecture));
            }
            Command::Keywords { id, count } => {
                let extractor = KeywordExtractor::new();
                let text = lecture_text(&client, id)
                    .await
                    .with_context(|| format!("failed to fetch lecture {}", id))?;
                for keyword in extractor.extract(&text, count) {
                    println!("{}", keyword);
                }
            }
        }
        Ok(())
    }
}

/// Title, abstract and every published block document of a lecture.
async fn lecture_text(client: &ContentClient, id: u64) -> Result<String, ContentError> {
    let lecture = client.lecture(id).await?;
    let attrs = &lecture.data.attributes;

    let mut parts = vec![attrs.title.clone()];
    parts.extend(attrs.abstract_text.clone());
    for entry in &attrs.blocks.data {
        let block = client.block(entry.id).await?;
        if block.data.attributes.is_published() {
            parts.extend(block.data.attributes.document);
        }
    }
    Ok(parts.join("\n\n"))
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub fn render_lecture_summary(lecture: &LectureRecord) -> String {
    let attrs = &lecture.data.attributes;
    let mut out = String::new();

    let _ = writeln!(out, "{}", attrs.title);
    if let Some(version) = attrs.version_label() {
        let _ = writeln!(out, "Version number: {}", version);
    }
    if let Some(versions) = attrs.versions_label() {
        let _ = writeln!(out, "Versions: {}", versions);
    }

    for block in &attrs.blocks.data {
        let title = block.attributes.title.as_deref().unwrap_or("");
        let _ = writeln!(out, "This lecture contains block {}: '{}'", block.id, title);
    }

    if !attrs.creators.data.is_empty() {
        let _ = writeln!(out, "This lecture was written by:");
        for creator in &attrs.creators.data {
            let c = &creator.attributes;
            let fields = [
                Some(c.first_name.as_str()),
                Some(c.last_name.as_str()),
                c.email.as_deref(),
                c.orcid.as_deref(),
            ];
            let line: Vec<&str> = fields
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .collect();
            let _ = writeln!(out, "  {}", line.join(" "));
        }
    }

    if !attrs.learning_outcomes.is_empty() {
        let _ = writeln!(out, "Outcomes:");
        for outcome in &attrs.learning_outcomes {
            let _ = writeln!(out, "  - {}", outcome.text);
        }
    }
    out
}

pub fn render_course_report(report: &CourseReport) -> String {
    let mut out = String::new();
    for lecture in &report.lectures {
        let _ = writeln!(
            out,
            "lecture {} '{}': {} block(s) written to {}",
            lecture.lecture_id,
            lecture.title,
            lecture.blocks.len(),
            lecture.directory.display()
        );
        if !lecture.unpublished.is_empty() {
            let ids: Vec<String> = lecture.unpublished.iter().map(u64::to_string).collect();
            let _ = writeln!(out, "  skipped unpublished: {}", ids.join(", "));
        }
        for image in lecture.failed_images() {
            let reason = match &image.outcome {
                ImageOutcome::HttpStatus(status) => format!("HTTP {}", status),
                ImageOutcome::Transport(err) | ImageOutcome::Write(err) => err.clone(),
                ImageOutcome::Saved { .. } => continue,
            };
            let _ = writeln!(out, "  image not saved: {} ({})", image.url, reason);
        }
    }
    let _ = writeln!(
        out,
        "course {}: {} block(s), {} image(s) saved, {} failed",
        report.course_id,
        report.blocks_written(),
        report.images_saved(),
        report.images_failed()
    );
    out
}
