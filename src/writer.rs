//! Writes a course out as the folder tree used for packaging:
//!
//! ```text
//! <destination>/
//!     lecture_<id>/
//!         assets/
//!         <block id>.md
//! ```

use std::path::{Path, PathBuf};

use crate::client::{ContentClient, ContentError};
use crate::images::{self, ImageReport, ASSETS_PREFIX};

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ── Reports ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct BlockReport {
    pub block_id: u64,
    pub path: PathBuf,
    pub images: Vec<ImageReport>,
}

#[derive(Debug)]
pub struct LectureReport {
    pub lecture_id: u64,
    pub title: String,
    pub directory: PathBuf,
    pub blocks: Vec<BlockReport>,
    /// Blocks left out because they have no `publishedAt`.
    pub unpublished: Vec<u64>,
}

#[derive(Debug)]
pub struct CourseReport {
    pub course_id: u64,
    pub lectures: Vec<LectureReport>,
}

impl LectureReport {
    fn images(&self) -> impl Iterator<Item = &ImageReport> {
        self.blocks.iter().flat_map(|b| b.images.iter())
    }

    pub fn failed_images(&self) -> Vec<&ImageReport> {
        self.images().filter(|i| !i.outcome.is_saved()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.images().all(|i| i.outcome.is_saved())
    }
}

impl CourseReport {
    pub fn blocks_written(&self) -> usize {
        self.lectures.iter().map(|l| l.blocks.len()).sum()
    }

    pub fn images_saved(&self) -> usize {
        self.lectures
            .iter()
            .flat_map(|l| l.images())
            .filter(|i| i.outcome.is_saved())
            .count()
    }

    pub fn images_failed(&self) -> usize {
        self.lectures.iter().map(|l| l.failed_images().len()).sum()
    }

    /// True only when every referenced image was saved.
    pub fn is_complete(&self) -> bool {
        self.lectures.iter().all(LectureReport::is_complete)
    }
}

// ── Write-out ────────────────────────────────────────────────────────────────

pub async fn write_course(
    client: &ContentClient,
    course_id: u64,
    destination: &Path,
) -> Result<CourseReport, WriteError> {
    create_dir(destination).await?;

    let course = client.course(course_id).await?;
    let lecture_ids: Vec<u64> = course
        .data
        .attributes
        .lectures
        .data
        .iter()
        .map(|l| l.id)
        .collect();
    tracing::info!(
        course_id,
        "course has {} lecture(s): {:?}",
        lecture_ids.len(),
        lecture_ids
    );

    let mut lectures = Vec::with_capacity(lecture_ids.len());
    for lecture_id in lecture_ids {
        lectures.push(write_lecture(client, lecture_id, destination).await?);
    }

    Ok(CourseReport {
        course_id,
        lectures,
    })
}

/// Write one lecture's published blocks under `destination/lecture_<id>`.
pub async fn write_lecture(
    client: &ContentClient,
    lecture_id: u64,
    destination: &Path,
) -> Result<LectureReport, WriteError> {
    let lecture = client.lecture(lecture_id).await?;
    let lecture_path = destination.join(format!("lecture_{}", lecture.data.id));
    let assets_path = lecture_path.join(ASSETS_PREFIX);
    create_dir(&lecture_path).await?;
    create_dir(&assets_path).await?;

    let attrs = lecture.data.attributes;
    tracing::info!(lecture_id = lecture.data.id, "writing '{}'", attrs.title);

    let mut blocks = Vec::new();
    let mut unpublished = Vec::new();
    for entry in &attrs.blocks.data {
        let block = client.block(entry.id).await?;
        if !block.data.attributes.is_published() {
            tracing::info!(block_id = block.data.id, "skipping unpublished block");
            unpublished.push(block.data.id);
            continue;
        }

        let source = block.data.attributes.document.as_deref().unwrap_or("");
        let materialized = images::materialize(client.http(), source, &assets_path).await;

        let block_path = lecture_path.join(format!("{}.md", block.data.id));
        tokio::fs::write(&block_path, materialized.document.as_bytes())
            .await
            .map_err(|source| WriteError::Io {
                path: block_path.clone(),
                source,
            })?;
        tracing::debug!(path = %block_path.display(), "wrote block");

        blocks.push(BlockReport {
            block_id: block.data.id,
            path: block_path,
            images: materialized.images,
        });
    }

    Ok(LectureReport {
        lecture_id: lecture.data.id,
        title: attrs.title,
        directory: lecture_path,
        blocks,
        unpublished,
    })
}

async fn create_dir(path: &Path) -> Result<(), WriteError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })
}
