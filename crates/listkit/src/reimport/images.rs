//! Ranked image upload from per-row mockup folders.
//!
//! The stage validates every referenced folder before touching the catalog:
//! a single missing folder blocks the whole run with zero remote calls.
//! Once validation passes, rows are uploaded independently and a failure
//! only marks its own row.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::catalog::{CatalogApi, ImageUpload, SubmitOutcome, VideoUpload};
use crate::config::ImagesConfig;
use crate::error::Result;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::sanitize;
use crate::table::{columns, load_table, Table, TableSchema};

use super::outcome::{RowError, RowOutcome, StageReport};

const STAGE: &str = "upload-images";

const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];
const VIDEO_EXTENSION: &str = "mp4";

#[derive(Debug, Clone, Serialize)]
pub enum ImageStageOutcome {
    /// Folder validation failed; nothing was uploaded.
    Blocked(Vec<RowError>),
    Completed(StageReport),
}

static RE_LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").unwrap());

/// Leading digits without leading zeros, so any length compares exactly.
fn leading_number(name: &str) -> Option<&str> {
    RE_LEADING_NUMBER
        .find(name)
        .map(|m| m.as_str().trim_start_matches('0'))
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Only plain relative names stay under the image root once joined.
fn is_contained(folder: &str) -> bool {
    Path::new(folder)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn has_extension(name: &str, wanted: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

pub fn is_image_file(name: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| has_extension(name, ext))
}

/// Orders file names by leading number ascending. Numbered names come
/// first; equal numbers and un-numbered names fall back to name order.
pub fn sort_image_files(mut names: Vec<String>) -> Vec<String> {
    names.sort_by(|a, b| {
        let by_number = match (leading_number(a), leading_number(b)) {
            (Some(x), Some(y)) => cmp_digits(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_number.then_with(|| a.cmp(b))
    });
    names
}

async fn list_file_names(folder: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

pub struct ImageUploadStage<'a> {
    api: &'a dyn CatalogApi,
    shop_id: String,
    image_root: PathBuf,
    max_images: usize,
    upload_videos: bool,
    video_retries: u32,
}

impl<'a> ImageUploadStage<'a> {
    pub fn new(api: &'a dyn CatalogApi, shop_id: &str, image_root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            shop_id: shop_id.to_string(),
            image_root: image_root.into(),
            max_images: 10,
            upload_videos: false,
            video_retries: 3,
        }
    }

    pub fn with_config(mut self, images: &ImagesConfig, video_retries: u32) -> Self {
        self.max_images = images.max_images;
        self.upload_videos = images.upload_videos;
        self.video_retries = video_retries;
        self
    }

    pub async fn run_file(
        &self,
        path: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<ImageStageOutcome> {
        let table = load_table(path, &TableSchema::images())?;
        Ok(self.run(&table, progress).await)
    }

    /// `None` when `folder` would resolve outside the image root.
    fn folder_path(&self, folder: &str) -> Option<PathBuf> {
        is_contained(folder).then(|| self.image_root.join(folder))
    }

    /// Every non-empty `Mockups Folder` must be a relative directory under
    /// the image root. Rows without a folder are not checked.
    pub async fn validate(&self, table: &Table) -> Vec<RowError> {
        let mut errors = Vec::new();
        for (line, record) in table.numbered_rows() {
            let folder = record.text(columns::MOCKUPS_FOLDER);
            if folder.is_empty() {
                continue;
            }
            let Some(folder_path) = self.folder_path(folder) else {
                errors.push(RowError::new(
                    line,
                    format!(
                        "folder '{}' is not a relative path inside {}",
                        folder,
                        self.image_root.display()
                    ),
                ));
                continue;
            };
            let is_dir = tokio::fs::metadata(&folder_path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                errors.push(RowError::new(
                    line,
                    format!(
                        "folder '{}' does not exist in {}",
                        folder,
                        self.image_root.display()
                    ),
                ));
            }
        }
        errors
    }

    pub async fn run(&self, table: &Table, progress: &dyn ProgressReporter) -> ImageStageOutcome {
        progress.report(ProgressEvent::StageStarted {
            stage: STAGE,
            total: Some(table.rows.len()),
        });

        let errors = self.validate(table).await;
        if !errors.is_empty() {
            for error in &errors {
                warn!(row = error.row, message = %error.message, "Mockups folder check failed");
            }
            progress.report(ProgressEvent::StageFinished {
                stage: STAGE,
                message: format!("blocked by {} folder errors", errors.len()),
            });
            return ImageStageOutcome::Blocked(errors);
        }

        let mut report = StageReport::start(STAGE);
        for (done, (line, record)) in (1..).zip(table.numbered_rows()) {
            let listing_id = record.text(columns::PRODUCT_ID);
            let folder = record.text(columns::MOCKUPS_FOLDER);
            let span = info_span!("row", row = line, listing_id = %listing_id);
            let outcome = self.upload_row(listing_id, folder).instrument(span).await;

            progress.report(ProgressEvent::Advanced {
                stage: STAGE,
                done,
                status: outcome.label().to_string(),
            });
            report.record(line, listing_id, outcome);
        }

        let report = report.finish();
        info!(summary = %report.summary(), "Image upload finished");
        progress.report(ProgressEvent::StageFinished {
            stage: STAGE,
            message: report.summary(),
        });
        ImageStageOutcome::Completed(report)
    }

    async fn upload_row(&self, listing_id: &str, folder: &str) -> RowOutcome {
        if folder.is_empty() {
            return RowOutcome::Skipped("no mockups folder".to_string());
        }
        if listing_id.is_empty() {
            warn!("Row has a mockups folder but no Product ID");
            return RowOutcome::Failed("empty Product ID".to_string());
        }

        let Some(folder_path) = self.folder_path(folder) else {
            return RowOutcome::Failed(format!("folder '{}' is outside the image root", folder));
        };
        let names = match list_file_names(&folder_path).await {
            Ok(names) => names,
            Err(e) => {
                warn!(folder = %sanitize::redact_path(&folder_path), error = %e, "Failed to list folder");
                return RowOutcome::Failed(format!("failed to read folder '{}': {}", folder, e));
            }
        };

        let images: Vec<String> = sort_image_files(
            names.iter().filter(|n| is_image_file(n)).cloned().collect(),
        )
        .into_iter()
        .take(self.max_images)
        .collect();

        for (position, file_name) in images.iter().enumerate() {
            let rank = position as u32 + 1;
            if let Err(message) = self.upload_image(listing_id, &folder_path, file_name, rank).await {
                return RowOutcome::Failed(message);
            }
        }

        let mut video_uploaded = false;
        if self.upload_videos {
            let mut videos: Vec<&String> = names
                .iter()
                .filter(|n| has_extension(n, VIDEO_EXTENSION))
                .collect();
            videos.sort();
            if let Some(video) = videos.first() {
                if let Err(message) = self.upload_video(listing_id, &folder_path, video).await {
                    return RowOutcome::Failed(message);
                }
                video_uploaded = true;
            }
        }

        if images.is_empty() && !video_uploaded {
            info!("No images in folder");
            return RowOutcome::Skipped("no .jpg or .png files in folder".to_string());
        }
        info!(images = images.len(), video = video_uploaded, "Uploaded media");
        RowOutcome::Success
    }

    async fn upload_image(
        &self,
        listing_id: &str,
        folder: &Path,
        file_name: &str,
        rank: u32,
    ) -> std::result::Result<(), String> {
        let bytes = tokio::fs::read(folder.join(file_name))
            .await
            .map_err(|e| format!("failed to read {}: {}", file_name, e))?;

        let upload = ImageUpload {
            file_name: file_name.to_string(),
            bytes,
            rank,
            overwrite: true,
        };
        self.api
            .upload_listing_image(&self.shop_id, listing_id, &upload)
            .await
            .map_err(|e| {
                warn!(file = %file_name, rank, error = %e, "Image upload failed");
                format!("image {} ({}): {}", rank, file_name, e)
            })?;
        debug!(file = %file_name, rank, "Uploaded image");
        Ok(())
    }

    async fn upload_video(
        &self,
        listing_id: &str,
        folder: &Path,
        file_name: &str,
    ) -> std::result::Result<(), String> {
        let bytes = tokio::fs::read(folder.join(file_name))
            .await
            .map_err(|e| format!("failed to read {}: {}", file_name, e))?;

        let video = VideoUpload {
            file_name: file_name.to_string(),
            bytes,
        };
        match self
            .api
            .upload_listing_video(&self.shop_id, listing_id, &video, self.video_retries)
            .await
        {
            SubmitOutcome::Success => Ok(()),
            SubmitOutcome::Failed => Err(format!("video {} failed after retries", file_name)),
        }
    }
}
