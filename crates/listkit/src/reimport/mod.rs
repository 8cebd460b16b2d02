//! Reimport stages: push human-edited template rows back to the catalog.

pub mod images;
pub mod outcome;
pub mod titles;

pub use images::{is_image_file, sort_image_files, ImageStageOutcome, ImageUploadStage};
pub use outcome::{RowError, RowOutcome, RowResult, StageReport};
pub use titles::TitleTagStage;
