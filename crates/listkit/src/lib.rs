pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod progress;
pub mod reimport;
pub mod sanitize;
pub mod secrets;
pub mod session;
pub mod storage;
pub mod table;

pub use catalog::{CatalogApi, CatalogClient, CatalogError, SubmitOutcome};
pub use config::{default_config_path, load_config, Config};
pub use enrich::{run_enrichment, EnrichError, EnrichmentReport, ResearchPage};
pub use error::{ConfigError, ListkitError, Result, StorageError, TableError};
pub use export::{ExportReport, ExportStage};
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter};
pub use reimport::{ImageStageOutcome, ImageUploadStage, RowOutcome, StageReport, TitleTagStage};
pub use secrets::{resolve_secret, SecretError};
pub use session::RunSession;
pub use storage::OutputStorage;
