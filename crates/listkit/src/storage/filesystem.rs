use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Highest numeric suffix tried before giving up on a base name.
const MAX_SUFFIX: usize = 10_000;

/// `base.ext`, `base1.ext`, `base2.ext`, ...
fn numbered_file_name(base: &str, extension: &str, counter: usize) -> String {
    if counter == 0 {
        format!("{}.{}", base, extension)
    } else {
        format!("{}{}.{}", base, counter, extension)
    }
}

/// Returns the first path in the numbered sequence that does not exist yet.
///
/// Uses `symlink_metadata` so a dangling symlink still counts as taken.
/// This only reports a candidate; `OutputStorage::create_numbered` is what
/// actually claims a name.
fn next_available_path(
    directory: &Path,
    base: &str,
    extension: &str,
) -> Result<PathBuf, StorageError> {
    for counter in 0..=MAX_SUFFIX {
        let candidate = directory.join(numbered_file_name(base, extension, counter));
        if std::fs::symlink_metadata(&candidate).is_err() {
            return Ok(candidate);
        }
    }

    Err(StorageError::NamesExhausted(
        directory.join(numbered_file_name(base, extension, 0)),
    ))
}

/// Directory that receives stage output files without ever overwriting a
/// previous run's output.
#[derive(Debug, Clone)]
pub struct OutputStorage {
    output_directory: PathBuf,
}

impl OutputStorage {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Creates the first free `base[N].extension` file and returns it open
    /// for writing.
    ///
    /// Creation uses `create_new` (O_CREAT | O_EXCL), so two writers racing
    /// for the same name end up with different files.
    pub fn create_numbered(
        &self,
        base: &str,
        extension: &str,
    ) -> Result<(PathBuf, File), StorageError> {
        self.ensure_directory()?;

        for _ in 0..=MAX_SUFFIX {
            let try_path = next_available_path(&self.output_directory, base, extension)?;

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(file) => return Ok((try_path, file)),
                // Claimed by another writer since the lookup.
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::CreateFile {
                        path: try_path,
                        source: e,
                    })
                }
            }
        }

        Err(StorageError::NamesExhausted(
            self.output_directory
                .join(numbered_file_name(base, extension, 0)),
        ))
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        if !self.output_directory.exists() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| {
                StorageError::CreateDirectory {
                    path: self.output_directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }
}
