//! Test harness for isolated stage runs.
//!
//! The `TestHarness` owns a temp directory with an export directory and an
//! image root, plus helpers for the human edit step between stages.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use listkit::table::{read_table, write_table, Table};
use listkit::OutputStorage;

pub struct TestHarness {
    temp_dir: TempDir,
    pub export_dir: PathBuf,
    pub image_root: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let export_dir = temp_dir.path().join("exports");
        let image_root = temp_dir.path().join("mockups");
        std::fs::create_dir_all(&export_dir).expect("Failed to create export dir");
        std::fs::create_dir_all(&image_root).expect("Failed to create image root");

        Self {
            temp_dir,
            export_dir,
            image_root,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn storage(&self) -> OutputStorage {
        OutputStorage::new(&self.export_dir)
    }

    pub fn read(&self, path: &Path) -> Table {
        read_table(path).expect("Failed to read table")
    }

    /// Saves an edited table next to the exports, like a spreadsheet "save as".
    pub fn save_edited(&self, name: &str, table: &Table) -> PathBuf {
        let path = self.root().join(name);
        let file = std::fs::File::create(&path).expect("Failed to create edited file");
        write_table(file, &table.headers, &table.rows).expect("Failed to write edited file");
        path
    }

    /// Creates `<image_root>/<folder>` holding empty files with these names.
    pub fn mockup_folder(&self, folder: &str, files: &[&str]) -> PathBuf {
        let dir = self.image_root.join(folder);
        std::fs::create_dir_all(&dir).expect("Failed to create mockup folder");
        for file in files {
            std::fs::write(dir.join(file), b"fake image bytes").expect("Failed to write mockup");
        }
        dir
    }
}
