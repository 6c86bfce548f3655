//! File and directory utilities

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, warn};
use walkdir::WalkDir;

/// File operations used across the pipeline
pub struct FileManager;

impl FileManager {
    /// True if `path` is an existing file
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    /// True if `path` is an existing directory
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Create the directory and its parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Find files with a specific extension below a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));
            if matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> io::Result<String> {
        fs::read_to_string(path)
    }

    /// Write a string to a file, creating the parent directory first
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, content)
    }

    /// Last modification time of `path`
    pub fn modified_time<P: AsRef<Path>>(path: P) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    /// Remove a file; a file that is already gone is not an error
    pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Intermediate file deleted when the guard goes out of scope.
///
/// The pipeline writes preprocessed and translated markdown next to the rendered
/// output; these must not survive a run, whichever way the run ends.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Guard an existing (or about to be written) path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match FileManager::remove_if_exists(&self.path) {
            Ok(()) => debug!("Removed intermediate file {:?}", self.path),
            Err(e) => warn!("Unable to remove intermediate file {:?}: {}", self.path, e),
        }
    }
}
