use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::Failure;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset source {} does not exist", .0.display())]
    MissingSource(PathBuf),
    #[error("Cannot create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: usize,
    pub failures: Vec<Failure>,
}

impl CopyReport {
    fn record(&mut self, src: &Path, dst: &Path, result: std::io::Result<()>) {
        match result {
            Ok(()) => {
                tracing::debug!("Copied {} -> {}", src.display(), dst.display());
                self.copied += 1;
            }
            Err(err) => {
                tracing::warn!("Failed to copy {} to {}: {}", src.display(), dst.display(), err);
                self.failures.push(Failure::new(src, err.to_string()));
            }
        }
    }
}

/// Copies files byte for byte into the output tree. `fs::copy` carries the
/// permission bits over on platforms that have them.
pub struct AssetCopier {
    required: bool,
    skip: Vec<PathBuf>,
}

impl AssetCopier {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            skip: Vec::new(),
        }
    }

    /// Leave `dir` and everything under it out of `copy_dir`.
    pub fn skip<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.skip.push(dir.into());
        self
    }

    /// Recursively duplicate `src` into `dst`, directories included.
    ///
    /// A missing `src` is an error only when the copier is `required`.
    /// Individual entries that fail are logged and recorded; the rest still copy.
    pub fn copy_dir(&self, src: &Path, dst: &Path) -> Result<CopyReport, AssetError> {
        let mut report = CopyReport::default();

        if !src.is_dir() {
            if self.required {
                return Err(AssetError::MissingSource(src.to_path_buf()));
            }
            tracing::info!("No asset directory at {}, skipping", src.display());
            return Ok(report);
        }

        std::fs::create_dir_all(dst).map_err(|source| AssetError::CreateDir {
            path: dst.to_path_buf(),
            source,
        })?;

        let walker = WalkDir::new(src)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| !self.skip.iter().any(|dir| entry.path() == dir));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(src).to_path_buf();
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    report.failures.push(Failure::new(path, err.to_string()));
                    continue;
                }
            };

            let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
            let target = dst.join(relative);

            if entry.file_type().is_dir() {
                if let Err(err) = std::fs::create_dir_all(&target) {
                    tracing::warn!("Failed to create {}: {}", target.display(), err);
                    report.failures.push(Failure::new(entry.path(), err.to_string()));
                }
                continue;
            }

            let result = copy_file(entry.path(), &target);
            report.record(entry.path(), &target, result);
        }

        Ok(report)
    }

    /// Copy a list of files given relative to `src_root` to the same relative
    /// paths under `dst_root`.
    pub fn copy_files(&self, src_root: &Path, dst_root: &Path, files: &[PathBuf]) -> CopyReport {
        let mut report = CopyReport::default();

        for rel in files {
            let src = src_root.join(rel);
            let dst = dst_root.join(rel);
            let result = copy_file(&src, &dst);
            report.record(&src, &dst, result);
        }

        report
    }
}

/// Copy one file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(src, dst).map(|_| ())
}
