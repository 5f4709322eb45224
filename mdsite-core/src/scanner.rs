use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::{AssetMode, SiteConfig};
use crate::Failure;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Input directory {} does not exist or is not a directory", .0.display())]
    MissingRoot(PathBuf),
    #[error("Cannot read input directory {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A document found by the walker, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path to the file, under the configured input directory.
    pub path: PathBuf,
    /// Directory relative to the input root, `/`-separated, `"."` at the root.
    pub relative_dir: String,
    pub file_name: String,
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub documents: Vec<SourceDocument>,
    /// Non-document files relative to the input root (mirror mode only).
    pub assets: Vec<PathBuf>,
    pub skipped: Vec<Failure>,
}

pub struct SiteScanner<'a> {
    config: &'a SiteConfig,
}

impl<'a> SiteScanner<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    pub fn scan(&self) -> Result<Discovery, ScanError> {
        let root = &self.config.input_dir;
        if !root.is_dir() {
            return Err(ScanError::MissingRoot(root.clone()));
        }
        // Surface an unreadable root as fatal instead of as one skipped entry
        std::fs::read_dir(root).map_err(|source| ScanError::Unreadable {
            path: root.clone(),
            source,
        })?;

        tracing::info!("Scanning {}", root.display());

        let excluded = self.excluded_dirs();
        let mut discovery = Discovery::default();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !excluded.iter().any(|ex| relative(root, entry.path()) == *ex)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.clone());
                    tracing::warn!("Skipping {}: {}", path.display(), err);
                    discovery.skipped.push(Failure::new(path, err.to_string()));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let rel = relative(root, entry.path());
            let file_name = entry.file_name().to_string_lossy().into_owned();

            if self.is_document(&file_name) {
                if rel.to_str().is_none() {
                    tracing::warn!("Skipping {}: path is not valid UTF-8", entry.path().display());
                    discovery
                        .skipped
                        .push(Failure::new(entry.path(), "path is not valid UTF-8"));
                    continue;
                }
                tracing::debug!("Found document {}", rel.display());
                discovery.documents.push(SourceDocument {
                    path: entry.path().to_path_buf(),
                    relative_dir: relative_dir_string(&rel),
                    file_name,
                });
            } else if self.config.assets.mode == AssetMode::Mirror {
                tracing::debug!("Found asset {}", rel.display());
                discovery.assets.push(rel);
            }
        }

        tracing::info!(
            "Discovered {} documents and {} assets",
            discovery.documents.len(),
            discovery.assets.len()
        );

        Ok(discovery)
    }

    /// Case-sensitive suffix match; a file named exactly like the extension is not a document.
    pub fn is_document(&self, file_name: &str) -> bool {
        let ext = &self.config.document_extension;
        file_name.len() > ext.len() && file_name.ends_with(ext.as_str())
    }

    fn excluded_dirs(&self) -> Vec<PathBuf> {
        let mut excluded = Vec::new();
        if self.config.assets.mode == AssetMode::Directory {
            excluded.push(strip_cur_dir(&self.config.assets.dir));
        }
        if let Some(output) = self.config.output_inside_input() {
            excluded.push(output);
        }
        excluded
    }
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

fn relative_dir_string(rel_file: &Path) -> String {
    let parts: Vec<String> = rel_file
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# x\n").unwrap();
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        touch(&docs, "b.md");
        touch(&docs, "a.md");
        touch(&docs, "notes.txt");
        touch(&docs, "guide/z.md");
        touch(&docs, "guide/deep/intro.md");
        touch(&docs, "guide/README.MD");
        touch(&docs, "img/logo.png");
        touch(&docs, "img/stray.md");
        tmp
    }

    fn config(tmp: &TempDir) -> SiteConfig {
        SiteConfig::with_dirs(tmp.path().join("docs"), tmp.path().join("site"))
    }

    fn names(discovery: &Discovery) -> Vec<String> {
        discovery
            .documents
            .iter()
            .map(|d| format!("{}/{}", d.relative_dir, d.file_name))
            .collect()
    }

    #[test]
    fn finds_documents_in_sorted_order() {
        let tmp = fixture();
        let config = config(&tmp);
        let discovery = SiteScanner::new(&config).scan().unwrap();

        assert_eq!(
            names(&discovery),
            vec!["./a.md", "./b.md", "guide/deep/intro.md", "guide/z.md"]
        );
        assert!(discovery.assets.is_empty());
        assert!(discovery.skipped.is_empty());
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let tmp = fixture();
        let config = config(&tmp);
        let scanner = SiteScanner::new(&config);

        assert!(scanner.is_document("page.md"));
        assert!(!scanner.is_document("README.MD"));
        assert!(!scanner.is_document(".md"));
        assert!(!scanner.is_document("page.mdx"));
    }

    #[test]
    fn asset_directory_is_not_converted() {
        let tmp = fixture();
        let config = config(&tmp);
        let discovery = SiteScanner::new(&config).scan().unwrap();

        assert!(!names(&discovery).iter().any(|n| n.starts_with("img/")));
    }

    #[test]
    fn mirror_mode_records_every_non_document() {
        let tmp = fixture();
        let mut config = config(&tmp);
        config.assets.mode = AssetMode::Mirror;
        let discovery = SiteScanner::new(&config).scan().unwrap();

        assert_eq!(
            discovery.assets,
            vec![
                PathBuf::from("guide/README.MD"),
                PathBuf::from("img/logo.png"),
                PathBuf::from("notes.txt"),
            ]
        );
        // Nothing is carved out in mirror mode, so the stray document is converted
        assert!(names(&discovery).contains(&"img/stray.md".to_string()));
    }

    #[test]
    fn output_inside_input_is_not_walked() {
        let tmp = fixture();
        let docs = tmp.path().join("docs");
        touch(&docs, "_site/old.md");
        let config = SiteConfig::with_dirs(&docs, docs.join("_site"));
        let discovery = SiteScanner::new(&config).scan().unwrap();

        assert!(!names(&discovery).iter().any(|n| n.starts_with("_site/")));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_document_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = fixture();
        let docs = tmp.path().join("docs");
        fs::write(docs.join(OsStr::from_bytes(b"bad\xff.md")), "x").unwrap();
        fs::create_dir_all(docs.join(OsStr::from_bytes(b"dir\xfe"))).unwrap();
        fs::write(docs.join(OsStr::from_bytes(b"dir\xfe")).join("ok.md"), "x").unwrap();

        let config = config(&tmp);
        let discovery = SiteScanner::new(&config).scan().unwrap();

        assert_eq!(
            names(&discovery),
            vec!["./a.md", "./b.md", "guide/deep/intro.md", "guide/z.md"]
        );
        assert_eq!(discovery.skipped.len(), 2);
        assert!(discovery.skipped.iter().all(|f| f.reason.contains("UTF-8")));
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::with_dirs(tmp.path().join("nope"), tmp.path().join("site"));
        let err = SiteScanner::new(&config).scan().unwrap_err();
        assert!(matches!(err, ScanError::MissingRoot(_)));
    }

    #[test]
    fn relative_dir_uses_dot_for_root() {
        assert_eq!(relative_dir_string(Path::new("a.md")), ".");
        assert_eq!(relative_dir_string(Path::new("x/y/a.md")), "x/y");
    }
}
