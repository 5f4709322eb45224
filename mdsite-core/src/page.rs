use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::SiteConfig;
use crate::markdown::{MarkdownRenderer, RenderError};
use crate::scanner::SourceDocument;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot render {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        source: RenderError,
    },
    #[error("{} does not end with {extension}", .path.display())]
    NotADocument { path: PathBuf, extension: String },
}

impl PageError {
    pub fn path(&self) -> &Path {
        match self {
            PageError::Read { path, .. }
            | PageError::Render { path, .. }
            | PageError::NotADocument { path, .. } => path,
        }
    }
}

/// One converted document, ready to be written and linked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    content: String,
    relative_dir: String,
    output_filename: String,
    source: PathBuf,
}

impl Page {
    /// Read a discovered document from disk and convert it.
    pub fn load<R: MarkdownRenderer + ?Sized>(
        doc: &SourceDocument,
        renderer: &R,
        config: &SiteConfig,
    ) -> Result<Self, PageError> {
        let raw = std::fs::read(&doc.path).map_err(|source| PageError::Read {
            path: doc.path.clone(),
            source,
        })?;
        Self::from_source(doc, &raw, renderer, config)
    }

    /// Build a record from bytes already in memory. No disk access.
    pub fn from_source<R: MarkdownRenderer + ?Sized>(
        doc: &SourceDocument,
        raw: &[u8],
        renderer: &R,
        config: &SiteConfig,
    ) -> Result<Self, PageError> {
        let title = doc
            .file_name
            .strip_suffix(config.document_extension.as_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| PageError::NotADocument {
                path: doc.path.clone(),
                extension: config.document_extension.clone(),
            })?
            .to_string();

        let content = renderer.render(raw).map_err(|source| PageError::Render {
            path: doc.path.clone(),
            source,
        })?;

        Ok(Self {
            output_filename: format!("{}{}", title, config.output_extension),
            title,
            content,
            relative_dir: doc.relative_dir.clone(),
            source: doc.path.clone(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn relative_dir(&self) -> &str {
        &self.relative_dir
    }

    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_root(&self) -> bool {
        self.relative_dir == "."
    }

    /// Destination relative to the output root.
    pub fn out_path(&self) -> PathBuf {
        let mut out = PathBuf::new();
        if !self.is_root() {
            for segment in self.relative_dir.split('/') {
                out.push(segment);
            }
        }
        out.join(&self.output_filename)
    }

    /// `relative_dir/output_filename`, or just the file name at the root.
    pub fn url_path(&self) -> String {
        if self.is_root() {
            self.output_filename.clone()
        } else {
            format!("{}/{}", self.relative_dir, self.output_filename)
        }
    }
}
