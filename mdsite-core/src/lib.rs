pub mod assets;
pub mod builder;
pub mod config;
pub mod markdown;
pub mod nav;
pub mod page;
pub mod scanner;
pub mod template;
pub mod writer;

use std::path::PathBuf;

// Re-export main types
pub use assets::{AssetCopier, AssetError, CopyReport};
pub use builder::{BuildError, BuildReport, SiteBuilder, build_site};
pub use config::{AssetMode, ConfigError, NavMode, SiteConfig};
pub use markdown::{CmarkRenderer, MarkdownRenderer, RenderError};
pub use nav::{NavGroup, NavItem, Navigation};
pub use page::{Page, PageError};
pub use scanner::{Discovery, ScanError, SiteScanner, SourceDocument};
pub use template::{TemplateError, TemplateRenderer};
pub use writer::{PageWriter, WriteError};

/// A file that was skipped without stopping the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
}

impl Failure {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}
