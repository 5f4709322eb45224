use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::assets::{self, AssetCopier, AssetError};
use crate::config::{AssetMode, ConfigError, NavMode, SiteConfig};
use crate::markdown::{self, CmarkRenderer, MarkdownRenderer};
use crate::nav::Navigation;
use crate::page::Page;
use crate::scanner::{ScanError, SiteScanner};
use crate::template::{DEFAULT_STYLESHEET, TemplateError, TemplateRenderer};
use crate::writer::{PageWriter, WriteError};
use crate::Failure;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Cannot clear output directory {}: {source}", .path.display())]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot create output directory {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Stylesheet {} does not exist", .0.display())]
    MissingStylesheet(PathBuf),
    #[error("Cannot write stylesheet {}: {source}", .path.display())]
    Stylesheet {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} and {} both map to {}", .first.display(), .second.display(), .dest.display())]
    Conflict {
        dest: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("Cannot write index: {0}")]
    Index(#[source] WriteError),
}

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages_written: usize,
    pub assets_copied: usize,
    pub index: Option<PathBuf>,
    /// Items skipped along the way. The build still succeeded.
    pub failures: Vec<Failure>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SiteBuilder {
    config: SiteConfig,
    renderer: Box<dyn MarkdownRenderer>,
}

impl SiteBuilder {
    pub fn new(config: SiteConfig) -> Self {
        let renderer = CmarkRenderer::new()
            .hard_breaks(config.hard_breaks)
            .highlight_theme(Some(config.highlight_theme.clone()));

        Self {
            config,
            renderer: Box::new(renderer),
        }
    }

    /// Swap in a different markdown renderer.
    pub fn renderer<R: MarkdownRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run the whole pipeline. Errors returned here stopped the run; anything
    /// that only affected one file is in the report instead.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let config = &self.config;
        config.validate()?;

        let highlight = &config.highlight_theme;
        if !highlight.is_empty() && !markdown::known_theme(highlight) {
            tracing::warn!("Unknown highlight theme {highlight:?}, code blocks will not be highlighted");
        }

        let templates = match &config.theme_dir {
            Some(dir) => TemplateRenderer::with_theme(dir)?,
            None => TemplateRenderer::new()?,
        };

        let output = &config.output_dir;
        self.reset_output(output)?;

        let discovery = SiteScanner::new(config).scan()?;
        let mut report = BuildReport {
            failures: discovery.skipped,
            ..BuildReport::default()
        };

        let mut pages = Vec::with_capacity(discovery.documents.len());
        for doc in &discovery.documents {
            match Page::load(doc, self.renderer.as_ref(), config) {
                Ok(page) => pages.push(page),
                Err(err) => {
                    tracing::warn!("Skipping {}: {}", err.path().display(), err);
                    report.failures.push(Failure::new(err.path(), err.to_string()));
                }
            }
        }

        self.check_conflicts(&pages, &discovery.assets)?;

        self.write_stylesheet(output)?;

        let copier = AssetCopier::new(config.assets.required).skip(output);
        let copied = match config.assets.mode {
            AssetMode::Ignore => None,
            AssetMode::Directory => Some(copier.copy_dir(
                &config.input_dir.join(&config.assets.dir),
                &output.join(&config.assets.dir),
            )?),
            AssetMode::Mirror => Some(copier.copy_files(&config.input_dir, output, &discovery.assets)),
        };
        if let Some(copied) = copied {
            report.assets_copied = copied.copied;
            report.failures.extend(copied.failures);
        }

        let writer = PageWriter::new(&templates, output)
            .stylesheet(config.stylesheet.href())
            .site_title(config.title.clone());

        let nav = match config.navigation {
            NavMode::Flat => writer.nav_fragment(&Navigation::flat(&pages))?,
            NavMode::Grouped => String::new(),
        };

        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            match writer.write(&page, &nav) {
                Ok(_) => written.push(page),
                Err(err) => {
                    tracing::warn!("Failed to write page for {}: {}", page.source().display(), err);
                    report.failures.push(Failure::new(page.source(), err.to_string()));
                }
            }
        }
        report.pages_written = written.len();

        if config.navigation == NavMode::Grouped {
            let index = writer
                .write_index(&config.index_file, &Navigation::grouped(&written))
                .map_err(BuildError::Index)?;
            report.index = Some(index);
        }

        tracing::info!(
            "Built {} pages and copied {} assets into {} ({} skipped)",
            report.pages_written,
            report.assets_copied,
            output.display(),
            report.failures.len()
        );

        Ok(report)
    }

    fn reset_output(&self, output: &Path) -> Result<(), BuildError> {
        if self.config.clean && output.exists() {
            tracing::debug!("Removing {}", output.display());
            std::fs::remove_dir_all(output).map_err(|source| BuildError::Clean {
                path: output.to_path_buf(),
                source,
            })?;
        }

        std::fs::create_dir_all(output).map_err(|source| BuildError::CreateOutput {
            path: output.to_path_buf(),
            source,
        })
    }

    /// Every generated file must have its own destination. Runs before
    /// anything is written so a conflict leaves no half-built pages behind.
    fn check_conflicts(&self, pages: &[Page], assets: &[PathBuf]) -> Result<(), BuildError> {
        let config = &self.config;
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

        let mut claim = |dest: PathBuf, source: PathBuf| match claimed.get(&dest) {
            Some(first) => Err(BuildError::Conflict {
                dest,
                first: first.clone(),
                second: source,
            }),
            None => {
                claimed.insert(dest, source);
                Ok(())
            }
        };

        claim(
            clean_relative(&config.stylesheet.dest),
            PathBuf::from("<stylesheet>"),
        )?;
        if config.navigation == NavMode::Grouped {
            claim(PathBuf::from(&config.index_file), PathBuf::from("<index>"))?;
        }
        for page in pages {
            claim(page.out_path(), page.source().to_path_buf())?;
        }
        match config.assets.mode {
            AssetMode::Ignore => {}
            AssetMode::Directory => {
                let src = config.input_dir.join(&config.assets.dir);
                let dest = clean_relative(&config.assets.dir);
                // Unreadable entries are reported by the copier itself
                for entry in WalkDir::new(&src).sort_by_file_name().into_iter().flatten() {
                    if entry.file_type().is_dir() {
                        continue;
                    }
                    if let Ok(rel) = entry.path().strip_prefix(&src) {
                        claim(dest.join(rel), entry.path().to_path_buf())?;
                    }
                }
            }
            AssetMode::Mirror => {
                for asset in assets {
                    claim(asset.clone(), config.input_dir.join(asset))?;
                }
            }
        }

        Ok(())
    }

    fn write_stylesheet(&self, output: &Path) -> Result<(), BuildError> {
        let dest = output.join(&self.config.stylesheet.dest);
        let io_err = |source| BuildError::Stylesheet {
            path: dest.clone(),
            source,
        };

        match &self.config.stylesheet.source {
            Some(source) => {
                if !source.is_file() {
                    return Err(BuildError::MissingStylesheet(source.clone()));
                }
                assets::copy_file(source, &dest).map_err(io_err)?;
            }
            None => {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent).map_err(io_err)?;
                }
                std::fs::write(&dest, DEFAULT_STYLESHEET).map_err(io_err)?;
            }
        }

        Ok(())
    }
}

/// Build a site with the default markdown renderer.
pub fn build_site(config: &SiteConfig) -> Result<BuildReport, BuildError> {
    SiteBuilder::new(config.clone()).build()
}

fn clean_relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect()
}
