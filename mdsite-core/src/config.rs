use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Shape of the cross-page navigation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NavMode {
    /// One link list embedded at the top of every page.
    Flat,
    /// A standalone table of contents grouped by source directory.
    #[default]
    Grouped,
}

/// What happens to files that are not documents.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
    Ignore,
    #[default]
    Directory,
    Mirror,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub mode: AssetMode,
    /// Asset directory relative to the input root, used in `directory` mode.
    pub dir: PathBuf,
    /// Fail the run when the asset directory is missing.
    pub required: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            mode: AssetMode::Directory,
            dir: PathBuf::from("img"),
            required: false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StylesheetConfig {
    /// Stylesheet to copy. The built-in one is written when unset.
    pub source: Option<PathBuf>,
    /// Location inside the output directory, also used as the absolute link.
    pub dest: PathBuf,
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            source: None,
            dest: PathBuf::from("css/main.css"),
        }
    }
}

impl StylesheetConfig {
    /// Absolute href every page uses to reference the stylesheet.
    pub fn href(&self) -> String {
        let parts: Vec<String> = self
            .dest
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", crate::nav::encode_path(&parts.join("/")))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub document_extension: String,
    pub output_extension: String,
    pub navigation: NavMode,
    pub index_file: String,
    pub title: String,
    /// Delete the output directory before building.
    pub clean: bool,
    pub hard_breaks: bool,
    /// Syntect theme for fenced code. Empty disables highlighting.
    pub highlight_theme: String,
    /// Directory with `page.html`, `index.html` or `nav.html` overrides.
    pub theme_dir: Option<PathBuf>,
    pub assets: AssetConfig,
    pub stylesheet: StylesheetConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("site"),
            document_extension: ".md".to_string(),
            output_extension: ".html".to_string(),
            navigation: NavMode::Grouped,
            index_file: "index.html".to_string(),
            title: "Table of Contents".to_string(),
            clean: true,
            hard_breaks: true,
            highlight_theme: "base16-ocean.dark".to_string(),
            theme_dir: None,
            assets: AssetConfig::default(),
            stylesheet: StylesheetConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Config rooted at the given input and output directories, everything else default.
    pub fn with_dirs<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Self {
        Self {
            input_dir: input.as_ref().to_path_buf(),
            output_dir: output.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_extension("document_extension", &self.document_extension)?;
        check_extension("output_extension", &self.output_extension)?;

        if self.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("input_dir", "must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("output_dir", "must not be empty"));
        }

        let input = normalize(&self.input_dir);
        let output = normalize(&self.output_dir);
        if input == output {
            return Err(ConfigError::invalid(
                "output_dir",
                "must differ from input_dir",
            ));
        }
        if input.starts_with(&output) {
            return Err(ConfigError::invalid(
                "output_dir",
                format!(
                    "{} contains the input directory and would be deleted on clean",
                    self.output_dir.display()
                ),
            ));
        }

        if self.assets.mode == AssetMode::Directory {
            check_relative("assets.dir", &self.assets.dir)?;
            if output.starts_with(normalize(&self.input_dir.join(&self.assets.dir))) {
                return Err(ConfigError::invalid(
                    "output_dir",
                    format!(
                        "{} is inside the asset directory and would be copied into itself",
                        self.output_dir.display()
                    ),
                ));
            }
        }
        check_relative("stylesheet.dest", &self.stylesheet.dest)?;

        if self.index_file.is_empty()
            || self.index_file.contains('/')
            || self.index_file.contains('\\')
            || self.index_file == "."
            || self.index_file == ".."
        {
            return Err(ConfigError::invalid(
                "index_file",
                "must be a plain file name",
            ));
        }

        Ok(())
    }

    /// Output directory relative to the input directory, when it lives inside it.
    pub fn output_inside_input(&self) -> Option<PathBuf> {
        let input = normalize(&self.input_dir);
        let output = normalize(&self.output_dir);
        output
            .strip_prefix(&input)
            .ok()
            .map(|rel| rel.to_path_buf())
    }
}

fn check_extension(field: &'static str, ext: &str) -> Result<(), ConfigError> {
    if !ext.starts_with('.') || ext.len() < 2 {
        return Err(ConfigError::invalid(
            field,
            format!("{ext:?} must start with '.' followed by at least one character"),
        ));
    }
    if ext.contains('/') || ext.contains('\\') {
        return Err(ConfigError::invalid(
            field,
            format!("{ext:?} must not contain path separators"),
        ));
    }
    Ok(())
}

fn check_relative(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if path.to_str().is_none() {
        return Err(ConfigError::invalid(
            field,
            format!("{} is not valid UTF-8", path.display()),
        ));
    }
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::invalid(
            field,
            format!("{} must be relative and stay inside its root", path.display()),
        ));
    }
    Ok(())
}

/// Lexical normalization: absolute against the current directory, `.` and
/// `..` folded. Does not touch the filesystem so it works for paths that do
/// not exist yet.
fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
