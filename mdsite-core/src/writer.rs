use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::nav::{NavGroup, NavItem};
use crate::page::Page;
use crate::template::{INDEX_TEMPLATE, NAV_TEMPLATE, PAGE_TEMPLATE, TemplateError, TemplateRenderer};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Cannot render {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
    #[error("Cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    content: &'a str,
    nav: &'a str,
    stylesheet: &'a str,
    site_title: &'a str,
}

#[derive(Serialize)]
struct IndexContext<'a> {
    title: &'a str,
    groups: &'a [NavGroup],
    stylesheet: &'a str,
}

#[derive(Serialize)]
struct NavContext<'a> {
    items: &'a [NavItem],
}

/// Renders pages and the index into the output tree.
pub struct PageWriter<'a> {
    templates: &'a TemplateRenderer,
    output_root: &'a Path,
    stylesheet: String,
    site_title: String,
}

impl<'a> PageWriter<'a> {
    pub fn new(templates: &'a TemplateRenderer, output_root: &'a Path) -> Self {
        Self {
            templates,
            output_root,
            stylesheet: "/css/main.css".to_string(),
            site_title: String::new(),
        }
    }

    pub fn stylesheet<S: Into<String>>(mut self, href: S) -> Self {
        self.stylesheet = href.into();
        self
    }

    pub fn site_title<S: Into<String>>(mut self, title: S) -> Self {
        self.site_title = title.into();
        self
    }

    /// The flat navigation markup shared by every page.
    pub fn nav_fragment(&self, items: &[NavItem]) -> Result<String, TemplateError> {
        self.templates.render(NAV_TEMPLATE, &NavContext { items })
    }

    /// Write one page, replacing whatever is at its destination. `nav` may be empty.
    pub fn write(&self, page: &Page, nav: &str) -> Result<PathBuf, WriteError> {
        let output_path = self.output_root.join(page.out_path());

        let html = self
            .templates
            .render(
                PAGE_TEMPLATE,
                &PageContext {
                    title: page.title(),
                    content: page.content(),
                    nav,
                    stylesheet: &self.stylesheet,
                    site_title: &self.site_title,
                },
            )
            .map_err(|source| WriteError::Template {
                path: output_path.clone(),
                source,
            })?;

        write_file(&output_path, &html)?;
        tracing::debug!("Wrote {}", output_path.display());

        Ok(output_path)
    }

    /// Write the grouped table of contents at `output_root/file_name`.
    pub fn write_index(&self, file_name: &str, groups: &[NavGroup]) -> Result<PathBuf, WriteError> {
        let output_path = self.output_root.join(file_name);

        let html = self
            .templates
            .render(
                INDEX_TEMPLATE,
                &IndexContext {
                    title: &self.site_title,
                    groups,
                    stylesheet: &self.stylesheet,
                },
            )
            .map_err(|source| WriteError::Template {
                path: output_path.clone(),
                source,
            })?;

        write_file(&output_path, &html)?;
        Ok(output_path)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, contents).map_err(io_err)
}
