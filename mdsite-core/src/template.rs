use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

pub const PAGE_TEMPLATE: &str = "page.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const NAV_TEMPLATE: &str = "nav.html";

/// Stylesheet written when no custom one is configured.
pub const DEFAULT_STYLESHEET: &str = include_str!("../templates/main.css");

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
    (PAGE_TEMPLATE, include_str!("../templates/page.html")),
    (INDEX_TEMPLATE, include_str!("../templates/index.html")),
    (NAV_TEMPLATE, include_str!("../templates/nav.html")),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    TeraError(#[from] tera::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Holds the three site templates. Names end in `.html`, so tera escapes
/// every substituted value unless the template pipes it through `safe`.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Built-in templates only.
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES)?;

        Ok(Self { tera })
    }

    /// Built-in templates, with any of `page.html`, `index.html` or
    /// `nav.html` found in `theme_dir` taking their place.
    pub fn with_theme(theme_dir: &Path) -> Result<Self, TemplateError> {
        let mut renderer = Self::new()?;

        for (name, _) in BUILTIN_TEMPLATES {
            let path = theme_dir.join(name);
            if path.is_file() {
                let source = std::fs::read_to_string(&path)?;
                renderer.tera.add_raw_template(name, &source)?;
                tracing::debug!("Using theme template {}", path.display());
            }
        }

        Ok(renderer)
    }

    /// Render a template with a context built from one serializable value.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, TemplateError> {
        let context = Context::from_serialize(data)?;
        self.render_with_context(template, &context)
    }

    pub fn render_with_context(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(template, context)?)
    }
}
