use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("{0}")]
    Other(String),
}

/// Whether syntect ships a theme with this name.
pub fn known_theme(name: &str) -> bool {
    THEME_SET.themes.contains_key(name)
}

/// Turns one document's raw bytes into an HTML fragment.
pub trait MarkdownRenderer {
    fn render(&self, raw: &[u8]) -> Result<String, RenderError>;
}

/// CommonMark plus the GFM pieces people expect from a docs folder:
/// tables, strikethrough, task lists and footnotes.
#[derive(Debug, Clone)]
pub struct CmarkRenderer {
    hard_breaks: bool,
    highlight_theme: Option<String>,
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            highlight_theme: Some("base16-ocean.dark".to_string()),
        }
    }
}

impl CmarkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render single newlines inside a paragraph as `<br />`.
    pub fn hard_breaks(mut self, enabled: bool) -> Self {
        self.hard_breaks = enabled;
        self
    }

    /// Syntect theme for fenced code blocks. `None` or an empty name leaves
    /// code blocks unhighlighted.
    pub fn highlight_theme<S: Into<String>>(mut self, theme: Option<S>) -> Self {
        self.highlight_theme = theme.map(Into::into).filter(|t| !t.is_empty());
        self
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options
    }

    fn highlight(&self, lang: &str, code: &str) -> String {
        // Info strings like "rust,ignore" or "toml title=x" only name the language first
        let token = lang
            .split(|c: char| c == ',' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        // Same markup pulldown-cmark emits for a fenced block
        let fallback = || {
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                html_escape::encode_double_quoted_attribute(token),
                html_escape::encode_text(code)
            )
        };

        let Some(theme) = self
            .highlight_theme
            .as_deref()
            .and_then(|name| THEME_SET.themes.get(name))
        else {
            return fallback();
        };

        let syntax = SYNTAX_SET.find_syntax_by_token(token).or_else(|| {
            // Fallback mappings for unsupported languages
            match token {
                "nix" => SYNTAX_SET.find_syntax_by_name("JavaScript"),
                "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
                _ => None,
            }
        });

        match syntax {
            Some(syntax) => highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| fallback()),
            None => fallback(),
        }
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, raw: &[u8]) -> Result<String, RenderError> {
        let content = std::str::from_utf8(raw)?;
        let parser = Parser::new_ext(content, Self::options());

        let events: Vec<Event> = parser.collect();
        let mut processed_events = Vec::with_capacity(events.len());
        let mut i = 0;

        while i < events.len() {
            match &events[i] {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang)))
                    if self.highlight_theme.is_some() && !lang.is_empty() =>
                {
                    // Collect all text events until the end of the code block
                    let mut code_content = String::new();
                    i += 1;

                    while i < events.len() {
                        match &events[i] {
                            Event::End(TagEnd::CodeBlock) => break,
                            Event::Text(text) => code_content.push_str(text),
                            _ => {}
                        }
                        i += 1;
                    }

                    let highlighted = self.highlight(lang, &code_content);
                    processed_events.push(Event::Html(highlighted.into()));
                }
                Event::SoftBreak if self.hard_breaks => {
                    processed_events.push(Event::HardBreak);
                }
                event => processed_events.push(event.clone()),
            }
            i += 1;
        }

        let mut out = String::new();
        html::push_html(&mut out, processed_events.into_iter());

        Ok(out)
    }
}
