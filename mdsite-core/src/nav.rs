//! Cross-page navigation derived from the full set of pages.
//!
//! Two shapes are supported: a flat list of absolute links embedded in every
//! page, and a table of contents grouped by source directory, linked
//! relative to the output root.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use crate::page::Page;

/// Everything except RFC 3986 unreserved characters gets encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    /// Last component of the directory, `"."` for the root.
    pub heading: String,
    pub dir: String,
    pub items: Vec<NavItem>,
}

pub struct Navigation;

impl Navigation {
    /// One entry per page, in the order given.
    pub fn flat(pages: &[Page]) -> Vec<NavItem> {
        pages
            .iter()
            .map(|page| NavItem {
                text: page.title().to_string(),
                link: absolute_link(page),
            })
            .collect()
    }

    /// Pages partitioned by directory. Groups are sorted by directory with the
    /// root first; pages keep their order within a group.
    pub fn grouped(pages: &[Page]) -> Vec<NavGroup> {
        // Keyed on (is_subdir, dir) so the root sorts ahead of names like "-drafts"
        let mut by_dir: BTreeMap<(bool, &str), Vec<NavItem>> = BTreeMap::new();

        for page in pages {
            let key = (!page.is_root(), page.relative_dir());
            by_dir.entry(key).or_default().push(NavItem {
                text: page.title().to_string(),
                link: relative_link(page),
            });
        }

        by_dir
            .into_iter()
            .map(|((_, dir), items)| NavGroup {
                heading: dir.rsplit('/').next().unwrap_or(dir).to_string(),
                dir: dir.to_string(),
                items,
            })
            .collect()
    }
}

/// `/dir/file.html`, or `/file.html` at the root.
pub fn absolute_link(page: &Page) -> String {
    format!("/{}", encode_path(&page.url_path()))
}

/// `dir/file.html` relative to the output root.
pub fn relative_link(page: &Page) -> String {
    encode_path(&page.url_path())
}

/// Percent-encode each `/`-separated segment. The result contains no HTML
/// special characters, so templates may emit it unescaped.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
