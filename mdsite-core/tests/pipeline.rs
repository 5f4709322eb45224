use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mdsite_core::{AssetMode, BuildError, NavMode, SiteConfig, build_site};
use tempfile::TempDir;
use walkdir::WalkDir;

fn write(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// `a.md` at the root, `sub/b.md` below it and an image in the asset dir.
fn example_site() -> (TempDir, SiteConfig) {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    write(&docs, "a.md", b"# Alpha\n\nFirst page.\n");
    write(&docs, "sub/b.md", b"# Beta\n\n| x | y |\n|---|---|\n| 1 | 2 |\n");
    write(&docs, "img/sub/logo.png", &[0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
    let config = SiteConfig::with_dirs(&docs, tmp.path().join("site"));
    (tmp, config)
}

/// Relative path -> bytes for every file under `root`.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn hrefs(html: &str) -> Vec<String> {
    html.split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

#[test]
fn example_scenario_grouped() {
    let (_tmp, config) = example_site();
    let report = build_site(&config).unwrap();
    let out = &config.output_dir;

    assert_eq!(report.pages_written, 2);
    assert_eq!(report.assets_copied, 1);
    assert!(report.is_clean());

    assert!(out.join("a.html").is_file());
    assert!(out.join("sub/b.html").is_file());
    assert_eq!(
        fs::read(out.join("img/sub/logo.png")).unwrap(),
        fs::read(config.input_dir.join("img/sub/logo.png")).unwrap()
    );

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    let links: Vec<String> = hrefs(&index)
        .into_iter()
        .filter(|h| h.ends_with(".html"))
        .collect();
    assert_eq!(links, vec!["a.html", "sub/b.html"]);
    assert!(index.contains("<li>."));
    assert!(index.contains("<li>sub"));

    let beta = fs::read_to_string(out.join("sub/b.html")).unwrap();
    assert!(beta.contains("<title>b</title>"));
    assert!(beta.contains("<table>"));
}

#[test]
fn example_scenario_flat() {
    let (_tmp, mut config) = example_site();
    config.navigation = NavMode::Flat;
    let report = build_site(&config).unwrap();
    let out = &config.output_dir;

    assert!(report.index.is_none());
    assert!(!out.join("index.html").exists());

    for page in ["a.html", "sub/b.html"] {
        let html = fs::read_to_string(out.join(page)).unwrap();
        let nav: Vec<String> = hrefs(&html)
            .into_iter()
            .filter(|h| h.ends_with(".html"))
            .collect();
        assert_eq!(nav, vec!["/a.html", "/sub/b.html"], "nav in {page}");
    }
}

#[test]
fn every_document_has_exactly_one_page() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    let sources = [
        "index-notes.md",
        "guide/intro.md",
        "guide/setup/linux.md",
        "guide/setup/mac os.md",
        "reference/api.md",
    ];
    for rel in sources {
        write(&docs, rel, b"text");
    }
    write(&docs, "reference/data.json", b"{}");
    let config = SiteConfig::with_dirs(&docs, tmp.path().join("site"));

    build_site(&config).unwrap();

    let pages: Vec<PathBuf> = snapshot(&config.output_dir)
        .into_keys()
        .filter(|p| p.extension().is_some_and(|e| e == "html") && p != Path::new("index.html"))
        .collect();
    let mut expected: Vec<PathBuf> = sources
        .iter()
        .map(|s| PathBuf::from(s.replace(".md", ".html")))
        .collect();
    expected.sort();
    assert_eq!(pages, expected);
}

#[test]
fn navigation_links_resolve_to_written_pages() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    write(&docs, "Read Me.md", b"");
    write(&docs, "deep/er/x & y.md", b"");
    let mut config = SiteConfig::with_dirs(&docs, tmp.path().join("site"));
    config.navigation = NavMode::Flat;

    build_site(&config).unwrap();

    let html = fs::read_to_string(config.output_dir.join("Read Me.html")).unwrap();
    let links: Vec<String> = hrefs(&html)
        .into_iter()
        .filter(|h| h.ends_with(".html"))
        .collect();
    assert_eq!(links.len(), 2);
    for link in links {
        let decoded = link.trim_start_matches('/').replace("%20", " ").replace("%26", "&");
        assert!(
            config.output_dir.join(&decoded).is_file(),
            "{link} does not resolve"
        );
    }
}

#[test]
fn rebuilding_is_byte_identical() {
    let (_tmp, config) = example_site();

    build_site(&config).unwrap();
    let first = snapshot(&config.output_dir);
    build_site(&config).unwrap();
    let second = snapshot(&config.output_dir);

    assert_eq!(first, second);
}

#[test]
fn one_bad_document_does_not_stop_the_rest() {
    let (_tmp, config) = example_site();
    write(&config.input_dir, "broken.md", &[b'#', b' ', 0xff, 0xfe, 0xfd]);

    let report = build_site(&config).unwrap();

    assert_eq!(report.pages_written, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("broken.md"));
    assert!(report.failures[0].reason.contains("UTF-8"));
    assert!(config.output_dir.join("a.html").is_file());
    assert!(config.output_dir.join("sub/b.html").is_file());
    assert!(!config.output_dir.join("broken.html").exists());
}

#[test]
fn mirror_mode_copies_every_non_document() {
    let (_tmp, mut config) = example_site();
    config.assets.mode = AssetMode::Mirror;
    write(&config.input_dir, "sub/data.csv", b"a,b\n1,2\n");

    let report = build_site(&config).unwrap();

    assert_eq!(report.assets_copied, 2);
    let input = snapshot(&config.input_dir);
    let output = snapshot(&config.output_dir);
    for rel in ["img/sub/logo.png", "sub/data.csv"] {
        let rel = PathBuf::from(rel);
        assert_eq!(output.get(&rel), input.get(&rel), "{}", rel.display());
    }
}

#[test]
fn missing_input_root_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let config = SiteConfig::with_dirs(tmp.path().join("docs"), tmp.path().join("site"));

    let err = build_site(&config).unwrap_err();
    assert!(matches!(err, BuildError::Scan(_)));
    assert!(err.to_string().contains("docs"));
}
