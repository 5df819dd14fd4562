//! End-to-end render passes over temporary source trees.

use std::collections::BTreeMap;
use std::path::Path;

use microsite_core::{
    IndexEntry, MarkdownConfig, MarkdownEngine, MemorySink, PageIndex, PathScanner, RenderError,
    RenderEvent, RenderOrchestrator, RelativePath,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Every file under `root`, keyed by relative path.
fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    PathScanner::new(root)
        .scan()
        .unwrap()
        .iter()
        .map(|p| (p.to_string(), std::fs::read(p.to_path(root)).unwrap()))
        .collect()
}

fn markdown(config: MarkdownConfig) -> MarkdownEngine {
    MarkdownEngine::new(config, PageIndex::new()).unwrap()
}

fn sample_site() -> TempDir {
    let source = TempDir::new().unwrap();
    write(
        source.path(),
        "index.md",
        b"# Welcome\n\nSee the [guide](docs/guide.md) or [upstream](https://example.com/README.md).\n",
    );
    write(source.path(), "docs/guide.md", b"## Guide\n\nBack [home](../index.md).\n");
    write(source.path(), "docs/deep/notes.md", b"");
    write(source.path(), "img/logo.png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    write(source.path(), "robots.txt", b"User-agent: *\n");
    source
}

#[test]
fn scenario_index_and_logo() {
    let source = TempDir::new().unwrap();
    write(source.path(), "index.md", b"# Hello");
    write(source.path(), "img/logo.png", &[1, 2, 3, 255]);
    let out = TempDir::new().unwrap();
    let target = out.path().join("public");

    let report = RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig {
            rewrite_md_extensions: true,
            ..MarkdownConfig::default()
        }))
        .run(source.path(), &target)
        .unwrap();

    let files: Vec<String> = snapshot(&target).into_keys().collect();
    assert_eq!(files, vec!["img/logo.png", "index.html", "style.css"]);
    assert_eq!(
        std::fs::read(target.join("img/logo.png")).unwrap(),
        vec![1, 2, 3, 255]
    );
    assert_eq!(
        report.claimed_union().into_iter().collect::<Vec<_>>(),
        vec![RelativePath::parse("index.md").unwrap()]
    );
}

#[test]
fn claimed_and_copied_partition_the_source() {
    let source = sample_site();
    let out = TempDir::new().unwrap();

    let report = RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig::default()))
        .run(source.path(), out.path().join("site"))
        .unwrap();

    let tree = PathScanner::new(source.path()).scan().unwrap();
    let claimed = report.claimed_union();

    assert!(claimed.is_disjoint(&report.copied));
    let union: std::collections::BTreeSet<_> = claimed.union(&report.copied).cloned().collect();
    assert_eq!(&union, tree.as_set());
}

#[test]
fn rerunning_with_delete_is_byte_identical() {
    let source = sample_site();
    let out = TempDir::new().unwrap();
    let target = out.path().join("site");

    let orchestrator = RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig {
            rewrite_md_extensions: true,
            rewrite_md_urls: true,
            pretty_html: true,
            extensions: vec!["tables".into(), "codehilite".into()],
            ..MarkdownConfig::default()
        }))
        .delete_target_if_exists(true);

    orchestrator.run(source.path(), &target).unwrap();
    let first = snapshot(&target);
    orchestrator.run(source.path(), &target).unwrap();

    assert_eq!(snapshot(&target), first);
}

#[test]
fn deep_page_links_and_stylesheet() {
    let source = sample_site();
    write(source.path(), "a/b/c.md", b"[sibling](sibling.md)");
    let out = TempDir::new().unwrap();
    let target = out.path().join("site");

    RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig {
            rewrite_md_extensions: true,
            rewrite_md_urls: true,
            ..MarkdownConfig::default()
        }))
        .run(source.path(), &target)
        .unwrap();

    let page = std::fs::read_to_string(target.join("a/b/c.html")).unwrap();
    assert!(page.contains(r#"href="../../style.css""#));
    assert!(page.contains(r#"<a href="sibling.html">sibling</a>"#));

    let index = std::fs::read_to_string(target.join("index.html")).unwrap();
    assert!(index.contains(r#"<a href="docs/guide.html">guide</a>"#));
    assert!(index.contains(r#"<a href="https://example.com/README.md">upstream</a>"#));
}

#[test]
fn stylesheet_conflict_aborts_before_pages() {
    let source = sample_site();
    write(source.path(), "style.css", b"body {}");
    let out = TempDir::new().unwrap();
    let target = out.path().join("site");

    let err = RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig::default()))
        .run(source.path(), &target)
        .unwrap_err();

    assert!(matches!(err, RenderError::StylesheetConflict { ref name } if name == "style.css"));
    assert!(snapshot(&target).is_empty());
}

#[test]
fn alternate_stylesheet_name_resolves_conflict() {
    let source = sample_site();
    write(source.path(), "style.css", b"body {}");
    let out = TempDir::new().unwrap();
    let target = out.path().join("site");

    RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig {
            stylesheet_target_name: "microsite.css".into(),
            ..MarkdownConfig::default()
        }))
        .run(source.path(), &target)
        .unwrap();

    assert_eq!(std::fs::read(target.join("style.css")).unwrap(), b"body {}");
    assert!(target.join("microsite.css").exists());
    let guide = std::fs::read_to_string(target.join("docs/guide.md")).unwrap();
    assert!(guide.contains(r#"href="../microsite.css""#));
}

#[test]
fn existing_target_fails_before_scanning() {
    let source = sample_site();
    let target = TempDir::new().unwrap();
    let sink = MemorySink::new();

    let err = RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig::default()))
        .events(sink.clone())
        .run(source.path(), target.path())
        .unwrap_err();

    assert!(matches!(err, RenderError::TargetExists { .. }));
    assert!(sink.events().is_empty());
}

#[test]
fn index_titles_and_tags_reach_the_template() {
    let source = sample_site();
    let template_dir = TempDir::new().unwrap();
    let template = template_dir.path().join("page.html");
    std::fs::write(
        &template,
        "<title>{{ title }}</title><ul>{% for tag in tags %}<li>{{ tag }}</li>{% endfor %}</ul>{{ html | safe }}",
    )
    .unwrap();

    let mut index = PageIndex::new();
    index
        .insert(
            "docs/guide.md",
            IndexEntry {
                title: Some("The Guide".into()),
                tags: vec!["docs".into(), "intro".into()],
            },
        )
        .unwrap();

    let engine = MarkdownEngine::new(
        MarkdownConfig {
            html_template: Some(template),
            title: Some("My Site".into()),
            ..MarkdownConfig::default()
        },
        index,
    )
    .unwrap();

    let out = TempDir::new().unwrap();
    let target = out.path().join("site");
    RenderOrchestrator::new()
        .engine(engine)
        .run(source.path(), &target)
        .unwrap();

    let guide = std::fs::read_to_string(target.join("docs/guide.md")).unwrap();
    assert!(guide.starts_with("<title>The Guide</title><ul><li>docs</li><li>intro</li></ul>"));
    let home = std::fs::read_to_string(target.join("index.md")).unwrap();
    assert!(home.starts_with("<title>My Site</title><ul></ul>"));
}

#[test]
fn events_describe_the_pass() {
    let source = sample_site();
    let out = TempDir::new().unwrap();
    let sink = MemorySink::new();

    RenderOrchestrator::new()
        .engine(markdown(MarkdownConfig::default()).with_events(sink.clone()))
        .events(sink.clone())
        .run(source.path(), out.path().join("site"))
        .unwrap();

    let events = sink.events();
    assert!(matches!(events[0], RenderEvent::TargetCreated { .. }));
    assert!(events.contains(&RenderEvent::SourceScanned {
        root: source.path().to_path_buf(),
        files: 5,
    }));
    assert!(events.contains(&RenderEvent::StylesheetInstalled {
        name: "style.css".into()
    }));
    assert!(events.contains(&RenderEvent::AssetCopied {
        path: "img/logo.png".into()
    }));
    assert!(events.contains(&RenderEvent::EngineFinished {
        engine: "markdown".into(),
        claimed: 3,
    }));
    let rendered = events
        .iter()
        .filter(|e| matches!(e, RenderEvent::PageRendered { .. }))
        .count();
    assert_eq!(rendered, 3);
}
