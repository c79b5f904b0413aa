//! Tests for completing class names against a package on disk.

use std::fs;
use std::path::{Path, PathBuf};

use classwright::config::CompletionConfig;
use classwright::prelude::*;
use tempfile::TempDir;

const CARD: &str = r#"
// Cards group related content.
@mixin vf-p-card {
  // A card.
  .p-card {
    // Full-bleed image at the top of a card.
    .p-card__image { }
    &--highlighted { }
    > .p-card__content { }
    &:hover { }
  }
}
"#;

const SETTINGS: &str = r#"
// Brand colour
$color-brand: #e95420 !default;
$sp-unit: 0.5rem !default;
"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn package(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    dir
}

fn vanilla() -> TempDir {
    package(&[
        ("_vanilla.scss", "@import 'settings', 'patterns/card';"),
        ("_settings.scss", SETTINGS),
        ("patterns/_card.scss", CARD),
    ])
}

fn entry(dir: &TempDir) -> PathBuf {
    dir.path().join("_vanilla.scss")
}

fn loaded(dir: &TempDir, config: Config) -> CompletionService {
    let service = CompletionService::new(config);
    service.load_entry(entry(dir)).unwrap();
    service
}

/// A request with the cursor at the end of `text`.
fn at_end(language: DocumentLanguage, text: &str) -> CompletionRequest {
    let line = text.lines().count().saturating_sub(1);
    let character = text.lines().last().unwrap_or("").encode_utf16().count();
    CompletionRequest {
        uri: "file:///project/index.html".to_string(),
        language,
        text: text.to_string(),
        position: Position::new(line as u32, character as u32),
    }
}

fn labels(candidates: &[CompletionCandidate], tier: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.sort_text.starts_with(tier))
        .map(|c| c.label.clone())
        .collect()
}

#[test]
fn test_bem_continuations_rank_first() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    let request = at_end(DocumentLanguage::Markup, r#"<div class="p-card"><img class="p-card__"#);
    let candidates = service.complete(&request);

    let high = labels(&candidates, "0_");
    assert!(high.contains(&"p-card__image".to_string()));
    assert!(high.contains(&"p-card__content".to_string()));
    assert!(high.contains(&"p-card--highlighted".to_string()));
    assert_eq!(labels(&candidates, "2_"), vec!["p-card"]);

    // Every name shows up once, in the best tier it qualifies for.
    let mut names: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);

    // Sort texts follow the presentation order.
    let sort_texts: Vec<&str> = candidates.iter().map(|c| c.sort_text.as_str()).collect();
    let mut sorted = sort_texts.clone();
    sorted.sort_unstable();
    assert_eq!(sort_texts, sorted);

    assert!(candidates.iter().all(|c| !c.label.contains(':')));
    assert!(candidates.iter().all(|c| c.kind == CandidateKind::Class));
}

#[test]
fn test_ancestor_classes_rank_nested_trees() {
    let dir = package(&[(
        "_vanilla.scss",
        "@mixin vf-p-list { .list { > .item { .deep { } } .other { } } }",
    )]);
    let service = loaded(&dir, Config::default());

    // The list class sits on the grandparent; the parent's class matches nothing.
    let request = at_end(DocumentLanguage::Markup, r#"<ul class="list"><li class="x"><a class=""#);
    let candidates = service.complete(&request);

    assert_eq!(labels(&candidates, "0_"), vec!["item"]);
    assert_eq!(labels(&candidates, "1_"), vec!["deep", "other"]);
    assert_eq!(labels(&candidates, "2_"), vec!["list"]);
    let sort_texts: Vec<&str> = candidates.iter().map(|c| c.sort_text.as_str()).collect();
    assert_eq!(sort_texts, vec!["0_00000", "1_00001", "1_00002", "2_00003"]);
}

#[test]
fn test_descendant_selectors_are_not_candidates() {
    let dir = package(&[("_vanilla.scss", "@mixin vf-p-list { .list { > .item .link { } } }")]);
    let service = loaded(&dir, Config::default());

    let request = at_end(DocumentLanguage::Markup, r#"<ul class="list"><li class=""#);
    let candidates = service.complete(&request);

    let names: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(names, vec!["list"]);
}

#[test]
fn test_class_documentation() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    let request = at_end(DocumentLanguage::Markup, r#"<div class="p-card"><img class=""#);
    let candidates = service.complete(&request);
    let image = candidates.iter().find(|c| c.label == "p-card__image").unwrap();
    let docs = image.documentation.as_deref().unwrap();

    assert!(docs.contains("Full-bleed image at the top of a card."));
    assert!(docs.contains("`.p-card .p-card__image`"));
    assert!(docs.contains("https://vanillaframework.io/docs/patterns/card"));
}

#[test]
fn test_nested_element_in_closed_markup() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    let text = r#"<section><div class="p-card"><span class="p-card__"></span></div></section>"#;
    let cursor = text.find("p-card__\"").unwrap() + "p-card__".len();
    let request = CompletionRequest {
        uri: "file:///project/index.html".to_string(),
        language: DocumentLanguage::Markup,
        text: text.to_string(),
        position: Position::new(0, cursor as u32),
    };

    let high = labels(&service.complete(&request), "0_");
    assert!(high.contains(&"p-card__image".to_string()));
}

#[test]
fn test_outside_class_attribute_is_empty() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    for text in [r#"<div class="p-card"><img src=""#, r#"<div class="p-card">text "#, "plain text"] {
        assert!(service.complete(&at_end(DocumentLanguage::Markup, text)).is_empty(), "{text}");
    }

    let past_the_end = CompletionRequest {
        position: Position::new(5, 0),
        ..at_end(DocumentLanguage::Markup, r#"<div class=""#)
    };
    assert!(service.complete(&past_the_end).is_empty());
}

#[test]
fn test_component_script_class_name() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    let request = at_end(
        DocumentLanguage::ComponentScript,
        r#"const Card = () => <div className="p-card"><img className="p-card__"#,
    );
    let high = labels(&service.complete(&request), "0_");
    assert!(high.contains(&"p-card__image".to_string()));

    // No element to rank against: only the top-level classes.
    let request = at_end(DocumentLanguage::ComponentScript, r#"className="p-"#);
    let candidates = service.complete(&request);
    assert_eq!(labels(&candidates, "2_"), vec!["p-card", "p-card--highlighted"]);
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_root_items_can_be_disabled() {
    let dir = vanilla();
    let config = Config::default().completion(CompletionConfig::default().root_items(false));
    let service = loaded(&dir, config);

    let candidates = service.complete(&at_end(DocumentLanguage::Markup, r#"<main><p class=""#));
    assert!(candidates.is_empty());
}

#[test]
fn test_stylesheet_variables() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    let candidates = service.complete(&at_end(DocumentLanguage::Stylesheet, ".p-card { color: $"));
    let brand = candidates.iter().find(|c| c.label == "$color-brand").unwrap();
    assert_eq!(brand.kind, CandidateKind::Color);
    assert_eq!(brand.detail.as_deref(), Some("#e95420"));
    assert_eq!(
        brand.documentation.as_deref(),
        Some("Brand colour\n\n`$color-brand` variable with default value of `#e95420`")
    );

    let unit = candidates.iter().find(|c| c.label == "$sp-unit").unwrap();
    assert_eq!(unit.kind, CandidateKind::Variable);
}

#[test]
fn test_not_loaded_gives_no_candidates() {
    let service = CompletionService::new(Config::default());
    let request = at_end(DocumentLanguage::Markup, r#"<div class=""#);

    assert!(service.complete(&request).is_empty());
    assert!(service.snapshot().is_none());
    assert!(matches!(service.reload(), Err(Error::NotLoaded)));
}

#[test]
fn test_failed_reload_keeps_previous_model() {
    init_logging();
    let dir = vanilla();
    let service = loaded(&dir, Config::default());
    let before = service.snapshot().unwrap();

    fs::write(dir.path().join("patterns/_card.scss"), "@mixin vf-p-card { .p-card { ").unwrap();
    let err = service.reload().unwrap_err();
    assert!(matches!(err, Error::Style(classwright_style::Error::Parse { .. })));

    let after = service.snapshot().unwrap();
    assert!(std::sync::Arc::ptr_eq(&before, &after));
    let request = at_end(DocumentLanguage::Markup, r#"<div class="p-card"><img class="p-card__"#);
    assert!(!service.complete(&request).is_empty());
}

#[test]
fn test_overlapping_loads_publish_matching_entry() {
    let first = vanilla();
    let second = package(&[("_vanilla.scss", "@mixin vf-p-list { .list { } }")]);
    let service = CompletionService::new(Config::default());

    std::thread::scope(|scope| {
        for dir in [&first, &second] {
            let service = &service;
            scope.spawn(move || {
                for _ in 0..20 {
                    service.load_entry(entry(dir)).unwrap();
                }
            });
        }
    });

    let (entry, model) = service.current().unwrap();
    assert_eq!(model.root().filename, entry.canonicalize().unwrap());
    assert_eq!(service.entry().unwrap(), entry);
    assert!(std::sync::Arc::ptr_eq(&service.snapshot().unwrap(), &model));
}

#[test]
fn test_reload_picks_up_edits() {
    let dir = vanilla();
    let service = loaded(&dir, Config::default());

    fs::write(
        dir.path().join("patterns/_card.scss"),
        "@mixin vf-p-card { .p-card { .p-card__footer { } } }",
    )
    .unwrap();
    service.reload().unwrap();

    let request = at_end(DocumentLanguage::Markup, r#"<div class="p-card"><img class="p-card__"#);
    let high = labels(&service.complete(&request), "0_");
    assert!(high.contains(&"p-card__footer".to_string()));
    assert!(!high.contains(&"p-card__image".to_string()));
}

fn install(project: &Path) {
    let scss = project.join("node_modules/vanilla-framework/scss");
    fs::create_dir_all(scss.join("patterns")).unwrap();
    fs::write(scss.join("_vanilla.scss"), "@import 'patterns/card';").unwrap();
    fs::write(scss.join("patterns/_card.scss"), CARD).unwrap();
}

#[test]
fn test_load_from_workspace() {
    let dir = tempfile::tempdir().unwrap();
    install(dir.path());
    let workspace = dir.path().join("src/components");

    let service = CompletionService::new(Config::default());
    let model = service.load(Some(&workspace)).unwrap();

    assert!(model.find_class_tree("p-card").is_some());
    assert!(service.entry().unwrap().ends_with("scss/_vanilla.scss"));
}

#[test]
fn test_load_from_fallback_root() {
    init_logging();
    let installed = tempfile::tempdir().unwrap();
    install(installed.path());
    let workspace = tempfile::tempdir().unwrap();

    let service = CompletionService::new(Config::default());
    assert!(matches!(
        service.load(Some(workspace.path())),
        Err(Error::Style(classwright_style::Error::PackageNotFound { .. }))
    ));
    assert!(!service.is_loaded());

    let config = Config::default().package(PackageConfig::default().fallback_root(installed.path()));
    let service = CompletionService::new(config);
    service.load(Some(workspace.path())).unwrap();
    assert!(service.is_loaded());
}

#[test]
fn test_config_file_drives_loading() {
    let dir = package(&[
        ("styles/main.scss", "@import 'card';"),
        ("styles/_card.scss", CARD),
        (
            "classwright.toml",
            r#"
            [package]
            name = "acme-ui"
            stylesheet_dir = "styles"
            entry_file = "main.scss"

            [completion]
            root_items = false
            "#,
        ),
    ]);
    let config = Config::from_file(dir.path().join("classwright.toml")).unwrap();
    let service = CompletionService::new(config);

    service.load_entry(dir.path().join("styles/main.scss")).unwrap();
    let candidates = service.complete(&at_end(DocumentLanguage::Markup, r#"<p class=""#));
    assert!(candidates.is_empty());
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn test_background_load() {
    let dir = tempfile::tempdir().unwrap();
    install(dir.path());

    let service = std::sync::Arc::new(CompletionService::new(Config::default()));
    let model = service.load_async(Some(dir.path().to_path_buf())).await.unwrap();

    assert!(model.find_class_tree("p-card").is_some());
    assert!(service.is_loaded());
}

#[cfg(feature = "hot-reload")]
#[test]
fn test_apply_changes_reloads() {
    use classwright_style::hot_reload::{ChangeKind, StylesheetChangeEvent};

    let dir = vanilla();
    let service = loaded(&dir, Config::default());
    let before = service.snapshot().unwrap();

    assert!(!service.apply_changes(&[]).unwrap());

    let card = dir.path().join("patterns/_card.scss");
    fs::write(&card, "@mixin vf-p-card { .p-card { .p-card__footer { } } }").unwrap();
    let changes = [StylesheetChangeEvent {
        path: card,
        kind: ChangeKind::Modified,
    }];
    assert!(service.apply_changes(&changes).unwrap());
    assert!(!std::sync::Arc::ptr_eq(&before, &service.snapshot().unwrap()));

    let watcher = service.watcher().unwrap();
    assert_eq!(watcher.watched_count(), 1);
}
