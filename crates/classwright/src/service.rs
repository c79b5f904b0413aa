//! The completion service.
//!
//! [`CompletionService`] owns the loaded [`StyleModel`] and answers
//! completion requests against it. The model is published as a single
//! `Arc`: a request clones it and works on that snapshot, so a reload in
//! progress never blocks requests and never exposes a half-built model.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use classwright_style::StyleModel;
use classwright_style::loader::LoaderOptions;
use parking_lot::RwLock;

use crate::config::Config;
use crate::docs::component_docs_link;
use crate::error::{Error, Result};
use crate::locator::{Position, class_attribute_open, is_inside_class_attribute, locate_element, offset_at};
use crate::logging::targets;
use crate::markup::MarkupDocument;
use crate::package::locate_package;
use crate::ranking::{RankedClass, filter_results, rank, root_items};

/// Kind of document a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentLanguage {
    /// HTML and HTML-like templates.
    Markup,
    /// Preprocessed stylesheets; completes variables.
    Stylesheet,
    /// Scripts that embed markup, such as JSX.
    ComponentScript,
}

impl DocumentLanguage {
    /// Map an editor language identifier.
    pub fn from_language_id(id: &str) -> Option<Self> {
        match id {
            "html" | "vue" | "svelte" | "astro" | "django-html" | "erb" | "php" => Some(Self::Markup),
            "scss" => Some(Self::Stylesheet),
            "javascriptreact" | "typescriptreact" => Some(Self::ComponentScript),
            _ => None,
        }
    }
}

/// One completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub uri: String,
    pub language: DocumentLanguage,
    /// Full document text.
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    Class,
    Variable,
    Color,
}

/// A completion candidate, ready for the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub kind: CandidateKind,
    /// Sorts candidates in ranked order: `<tier>_<index>`.
    pub sort_text: String,
    /// Short detail line, such as a variable's value.
    pub detail: Option<String>,
    /// Markdown documentation.
    pub documentation: Option<String>,
}

/// Tiers of class candidates, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    HighScore = 0,
    Normal = 1,
    Root = 2,
}

/// Answers completion requests against a loaded stylesheet package.
///
/// # Example
///
/// ```ignore
/// let service = CompletionService::new(Config::default());
/// service.load(Some(Path::new("/home/me/project")))?;
///
/// let candidates = service.complete(&CompletionRequest {
///     uri: "file:///home/me/project/index.html".into(),
///     language: DocumentLanguage::Markup,
///     text: r#"<div class="p-card"><img class="p-card__"#.into(),
///     position: Position::new(0, 42),
/// });
/// ```
#[derive(Debug)]
pub struct CompletionService {
    config: Config,
    /// Entry stylesheet and the model built from it, swapped as one.
    loaded: RwLock<Option<(PathBuf, Arc<StyleModel>)>>,
}

impl CompletionService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            loaded: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn loader_options(&self) -> LoaderOptions {
        LoaderOptions::default().extension(self.config.package.extension.clone())
    }

    /// Find the package from `workspace` (or the configured fallbacks) and
    /// load it.
    pub fn load(&self, workspace: Option<&Path>) -> Result<Arc<StyleModel>> {
        let entry = locate_package(workspace, &self.config.package).ok_or_else(|| {
            classwright_style::Error::PackageNotFound {
                start: workspace.map(Path::to_path_buf).unwrap_or_default(),
            }
        })?;
        self.load_entry(entry)
    }

    /// Load the package whose entry stylesheet is `entry`.
    ///
    /// On failure the previously loaded model, if any, stays in use.
    pub fn load_entry(&self, entry: impl AsRef<Path>) -> Result<Arc<StyleModel>> {
        let entry = entry.as_ref();
        match StyleModel::load(entry, &self.loader_options()) {
            Ok(model) => {
                let model = Arc::new(model);
                *self.loaded.write() = Some((entry.to_path_buf(), Arc::clone(&model)));
                tracing::info!(
                    target: targets::SERVICE,
                    entry = %entry.display(),
                    warnings = model.warnings().len(),
                    "Stylesheet package loaded"
                );
                Ok(model)
            }
            Err(e) => {
                tracing::error!(
                    target: targets::SERVICE,
                    entry = %entry.display(),
                    error = %e,
                    kept_previous = self.is_loaded(),
                    "Failed to load stylesheet package"
                );
                Err(e.into())
            }
        }
    }

    /// Load the last loaded entry again.
    pub fn reload(&self) -> Result<Arc<StyleModel>> {
        let entry = self.entry().ok_or(Error::NotLoaded)?;
        self.load_entry(entry)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.read().is_some()
    }

    /// The current model.
    pub fn snapshot(&self) -> Option<Arc<StyleModel>> {
        self.loaded.read().as_ref().map(|(_, model)| Arc::clone(model))
    }

    /// The current entry stylesheet and the model built from it, read
    /// together.
    pub fn current(&self) -> Option<(PathBuf, Arc<StyleModel>)> {
        self.loaded.read().clone()
    }

    /// Entry stylesheet of the current model.
    pub fn entry(&self) -> Option<PathBuf> {
        self.loaded.read().as_ref().map(|(entry, _)| entry.clone())
    }

    /// Candidates for the cursor in `request`.
    ///
    /// Empty when nothing is loaded, when the cursor is outside an open
    /// class attribute, or when the position is past the end of the text.
    pub fn complete(&self, request: &CompletionRequest) -> Vec<CompletionCandidate> {
        let Some(model) = self.snapshot() else {
            tracing::debug!(target: targets::SERVICE, uri = %request.uri, "Completion requested before load");
            return vec![];
        };

        match request.language {
            DocumentLanguage::Stylesheet => variable_candidates(&model),
            DocumentLanguage::Markup | DocumentLanguage::ComponentScript => {
                self.class_candidates(&model, request)
            }
        }
    }

    fn class_candidates(&self, model: &StyleModel, request: &CompletionRequest) -> Vec<CompletionCandidate> {
        let Some(offset) = offset_at(&request.text, request.position) else {
            return vec![];
        };
        let lookback = self.config.completion.lookback;
        let document = MarkupDocument::parse(&request.text);

        match locate_element(&document, offset) {
            Some(element) => {
                if !is_inside_class_attribute(&document, element, &request.text, offset, lookback) {
                    return vec![];
                }
                let ranking = rank(&document, element, model);
                self.assemble(model, ranking.high_score_items, ranking.normal_items)
            }
            None if request.language == DocumentLanguage::ComponentScript
                && class_attribute_open(&request.text, offset, 0, lookback) =>
            {
                self.assemble(model, vec![], vec![])
            }
            None => vec![],
        }
    }

    fn assemble(
        &self,
        model: &StyleModel,
        high_score: Vec<RankedClass>,
        normal: Vec<RankedClass>,
    ) -> Vec<CompletionCandidate> {
        let root = if self.config.completion.root_items {
            root_items(model)
        } else {
            vec![]
        };

        let mut seen = HashSet::new();
        let mut candidates = vec![];
        for (tier, items) in [(Tier::HighScore, high_score), (Tier::Normal, normal), (Tier::Root, root)] {
            for item in filter_results(items) {
                if !seen.insert(item.name.clone()) {
                    continue;
                }
                let index = candidates.len();
                candidates.push(CompletionCandidate {
                    documentation: self.class_documentation(model, &item),
                    sort_text: sort_text(tier, index),
                    label: item.name,
                    kind: CandidateKind::Class,
                    detail: None,
                });
            }
        }
        candidates
    }

    fn class_documentation(&self, model: &StyleModel, item: &RankedClass) -> Option<String> {
        let path = model.tree_path(item.tree);
        let mut sections = vec![];

        if let Some(description) = path.last().and_then(|tree| tree.description.as_deref()) {
            sections.push(description.to_string());
        }
        if !path.is_empty() {
            let selectors: Vec<&str> = path.iter().map(|tree| tree.selector.as_str()).collect();
            sections.push(format!("`{}`", selectors.join(" ")));
        }
        if let Some(link) = component_docs_link(&item.name, &self.config.completion.docs_base) {
            sections.push(format!("docs: {link}"));
        }

        (!sections.is_empty()).then(|| sections.join("\n\n"))
    }

    /// Load in the background, on tokio's blocking pool.
    #[cfg(feature = "tokio")]
    pub async fn load_async(self: &Arc<Self>, workspace: Option<PathBuf>) -> Result<Arc<StyleModel>> {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.load(workspace.as_deref()))
            .await
            .map_err(|e| Error::Background(e.to_string()))?
    }

    /// Watch the loaded package's stylesheet folder.
    #[cfg(feature = "hot-reload")]
    pub fn watcher(&self) -> Result<classwright_style::hot_reload::StylesheetWatcher> {
        let entry = self.entry().ok_or(Error::NotLoaded)?;
        let dir = entry.parent().ok_or(Error::NotLoaded)?;

        let mut watcher = classwright_style::hot_reload::StylesheetWatcher::new(self.config.package.extension.clone())?;
        watcher.watch_dir(dir)?;
        Ok(watcher)
    }

    /// Reload after stylesheets changed on disk.
    ///
    /// Returns whether a reload happened. A failed reload keeps the current
    /// model and returns the error.
    #[cfg(feature = "hot-reload")]
    pub fn apply_changes(&self, changes: &[classwright_style::hot_reload::StylesheetChangeEvent]) -> Result<bool> {
        if changes.is_empty() {
            return Ok(false);
        }
        for change in changes {
            tracing::info!(target: targets::SERVICE, path = %change.path.display(), kind = ?change.kind, "Stylesheet changed");
        }
        self.reload()?;
        Ok(true)
    }
}

fn sort_text(tier: Tier, index: usize) -> String {
    format!("{}_{index:05}", tier as u8)
}

fn variable_candidates(model: &StyleModel) -> Vec<CompletionCandidate> {
    model
        .all_variables()
        .iter()
        .enumerate()
        .map(|(index, variable)| {
            let mut documentation = format!(
                "`{}` variable with default value of `{}`",
                variable.name, variable.value
            );
            if let Some(comment) = &variable.comment {
                documentation = format!("{comment}\n\n{documentation}");
            }

            CompletionCandidate {
                label: variable.name.clone(),
                kind: if variable.name.contains("color") {
                    CandidateKind::Color
                } else {
                    CandidateKind::Variable
                },
                sort_text: sort_text(Tier::HighScore, index),
                detail: Some(variable.value.clone()),
                documentation: Some(documentation),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_text_orders_tiers_then_index() {
        let mut texts = vec![
            sort_text(Tier::Root, 0),
            sort_text(Tier::Normal, 12),
            sort_text(Tier::HighScore, 3),
            sort_text(Tier::Normal, 2),
        ];
        texts.sort();
        assert_eq!(texts, vec!["0_00003", "1_00002", "1_00012", "2_00000"]);
    }

    #[test]
    fn language_ids() {
        assert_eq!(DocumentLanguage::from_language_id("html"), Some(DocumentLanguage::Markup));
        assert_eq!(DocumentLanguage::from_language_id("scss"), Some(DocumentLanguage::Stylesheet));
        assert_eq!(
            DocumentLanguage::from_language_id("typescriptreact"),
            Some(DocumentLanguage::ComponentScript)
        );
        assert_eq!(DocumentLanguage::from_language_id("rust"), None);
    }

    #[test]
    fn nothing_loaded() {
        let service = CompletionService::new(Config::default());
        assert!(!service.is_loaded());
        assert!(matches!(service.reload(), Err(Error::NotLoaded)));

        let request = CompletionRequest {
            uri: "file:///index.html".to_string(),
            language: DocumentLanguage::Markup,
            text: r#"<div class=""#.to_string(),
            position: Position::new(0, 12),
        };
        assert!(service.complete(&request).is_empty());
    }
}
