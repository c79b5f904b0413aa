//! Import graph construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use slotmap::SlotMap;

use super::LoaderOptions;
use super::ingest::{TopLevel, classify, read_stylesheet};
use crate::model::{ClassTree, ClassTreeId, MixinId, ModuleId, StyleBloc, StyleModule};
use crate::resolve::resolve_mixin;
use crate::warning::LoadWarning;
use crate::{Error, Result};

/// Arenas of a loaded, not yet indexed, package.
#[derive(Debug)]
pub struct ModuleGraph {
    pub modules: SlotMap<ModuleId, StyleModule>,
    pub mixins: SlotMap<MixinId, StyleBloc>,
    pub trees: SlotMap<ClassTreeId, ClassTree>,
    pub root: ModuleId,
    pub warnings: Vec<LoadWarning>,
}

/// Loads a stylesheet and everything it imports.
///
/// Each file is loaded once, keyed by its canonical path. A module's id is
/// registered before its imports are followed, so files that import each
/// other link back to the module being loaded instead of recursing.
pub struct ModuleGraphBuilder<'a> {
    options: &'a LoaderOptions,
    modules: SlotMap<ModuleId, StyleModule>,
    mixins: SlotMap<MixinId, StyleBloc>,
    trees: SlotMap<ClassTreeId, ClassTree>,
    memo: HashMap<PathBuf, ModuleId>,
    warnings: Vec<LoadWarning>,
}

impl<'a> ModuleGraphBuilder<'a> {
    pub fn new(options: &'a LoaderOptions) -> Self {
        Self {
            options,
            modules: SlotMap::with_key(),
            mixins: SlotMap::with_key(),
            trees: SlotMap::with_key(),
            memo: HashMap::new(),
            warnings: vec![],
        }
    }

    /// Load `entry` and its imports.
    ///
    /// Failing to read or parse the entry is an error. Nested imports that
    /// match no file or can't be read are skipped with a warning; a nested
    /// file that fails to parse fails the whole load.
    pub fn build(mut self, entry: &Path) -> Result<ModuleGraph> {
        let path = entry.canonicalize().map_err(|e| Error::io(entry, e))?;
        let name = self
            .options
            .namespace
            .clone()
            .unwrap_or_else(|| module_name(&path));

        let root = self.load_module(name, &path)?;

        Ok(ModuleGraph {
            modules: self.modules,
            mixins: self.mixins,
            trees: self.trees,
            root,
            warnings: self.warnings,
        })
    }

    fn load_module(&mut self, name: String, path: &Path) -> Result<ModuleId> {
        if let Some(&id) = self.memo.get(path) {
            return Ok(id);
        }

        tracing::debug!(target: "classwright_style::loader", path = %path.display(), "Loading stylesheet");
        let nodes = read_stylesheet(path)?;

        let id = self.modules.insert(StyleModule {
            name,
            filename: path.to_path_buf(),
            ..Default::default()
        });
        self.memo.insert(path.to_path_buf(), id);

        let base = path.parent().unwrap_or(Path::new(""));
        for item in classify(&nodes) {
            match item {
                TopLevel::Variable(variable) => self.modules[id].variables.push(variable),
                TopLevel::Import(imports) => {
                    for import in imports {
                        if let Some(child) = self.load_import(&import, base, path)? {
                            self.modules[id].imported_modules.push(child);
                        }
                    }
                }
                TopLevel::Mixin { rule, description } => {
                    let bloc = resolve_mixin(rule, description, &mut self.trees);
                    let mixin = self.mixins.insert(bloc);
                    self.modules[id].mixins.push(mixin);
                }
            }
        }

        Ok(id)
    }

    fn load_import(&mut self, import: &str, base: &Path, from: &Path) -> Result<Option<ModuleId>> {
        let resolved = resolve_import(import, base, &self.options.extension)
            .and_then(|path| path.canonicalize().map_err(|e| Error::io(path, e)));

        let path = match resolved {
            Ok(path) => path,
            Err(_) => {
                tracing::warn!(
                    target: "classwright_style::loader",
                    import,
                    from = %from.display(),
                    "Couldn't find the imported file"
                );
                self.warnings.push(LoadWarning::ImportNotResolved {
                    import: import.to_string(),
                    from: from.to_path_buf(),
                });
                return Ok(None);
            }
        };

        match self.load_module(import.to_string(), &path) {
            Ok(id) => Ok(Some(id)),
            Err(Error::Io { path, source }) => {
                tracing::warn!(
                    target: "classwright_style::loader",
                    path = %path.display(),
                    error = %source,
                    "Couldn't read the imported file"
                );
                self.warnings.push(LoadWarning::UnreadableImport {
                    path,
                    message: source.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Find the file an `@import` names, relative to `base`.
///
/// Tries `<base>/<name>.<ext>`, then the partial `<base>/<dir>/_<file>.<ext>`.
/// An import that already carries the extension is taken as is.
pub fn resolve_import(import: &str, base: &Path, extension: &str) -> Result<PathBuf> {
    let suffix = format!(".{extension}");
    let name = import.strip_suffix(&suffix).unwrap_or(import);

    let direct = base.join(format!("{name}{suffix}"));
    if direct.is_file() {
        return Ok(direct);
    }

    let relative = Path::new(name);
    if let Some(file) = relative.file_name() {
        let partial = base
            .join(relative.parent().unwrap_or(Path::new("")))
            .join(format!("_{}{suffix}", file.to_string_lossy()));
        if partial.is_file() {
            return Ok(partial);
        }
    }

    Err(Error::import_not_resolved(import, base))
}

/// Namespace of an entry file: its stem without the partial underscore.
fn module_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_prefix('_').map(str::to_string).unwrap_or(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn resolves_plain_and_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plain.scss", "");
        write(dir.path(), "_settings.scss", "");
        write(dir.path(), "patterns/_buttons.scss", "");

        assert_eq!(resolve_import("plain", dir.path(), "scss").unwrap(), dir.path().join("plain.scss"));
        assert_eq!(
            resolve_import("settings", dir.path(), "scss").unwrap(),
            dir.path().join("_settings.scss")
        );
        assert_eq!(
            resolve_import("patterns/buttons", dir.path(), "scss").unwrap(),
            dir.path().join("patterns").join("_buttons.scss")
        );
        assert_eq!(
            resolve_import("plain.scss", dir.path(), "scss").unwrap(),
            dir.path().join("plain.scss")
        );
    }

    #[test]
    fn missing_import_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_import("nowhere", dir.path(), "scss").unwrap_err();
        assert!(matches!(err, Error::ImportNotResolved { .. }));
    }

    #[test]
    fn module_names() {
        assert_eq!(module_name(Path::new("/pkg/scss/_vanilla.scss")), "vanilla");
        assert_eq!(module_name(Path::new("/pkg/scss/build.scss")), "build");
    }

    #[test]
    fn mutual_imports_load_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.scss", "@import 'b';\n@mixin ma { .a { } }");
        write(dir.path(), "_b.scss", "@import 'a';\n@mixin mb { .b { } }");

        let options = LoaderOptions::default();
        let graph = ModuleGraphBuilder::new(&options)
            .build(&dir.path().join("a.scss"))
            .unwrap();

        assert_eq!(graph.modules.len(), 2);
        let root = &graph.modules[graph.root];
        let b = root.imported_modules[0];
        assert_eq!(graph.modules[b].imported_modules, vec![graph.root]);
        assert!(graph.warnings.is_empty());
    }
}
