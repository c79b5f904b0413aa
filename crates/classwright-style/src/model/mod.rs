//! The queryable style model.

mod index;
mod types;

use std::path::Path;

use slotmap::SlotMap;

pub use index::{ModelIndex, deep_flatten};
pub use types::{
    ClassName, ClassTree, ClassTreeId, MixinId, ModuleId, StyleBloc, StyleModule, Variable,
};

use crate::loader::LoaderOptions;
use crate::warning::LoadWarning;
use crate::Result;

/// A fully resolved stylesheet package.
///
/// Built once per load by [`StyleModel::load`] and read-only afterwards. A
/// reload builds a new model; nothing is updated in place.
#[derive(Debug, Clone)]
pub struct StyleModel {
    pub(crate) modules: SlotMap<ModuleId, StyleModule>,
    pub(crate) mixins: SlotMap<MixinId, StyleBloc>,
    pub(crate) trees: SlotMap<ClassTreeId, ClassTree>,
    pub(crate) root: ModuleId,
    pub(crate) index: ModelIndex,
    pub(crate) warnings: Vec<LoadWarning>,
}

impl StyleModel {
    /// Load the package whose entry stylesheet is `entry`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let model = StyleModel::load("node_modules/vanilla-framework/scss/_vanilla.scss", &LoaderOptions::default())?;
    /// for tree in model.all_class_trees() {
    ///     println!("{:?}", tree.classes);
    /// }
    /// ```
    pub fn load(entry: impl AsRef<Path>, options: &LoaderOptions) -> Result<Self> {
        crate::loader::load_package(entry.as_ref(), options)
    }

    /// The entry module.
    pub fn root(&self) -> &StyleModule {
        &self.modules[self.root]
    }

    /// Id of the entry module.
    pub fn root_id(&self) -> ModuleId {
        self.root
    }

    pub fn module(&self, id: ModuleId) -> Option<&StyleModule> {
        self.modules.get(id)
    }

    pub fn mixin(&self, id: MixinId) -> Option<&StyleBloc> {
        self.mixins.get(id)
    }

    pub fn tree(&self, id: ClassTreeId) -> Option<&ClassTree> {
        self.trees.get(id)
    }

    /// Number of distinct stylesheet files that were loaded.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Mixins by name, in first-definition order.
    pub fn all_mixins(&self) -> impl Iterator<Item = (&str, &StyleBloc)> {
        self.index
            .all_mixins
            .iter()
            .map(|(name, &id)| (name.as_str(), &self.mixins[id]))
    }

    /// The mixin that won for `name`.
    pub fn mixin_named(&self, name: &str) -> Option<&StyleBloc> {
        self.index.all_mixins.get(name).map(|&id| &self.mixins[id])
    }

    pub fn all_variables(&self) -> &[Variable] {
        &self.index.all_variables
    }

    pub fn all_root_class_trees(&self) -> impl Iterator<Item = (ClassTreeId, &ClassTree)> {
        self.index
            .all_root_class_trees
            .iter()
            .map(|&id| (id, &self.trees[id]))
    }

    pub fn all_class_trees(&self) -> impl Iterator<Item = (ClassTreeId, &ClassTree)> {
        self.index.all_class_trees.iter().map(|&id| (id, &self.trees[id]))
    }

    /// Modules by import name.
    pub fn all_style_modules(&self) -> impl Iterator<Item = (&str, &StyleModule)> {
        self.index
            .all_style_modules
            .iter()
            .map(|(name, &id)| (name.as_str(), &self.modules[id]))
    }

    /// Depth-first listing of a tree, see [`deep_flatten`].
    pub fn deep_flatten(&self, tree: ClassTreeId, ignore_root: bool) -> Vec<ClassTreeId> {
        deep_flatten(&self.trees, tree, ignore_root)
    }

    /// First indexed tree node that carries the class `name`.
    pub fn find_class_tree(&self, name: &str) -> Option<(ClassTreeId, &ClassTree)> {
        self.all_class_trees().find(|(_, tree)| tree.has_class(name))
    }

    /// The chain of trees from the outermost ancestor down to `tree`.
    pub fn tree_path(&self, tree: ClassTreeId) -> Vec<&ClassTree> {
        let mut path = vec![];
        let mut current = self.trees.get(tree);
        while let Some(node) = current {
            path.push(node);
            current = node.parent.and_then(|parent| self.trees.get(parent));
        }
        path.reverse();
        path
    }

    /// Recoverable problems met while loading.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}
