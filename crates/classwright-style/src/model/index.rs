//! Flattened, de-duplicated views over a module graph.

use std::collections::HashSet;

use indexmap::IndexMap;
use slotmap::SlotMap;

use super::types::{ClassTree, ClassTreeId, MixinId, ModuleId, StyleBloc, StyleModule, Variable};

/// Derived lookup tables, computed once per load.
#[derive(Debug, Clone, Default)]
pub struct ModelIndex {
    /// Mixins by name. A later definition replaces an earlier one but keeps
    /// its position.
    pub all_mixins: IndexMap<String, MixinId>,
    /// Variables by first definition.
    pub all_variables: Vec<Variable>,
    /// Own trees of every mixin in `all_mixins`, in that order.
    pub all_root_class_trees: Vec<ClassTreeId>,
    /// Every tree node reachable from a root tree, pre-order, each once.
    pub all_class_trees: Vec<ClassTreeId>,
    /// Modules by import name, first visit wins.
    pub all_style_modules: IndexMap<String, ModuleId>,
}

impl ModelIndex {
    /// Walk the module graph from `root` and build every view.
    ///
    /// Modules are visited depth-first in import order and at most once, so
    /// import cycles terminate and every module contributes exactly once.
    pub fn build(
        root: ModuleId,
        modules: &SlotMap<ModuleId, StyleModule>,
        mixins: &SlotMap<MixinId, StyleBloc>,
        trees: &SlotMap<ClassTreeId, ClassTree>,
    ) -> Self {
        let mut index = Self::default();
        let mut variable_names = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(module) = modules.get(id) else {
                continue;
            };

            for &mixin_id in &module.mixins {
                index.all_mixins.insert(mixins[mixin_id].name.clone(), mixin_id);
            }
            for variable in &module.variables {
                if variable_names.insert(variable.name.clone()) {
                    index.all_variables.push(variable.clone());
                }
            }
            index.all_style_modules.entry(module.name.clone()).or_insert(id);

            stack.extend(module.imported_modules.iter().rev().copied());
        }

        index.all_root_class_trees = index
            .all_mixins
            .values()
            .flat_map(|&id| mixins[id].own_trees.iter().copied())
            .collect();

        let mut seen = HashSet::new();
        for &root_tree in &index.all_root_class_trees {
            for id in deep_flatten(trees, root_tree, false) {
                if seen.insert(id) {
                    index.all_class_trees.push(id);
                }
            }
        }

        index
    }
}

/// Depth-first pre-order listing of a tree.
///
/// With `ignore_root` the tree itself is left out and only its descendants
/// are returned.
pub fn deep_flatten(
    trees: &SlotMap<ClassTreeId, ClassTree>,
    root: ClassTreeId,
    ignore_root: bool,
) -> Vec<ClassTreeId> {
    let mut out = vec![];
    let mut stack = match trees.get(root) {
        Some(tree) if ignore_root => tree.children.iter().rev().copied().collect(),
        Some(_) => vec![root],
        None => vec![],
    };

    while let Some(id) = stack.pop() {
        out.push(id);
        if let Some(tree) = trees.get(id) {
            stack.extend(tree.children.iter().rev().copied());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassName;

    fn tree(trees: &mut SlotMap<ClassTreeId, ClassTree>, name: &str, children: Vec<ClassTreeId>) -> ClassTreeId {
        let id = trees.insert(ClassTree {
            classes: vec![ClassName::new(name)],
            children: children.clone(),
            ..Default::default()
        });
        for child in children {
            trees[child].parent = Some(id);
        }
        id
    }

    fn names(trees: &SlotMap<ClassTreeId, ClassTree>, ids: &[ClassTreeId]) -> Vec<String> {
        ids.iter().map(|&id| trees[id].classes[0].name.clone()).collect()
    }

    #[test]
    fn flatten_is_pre_order() {
        let mut trees = SlotMap::with_key();
        let a1 = tree(&mut trees, "a1", vec![]);
        let a = tree(&mut trees, "a", vec![a1]);
        let b = tree(&mut trees, "b", vec![]);
        let root = tree(&mut trees, "root", vec![a, b]);

        assert_eq!(names(&trees, &deep_flatten(&trees, root, false)), vec!["root", "a", "a1", "b"]);
        assert_eq!(names(&trees, &deep_flatten(&trees, root, true)), vec!["a", "a1", "b"]);
    }

    fn module(name: &str, variables: &[(&str, &str)], mixins: Vec<MixinId>) -> StyleModule {
        StyleModule {
            name: name.to_string(),
            variables: variables
                .iter()
                .map(|(n, v)| Variable {
                    name: n.to_string(),
                    value: v.to_string(),
                    comment: None,
                })
                .collect(),
            mixins,
            ..Default::default()
        }
    }

    #[test]
    fn mixins_last_win_and_variables_first_win() {
        // Intentional asymmetry: a redefined mixin replaces the earlier one,
        // a redefined variable keeps its first value.
        let trees = SlotMap::with_key();
        let mut mixins: SlotMap<MixinId, StyleBloc> = SlotMap::with_key();
        let first = mixins.insert(StyleBloc { name: "vf-button".into(), ..Default::default() });
        let second = mixins.insert(StyleBloc { name: "vf-button".into(), ..Default::default() });

        let mut modules = SlotMap::with_key();
        let a = modules.insert(module("a", &[("$brand-color", "red")], vec![first]));
        let b = modules.insert(module("b", &[("$brand-color", "blue")], vec![second]));
        let root = modules.insert(module("root", &[], vec![]));
        modules[root].imported_modules = vec![a, b];

        let index = ModelIndex::build(root, &modules, &mixins, &trees);

        assert_eq!(index.all_mixins["vf-button"], second);
        assert_eq!(index.all_variables.len(), 1);
        assert_eq!(index.all_variables[0].value, "red");
    }

    #[test]
    fn cyclic_imports_visit_each_module_once() {
        let trees = SlotMap::with_key();
        let mut mixins: SlotMap<MixinId, StyleBloc> = SlotMap::with_key();
        let m = mixins.insert(StyleBloc { name: "m".into(), ..Default::default() });

        let mut modules = SlotMap::with_key();
        let a = modules.insert(module("a", &[("$x", "1")], vec![m]));
        let b = modules.insert(module("b", &[("$y", "2")], vec![]));
        modules[a].imported_modules = vec![b];
        modules[b].imported_modules = vec![a];

        let index = ModelIndex::build(a, &modules, &mixins, &trees);

        assert_eq!(index.all_style_modules.len(), 2);
        assert_eq!(index.all_variables.len(), 2);
        assert_eq!(index.all_mixins.len(), 1);
    }
}
