//! Merging included class trees into mixins.

use slotmap::SlotMap;

use crate::model::{ClassTreeId, MixinId, ModelIndex, StyleBloc};

/// Append the own trees of each directly included mixin to the including
/// mixin's `class_trees`.
///
/// Only trees written in the included mixin's body are merged, never what
/// that mixin itself got from its includes, so the result does not depend
/// on the order mixins are visited in.
pub fn link_dependencies(index: &ModelIndex, mixins: &mut SlotMap<MixinId, StyleBloc>) {
    for &id in index.all_mixins.values() {
        let merged: Vec<ClassTreeId> = mixins[id]
            .resolved_includes
            .iter()
            .flat_map(|&target| mixins[target].own_trees.iter().copied())
            .collect();
        mixins[id].class_trees.extend(merged);
    }
}
