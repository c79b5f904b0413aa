//! `@include` name resolution.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use crate::model::{MixinId, ModelIndex, ModuleId, StyleBloc, StyleModule};
use crate::warning::LoadWarning;

/// Resolve every mixin's `@include` names to mixin ids.
///
/// A name is searched, in order, among the mixins of the modules the
/// including module imports (directly or not, later definitions winning),
/// the mixins defined earlier in the same module, those defined later in
/// it, and finally every mixin of the package. Targets are marked
/// [`StyleBloc::included`]. Unresolved names are logged and reported as
/// warnings.
pub fn resolve_includes(
    modules: &SlotMap<ModuleId, StyleModule>,
    index: &ModelIndex,
    mixins: &mut SlotMap<MixinId, StyleBloc>,
    warnings: &mut Vec<LoadWarning>,
) {
    let mut resolutions: Vec<(MixinId, Vec<MixinId>)> = vec![];
    let blocs: &SlotMap<MixinId, StyleBloc> = mixins;

    for (module_id, module) in modules {
        let mut imported: Option<HashMap<&str, MixinId>> = None;

        for (position, &mixin_id) in module.mixins.iter().enumerate() {
            let bloc = &blocs[mixin_id];
            if bloc.included_style_blocs.is_empty() {
                continue;
            }
            let imported = imported.get_or_insert_with(|| imported_mixins(modules, blocs, module_id));

            let mut targets = vec![];
            for name in &bloc.included_style_blocs {
                let earlier = || {
                    module.mixins[..position]
                        .iter()
                        .copied()
                        .find(|&id| blocs[id].name == *name)
                };
                let later = || {
                    module.mixins[position + 1..]
                        .iter()
                        .copied()
                        .find(|&id| blocs[id].name == *name)
                };

                let target = imported
                    .get(name.as_str())
                    .copied()
                    .or_else(earlier)
                    .or_else(later)
                    .or_else(|| index.all_mixins.get(name).copied());

                match target {
                    Some(target) => targets.push(target),
                    None => {
                        tracing::warn!(
                            target: "classwright_style::resolve",
                            mixin = %bloc.name,
                            include = %name,
                            "Failed to resolve included mixin"
                        );
                        warnings.push(LoadWarning::IncludeNotResolved {
                            mixin: bloc.name.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
            resolutions.push((mixin_id, targets));
        }
    }

    for (mixin_id, targets) in resolutions {
        for &target in &targets {
            mixins[target].included = true;
        }
        mixins[mixin_id].resolved_includes = targets;
    }
}

/// Mixins visible through `module`'s imports, transitively.
fn imported_mixins<'a>(
    modules: &SlotMap<ModuleId, StyleModule>,
    mixins: &'a SlotMap<MixinId, StyleBloc>,
    module: ModuleId,
) -> HashMap<&'a str, MixinId> {
    let mut table = HashMap::new();
    let mut visited = HashSet::from([module]);
    let mut stack: Vec<ModuleId> = modules[module].imported_modules.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(imported) = modules.get(id) else {
            continue;
        };
        for &mixin_id in &imported.mixins {
            table.insert(mixins[mixin_id].name.as_str(), mixin_id);
        }
        stack.extend(imported.imported_modules.iter().rev().copied());
    }
    table
}
