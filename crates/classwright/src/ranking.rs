//! Ranking class candidates for an element.

use classwright_style::StyleModel;
use classwright_style::model::ClassTreeId;

use crate::markup::{MarkupDocument, NodeId};

/// A class name and the tree node it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedClass {
    pub name: String,
    pub tree: ClassTreeId,
}

impl RankedClass {
    fn new(name: &str, tree: ClassTreeId) -> Self {
        Self {
            name: name.to_string(),
            tree,
        }
    }
}

/// Candidates for one element, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    /// Continuations of the enclosing classes: BEM elements and modifiers of
    /// the parent's classes and direct children of matched ancestors.
    pub high_score_items: Vec<RankedClass>,
    /// Everything nested under a matched ancestor class.
    pub normal_items: Vec<RankedClass>,
}

/// Rank the classes that fit inside `element`.
///
/// Candidates may repeat; callers de-duplicate by name, keeping the first.
pub fn rank(document: &MarkupDocument, element: NodeId, model: &StyleModel) -> Ranking {
    let mut ranking = Ranking::default();

    if let Some(parent) = document.parent_element(element).and_then(|id| document.element(id)) {
        for class in &parent.class_list {
            for (id, tree) in model.all_class_trees() {
                ranking.high_score_items.extend(
                    tree.classes
                        .iter()
                        .filter(|c| c.name.len() > class.len() && c.name.starts_with(class.as_str()))
                        .map(|c| RankedClass::new(&c.name, id)),
                );
            }
        }
    }

    let matched: Vec<ClassTreeId> = document
        .ancestors(element)
        .filter_map(|id| document.element(id))
        .flat_map(|ancestor| ancestor.class_list.iter())
        .flat_map(|class| {
            model
                .all_class_trees()
                .filter(move |(_, tree)| !tree.children.is_empty() && tree.has_class(class))
                .map(|(id, _)| id)
        })
        .collect();

    for tree_id in matched {
        let Some(tree) = model.tree(tree_id) else {
            continue;
        };

        for &child_id in &tree.children {
            if let Some(child) = model.tree(child_id) {
                ranking.high_score_items.extend(
                    child
                        .classes
                        .iter()
                        .filter(|c| c.is_direct_child)
                        .map(|c| RankedClass::new(&c.name, child_id)),
                );
            }
        }

        for descendant_id in model.deep_flatten(tree_id, true) {
            if let Some(descendant) = model.tree(descendant_id) {
                ranking.normal_items.extend(
                    descendant
                        .classes
                        .iter()
                        .map(|c| RankedClass::new(&c.name, descendant_id)),
                );
            }
        }
    }

    ranking
}

/// Top-level classes of every mixin, BEM elements (`block__element`) left
/// out.
pub fn root_items(model: &StyleModel) -> Vec<RankedClass> {
    model
        .all_root_class_trees()
        .flat_map(|(id, tree)| {
            tree.classes
                .iter()
                .filter(|c| !is_bem_element(&c.name))
                .map(move |c| RankedClass::new(&c.name, id))
        })
        .collect()
}

fn is_bem_element(name: &str) -> bool {
    name.match_indices("__").any(|(i, _)| i > 0 && i + 2 < name.len())
}

/// Whether `name` can be written in a class attribute as is.
///
/// Pseudo-classes and pseudo-elements, unresolved interpolation, parent
/// selector remnants and anything past a combinator or a compound selector
/// are selector syntax, not class names.
pub fn is_valid_class_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("#{")
        && !name.contains(|c: char| {
            c.is_whitespace() || matches!(c, ':' | '&' | '>' | '+' | '~' | '.' | '[' | '(' | ',')
        })
}

/// Drop candidates that aren't literal class names.
pub fn filter_results(items: Vec<RankedClass>) -> Vec<RankedClass> {
    items
        .into_iter()
        .filter(|item| is_valid_class_name(&item.name))
        .collect()
}
