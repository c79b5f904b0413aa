//! Mixin bodies to class trees.

use slotmap::SlotMap;

use crate::model::{ClassName, ClassTree, ClassTreeId, StyleBloc, Variable};
use crate::parser::{AtRule, Declaration, Node, Rule};

/// Build a [`StyleBloc`] from a `@mixin` at-rule.
///
/// Direct `@include` children are recorded by name (resolved later, once
/// every mixin of the package is known), `$` declarations become mixin
/// variables and rules become root class trees. Other at-rules, such as
/// media queries, are not descended into.
pub fn resolve_mixin(
    rule: &AtRule,
    description: Option<String>,
    trees: &mut SlotMap<ClassTreeId, ClassTree>,
) -> StyleBloc {
    let mut bloc = StyleBloc {
        name: mixin_name(&rule.params),
        description,
        ..Default::default()
    };

    let mut pending_comment = None;
    for node in rule.children() {
        if let Node::Comment(comment) = node {
            pending_comment = Some(comment.cleaned());
            continue;
        }
        let comment = pending_comment.take();

        match node {
            Node::AtRule(at_rule) if at_rule.name == "include" => {
                bloc.included_style_blocs.push(mixin_name(&at_rule.params));
            }
            Node::Declaration(decl) if decl.is_variable() => {
                bloc.variables.push(variable(decl, comment));
            }
            Node::Rule(rule) => {
                if let Some(tree) = class_tree(rule, None, comment, trees) {
                    bloc.own_trees.push(tree);
                }
            }
            Node::AtRule(_) | Node::Declaration(_) | Node::Comment(_) => {}
        }
    }

    bloc.class_trees = bloc.own_trees.clone();
    bloc
}

/// Build the class tree of a rule and its nested rules.
///
/// Returns `None` when no selector of the rule is a class selector; nested
/// rules are dropped with it.
pub fn class_tree(
    rule: &Rule,
    parent: Option<ClassTreeId>,
    description: Option<String>,
    trees: &mut SlotMap<ClassTreeId, ClassTree>,
) -> Option<ClassTreeId> {
    let base = sub_classes(&rule.selectors);
    if base.is_empty() {
        return None;
    }

    let mut classes = base.clone();
    for child in rule.child_rules() {
        classes.extend(parent_extended_classes(&child.selectors, &base));
    }

    let id = trees.insert(ClassTree {
        classes,
        children: vec![],
        parent,
        selector: rule.selector.clone(),
        description,
    });

    let mut children = vec![];
    let mut pending_comment = None;
    for node in &rule.nodes {
        match node {
            Node::Comment(comment) => pending_comment = Some(comment.cleaned()),
            Node::Rule(child) => {
                if let Some(child) = class_tree(child, Some(id), pending_comment.take(), trees) {
                    children.push(child);
                }
            }
            Node::AtRule(_) | Node::Declaration(_) => pending_comment = None,
        }
    }
    trees[id].children = children;

    Some(id)
}

/// Class names named by a rule's selectors.
///
/// `.name rest` gives `name` (first compound only), `> .name` gives a
/// direct-child `name`. Tag, id, attribute and placeholder selectors give
/// nothing.
pub fn sub_classes(selectors: &[String]) -> Vec<ClassName> {
    selectors
        .iter()
        .filter_map(|selector| class_from_selector(selector))
        .collect()
}

fn class_from_selector(selector: &str) -> Option<ClassName> {
    if let Some(rest) = selector.strip_prefix('.') {
        let name = rest.split(char::is_whitespace).next().unwrap_or_default();
        return (!name.is_empty()).then(|| ClassName::new(name));
    }

    let name = selector.strip_prefix('>')?.trim_start().strip_prefix('.')?;
    (!name.is_empty()).then(|| ClassName::direct_child(name))
}

/// Classes synthesized from `&suffix` selectors of a nested rule.
///
/// Every class of the parent gets the suffix appended (`p-card` with
/// `&--highlighted` gives `p-card--highlighted`) and keeps its
/// direct-child flag.
pub fn parent_extended_classes(selectors: &[String], parent_classes: &[ClassName]) -> Vec<ClassName> {
    selectors
        .iter()
        .filter_map(|selector| parent_suffix(selector))
        .flat_map(|suffix| {
            parent_classes.iter().map(move |class| ClassName {
                name: format!("{}{suffix}", class.name),
                is_direct_child: class.is_direct_child,
            })
        })
        .collect()
}

/// The suffix of `&suffix`, when it is attached directly to `&`.
fn parent_suffix(selector: &str) -> Option<&str> {
    let rest = selector.strip_prefix('&')?;
    let suffix = rest.split(char::is_whitespace).next().unwrap_or_default();
    let first = suffix.chars().next()?;
    (first == '-' || first == '_' || first.is_alphanumeric()).then_some(suffix)
}

/// Mixin name from `@mixin` / `@include` params, without arguments.
pub fn mixin_name(params: &str) -> String {
    let params = params.trim();
    params
        .split_once('(')
        .map_or(params, |(name, _)| name)
        .trim()
        .to_string()
}

/// Variable from a `$name: value` declaration.
pub fn variable(decl: &Declaration, comment: Option<String>) -> Variable {
    let mut value = decl.value.trim();
    loop {
        if let Some(rest) = value.strip_suffix("!default") {
            value = rest.trim_end();
        } else if let Some(rest) = value.strip_suffix("!global") {
            value = rest.trim_end();
        } else {
            break;
        }
    }

    Variable {
        name: decl.prop.clone(),
        value: value.to_string(),
        comment,
    }
}
