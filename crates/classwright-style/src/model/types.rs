//! Extracted stylesheet facts.

use std::path::PathBuf;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a [`StyleModule`] in a model's module arena.
    pub struct ModuleId;
}

new_key_type! {
    /// Handle to a [`StyleBloc`] in a model's mixin arena.
    pub struct MixinId;
}

new_key_type! {
    /// Handle to a [`ClassTree`] in a model's class-tree arena.
    ///
    /// Trees are shared by id: a mixin that includes another one refers to
    /// the same tree nodes rather than copies.
    pub struct ClassTreeId;
}

/// A class name extracted from a selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName {
    /// Bare class, without the leading dot.
    pub name: String,
    /// Whether the selector used the child combinator (`> .name`).
    pub is_direct_child: bool,
}

impl ClassName {
    /// Create a class name reached by plain nesting.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_direct_child: false,
        }
    }

    /// Create a class name reached through `>`.
    pub fn direct_child(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_direct_child: true,
        }
    }
}

/// One class selector (or several sharing a rule body) and its nested rules.
#[derive(Debug, Clone, Default)]
pub struct ClassTree {
    /// Classes of the rule, followed by any `&suffix` expansions.
    pub classes: Vec<ClassName>,
    /// Nested class rules, owned by this tree.
    pub children: Vec<ClassTreeId>,
    /// Enclosing tree; not an owner.
    pub parent: Option<ClassTreeId>,
    /// Raw selector text of the rule.
    pub selector: String,
    /// Comment written right before the rule.
    pub description: Option<String>,
}

impl ClassTree {
    /// Whether any class of this node is named `name`.
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c.name == name)
    }
}

/// A preprocessor variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Name including the `$` sigil.
    pub name: String,
    /// Value with `!default` / `!global` flags removed.
    pub value: String,
    pub comment: Option<String>,
}

/// A mixin: a named, includable block of nested rules.
#[derive(Debug, Clone, Default)]
pub struct StyleBloc {
    /// Mixin name without its parameter list.
    pub name: String,
    /// Trees defined in the body.
    pub own_trees: Vec<ClassTreeId>,
    /// Own trees plus the own trees of every directly included mixin,
    /// once linked.
    pub class_trees: Vec<ClassTreeId>,
    /// Variables declared at the top of the body.
    pub variables: Vec<Variable>,
    /// Names from `@include` directives, in source order.
    pub included_style_blocs: Vec<String>,
    /// Include targets, filled by include resolution.
    pub resolved_includes: Vec<MixinId>,
    /// Set once an `@include` somewhere resolved to this mixin.
    pub included: bool,
    /// Comment written right before the `@mixin`.
    pub description: Option<String>,
}

/// A stylesheet file and the facts extracted from it.
#[derive(Debug, Clone, Default)]
pub struct StyleModule {
    /// Import namespace, e.g. `base_typography` or `vanilla`.
    pub name: String,
    pub filename: PathBuf,
    pub variables: Vec<Variable>,
    pub mixins: Vec<MixinId>,
    /// Modules imported by this one, in source order. May point back to an
    /// ancestor when files import each other.
    pub imported_modules: Vec<ModuleId>,
}
