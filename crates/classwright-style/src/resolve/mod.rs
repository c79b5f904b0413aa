//! Mixin, class-tree and include resolution.

mod include;
mod link;
mod mixin;

pub use include::resolve_includes;
pub use link::link_dependencies;
pub use mixin::{class_tree, mixin_name, parent_extended_classes, resolve_mixin, sub_classes, variable};
