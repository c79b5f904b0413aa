//! Links to the component library's documentation.

/// Markdown link to the documentation page of the component `class`
/// belongs to.
///
/// `l-` classes are layouts, `u-` classes utilities and every other class a
/// pattern; the page is named after the block, without the category prefix
/// and without any `__element` or `--modifier` part. State classes (`is-`)
/// have no page.
///
/// ```
/// use classwright::docs::component_docs_link;
///
/// assert_eq!(
///     component_docs_link("p-card__image", "vanillaframework.io/docs").as_deref(),
///     Some("[vanillaframework.io/docs/patterns/card](https://vanillaframework.io/docs/patterns/card)"),
/// );
/// assert_eq!(component_docs_link("is-dark", "vanillaframework.io/docs"), None);
/// ```
pub fn component_docs_link(class: &str, base: &str) -> Option<String> {
    if class.is_empty() || class.starts_with("is-") {
        return None;
    }

    let category = if class.starts_with("l-") {
        "layouts"
    } else if class.starts_with("u-") {
        "utilities"
    } else {
        "patterns"
    };

    let prefix: String = class.chars().take(3).collect();
    let name = match class.split_once('-') {
        Some((_, rest)) if prefix.contains('-') => rest,
        _ => class,
    };
    let name = name.split("__").next().unwrap_or(name);
    let name = name.split("--").next().unwrap_or(name);

    let page = format!("{}/{category}/{name}", base.trim_end_matches('/'));
    Some(format!("[{page}](https://{page})"))
}
