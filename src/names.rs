//! Property and signal name normalisation.
//!
//! Application code names properties in camel or snake case (`iconName`, `icon_name`), emitters know
//! them in hyphenated wire form (`icon-name`). Every name crosses this module before it's used as a
//! property key or a signal detail.

/// Convert `camelCase` and `snake_case` to `kebab-case`.
///
/// A hyphen is inserted only between a lowercase letter and a following uppercase one,
/// so runs of capitals (`URLPath`) are lowered without being split.
pub fn kebabify(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' {
            result.push('-');
            prev_lower = false;
            continue
        }
        if prev_lower && c.is_ascii_uppercase() {
            result.push('-');
        }
        prev_lower = c.is_ascii_lowercase();
        result.extend(c.to_lowercase());
    }
    result
}

/// `get_<name>` with hyphens replaced by underscores.
pub fn getter_name(property: &str) -> String {
    format!("get_{}", kebabify(property).replace('-', "_"))
}

/// `set_<name>` with hyphens replaced by underscores.
pub fn setter_name(property: &str) -> String {
    format!("set_{}", kebabify(property).replace('-', "_"))
}

/// Event key an object announces after `property` changed.
pub fn notify_signal(property: &str) -> String {
    format!("notify::{}", kebabify(property))
}

/// Event key a settings store announces after `key` changed.
pub fn changed_signal(key: &str) -> String {
    format!("changed::{}", kebabify(key))
}

/// Split `name::detail` into its parts.
pub(crate) fn split_detail(signal: &str) -> (&str, Option<&str>) {
    match signal.split_once("::") {
        None => (signal, None),
        Some((name, detail)) => (name, Some(detail))
    }
}
