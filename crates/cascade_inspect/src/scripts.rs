//! In-page functions evaluated through `Runtime.evaluate`.
//!
//! Each source is a JavaScript function expression. Arguments are passed as JSON literals and,
//! except for [`RESOLVE_NODE`], every function returns `JSON.stringify(...)` so results survive
//! the protocol as a string.
//! Elements are addressed by their child-index path from `document.documentElement`.

use anyhow::Result;
use serde_json::Value;

/// `(selector) => path | null`
pub const QUERY_ELEMENT: &str = r"(selector) => {
    let el = null;
    try { el = document.querySelector(selector); } catch (err) { return JSON.stringify(null); }
    if (!el) return JSON.stringify(null);
    const path = [];
    for (let cur = el; cur !== document.documentElement; cur = cur.parentElement) {
        const parent = cur.parentElement;
        if (!parent) return JSON.stringify(null);
        path.unshift(Array.prototype.indexOf.call(parent.children, cur));
    }
    return JSON.stringify(path);
}";

/// `(path) => {tagName, id, classes}`
pub const DESCRIBE_NODE: &str = r"(path) => {
    const el = path.reduce((node, index) => node && node.children[index], document.documentElement);
    if (!el) throw new Error('node is no longer attached');
    return JSON.stringify({ tagName: el.tagName, id: el.id || null, classes: Array.from(el.classList) });
}";

/// `(path) => Element`, evaluated without `returnByValue` to obtain a remote object handle.
pub const RESOLVE_NODE: &str = r"(path) => {
    const el = path.reduce((node, index) => node && node.children[index], document.documentElement);
    if (!el) throw new Error('node is no longer attached');
    return el;
}";

/// `(path) => {name: value}` including custom properties.
///
/// Custom property names are gathered from every stylesheet and from inline styles on the
/// element and its ancestors, then read back from the computed style.
pub const COMPUTED_STYLE: &str = r"(path) => {
    const el = path.reduce((node, index) => node && node.children[index], document.documentElement);
    if (!el) throw new Error('node is no longer attached');
    const style = window.getComputedStyle(el);
    const out = {};
    for (let i = 0; i < style.length; i++) {
        const name = style[i];
        out[name] = style.getPropertyValue(name);
    }
    const custom = new Set();
    const collect = (declarations) => {
        for (let i = 0; i < declarations.length; i++) {
            const name = declarations[i];
            if (name.startsWith('--')) custom.add(name);
        }
    };
    const visit = (list) => {
        for (const rule of Array.from(list)) {
            if (rule.style) collect(rule.style);
            if (rule.cssRules) visit(rule.cssRules);
        }
    };
    for (const sheet of Array.from(document.styleSheets)) {
        let list = null;
        try { list = sheet.cssRules; } catch (err) { list = null; }
        if (list) visit(list);
    }
    for (let cur = el; cur; cur = cur.parentElement) collect(cur.style);
    for (const name of custom) {
        const value = style.getPropertyValue(name);
        if (value !== '') out[name] = value;
    }
    return JSON.stringify(out);
}";

/// `(path, class) => bool`, true if the class was not present before.
pub const ADD_CLASS: &str = r"(path, name) => {
    const el = path.reduce((node, index) => node && node.children[index], document.documentElement);
    if (!el) throw new Error('node is no longer attached');
    const added = !el.classList.contains(name);
    el.classList.add(name);
    return JSON.stringify(added);
}";

/// `(path, class) => null`
pub const REMOVE_CLASS: &str = r"(path, name) => {
    const el = path.reduce((node, index) => node && node.children[index], document.documentElement);
    if (!el) throw new Error('node is no longer attached');
    el.classList.remove(name);
    return JSON.stringify(null);
}";

/// Immediately invoked call of `function` with JSON-encoded `args`.
///
/// # Errors
/// Returns an error if an argument cannot be serialized.
pub fn invocation(function: &str, args: &[Value]) -> Result<String> {
    let encoded = args
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({function})({})", encoded.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invocation_encodes_arguments_as_json() -> Result<()> {
        let script = invocation(ADD_CLASS, &[json!([0, 2]), json!("pseudo-\"hover")])?;
        assert!(script.starts_with("((path, name) =>"));
        assert!(script.ends_with(r#"})([0,2], "pseudo-\"hover")"#));
        Ok(())
    }
}
