//! CSS Custom Properties for Cascading Variables Module Level 1 — CSS variables.
//! Spec: <https://www.w3.org/TR/css-variables-1/>

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

/// Custom properties keyed by name (including the leading `--`); values are the
/// backend's resolved token strings.
pub type CustomProperties = BTreeMap<String, String>;

/// Whether `name` is a custom property name.
/// Spec: <https://www.w3.org/TR/css-variables-1/#defining-variables>
#[inline]
pub fn is_custom_property(name: &str) -> bool {
    name.starts_with("--")
}

/// Extract custom properties (`--*`) from a resolved property list.
///
/// Values are copied as-is: the style engine has already cascaded and substituted them.
/// The result is ordered by name.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#custom-properties>
pub fn extract_custom_properties<'props, I>(declarations: I) -> CustomProperties
where
    I: IntoIterator<Item = (&'props String, &'props String)>,
{
    declarations
        .into_iter()
        .filter(|(name, _)| is_custom_property(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_custom_properties() {
        let mut resolved = BTreeMap::new();
        resolved.insert("color".to_owned(), "rgb(0, 0, 0)".to_owned());
        resolved.insert("--brand".to_owned(), " #ff0000".to_owned());
        resolved.insert("--Gap".to_owned(), "4px".to_owned());

        let vars = extract_custom_properties(&resolved);
        let names: Vec<&str> = vars.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["--Gap", "--brand"]);
        assert_eq!(vars.get("--brand").map(String::as_str), Some(" #ff0000"));
    }

    #[test]
    fn single_dash_is_not_custom() {
        assert!(!is_custom_property("-webkit-box"));
        assert!(is_custom_property("--x"));
    }
}
