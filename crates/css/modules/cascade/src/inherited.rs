//! Properties whose value is inherited by default.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#inheriting>

/// Inherited properties tracked by the inspector, in reporting order.
pub const INHERITABLE_PROPERTIES: [&str; 14] = [
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "text-align",
    "text-indent",
    "text-transform",
    "letter-spacing",
    "word-spacing",
    "white-space",
    "direction",
    "visibility",
    "cursor",
];

/// Whether a property is inherited by default (tracked subset).
pub fn is_inherited_property(property_name: &str) -> bool {
    let lowered = property_name.to_ascii_lowercase();
    INHERITABLE_PROPERTIES.contains(&lowered.as_str())
}
