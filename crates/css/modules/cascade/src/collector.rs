//! Normalization of raw matched-style records into typed [`Rule`]s.

use css_selectors::{Specificity, specificity_of};
use css_style_attr::parse_style_attribute;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Rule, RuleSource, SourceType};

/// Selector reported for the synthetic rule holding the `style` attribute.
pub const INLINE_SELECTOR: &str = "element.style";

/// Origin tag reported by the style-inspection backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawOrigin {
    /// A document stylesheet.
    #[serde(alias = "author")]
    Regular,
    /// A sheet injected by an extension or automation.
    Injected,
    /// A sheet created by developer tools.
    Inspector,
    /// A user stylesheet.
    User,
    /// The browser's default sheet.
    UserAgent,
    /// The element's `style` attribute.
    #[serde(alias = "attribute")]
    Inline,
}

impl RawOrigin {
    /// Fold the backend origin into the three tiers the cascade distinguishes.
    pub const fn source_type(self) -> SourceType {
        match self {
            Self::Regular | Self::Injected | Self::Inspector | Self::User => {
                SourceType::Stylesheet
            }
            Self::UserAgent => SourceType::UserAgent,
            Self::Inline => SourceType::Inline,
        }
    }
}

/// One declaration as reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub important: bool,
}

/// One matched rule as reported by the backend, in the backend's order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    pub selector_text: String,
    pub declarations: Vec<RawDeclaration>,
    pub origin: RawOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl RawRule {
    /// Build a record from declaration block text such as a rule's `cssText`.
    pub fn from_declaration_block(
        selector_text: impl Into<String>,
        block: &str,
        origin: RawOrigin,
    ) -> Self {
        let declarations = parse_style_attribute(block)
            .into_iter()
            .map(|decl| RawDeclaration {
                name: decl.property,
                value: decl.value,
                important: decl.important,
            })
            .collect();
        Self {
            selector_text: selector_text.into(),
            declarations,
            origin,
            stylesheet_url: None,
            line: None,
        }
    }

    /// Attach a stylesheet location.
    #[must_use]
    pub fn located(mut self, url: Option<String>, line: Option<u32>) -> Self {
        self.stylesheet_url = url;
        self.line = line;
        self
    }
}

/// Lowercase a property name unless it is a custom property.
pub(crate) fn normalize_property(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.starts_with("--") {
        trimmed.to_owned()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Convert raw records into rules, keeping the backend's order as source order.
///
/// Within one record a later declaration replaces an earlier one of the same property,
/// except that a normal declaration never replaces an `!important` one.
pub fn collect_rules(records: &[RawRule]) -> Vec<Rule> {
    let rules: Vec<Rule> = records
        .iter()
        .enumerate()
        .map(|(index, record)| collect_one(index, record))
        .collect();
    debug!(
        "[COLLECT] {} matched records -> {} declarations",
        rules.len(),
        rules.iter().map(|rule| rule.properties.len()).sum::<usize>()
    );
    rules
}

fn collect_one(index: usize, record: &RawRule) -> Rule {
    let mut properties: IndexMap<String, String> = IndexMap::new();
    let mut important_properties: IndexSet<String> = IndexSet::new();
    for decl in &record.declarations {
        let name = normalize_property(&decl.name);
        if name.is_empty() {
            continue;
        }
        if important_properties.contains(&name) && !decl.important {
            continue;
        }
        if decl.important {
            important_properties.insert(name.clone());
        }
        properties.insert(name, decl.value.trim().to_owned());
    }

    let kind = record.origin.source_type();
    let trimmed_selector = record.selector_text.trim();
    let (selector, specificity) = if kind == SourceType::Inline {
        let selector = if trimmed_selector.is_empty() {
            INLINE_SELECTOR
        } else {
            trimmed_selector
        };
        (selector.to_owned(), Specificity::INLINE)
    } else {
        (
            trimmed_selector.to_owned(),
            specificity_of(trimmed_selector),
        )
    };

    Rule {
        selector,
        properties,
        important_properties,
        specificity,
        source: RuleSource {
            kind,
            url: record.stylesheet_url.clone(),
            line: record.line,
        },
        is_active: false,
        overridden_by: None,
        overridden_properties: IndexMap::new(),
        source_order: u32::try_from(index).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_declarations_overwrite_earlier_ones() {
        let record = RawRule::from_declaration_block(
            ".a",
            "color: red; COLOR: blue; margin: 0",
            RawOrigin::Regular,
        );
        let rules = collect_rules(&[record]);
        let rule = &rules[0];
        assert_eq!(rule.properties.get("color").map(String::as_str), Some("blue"));
        assert_eq!(rule.properties.len(), 2);
        assert_eq!(rule.specificity, Specificity::new(0, 1, 0));
    }

    #[test]
    fn normal_declaration_does_not_replace_important_one() {
        let record = RawRule::from_declaration_block(
            "p",
            "color: red !important; color: blue",
            RawOrigin::Regular,
        );
        let rules = collect_rules(&[record]);
        let rule = &rules[0];
        assert_eq!(rule.properties.get("color").map(String::as_str), Some("red"));
        assert!(rule.is_important("color"));
    }

    #[test]
    fn inline_records_get_inline_specificity_and_selector() {
        let record = RawRule::from_declaration_block("", "color: green", RawOrigin::Inline);
        let rules = collect_rules(&[record]);
        let rule = &rules[0];
        assert_eq!(rule.selector, INLINE_SELECTOR);
        assert_eq!(rule.specificity, Specificity::INLINE);
        assert_eq!(rule.source.kind, SourceType::Inline);
    }

    #[test]
    fn origins_fold_into_three_tiers() {
        assert_eq!(RawOrigin::User.source_type(), SourceType::Stylesheet);
        assert_eq!(RawOrigin::Injected.source_type(), SourceType::Stylesheet);
        assert_eq!(RawOrigin::UserAgent.source_type(), SourceType::UserAgent);
    }

    #[test]
    fn source_order_follows_record_order() {
        let records = vec![
            RawRule::from_declaration_block("div", "color: red", RawOrigin::UserAgent),
            RawRule::from_declaration_block("#x", "color: blue", RawOrigin::Regular)
                .located(Some("https://example.test/site.css".to_owned()), Some(12)),
        ];
        let rules = collect_rules(&records);
        let orders: Vec<u32> = rules.iter().map(|rule| rule.source_order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(
            rules.get(1).and_then(|rule| rule.source.line),
            Some(12)
        );
    }
}
