//! Typed rule records produced by the collector and annotated by the resolver.

use css_selectors::Specificity;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::CascadePriority;

/// Where a rule came from, as far as the cascade cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// Any author-level sheet (document, injected, inspector or user sheets).
    Stylesheet,
    /// The element's own `style` attribute.
    Inline,
    /// The browser's default sheet.
    UserAgent,
}

/// Origin details of a rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleSource {
    #[serde(rename = "type")]
    pub kind: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// One matched rule with its declarations and cascade verdict.
///
/// `is_active` is true iff the rule wins at least one property it declares.
/// `overridden_by` names the winner of the first property (in declaration order) that
/// the rule lost; `overridden_properties` has the winner for every lost property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub selector: String,
    pub properties: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub important_properties: IndexSet<String>,
    pub specificity: Specificity,
    pub source: RuleSource,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridden_by: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub overridden_properties: IndexMap<String, String>,
    /// Position in the matched-rule list; last-resort tie-breaker.
    #[serde(skip)]
    pub source_order: u32,
}

impl Rule {
    /// Whether the rule declares `property`.
    #[inline]
    pub fn declares(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Whether the rule's declaration of `property` is `!important`.
    #[inline]
    pub fn is_important(&self, property: &str) -> bool {
        self.important_properties.contains(property)
    }

    /// Cascade priority of this rule's declaration of `property`.
    #[inline]
    pub fn priority_for(&self, property: &str) -> CascadePriority {
        CascadePriority::new(
            self.is_important(property),
            self.source.kind,
            self.specificity,
            self.source_order,
        )
    }
}
