//! Request and response documents.

use std::collections::{BTreeMap, BTreeSet};

use css_cascade::Rule;
use serde::{Deserialize, Serialize};

/// Pseudo-class state name → tracked property → value.
pub type PseudoStateMap = BTreeMap<String, BTreeMap<String, String>>;

/// One analysis request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub url: String,
    pub selector: String,
    /// Restrict computed styles, resolution and inheritance to these properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
    #[serde(default)]
    pub include_pseudo_states: bool,
}

impl AnalysisRequest {
    /// Request a full analysis of `selector` on `url`.
    pub fn new(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            properties: None,
            include_pseudo_states: false,
        }
    }

    /// Restrict the analysis to `properties`.
    #[must_use]
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Toggle pseudo-state simulation.
    #[must_use]
    pub const fn with_pseudo_states(mut self, enabled: bool) -> Self {
        self.include_pseudo_states = enabled;
        self
    }

    /// Whether `property` passes the request's property filter.
    pub fn wants(&self, property: &str) -> bool {
        self.properties.as_ref().is_none_or(|wanted| {
            wanted
                .iter()
                .any(|name| name.trim().eq_ignore_ascii_case(property))
        })
    }
}

/// Tag, id and classes of a node as reported by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub tag_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Identifies an element in the response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub selector: String,
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub classes: BTreeSet<String>,
}

impl ElementDescriptor {
    /// Describe the requested element under the selector it was found with.
    pub fn for_target(selector: &str, node: NodeDescription) -> Self {
        Self {
            selector: selector.to_owned(),
            tag_name: node.tag_name.to_ascii_lowercase(),
            id: node.id.filter(|id| !id.is_empty()),
            classes: node.classes.into_iter().collect(),
        }
    }

    /// Describe an ancestor under a synthesized `tag#id.class` selector.
    pub fn synthesized(node: NodeDescription) -> Self {
        let tag_name = node.tag_name.to_ascii_lowercase();
        let id = node.id.filter(|id| !id.is_empty());
        let classes: BTreeSet<String> = node
            .classes
            .into_iter()
            .filter(|class| !class.is_empty())
            .collect();
        let mut selector = tag_name.clone();
        if let Some(id) = &id {
            selector.push('#');
            selector.push_str(id);
        }
        for class in &classes {
            selector.push('.');
            selector.push_str(class);
        }
        Self {
            selector,
            tag_name,
            id,
            classes,
        }
    }
}

/// An inheritable property attributed to an ancestor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InheritedProperty {
    pub property: String,
    pub value: String,
    /// Selector of the ancestor the value is attributed to.
    pub source: String,
}

/// The full explanation of one element's styles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssCascadeAnalysis {
    pub element: ElementDescriptor,
    pub computed_styles: BTreeMap<String, String>,
    pub applied_rules: Vec<Rule>,
    pub overridden_rules: Vec<Rule>,
    pub inherited_properties: Vec<InheritedProperty>,
    pub css_variables: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pseudo_states: Option<PseudoStateMap>,
}
