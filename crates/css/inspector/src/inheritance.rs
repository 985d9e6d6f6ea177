//! Attribute inheritable property values to the ancestor they most likely came from.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#inheriting>
//!
//! Attribution is by value equality: the nearest ancestor whose own computed value equals
//! the element's computed value is reported as the source. This is a heuristic, not a
//! causal proof.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use css_cascade::{CascadeResolution, INHERITABLE_PROPERTIES};
use log::debug;

use crate::analysis::{ElementDescriptor, InheritedProperty};
use crate::collaborators::StyleInspector;

/// Computed style and descriptor of one ancestor, fetched on first use.
struct AncestorStyle {
    style: BTreeMap<String, String>,
    selector: Option<String>,
}

/// Walks an element's ancestor chain, fetching each ancestor's style at most once.
pub struct InheritanceWalker<'walk, S: StyleInspector> {
    inspector: &'walk S,
    page: &'walk S::Page,
    ancestors: Vec<S::Node>,
    cache: Vec<Option<AncestorStyle>>,
}

impl<'walk, S: StyleInspector> InheritanceWalker<'walk, S> {
    /// Walker over `ancestors` (nearest first).
    pub fn new(inspector: &'walk S, page: &'walk S::Page, ancestors: Vec<S::Node>) -> Self {
        let cache = ancestors.iter().map(|_| None).collect();
        Self {
            inspector,
            page,
            ancestors,
            cache,
        }
    }

    /// Attribute every tracked inheritable property that the element did not declare itself.
    ///
    /// Properties are visited in allow-list order; `wanted` narrows the list further. A
    /// property the element has no computed value for is skipped.
    ///
    /// # Errors
    /// Returns the backend's error if an ancestor's style cannot be fetched.
    pub async fn attribute<F>(
        &mut self,
        element_style: &BTreeMap<String, String>,
        resolution: &CascadeResolution,
        wanted: F,
    ) -> Result<Vec<InheritedProperty>>
    where
        F: Fn(&str) -> bool,
    {
        let mut inherited = Vec::new();
        for property in INHERITABLE_PROPERTIES {
            if !wanted(property) || resolution.is_declared(property) {
                continue;
            }
            let Some(value) = element_style.get(property) else {
                continue;
            };
            if let Some(source) = self.find_source(property, value).await? {
                debug!("[INHERIT] {property} = {value} from {source}");
                inherited.push(InheritedProperty {
                    property: property.to_owned(),
                    value: value.clone(),
                    source,
                });
            }
        }
        Ok(inherited)
    }

    /// Selector of the nearest ancestor whose computed `property` equals `value`.
    async fn find_source(&mut self, property: &str, value: &str) -> Result<Option<String>> {
        for index in 0..self.ancestors.len() {
            let matches = self
                .style_of(index)
                .await?
                .style
                .get(property)
                .is_some_and(|candidate| candidate == value);
            if matches {
                return self.selector_of(index).await.map(Some);
            }
        }
        Ok(None)
    }

    async fn style_of(&mut self, index: usize) -> Result<&mut AncestorStyle> {
        if self.cache[index].is_none() {
            let style = self
                .inspector
                .get_computed_style(self.page, &self.ancestors[index])
                .await?;
            self.cache[index] = Some(AncestorStyle {
                style,
                selector: None,
            });
        }
        self.cache[index]
            .as_mut()
            .ok_or_else(|| anyhow!("ancestor {index} style missing from cache"))
    }

    async fn selector_of(&mut self, index: usize) -> Result<String> {
        if let Some(selector) = self.style_of(index).await?.selector.clone() {
            return Ok(selector);
        }
        let description = self
            .inspector
            .describe_node(self.page, &self.ancestors[index])
            .await?;
        let selector = ElementDescriptor::synthesized(description).selector;
        self.style_of(index).await?.selector = Some(selector.clone());
        Ok(selector)
    }
}
