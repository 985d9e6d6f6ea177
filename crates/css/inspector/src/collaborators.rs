//! Interfaces the engine consumes: a page provider and a style-inspection backend.
//!
//! Both are injected into [`crate::CascadeInspector`]; nothing here is global. Errors
//! are plain `anyhow` errors and are translated by the inspector.

#![allow(
    async_fn_in_trait,
    reason = "futures are awaited in place by the inspector and never spawned"
)]

use std::collections::BTreeMap;

use anyhow::Result;
use css_cascade::RawRule;

use crate::analysis::NodeDescription;

/// Hands out page handles per URL.
pub trait PageProvider {
    type Page;

    /// Open (or reuse) the page for `url`.
    ///
    /// # Errors
    /// Returns an error if the page cannot be reached.
    async fn get_page(&self, url: &str) -> Result<Self::Page>;

    /// Give the page for `url` back. Called exactly once per successful `get_page`,
    /// from a drop guard, so it must not block.
    fn release_page(&self, url: &str);
}

/// Style-inspection surface of a page.
pub trait StyleInspector {
    type Page;
    type Node: Clone;

    /// First element matching `selector`, or `None` if nothing matches yet.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn query_element(&self, page: &Self::Page, selector: &str) -> Result<Option<Self::Node>>;

    /// Tag, id and classes of `node`.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn describe_node(&self, page: &Self::Page, node: &Self::Node) -> Result<NodeDescription>;

    /// Rules the style engine matched for `node`, in cascade source order.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn get_matched_rules(&self, page: &Self::Page, node: &Self::Node) -> Result<Vec<RawRule>>;

    /// Final computed style of `node`, including custom properties.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn get_computed_style(
        &self,
        page: &Self::Page,
        node: &Self::Node,
    ) -> Result<BTreeMap<String, String>>;

    /// Ancestors of `node`, nearest first.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn get_ancestor_chain(&self, page: &Self::Page, node: &Self::Node) -> Result<Vec<Self::Node>>;

    /// Add `class` to `node`; returns true if the node did not already carry it.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn add_class(&self, page: &Self::Page, node: &Self::Node, class: &str) -> Result<bool>;

    /// Remove `class` from `node`.
    ///
    /// # Errors
    /// Returns an error on transport failure.
    async fn remove_class(&self, page: &Self::Page, node: &Self::Node, class: &str) -> Result<()>;

    /// Remove `class` from `node` without awaiting the result. Called from a drop guard when a
    /// simulation is cancelled, so it must not block; failures can only be logged.
    fn remove_class_detached(&self, page: &Self::Page, node: &Self::Node, class: &str);
}
