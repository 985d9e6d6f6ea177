//! [`StyleInspector`] over a Chrome page.
//!
//! Matched rules come from the DevTools protocol (`CSS.getMatchedStylesForNode`), so media,
//! container and import conditions are resolved by the browser itself. Everything else runs as
//! small in-page scripts.

use std::collections::BTreeMap;

use anyhow::{Context as _, Result, bail};
use chromiumoxide::cdp::browser_protocol::css::{
    CssStyle, EnableParams as CssEnableParams, GetMatchedStylesForNodeParams,
    GetMatchedStylesForNodeReturns, RuleMatch, StyleSheetOrigin,
};
use chromiumoxide::cdp::browser_protocol::dom::{
    EnableParams as DomEnableParams, GetDocumentParams, NodeId, RequestNodeParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{EvaluateParams, ReleaseObjectParams};
use chromiumoxide::page::Page;
use css_cascade::{RawDeclaration, RawOrigin, RawRule};
use css_inspector::{NodeDescription, StyleInspector};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::runtime::Handle;

use crate::scripts::{
    ADD_CLASS, COMPUTED_STYLE, DESCRIBE_NODE, QUERY_ELEMENT, REMOVE_CLASS, RESOLVE_NODE,
    invocation,
};

/// An element addressed by child indices from the document element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChromeNode {
    pub path: Vec<u32>,
}

impl ChromeNode {
    /// Ancestors of this node, nearest first; the document element has none.
    pub fn ancestors(&self) -> Vec<Self> {
        (0..self.path.len())
            .rev()
            .map(|depth| Self {
                path: self.path.iter().take(depth).copied().collect(),
            })
            .collect()
    }

    fn as_json(&self) -> Value {
        json!(self.path)
    }
}

const fn raw_origin(origin: &StyleSheetOrigin) -> RawOrigin {
    match origin {
        StyleSheetOrigin::Regular => RawOrigin::Regular,
        StyleSheetOrigin::Injected => RawOrigin::Injected,
        StyleSheetOrigin::Inspector => RawOrigin::Inspector,
        StyleSheetOrigin::UserAgent => RawOrigin::UserAgent,
    }
}

/// Enabled, successfully parsed declarations of `style`.
fn declarations(style: &CssStyle) -> Vec<RawDeclaration> {
    style
        .css_properties
        .iter()
        .filter(|property| property.disabled != Some(true) && property.parsed_ok != Some(false))
        .map(|property| RawDeclaration {
            name: property.name.clone(),
            value: property.value.clone(),
            important: property.important == Some(true),
        })
        .collect()
}

/// One matched rule, reported under the selector alternatives that actually match.
fn raw_rule(rule_match: &RuleMatch) -> RawRule {
    let rule = &rule_match.rule;
    let matching: Vec<_> = rule_match
        .matching_selectors
        .iter()
        .filter_map(|&index| {
            usize::try_from(index)
                .ok()
                .and_then(|position| rule.selector_list.selectors.get(position))
        })
        .collect();
    let selector_text = if matching.is_empty() {
        rule.selector_list.text.clone()
    } else {
        matching
            .iter()
            .map(|selector| selector.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    // Protocol lines are zero-based.
    let line = matching
        .first()
        .and_then(|selector| selector.range.as_ref())
        .or(rule.style.range.as_ref())
        .and_then(|range| u32::try_from(range.start_line).ok())
        .map(|start| start.saturating_add(1));
    RawRule {
        selector_text,
        declarations: declarations(&rule.style),
        origin: raw_origin(&rule.origin),
        stylesheet_url: None,
        line,
    }
}

/// Convert the protocol's matched styles into raw records, in the browser's order.
fn raw_rules(matched: &GetMatchedStylesForNodeReturns) -> Vec<RawRule> {
    let mut records: Vec<RawRule> = matched
        .matched_css_rules
        .iter()
        .flatten()
        .map(raw_rule)
        .collect();
    if let Some(inline) = &matched.inline_style {
        let inline_declarations = declarations(inline);
        if !inline_declarations.is_empty() {
            records.push(RawRule {
                selector_text: String::new(),
                declarations: inline_declarations,
                origin: RawOrigin::Inline,
                stylesheet_url: None,
                line: None,
            });
        }
    }
    records
}

/// Queries a Chrome page through in-page scripts and the CSS protocol domain.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeStyleInspector;

impl ChromeStyleInspector {
    async fn call<T: DeserializeOwned>(page: &Page, function: &str, args: &[Value]) -> Result<T> {
        let script = invocation(function, args)?;
        let encoded: String = page.evaluate(script).await?.into_value()?;
        serde_json::from_str(&encoded).context("malformed in-page script result")
    }

    /// Protocol node id of `node`, pushed to the front end via its remote object.
    async fn dom_node_id(page: &Page, node: &ChromeNode) -> Result<NodeId> {
        page.execute(DomEnableParams::default()).await?;
        page.execute(GetDocumentParams::default()).await?;
        let mut params = EvaluateParams::new(invocation(RESOLVE_NODE, &[node.as_json()])?);
        params.return_by_value = Some(false);
        let evaluated = page.execute(params).await?.result;
        if let Some(details) = evaluated.exception_details {
            bail!("resolving node {:?}: {}", node.path, details.text);
        }
        let object_id = evaluated
            .result
            .object_id
            .context("resolved node has no remote object")?;
        let requested = page.execute(RequestNodeParams::new(object_id.clone())).await;
        if let Err(err) = page.execute(ReleaseObjectParams::new(object_id)).await {
            debug!("[CDP] releasing node handle: {err}");
        }
        Ok(requested?.result.node_id)
    }
}

impl StyleInspector for ChromeStyleInspector {
    type Page = Page;
    type Node = ChromeNode;

    async fn query_element(&self, page: &Page, selector: &str) -> Result<Option<ChromeNode>> {
        let path: Option<Vec<u32>> = Self::call(page, QUERY_ELEMENT, &[json!(selector)]).await?;
        Ok(path.map(|path| ChromeNode { path }))
    }

    async fn describe_node(&self, page: &Page, node: &ChromeNode) -> Result<NodeDescription> {
        Self::call(page, DESCRIBE_NODE, &[node.as_json()]).await
    }

    async fn get_matched_rules(&self, page: &Page, node: &ChromeNode) -> Result<Vec<RawRule>> {
        let node_id = Self::dom_node_id(page, node).await?;
        page.execute(CssEnableParams::default()).await?;
        let matched = page
            .execute(GetMatchedStylesForNodeParams::new(node_id))
            .await?
            .result;
        let records = raw_rules(&matched);
        debug!("[CDP] {} matched rules for {:?}", records.len(), node.path);
        Ok(records)
    }

    async fn get_computed_style(
        &self,
        page: &Page,
        node: &ChromeNode,
    ) -> Result<BTreeMap<String, String>> {
        Self::call(page, COMPUTED_STYLE, &[node.as_json()]).await
    }

    async fn get_ancestor_chain(&self, _page: &Page, node: &ChromeNode) -> Result<Vec<ChromeNode>> {
        Ok(node.ancestors())
    }

    async fn add_class(&self, page: &Page, node: &ChromeNode, class: &str) -> Result<bool> {
        Self::call(page, ADD_CLASS, &[node.as_json(), json!(class)]).await
    }

    async fn remove_class(&self, page: &Page, node: &ChromeNode, class: &str) -> Result<()> {
        let _: Value = Self::call(page, REMOVE_CLASS, &[node.as_json(), json!(class)]).await?;
        Ok(())
    }

    fn remove_class_detached(&self, page: &Page, node: &ChromeNode, class: &str) {
        let script = match invocation(REMOVE_CLASS, &[node.as_json(), json!(class)]) {
            Ok(script) => script,
            Err(err) => {
                warn!("[CDP] cannot encode removal of {class}: {err}");
                return;
            }
        };
        let Ok(handle) = Handle::try_current() else {
            warn!("[CDP] no runtime to remove {class}; marker left on the page");
            return;
        };
        let page = page.clone();
        let class = class.to_owned();
        let _remove_task = handle.spawn(async move {
            if let Err(err) = page.evaluate(script).await {
                warn!("[CDP] failed to remove {class}: {err}");
            }
        });
    }
}
