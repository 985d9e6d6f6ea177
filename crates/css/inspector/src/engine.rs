//! The orchestrator: one request in, one [`CssCascadeAnalysis`] out.

use std::collections::BTreeMap;

use css_cascade::{collect_rules, oracle_divergences, resolve_cascade};
use css_variables::extract_custom_properties;
use log::{debug, info, warn};
use tokio::time::{sleep, timeout};

use crate::analysis::{AnalysisRequest, CssCascadeAnalysis, ElementDescriptor};
use crate::collaborators::{PageProvider, StyleInspector};
use crate::config::InspectorConfig;
use crate::error::AnalysisError;
use crate::inheritance::InheritanceWalker;
use crate::lease::{PageLease, PageLocks};
use crate::pseudo::simulate_pseudo_states;

/// Explains why an element ends up with its styles.
///
/// Holds no per-request state besides the per-page lock registry, so one inspector can
/// serve concurrent requests.
pub struct CascadeInspector<P, S> {
    provider: P,
    inspector: S,
    config: InspectorConfig,
    locks: PageLocks,
}

impl<P, S> CascadeInspector<P, S>
where
    P: PageProvider,
    S: StyleInspector<Page = P::Page>,
{
    /// Build an inspector over the given collaborators.
    pub fn new(provider: P, inspector: S, config: InspectorConfig) -> Self {
        Self {
            provider,
            inspector,
            config,
            locks: PageLocks::default(),
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// The page provider, e.g. to shut a browser down.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Analyze the element `request.selector` matches on `request.url`.
    ///
    /// The page is released when this returns or when the future is dropped.
    ///
    /// # Errors
    /// - [`AnalysisError::ElementNotFound`] if nothing matches within the element timeout.
    /// - [`AnalysisError::SessionUnavailable`] if the page or backend cannot be reached.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<CssCascadeAnalysis, AnalysisError> {
        let url = request.url.as_str();
        info!("[ANALYZE] {} on {url}", request.selector);
        let lease = PageLease::acquire(&self.provider, url)
            .await
            .map_err(|err| AnalysisError::session(url, &err))?;
        let page: &P::Page = &lease;
        let session = |err: anyhow::Error| AnalysisError::session(lease.url(), &err);

        let node = self.wait_for_element(page, url, &request.selector).await?;
        let description = self
            .inspector
            .describe_node(page, &node)
            .await
            .map_err(session)?;
        let records = self
            .inspector
            .get_matched_rules(page, &node)
            .await
            .map_err(session)?;
        let computed = self
            .inspector
            .get_computed_style(page, &node)
            .await
            .map_err(session)?;

        let resolution = resolve_cascade(collect_rules(&records), request.properties.as_deref());
        for divergence in oracle_divergences(&resolution, &computed) {
            debug!(
                "[ANALYZE] {} declared `{}` but computed `{}`",
                divergence.property, divergence.declared, divergence.computed
            );
        }

        let ancestors = self
            .inspector
            .get_ancestor_chain(page, &node)
            .await
            .map_err(session)?;
        let inherited_properties = InheritanceWalker::new(&self.inspector, page, ancestors)
            .attribute(&computed, &resolution, |property| request.wants(property))
            .await
            .map_err(session)?;

        let css_variables = extract_custom_properties(&computed);

        let pseudo_states = if request.include_pseudo_states {
            let lock = self.locks.for_page(url);
            match simulate_pseudo_states(&self.inspector, page, &node, &self.config, &lock).await {
                Ok(states) => Some(states),
                Err(err) => {
                    warn!("[ANALYZE] omitting pseudo states for {}: {err}", request.selector);
                    None
                }
            }
        } else {
            None
        };

        let computed_styles: BTreeMap<String, String> = computed
            .into_iter()
            .filter(|(property, _)| request.wants(property))
            .collect();

        Ok(CssCascadeAnalysis {
            element: ElementDescriptor::for_target(&request.selector, description),
            computed_styles,
            applied_rules: resolution.applied_rules().cloned().collect(),
            overridden_rules: resolution.overridden_rules().cloned().collect(),
            inherited_properties,
            css_variables,
            pseudo_states,
        })
    }

    /// Poll for `selector` until it matches, bounded by the element timeout.
    async fn wait_for_element(
        &self,
        page: &P::Page,
        url: &str,
        selector: &str,
    ) -> Result<S::Node, AnalysisError> {
        let poll = async {
            loop {
                match self.inspector.query_element(page, selector).await {
                    Ok(Some(node)) => return Ok(node),
                    Ok(None) => sleep(self.config.poll_interval()).await,
                    Err(err) => return Err(AnalysisError::session(url, &err)),
                }
            }
        };
        timeout(self.config.element_timeout(), poll)
            .await
            .unwrap_or_else(|_| {
                Err(AnalysisError::ElementNotFound {
                    selector: selector.to_owned(),
                    timeout_ms: self.config.element_timeout_ms,
                })
            })
    }
}
