//! Approximate `:hover`, `:focus` and `:active` by toggling a marker class.
//! Spec: <https://www.w3.org/TR/selectors-4/#useraction-pseudos>
//!
//! No pointer or focus event is dispatched. The result only reflects pages that express their
//! user-action rules through an equivalent class selector as well.

use std::collections::BTreeMap;

use log::{debug, warn};
use tokio::sync::Mutex as AsyncMutex;

use crate::analysis::PseudoStateMap;
use crate::collaborators::StyleInspector;
use crate::config::InspectorConfig;
use crate::error::AnalysisError;

/// User-action states that are simulated, in reporting order.
pub const SIMULATED_STATES: [&str; 3] = ["hover", "focus", "active"];

/// Snapshot the tracked properties of `node` under each simulated state.
///
/// Each state holds `lock` while the marker class is on the element. The marker is only
/// removed if this call added it, and removal is attempted even when the snapshot failed.
/// If the future is dropped while the marker is applied, removal is handed to
/// [`StyleInspector::remove_class_detached`].
///
/// # Errors
/// Returns [`AnalysisError::PartialAnalysisFailure`] if any toggle or snapshot fails.
pub async fn simulate_pseudo_states<S: StyleInspector>(
    inspector: &S,
    page: &S::Page,
    node: &S::Node,
    config: &InspectorConfig,
    lock: &AsyncMutex<()>,
) -> Result<PseudoStateMap, AnalysisError> {
    let mut states = PseudoStateMap::new();
    for state in SIMULATED_STATES {
        let marker = config.marker_class(state);
        let _lock = lock.lock().await;

        let mut guard = MarkerGuard {
            inspector,
            page,
            node,
            class: &marker,
            armed: true,
        };
        let applied = inspector.add_class(page, node, &marker).await;
        guard.armed = applied.as_ref().is_ok_and(|&added| added);
        if let Err(err) = applied {
            return Err(partial(state, "apply marker", &err));
        }
        let snapshot = inspector.get_computed_style(page, node).await;
        if guard.armed {
            let removed = inspector.remove_class(page, node, &marker).await;
            guard.armed = false;
            if let Err(err) = removed {
                warn!("[PSEUDO] failed to remove {marker}: {err:#}");
                return Err(partial(state, "remove marker", &err));
            }
        }
        let style = snapshot.map_err(|err| partial(state, "snapshot", &err))?;

        let tracked: BTreeMap<String, String> = config
            .pseudo_properties
            .iter()
            .filter_map(|property| {
                style
                    .get(property)
                    .map(|value| (property.clone(), value.clone()))
            })
            .collect();
        debug!("[PSEUDO] {state}: {} tracked properties", tracked.len());
        states.insert(state.to_owned(), tracked);
    }
    Ok(states)
}

/// Removes a marker class that is still applied when the simulation is dropped early.
///
/// Armed while the marker may be on the element because of this simulation; a marker the
/// element already carried disarms it.
struct MarkerGuard<'marker, S: StyleInspector> {
    inspector: &'marker S,
    page: &'marker S::Page,
    node: &'marker S::Node,
    class: &'marker str,
    armed: bool,
}

impl<S: StyleInspector> Drop for MarkerGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            warn!("[PSEUDO] simulation interrupted, scheduling removal of {}", self.class);
            self.inspector
                .remove_class_detached(self.page, self.node, self.class);
        }
    }
}

fn partial(state: &str, step: &str, err: &anyhow::Error) -> AnalysisError {
    AnalysisError::PartialAnalysisFailure {
        reason: format!(":{state} {step}: {err:#}"),
    }
}
