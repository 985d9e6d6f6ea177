//! CSS cascade inspection: explain which rules style an element and why.
//!
//! The engine gathers the rules a live style engine matched for an element, re-runs the
//! cascade over them, attributes inherited values to ancestors, extracts custom properties
//! and optionally simulates user-action pseudo-classes. Browser access is injected through
//! [`PageProvider`] and [`StyleInspector`].
//! Spec: <https://www.w3.org/TR/css-cascade-4/>

#![forbid(unsafe_code)]

mod analysis;
mod collaborators;
mod config;
mod engine;
mod error;
mod inheritance;
mod lease;
mod pseudo;

pub use analysis::{
    AnalysisRequest, CssCascadeAnalysis, ElementDescriptor, InheritedProperty, NodeDescription,
    PseudoStateMap,
};
pub use collaborators::{PageProvider, StyleInspector};
pub use config::{DEFAULT_PSEUDO_PROPERTIES, InspectorConfig};
pub use engine::CascadeInspector;
pub use error::AnalysisError;
pub use inheritance::InheritanceWalker;
pub use lease::{PageLease, PageLocks};
pub use pseudo::{SIMULATED_STATES, simulate_pseudo_states};
