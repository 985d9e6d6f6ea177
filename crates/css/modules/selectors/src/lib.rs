//! Selectors Level 4 — selector structure and specificity.
//! Spec: <https://www.w3.org/TR/selectors-4/>
//!
//! This module implements the subset needed to rank matched rules:
//! - Type, class, id, attribute, pseudo-class and pseudo-element selectors
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Functional pseudo-classes (`:is()`, `:not()`, `:has()`, `:where()`, `:nth-child(.. of S)`)
//! - Specificity calculation with an inline-style bucket and a bounded-width ordering key

use core::iter::once;

mod parser;
mod specificity;

// Re-export public API
pub use parser::{parse_complex_selector, parse_selector_list};
pub use specificity::{
    Specificity, specificity_of, specificity_of_complex, specificity_of_compound,
    specificity_of_list,
};

/// Attribute selector parts. Operator and value are kept only for diagnostics.
/// Spec: Section 6 — Attribute selectors
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name in ASCII lowercase, namespace prefix dropped.
    pub name: String,
    /// One of `=`, `~=`, `|=`, `^=`, `$=`, `*=` when present.
    pub operator: Option<String>,
    /// Unquoted comparison value when present.
    pub value: Option<String>,
}

/// Simple selectors.
/// Spec: Sections 3.1, 5, 6, 7, 8
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Spec: Section 5.1 — Type selectors
    Type(String),
    /// Spec: Section 6.6 — Class selectors
    Class(String),
    /// Spec: Section 6.7 — ID selectors
    IdSelector(String),
    /// Spec: Section 6 — Attribute selectors
    Attribute(AttributeSelector),
    /// `:name` or `:name(argument)`, argument kept as raw text.
    /// Spec: Section 3.5 — Pseudo-classes
    PseudoClass {
        name: String,
        argument: Option<String>,
    },
    /// `::name`, `::name(argument)` or a legacy single-colon pseudo-element.
    /// Spec: Section 3.6 — Pseudo-elements
    PseudoElement {
        name: String,
        argument: Option<String>,
    },
    /// Universal selector '*'.
    /// Spec: Section 5.2 — Universal selector
    Universal,
}

/// A compound selector is a sequence of simple selectors (no combinators).
/// Spec: Section 3.1 — Compound selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
/// Spec: Section 15 — Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
/// Spec: Section 3.1 — Complex selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Iterate every compound in source order.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        once(&self.first).chain(self.rest.iter().map(|pair| &pair.1))
    }
}

/// A selector list separated by commas.
/// Spec: Section 4.1 — Selector lists
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}
