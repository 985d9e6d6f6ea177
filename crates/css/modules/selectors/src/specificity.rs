//! CSS selector specificity calculation.
//! Spec: <https://www.w3.org/TR/selectors-4/#specificity-rules>

use core::fmt;

use serde::Serialize;

use crate::parser::nth_of_selector;
use crate::{
    ComplexSelector, CompoundSelector, SelectorList, SimpleSelector, parse_selector_list,
};

/// Specificity tuple (inline, a, b, c).
///
/// Field order drives the derived ordering: buckets compare lexicographically with
/// `inline` most significant and `element` least significant.
/// Spec: Section 17 — Calculating a selector's specificity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Specificity {
    /// 1 only for the synthetic rule carrying an element's `style` attribute.
    pub inline: u16,
    /// ID selectors (a).
    pub id: u16,
    /// Class, attribute and pseudo-class selectors (b).
    pub class: u16,
    /// Type selectors (c).
    #[serde(rename = "type")]
    pub element: u16,
}

impl Specificity {
    /// Specificity of `*` and of selectors made only of combinators.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Specificity of the inline style pseudo-rule.
    pub const INLINE: Self = Self {
        inline: 1,
        id: 0,
        class: 0,
        element: 0,
    };

    /// Construct a stylesheet-derived specificity (inline bucket zero).
    #[inline]
    pub const fn new(id: u16, class: u16, element: u16) -> Self {
        Self {
            inline: 0,
            id,
            class,
            element,
        }
    }

    /// Single integer ordering key: 16 bits per bucket, so comparing keys agrees
    /// with comparing tuples for every representable value.
    #[inline]
    pub const fn key(self) -> u64 {
        ((self.inline as u64) << 48)
            | ((self.id as u64) << 32)
            | ((self.class as u64) << 16)
            | (self.element as u64)
    }

    /// Bucket-wise saturating sum.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            inline: self.inline.saturating_add(other.inline),
            id: self.id.saturating_add(other.id),
            class: self.class.saturating_add(other.class),
            element: self.element.saturating_add(other.element),
        }
    }

    /// Whether this is the inline style specificity.
    #[inline]
    pub const fn is_inline(self) -> bool {
        self.inline > 0
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "({},{},{},{})",
            self.inline, self.id, self.class, self.element
        )
    }
}

/// Compute the specificity of a compound selector.
/// Pseudo-elements are stripped and contribute nothing.
/// Spec: Section 17 — Specificity (a, b, c)
pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    let mut total = Specificity::ZERO;
    for simple in &compound.simples {
        let add = match simple {
            SimpleSelector::IdSelector(_) => Specificity::new(1, 0, 0),
            SimpleSelector::Class(_) | SimpleSelector::Attribute(_) => Specificity::new(0, 1, 0),
            SimpleSelector::PseudoClass { name, argument } => {
                specificity_of_pseudo_class(name, argument.as_deref())
            }
            SimpleSelector::Type(_) => Specificity::new(0, 0, 1),
            SimpleSelector::PseudoElement { .. } | SimpleSelector::Universal => Specificity::ZERO,
        };
        total = total.saturating_add(add);
    }
    total
}

/// Specificity contributed by a pseudo-class.
/// Spec: Section 17 — special cases for `:is()`, `:not()`, `:has()`, `:where()`, `:nth-child()`
fn specificity_of_pseudo_class(name: &str, argument: Option<&str>) -> Specificity {
    match (name, argument) {
        ("where", _) => Specificity::ZERO,
        ("is" | "not" | "has" | "matches" | "any" | "-webkit-any" | "-moz-any", Some(list)) => {
            specificity_of_list(&parse_selector_list(list))
        }
        ("nth-child" | "nth-last-child", Some(arg)) => {
            let of_list = nth_of_selector(arg)
                .map(|text| specificity_of_list(&parse_selector_list(text)))
                .unwrap_or_default();
            Specificity::new(0, 1, 0).saturating_add(of_list)
        }
        _ => Specificity::new(0, 1, 0),
    }
}

/// Compute the specificity of a complex selector (sum of its compounds).
/// Spec: Section 17 — Specificity accumulation
pub fn specificity_of_complex(sel: &ComplexSelector) -> Specificity {
    sel.compounds()
        .map(specificity_of_compound)
        .fold(Specificity::ZERO, Specificity::saturating_add)
}

/// Specificity of a selector list: that of its most specific member.
/// Spec: Section 17 — "the specificity of the most specific complex selector in its argument"
pub fn specificity_of_list(list: &SelectorList) -> Specificity {
    list.selectors
        .iter()
        .map(specificity_of_complex)
        .max()
        .unwrap_or_default()
}

/// Parse selector text and compute its specificity.
pub fn specificity_of(selector_text: &str) -> Specificity {
    specificity_of_list(&parse_selector_list(selector_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shorthand for a stylesheet specificity triple.
    fn weight(id: u16, class: u16, element: u16) -> Specificity {
        Specificity::new(id, class, element)
    }

    #[test]
    fn basic_buckets() {
        assert_eq!(specificity_of("*"), Specificity::ZERO);
        assert_eq!(specificity_of("div"), weight(0, 0, 1));
        assert_eq!(specificity_of(".a"), weight(0, 1, 0));
        assert_eq!(specificity_of("#x"), weight(1, 0, 0));
        assert_eq!(specificity_of("div#x.a.b"), weight(1, 2, 1));
        assert_eq!(specificity_of("ul li > a + span ~ em"), weight(0, 0, 5));
    }

    #[test]
    fn attributes_and_pseudo_classes_count_as_classes() {
        assert_eq!(specificity_of("a[href]"), weight(0, 1, 1));
        assert_eq!(specificity_of("input[type=\"text\" i]"), weight(0, 1, 1));
        assert_eq!(specificity_of("a:hover"), weight(0, 1, 1));
        assert_eq!(specificity_of("li:nth-child(2n + 1)"), weight(0, 1, 1));
        assert_eq!(specificity_of("[data-x~='a b]c']"), weight(0, 1, 0));
    }

    #[test]
    fn pseudo_elements_are_stripped() {
        assert_eq!(specificity_of("p::first-line"), weight(0, 0, 1));
        assert_eq!(specificity_of("p:before"), weight(0, 0, 1));
        assert_eq!(specificity_of(".a::part(label)"), weight(0, 1, 0));
    }

    #[test]
    fn functional_pseudo_classes_take_most_specific_argument() {
        assert_eq!(specificity_of(":is(#a, .b)"), weight(1, 0, 0));
        assert_eq!(specificity_of("div:not(.a, p)"), weight(0, 1, 1));
        assert_eq!(specificity_of(":where(#a .b) p"), weight(0, 0, 1));
        assert_eq!(specificity_of("a:has(> img)"), weight(0, 0, 2));
        assert_eq!(specificity_of("li:nth-child(2 of .item)"), weight(0, 2, 1));
    }

    #[test]
    fn escapes_and_namespaces() {
        assert_eq!(specificity_of(".md\\:flex"), weight(0, 1, 0));
        assert_eq!(specificity_of(".hover\\:bg-red:hover"), weight(0, 2, 0));
        assert_eq!(specificity_of("svg|circle"), weight(0, 0, 1));
        assert_eq!(specificity_of("*|*"), Specificity::ZERO);
    }

    #[test]
    fn selector_list_uses_max_member() {
        assert_eq!(specificity_of("p, .a, #b"), weight(1, 0, 0));
        assert_eq!(specificity_of(""), Specificity::ZERO);
    }

    #[test]
    fn key_orders_like_tuple_past_single_digits() {
        let many_classes = weight(0, 12, 0);
        let one_id = weight(1, 0, 0);
        let eleven_types = weight(0, 1, 11);
        assert!(one_id > many_classes);
        assert!(one_id.key() > many_classes.key());
        assert!(many_classes.key() > eleven_types.key());
        assert!(Specificity::INLINE.key() > weight(u16::MAX, u16::MAX, u16::MAX).key());
    }

    #[test]
    fn display_lists_all_buckets() {
        assert_eq!(weight(1, 2, 3).to_string(), "(0,1,2,3)");
    }
}
