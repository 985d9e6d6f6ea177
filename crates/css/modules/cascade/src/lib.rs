//! CSS Cascading and Inheritance Level 4 — matched-rule cascade for one element.
//! Spec: <https://www.w3.org/TR/css-cascade-4/>
//!
//! Rules arrive already matched against the element (see [`collect_rules`]); this crate
//! ranks their declarations, picks one winner per property and explains the losers.
//! User-origin and user-important tiers are folded into the author origin.

#![forbid(unsafe_code)]

mod collector;
mod inherited;
mod resolver;
mod rule;

use core::cmp::Ordering;
use css_selectors::Specificity;

pub use collector::{INLINE_SELECTOR, RawDeclaration, RawOrigin, RawRule, collect_rules};
pub use inherited::{INHERITABLE_PROPERTIES, is_inherited_property};
pub use resolver::{
    CascadeResolution, Divergence, PropertyWinner, oracle_divergences, resolve_cascade,
};
pub use rule::{Rule, RuleSource, SourceType};

/// Priority tuple used to order declarations in the cascade.
/// Spec: Section 6.1 — Cascade sorting order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CascadePriority {
    /// Spec: Section 6.3 — Importance
    pub important: bool,
    /// Spec: Section 6.2 — Origins; the style attribute ranks above author sheets
    pub origin: SourceType,
    /// Spec: Section 6.1 — Specificity
    pub specificity: Specificity,
    /// Source order index, increasing with appearance in the matched-rule list.
    /// Spec: Section 6.1 — Order of appearance
    pub source_order: u32,
}

impl CascadePriority {
    /// Construct a priority value from inputs.
    #[inline]
    pub const fn new(
        important: bool,
        origin: SourceType,
        specificity: Specificity,
        source_order: u32,
    ) -> Self {
        Self {
            important,
            origin,
            specificity,
            source_order,
        }
    }
}

/// Compare two `CascadePriority` values according to the cascade rules.
/// Return `Ordering::Greater` if `left` should win over `right`.
/// Spec: Section 6.1 — Sorting the cascade
pub fn compare_priority(left: &CascadePriority, right: &CascadePriority) -> Ordering {
    // Importance first (important wins)
    if left.important != right.important {
        return bool_order_desc(left.important, right.important);
    }

    // Origin order: UA < author stylesheet < inline style.
    let left_rank = origin_rank(left.origin);
    let right_rank = origin_rank(right.origin);
    if left_rank != right_rank {
        return left_rank.cmp(&right_rank);
    }

    // Specificity: higher wins
    if left.specificity != right.specificity {
        return left.specificity.cmp(&right.specificity);
    }

    // Source order: later wins
    left.source_order.cmp(&right.source_order)
}

/// Return ordering where true > false.
const fn bool_order_desc(a_true_wins: bool, b_true_wins: bool) -> Ordering {
    match (a_true_wins, b_true_wins) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Rank origins: UA < author stylesheet < inline style.
const fn origin_rank(origin: SourceType) -> u8 {
    match origin {
        SourceType::UserAgent => 0,
        SourceType::Stylesheet => 1,
        SourceType::Inline => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priority(important: bool, origin: SourceType, id: u16, order: u32) -> CascadePriority {
        CascadePriority::new(important, origin, Specificity::new(id, 0, 0), order)
    }

    #[test]
    fn importance_beats_everything_else() {
        let important_ua = priority(true, SourceType::UserAgent, 0, 0);
        let inline = CascadePriority::new(false, SourceType::Inline, Specificity::INLINE, 9);
        assert_eq!(compare_priority(&important_ua, &inline), Ordering::Greater);
    }

    #[test]
    fn origin_beats_specificity() {
        let author = priority(false, SourceType::Stylesheet, 0, 0);
        let ua = priority(false, SourceType::UserAgent, 5, 1);
        assert_eq!(compare_priority(&author, &ua), Ordering::Greater);
    }

    #[test]
    fn specificity_then_source_order() {
        let early_id = priority(false, SourceType::Stylesheet, 1, 0);
        let late_plain = priority(false, SourceType::Stylesheet, 0, 5);
        assert_eq!(compare_priority(&early_id, &late_plain), Ordering::Greater);

        let late = priority(false, SourceType::Stylesheet, 1, 3);
        assert_eq!(compare_priority(&early_id, &late), Ordering::Less);
    }
}
