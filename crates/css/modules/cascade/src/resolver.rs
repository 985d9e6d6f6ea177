//! Per-property winner selection over collected rules.
//! Spec: <https://www.w3.org/TR/css-cascade-4/#cascade-sort>

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::collector::normalize_property;
use crate::{Rule, compare_priority};

/// The declaration that won one property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyWinner {
    /// Index into [`CascadeResolution::rules`].
    pub rule_index: usize,
    pub value: String,
    pub important: bool,
}

/// Rules annotated with their verdicts plus the winner of every resolved property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeResolution {
    /// Rules in source order, with `is_active` and the overridden annotations filled in.
    pub rules: Vec<Rule>,
    /// Winner per property, in order of first declaration.
    pub winners: IndexMap<String, PropertyWinner>,
}

impl CascadeResolution {
    /// The rule that won `property`, if any rule declared it.
    pub fn winning_rule(&self, property: &str) -> Option<&Rule> {
        self.winners
            .get(property)
            .and_then(|winner| self.rules.get(winner.rule_index))
    }

    /// Whether some rule on the element declared (and so won) `property`.
    #[inline]
    pub fn is_declared(&self, property: &str) -> bool {
        self.winners.contains_key(property)
    }

    /// Winning value of every resolved property.
    pub fn winning_values(&self) -> IndexMap<String, String> {
        self.winners
            .iter()
            .map(|(property, winner)| (property.clone(), winner.value.clone()))
            .collect()
    }

    /// Rules that won at least one property.
    pub fn applied_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.is_active)
    }

    /// Rules that lost every resolved property they declare.
    ///
    /// Rules declaring none of the resolved properties are in neither list.
    pub fn overridden_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .filter(|rule| !rule.is_active && !rule.overridden_properties.is_empty())
    }
}

/// Resolve the cascade over `rules`, optionally restricted to `only` properties.
///
/// For each property every declaring rule is ranked by importance, origin, specificity
/// and source order; the head wins that property alone and every other declaring rule
/// records the winner's selector.
pub fn resolve_cascade(mut rules: Vec<Rule>, only: Option<&[String]>) -> CascadeResolution {
    let filter: Option<IndexSet<String>> =
        only.map(|names| names.iter().map(|name| normalize_property(name)).collect());

    let mut properties: IndexSet<String> = IndexSet::new();
    for rule in &mut rules {
        rule.is_active = false;
        rule.overridden_by = None;
        rule.overridden_properties.clear();
        for property in rule.properties.keys() {
            if filter.as_ref().is_none_or(|wanted| wanted.contains(property)) {
                properties.insert(property.clone());
            }
        }
    }

    let mut winners: IndexMap<String, PropertyWinner> = IndexMap::new();
    for property in properties {
        let ranked = rank_declarations(&rules, &property);
        let Some((&winner_index, losers)) = ranked.split_first() else {
            continue;
        };
        let Some(winner) = rules.get_mut(winner_index) else {
            continue;
        };
        winner.is_active = true;
        let winner_selector = winner.selector.clone();
        let entry = PropertyWinner {
            rule_index: winner_index,
            value: winner.properties.get(&property).cloned().unwrap_or_default(),
            important: winner.is_important(&property),
        };
        for &loser_index in losers {
            if let Some(loser) = rules.get_mut(loser_index) {
                loser
                    .overridden_properties
                    .insert(property.clone(), winner_selector.clone());
            }
        }
        winners.insert(property, entry);
    }

    for rule in &mut rules {
        rule.overridden_by = rule
            .properties
            .keys()
            .find_map(|property| rule.overridden_properties.get(property).cloned());
    }

    debug!(
        "[CASCADE] resolved {} properties over {} rules ({} active)",
        winners.len(),
        rules.len(),
        rules.iter().filter(|rule| rule.is_active).count()
    );
    CascadeResolution { rules, winners }
}

/// Indices of the rules declaring `property`, best first.
fn rank_declarations(rules: &[Rule], property: &str) -> Vec<usize> {
    let mut ranked: Vec<usize> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.declares(property))
        .map(|(index, _)| index)
        .collect();
    ranked.sort_by(|&left, &right| {
        match (rules.get(left), rules.get(right)) {
            (Some(left_rule), Some(right_rule)) => compare_priority(
                &right_rule.priority_for(property),
                &left_rule.priority_for(property),
            )
            .then(right.cmp(&left)),
            _ => right.cmp(&left),
        }
    });
    ranked
}

/// A resolved property whose winning value disagrees with the computed style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Divergence {
    pub property: String,
    pub declared: String,
    pub computed: String,
}

/// Cross-check winners against the backend's computed style.
///
/// Values compare ASCII case-insensitively with whitespace collapsed. Properties the
/// computed style does not list (typically shorthands) cannot be checked and are skipped.
pub fn oracle_divergences(
    resolution: &CascadeResolution,
    computed: &BTreeMap<String, String>,
) -> Vec<Divergence> {
    resolution
        .winners
        .iter()
        .filter_map(|(property, winner)| {
            let computed_value = computed.get(property)?;
            (normalize_value(&winner.value) != normalize_value(computed_value)).then(|| {
                Divergence {
                    property: property.clone(),
                    declared: winner.value.clone(),
                    computed: computed_value.clone(),
                }
            })
        })
        .collect()
}

fn normalize_value(value: &str) -> String {
    value
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
