#![cfg(test)]

use core::error::Error;
use css_cascade::{
    CascadeResolution, INLINE_SELECTOR, RawOrigin, RawRule, collect_rules, oracle_divergences,
    resolve_cascade,
};
use css_selectors::{Specificity, specificity_of};
use std::collections::BTreeMap;

/// Type alias for a matched rule fixture: (selector, declaration block, origin)
type RuleSpec<'rule> = (&'rule str, &'rule str, RawOrigin);

fn resolve(specs: &[RuleSpec<'_>]) -> CascadeResolution {
    let records: Vec<RawRule> = specs
        .iter()
        .map(|&(selector, block, origin)| RawRule::from_declaration_block(selector, block, origin))
        .collect();
    resolve_cascade(collect_rules(&records), None)
}

fn winner_selector<'res>(resolution: &'res CascadeResolution, property: &str) -> Option<&'res str> {
    resolution
        .winning_rule(property)
        .map(|rule| rule.selector.as_str())
}

fn computed(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|&(name, value)| (name.to_owned(), value.to_owned()))
        .collect()
}

/// Selector with `ids` id selectors, `classes` class selectors and `elements` type selectors.
fn selector_with(ids: u16, classes: u16, elements: u16) -> String {
    let mut compound: String = (0..ids).map(|index| format!("#i{index}")).collect();
    compound.extend((0..classes).map(|index| format!(".c{index}")));
    let mut parts: Vec<String> = (1..elements).map(|_| "div".to_owned()).collect();
    let subject = if elements > 0 {
        format!("div{compound}")
    } else if compound.is_empty() {
        "*".to_owned()
    } else {
        compound
    };
    parts.push(subject);
    parts.join(" ")
}

fn bucket_tuples(max: u16) -> Vec<(u16, u16, u16)> {
    let mut tuples = Vec::new();
    for ids in 0..=max {
        for classes in 0..=max {
            for elements in 0..=max {
                tuples.push((ids, classes, elements));
            }
        }
    }
    tuples
}

/// `<div id="x" class="a">` with `.a{color:red}` and `#x{color:blue}`.
///
/// # Errors
/// Returns an error if the id rule does not win or `.a` is not annotated.
#[test]
fn id_beats_class_and_annotates_loser() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        (".a", "color: red", RawOrigin::Regular),
        ("#x", "color: blue", RawOrigin::Regular),
    ]);
    if winner_selector(&resolution, "color") != Some("#x") {
        return Err("#x should win color".into());
    }
    let values = resolution.winning_values();
    if values.get("color").map(String::as_str) != Some("blue") {
        return Err("color should resolve to blue".into());
    }
    let class_rule = resolution
        .rules
        .iter()
        .find(|rule| rule.selector == ".a")
        .ok_or("missing .a rule")?;
    if class_rule.overridden_by.as_deref() != Some("#x") || class_rule.is_active {
        return Err(".a should be overridden by #x and inactive".into());
    }
    if resolution.overridden_rules().count() != 1 || resolution.applied_rules().count() != 1 {
        return Err("expected one applied and one overridden rule".into());
    }
    Ok(())
}

/// Same element plus `style="color:green"`.
///
/// # Errors
/// Returns an error if the inline declaration does not win.
#[test]
fn inline_style_wins_over_id() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        (".a", "color: red", RawOrigin::Regular),
        ("#x", "color: blue", RawOrigin::Regular),
        ("", "color: green", RawOrigin::Inline),
    ]);
    if winner_selector(&resolution, "color") != Some(INLINE_SELECTOR) {
        return Err("inline style should win color".into());
    }
    if resolution.winning_values().get("color").map(String::as_str) != Some("green") {
        return Err("color should resolve to green".into());
    }
    Ok(())
}

/// Any inline declaration outranks any non-important author declaration, even one
/// listed later with more ids.
///
/// # Errors
/// Returns an error if a stylesheet rule beats the inline style.
#[test]
fn inline_outranks_every_normal_author_rule() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        ("", "margin: 1px", RawOrigin::Inline),
        ("#a#b#c.d.e", "margin: 2px", RawOrigin::Regular),
    ]);
    if winner_selector(&resolution, "margin") != Some(INLINE_SELECTOR) {
        return Err("inline margin should win".into());
    }
    Ok(())
}

/// `!important` in a stylesheet beats a normal inline declaration.
///
/// # Errors
/// Returns an error if importance is not the most significant key.
#[test]
fn important_author_beats_normal_inline() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        ("p", "color: purple !important", RawOrigin::Regular),
        ("", "color: green", RawOrigin::Inline),
    ]);
    if winner_selector(&resolution, "color") != Some("p") {
        return Err("important author declaration should win".into());
    }
    let winner = resolution.winners.get("color").ok_or("no color winner")?;
    if !winner.important {
        return Err("winner should be flagged important".into());
    }
    Ok(())
}

/// Author rules beat user-agent rules regardless of specificity.
///
/// # Errors
/// Returns an error if origin precedence is ignored.
#[test]
fn author_beats_user_agent() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        ("div#main.box", "display: flex", RawOrigin::UserAgent),
        ("div", "display: grid", RawOrigin::Regular),
    ]);
    if winner_selector(&resolution, "display") != Some("div") {
        return Err("author display should win".into());
    }
    Ok(())
}

/// Equal specificity falls back to source order; later wins.
///
/// # Errors
/// Returns an error if the earlier rule wins the tie.
#[test]
fn later_rule_wins_ties() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        (".a", "color: red", RawOrigin::Regular),
        (".b", "color: blue", RawOrigin::Regular),
    ]);
    if winner_selector(&resolution, "color") != Some(".b") {
        return Err(".b should win the tie".into());
    }
    Ok(())
}

/// A rule can win some properties and lose others; it stays active.
///
/// # Errors
/// Returns an error if per-property verdicts are mixed up.
#[test]
fn per_property_verdicts() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        (".card", "color: red; padding: 4px; margin: 0", RawOrigin::Regular),
        ("#hero", "color: blue", RawOrigin::Regular),
        ("div.card.wide", "margin: 8px", RawOrigin::Regular),
    ]);
    let card = resolution
        .rules
        .iter()
        .find(|rule| rule.selector == ".card")
        .ok_or("missing .card")?;
    if !card.is_active {
        return Err(".card still wins padding".into());
    }
    if card.overridden_by.as_deref() != Some("#hero") {
        return Err("first lost property is color, lost to #hero".into());
    }
    if card.overridden_properties.get("margin").map(String::as_str) != Some("div.card.wide") {
        return Err("margin should be overridden by div.card.wide".into());
    }
    if winner_selector(&resolution, "padding") != Some(".card") {
        return Err(".card should win padding".into());
    }
    Ok(())
}

/// For every fixture, winning values match the computed style.
///
/// # Errors
/// Returns an error if the oracle reports a divergence.
#[test]
fn oracle_agrees_with_fixture_computed_style() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        ("div", "display: block; color: black", RawOrigin::UserAgent),
        (".a", "color: red; font-size: 14px", RawOrigin::Regular),
        ("#x", "color: blue", RawOrigin::Regular),
        ("", "font-size: 16px", RawOrigin::Inline),
    ]);
    let style = computed(&[
        ("display", "block"),
        ("color", "Blue"),
        ("font-size", "16px"),
        ("margin-top", "0px"),
    ]);
    let divergences = oracle_divergences(&resolution, &style);
    if !divergences.is_empty() {
        return Err(format!("unexpected divergences: {divergences:?}").into());
    }

    let wrong = computed(&[("color", "red")]);
    let reported = oracle_divergences(&resolution, &wrong);
    if reported.len() != 1 || reported.first().map(|div| div.property.as_str()) != Some("color") {
        return Err("a wrong computed color should be reported".into());
    }
    Ok(())
}

/// Only requested properties are resolved.
///
/// # Errors
/// Returns an error if the filter is ignored.
#[test]
fn property_filter_limits_resolution() -> Result<(), Box<dyn Error>> {
    let records = vec![RawRule::from_declaration_block(
        ".a",
        "color: red; margin: 0",
        RawOrigin::Regular,
    )];
    let only = vec!["Color".to_owned()];
    let resolution = resolve_cascade(collect_rules(&records), Some(&only));
    if resolution.winners.len() != 1 || !resolution.is_declared("color") {
        return Err("only color should be resolved".into());
    }
    Ok(())
}

/// Resolving twice yields identical verdicts.
///
/// # Errors
/// Returns an error if re-resolution changes anything.
#[test]
fn resolution_is_idempotent() -> Result<(), Box<dyn Error>> {
    let first = resolve(&[
        (".a", "color: red", RawOrigin::Regular),
        ("#x", "color: blue", RawOrigin::Regular),
    ]);
    let second = resolve_cascade(first.rules.clone(), None);
    if first != second {
        return Err("second resolution differs".into());
    }
    Ok(())
}

/// Rules serialize with camelCase keys and the source type tag.
///
/// # Errors
/// Returns an error if serialization fails or the shape is wrong.
#[test]
fn rule_serialization_shape() -> Result<(), Box<dyn Error>> {
    let resolution = resolve(&[
        (".a", "color: red", RawOrigin::Regular),
        ("#x", "color: blue", RawOrigin::Regular),
    ]);
    let loser = resolution.rules.first().ok_or("missing rule")?;
    let json = serde_json::to_value(loser)?;
    if json["overriddenBy"] != "#x" || json["isActive"] != false {
        return Err(format!("unexpected loser json: {json}").into());
    }
    if json["source"]["type"] != "stylesheet" || json["specificity"]["class"] != 1 {
        return Err(format!("unexpected source/specificity json: {json}").into());
    }
    if json.get("sourceOrder").is_some() {
        return Err("source order is internal".into());
    }
    Ok(())
}

/// Every bucket combination up to 12 is counted exactly, and specificity order (as tuples
/// and as integer keys) is the lexicographic order of the buckets.
///
/// # Errors
/// Returns an error on the first miscounted selector or misordered pair.
#[test]
fn specificity_orders_buckets_lexicographically() -> Result<(), Box<dyn Error>> {
    let tuples = bucket_tuples(12);
    let mut computed_specificities = Vec::with_capacity(tuples.len());
    for &(ids, classes, elements) in &tuples {
        let selector = selector_with(ids, classes, elements);
        let specificity = specificity_of(&selector);
        if specificity != Specificity::new(ids, classes, elements) {
            return Err(format!("{selector} counted as {specificity}").into());
        }
        computed_specificities.push(specificity);
    }
    for (lhs_tuple, lhs) in tuples.iter().zip(&computed_specificities) {
        for (rhs_tuple, rhs) in tuples.iter().zip(&computed_specificities) {
            let expected = lhs_tuple.cmp(rhs_tuple);
            if lhs.cmp(rhs) != expected || lhs.key().cmp(&rhs.key()) != expected {
                return Err(format!("{lhs} vs {rhs} should be {expected:?}").into());
            }
        }
    }
    Ok(())
}

/// Between two author rules the greater bucket tuple wins, and equal tuples go to the later
/// rule, whichever bucket the difference is in.
///
/// # Errors
/// Returns an error naming the first pair resolved to the wrong winner.
#[test]
fn greater_bucket_tuple_wins_the_cascade() -> Result<(), Box<dyn Error>> {
    let tuples = bucket_tuples(3);
    for &(first_ids, first_classes, first_elements) in &tuples {
        let first = selector_with(first_ids, first_classes, first_elements);
        for &(second_ids, second_classes, second_elements) in &tuples {
            let second = selector_with(second_ids, second_classes, second_elements);
            let resolution = resolve(&[
                (first.as_str(), "color: red", RawOrigin::Regular),
                (second.as_str(), "color: blue", RawOrigin::Regular),
            ]);
            let first_wins = (first_ids, first_classes, first_elements)
                > (second_ids, second_classes, second_elements);
            let expected = if first_wins { &first } else { &second };
            if winner_selector(&resolution, "color") != Some(expected.as_str()) {
                return Err(format!("{first} vs {second}: expected {expected} to win").into());
            }
        }
    }
    Ok(())
}
