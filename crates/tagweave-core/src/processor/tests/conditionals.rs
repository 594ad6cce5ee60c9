//! Conditional block tests

use super::helpers::{Captured, render, shop, with_custom};
use super::*;

fn tiers(price: i64) -> String {
    with_custom(&[("price", Value::Int(price))]).process(
        "[if:%custom:price% > 100]Premium[elseif:%custom:price% > 50]Standard[else]Basic[/if]",
        1,
    )
}

#[test]
fn test_price_tiers() {
    assert_eq!(tiers(75), "Standard");
    assert_eq!(tiers(150), "Premium");
    assert_eq!(tiers(10), "Basic");
    assert_eq!(tiers(100), "Standard");
}

#[test]
fn test_nested_blocks_are_reduced_outside_in() {
    let template = "[if:%custom:a% == 'yes']outer[if:%custom:b% == 'yes']inner[/if]after[/if]";
    let render_with = |a: &str, b: &str| {
        with_custom(&[("a", Value::from(a)), ("b", Value::from(b))]).process(template, 1)
    };
    assert_eq!(render_with("yes", "no"), "outerafter");
    assert_eq!(render_with("yes", "yes"), "outerinnerafter");
    assert_eq!(render_with("no", "yes"), "");
    assert_eq!(render_with("no", "no"), "");
}

#[test]
fn test_nested_block_conditions_are_not_evaluated_when_outer_fails() {
    let (processor, _) = shop();
    let custom = Arc::new(super::helpers::MapSource::new(&[("gate", Value::from("off"))]));
    let processor = processor.with_source(Source::Custom, custom.clone());
    let out = processor.process(
        "[if:%custom:gate% == 'on'][if:%custom:deep% == 'x']x[/if][/if]done",
        1,
    );
    assert_eq!(out, "done");
    // Only `gate` was looked up
    assert_eq!(custom.calls(), 1);
}

#[test]
fn test_sibling_blocks() {
    let out = render("[if:%custom:price% > 50]A[/if]-[if:%custom:price% < 50]B[else]C[/if]");
    assert_eq!(out, "A-C");
}

#[test]
fn test_elseif_inside_nested_block_belongs_to_it() {
    let template = "[if:%custom:price% > 50][if:%custom:size% == 'small']S[elseif:%custom:size% == 'large']L[/if][else]cheap[/if]";
    assert_eq!(render(template), "L");
}

#[test]
fn test_no_branch_matches_renders_empty() {
    assert_eq!(render("<[if:%custom:price% > 1000]rich[/if]>"), "<>");
}

#[test]
fn test_branch_body_tags_are_resolved() {
    assert_eq!(render("[if:%native:title% == 'Hello']Title: %native:title%[/if]"), "Title: Hello");
}

#[test]
fn test_string_operators() {
    assert_eq!(render("[if:%custom:colors% contains 'green']yes[/if]"), "yes");
    assert_eq!(render("[if:%custom:colors% not_contains 'pink']no pink[/if]"), "no pink");
    assert_eq!(render("[if:%custom:sku% != 'AB-12']x[else]same[/if]"), "same");
}

#[test]
fn test_condition_tag_filters_are_honoured() {
    assert_eq!(render("[if:%native:title|upper% == 'HELLO']shout[/if]"), "shout");
    assert_eq!(render("[if:%custom:colors|count% >= 3]many[/if]"), "many");
}

#[test]
fn test_non_numeric_greater_than_is_false() {
    let processor = with_custom(&[("word", Value::from("banana"))]);
    for n in ["0", "1", "5", "-1"] {
        let expected = n == "-1";
        let out = processor.process(&format!("[if:%custom:word% > {n}]yes[else]no[/if]"), 1);
        assert_eq!(out, if expected { "yes" } else { "no" }, "banana > {n}");
    }
}

#[test]
fn test_unquoted_literal() {
    assert_eq!(render("[if:%custom:size% == large]big[/if]"), "big");
}

#[test]
fn test_literal_with_bracket_in_quotes() {
    let processor = with_custom(&[("code", Value::from("a]b"))]);
    assert_eq!(processor.process("[if:%custom:code% == 'a]b']match[/if]", 1), "match");
}

#[test]
fn test_malformed_condition_is_false_and_logged() {
    let (processor, logger) = shop();
    let out = processor.process("[if:%custom:price%>50]glued[else]fallback[/if]", 1);
    assert_eq!(out, "fallback");
    let debug = logger.messages(LogLevel::Debug);
    assert!(debug.iter().any(|m| m.contains("Malformed condition")));
}

#[test]
fn test_evaluate_standalone() {
    let (processor, _) = shop();
    assert!(processor.evaluate_standalone("%custom:price% > 50", 1));
    assert!(!processor.evaluate_standalone("%custom:price% > 100", 1));
    assert!(processor.evaluate_standalone("%custom:stock% == '0'", 1));
    assert!(!processor.evaluate_standalone("not a condition", 1));
    assert!(!processor.evaluate_standalone("", 1));
}

#[test]
fn test_reduction_limit_stops_and_warns() {
    let logger = Arc::new(Captured::default());
    let config = EngineConfig {
        max_reductions: 2,
        ..EngineConfig::default()
    };
    let processor = Processor::new(config)
        .with_source(Source::Custom, Arc::new(super::helpers::MapSource::new(&[("on", Value::from("1"))])))
        .with_logger(logger.clone());

    let block = "[if:%custom:on% == '1']x[/if]";
    let out = processor.process(&block.repeat(3), 1);
    assert_eq!(out, format!("xx{block}"));
    assert_eq!(logger.messages(LogLevel::Warning).len(), 1);
}

#[test]
fn test_unclosed_block_stays_literal() {
    let out = render("[if:%custom:price% > 50]open ended %native:title%");
    assert_eq!(out, "[if:%custom:price% > 50]open ended Hello");
}
