//! Expansion execution: receiver synthesis, delegation, and the
//! redundant-conversion filter.

mod helpers;

use once_cell::sync::Lazy;
use qualex::expand::{CorrectiveExpander, SyntaxExpander};
use qualex::semantic::SemanticModel;

use helpers::{
    CastWrap, ConversionWrap, FIXTURE, PassThrough, Unreachable, analyze, find_call,
    find_call_arg, find_name_ref, find_var_init,
};

static MODEL: Lazy<SemanticModel> = Lazy::new(|| analyze(FIXTURE));

#[test]
fn test_foreign_member_gets_synthesized_receiver() {
    // `total` resolves to Sibling.total; the enclosing chain is
    // Derived -> Base -> object, so the captured `with` subject becomes the
    // explicit receiver. The primitive must never be consulted.
    let root = MODEL.root();
    let node = find_name_ref(&root, "total");
    let expander = CorrectiveExpander::new(Unreachable);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(result.text().to_string(), "buddy.total");
}

#[test]
fn test_inherited_member_delegates_to_primitive() {
    // `shared_count` lives on Base, which is on the enclosing chain, so the
    // synthesis path must not fire.
    let root = MODEL.root();
    let node = find_name_ref(&root, "shared_count");
    let expander = CorrectiveExpander::new(PassThrough);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(result.text().to_string(), "shared_count");
}

#[test]
fn test_redundant_conversion_call_is_discarded() {
    // `int copy = n;` converts nothing: static and converted types agree,
    // so a Conversions wrapper is a provable no-op.
    let root = MODEL.root();
    let node = find_var_init(&root, "copy");
    let expander = CorrectiveExpander::new(ConversionWrap);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(result.text().to_string(), "n");
}

#[test]
fn test_widening_conversion_call_is_kept() {
    // The argument of `scale(n)` is converted int -> long, so the wrapper
    // carries real meaning and survives.
    let root = MODEL.root();
    let node = find_call_arg(&root, "scale");
    let expander = CorrectiveExpander::new(ConversionWrap);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(result.text().to_string(), "Conversions.to_long(n)");
}

#[test]
fn test_existing_conversion_call_is_not_refiltered() {
    // The original is already written as a conversion call; the filter only
    // discards conversions the expansion itself introduced.
    let root = MODEL.root();
    let node = find_call(&root, "Conversions.to_int");
    let expander = CorrectiveExpander::new(ConversionWrap);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(
        result.text().to_string(),
        "Conversions.to_long(Conversions.to_int(n))"
    );
}

#[test]
fn test_redundant_cast_is_discarded() {
    let root = MODEL.root();
    let node = find_var_init(&root, "copy");
    let expander = CorrectiveExpander::new(CastWrap);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(result.text().to_string(), "n");
}

#[test]
fn test_cast_of_same_kind_is_not_refiltered() {
    // `(long) n` re-emitted as a cast keeps the candidate: the kind check
    // exempts originals already written in cast form.
    let root = MODEL.root();
    let node = find_var_init(&root, "wide");
    let expander = CorrectiveExpander::new(CastWrap);
    let result = expander.try_expand_node(&node, &MODEL);
    assert_eq!(result.text().to_string(), "(long) (long) n");
}

#[test]
fn test_unresolved_nodes_fail_open() {
    // A snippet with no semantic facts at all: execution degrades to the
    // primitive's answer.
    let model = analyze("class Lone { void run() { mystery; } }");
    let root = model.root();
    let node = find_name_ref(&root, "mystery");
    let expander = CorrectiveExpander::new(PassThrough);
    let result = expander.try_expand_node(&node, &model);
    assert_eq!(result.text().to_string(), "mystery");
}
