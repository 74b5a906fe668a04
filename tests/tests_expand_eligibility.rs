//! Eligibility decisions: which nodes may be expanded, and where the driver
//! may descend.

mod helpers;

use once_cell::sync::Lazy;
use qualex::expand::{CorrectiveExpander, SyntaxExpander};
use qualex::parser::SyntaxKind;
use qualex::semantic::SemanticModel;

use helpers::{FIXTURE, PassThrough, analyze, find_call, find_name_ref};

static MODEL: Lazy<SemanticModel> = Lazy::new(|| analyze(FIXTURE));

fn expander() -> CorrectiveExpander<PassThrough> {
    CorrectiveExpander::new(PassThrough)
}

#[test]
fn test_instance_receiver_calls_are_fully_suppressed() {
    let root = MODEL.root();
    let expander = expander();
    for callee in ["new Sibling().bump", "this.bump_all"] {
        let call = find_call(&root, callee);
        assert!(
            !expander.should_expand_node(&MODEL, &call),
            "{callee} must not be eligible"
        );
        assert!(
            !expander.should_expand_within_node(&MODEL, &call),
            "{callee} subtree must not be visited"
        );
    }
}

#[test]
fn test_generic_method_calls_are_skipped_but_visited() {
    let root = MODEL.root();
    let expander = expander();

    let direct = find_call(&root, "pick");
    assert!(!expander.should_expand_node(&MODEL, &direct));
    assert!(expander.should_expand_within_node(&MODEL, &direct));

    let reduced = find_call(&root, "buddy.grow");
    assert!(!expander.should_expand_node(&MODEL, &reduced));
    assert!(expander.should_expand_within_node(&MODEL, &reduced));
}

#[test]
fn test_generic_method_name_refs_are_skipped() {
    let root = MODEL.root();
    let expander = expander();
    let name = find_name_ref(&root, "pick");
    assert!(!expander.should_expand_node(&MODEL, &name));
}

#[test]
fn test_plain_references_are_eligible() {
    let root = MODEL.root();
    let expander = expander();
    for text in ["shared_count", "total", "buddy", "n"] {
        let name = find_name_ref(&root, text);
        assert!(
            expander.should_expand_node(&MODEL, &name),
            "'{text}' should be eligible"
        );
        assert!(
            !expander.should_expand_within_node(&MODEL, &name),
            "eligible '{text}' needs no interior visit"
        );
    }
}

#[test]
fn test_ordinary_calls_and_member_accesses_are_eligible() {
    let root = MODEL.root();
    let expander = expander();

    let call = find_call(&root, "scale");
    assert!(expander.should_expand_node(&MODEL, &call));

    let static_call = find_call(&root, "Conversions.to_int");
    assert!(expander.should_expand_node(&MODEL, &static_call));
}

#[test]
fn test_non_expression_nodes_are_visited_not_expanded() {
    let root = MODEL.root();
    let expander = expander();
    let class = root
        .descendants()
        .find(|n| n.kind() == SyntaxKind::CLASS_DECL)
        .unwrap();
    assert!(!expander.should_expand_node(&MODEL, &class));
    assert!(expander.should_expand_within_node(&MODEL, &class));
}

#[test]
fn test_base_chain_mismatch_does_not_gate_eligibility() {
    // The receiver-synthesis case stays eligible; it is routed inside
    // execution, not filtered out here.
    let root = MODEL.root();
    let expander = expander();
    let name = find_name_ref(&root, "total");
    assert!(expander.should_expand_node(&MODEL, &name));
}
