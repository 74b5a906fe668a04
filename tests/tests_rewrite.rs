//! The rewrite driver end to end: whole-tree expansion, subtree
//! suppression, idempotence, and the parallel batch entry point.

mod helpers;

use qualex::expand::{CorrectiveExpander, expand_sources, expand_tree};
use qualex::semantic::SemanticModel;

use helpers::{FIXTURE, PassThrough, QualifyWithThis, analyze};

#[test]
fn test_pass_through_rewrite_only_synthesizes_receivers() {
    // With a primitive that declines every expansion, the only change in
    // the whole tree is the corrective receiver synthesis.
    let model = analyze(FIXTURE);
    let expander = CorrectiveExpander::new(PassThrough);
    let rewritten = expand_tree(&model.root(), &model, &expander);
    let expected = FIXTURE.replace("total = 1;", "buddy.total = 1;");
    assert_eq!(rewritten.text().to_string(), expected);
}

#[test]
fn test_instance_receiver_subtrees_survive_byte_identical() {
    let model = analyze(FIXTURE);
    let expander = CorrectiveExpander::new(PassThrough);
    let rewritten = expand_tree(&model.root(), &model, &expander).text().to_string();
    assert!(rewritten.contains("new Sibling().bump();"));
    assert!(rewritten.contains("this.bump_all();"));
}

#[test]
fn test_rewrite_is_idempotent() {
    let model = analyze(FIXTURE);
    let expander = CorrectiveExpander::new(PassThrough);
    let once = expand_tree(&model.root(), &model, &expander).text().to_string();

    let model2 = analyze(&once);
    let twice = expand_tree(&model2.root(), &model2, &expander).text().to_string();
    assert_eq!(once, twice);
}

#[test]
fn test_qualifying_primitive_preserves_meaning() {
    // A faithful primitive qualifies bare instance fields with `this`; the
    // rewritten program must resolve every probe to the same symbol.
    let model = analyze(FIXTURE);
    let expander = CorrectiveExpander::new(QualifyWithThis);
    let rewritten = expand_tree(&model.root(), &model, &expander).text().to_string();

    assert!(rewritten.contains("this.shared_count = 2;"));
    assert!(rewritten.contains("with (this.buddy)"));
    assert!(rewritten.contains("buddy.total = 1;"));

    let again = analyze(&rewritten);
    for (text, containing) in [("shared_count", "Base"), ("total", "Sibling"), ("buddy", "Derived")]
    {
        let root = again.root();
        let node = helpers::find_name_ref(&root, text);
        let sym = again.symbol_of(&node).unwrap_or_else(|| panic!("'{text}' unresolved"));
        assert_eq!(
            &*again.types().get(sym.containing_type.unwrap()).name,
            containing,
            "probe '{text}'"
        );
    }
}

#[test]
fn test_parallel_batch_matches_sequential_results() {
    let small = "class Lone { int n; void run() { n = 1; } }";
    let sources = [FIXTURE, small, FIXTURE];
    let expander = CorrectiveExpander::new(PassThrough);

    let batch = expand_sources(&sources, &expander);

    let sequential: Vec<String> = sources
        .iter()
        .map(|s| {
            let model = analyze(s);
            expand_tree(&model.root(), &model, &expander).text().to_string()
        })
        .collect();
    assert_eq!(batch, sequential);
}

#[test]
fn test_unparseable_input_degrades_to_recovery_text() {
    // The driver never panics on error trees; unresolved syntax is carried
    // through unchanged.
    let source = "class Broken { void run() { ??? ; } }";
    let parse = qualex::parser::parse(source);
    assert!(!parse.ok());
    let root = parse.syntax();
    let model = SemanticModel::bind(&root);
    let expander = CorrectiveExpander::new(PassThrough);
    let rewritten = expand_tree(&root, &model, &expander);
    assert_eq!(rewritten.text().to_string(), source);
}
