//! The four corrective predicates.
//!
//! Each one encodes a discovered defect of the canonical expansion primitive
//! (or of blind qualification in general). They are independent pure
//! functions; the eligibility and execution steps combine them explicitly.
//! An unresolved symbol or type always makes a predicate inapplicable.

use crate::parser::ast::{AstNode, CallExpr, Expr, MemberAccessExpr, NameRef};
use crate::parser::{SyntaxKind, SyntaxNode};
use crate::semantic::{Resolution, SemanticModel};

/// Callee prefix of the destination runtime's conversion helpers
const CONVERSION_PREFIX: &str = "Conversions.to";

/// A call on an instance expression: `this.m()`, `base.m()`, or a
/// freshly-constructed receiver `new T().m()`. Expanding these corrupts the
/// call into a bare identifier, so the whole subtree is off limits.
pub(crate) fn is_instance_receiver_call(node: &SyntaxNode) -> bool {
    let Some(call) = CallExpr::cast(node.clone()) else {
        return false;
    };
    let Some(Expr::MemberAccess(access)) = call.callee() else {
        return false;
    };
    matches!(
        access.receiver().map(|r| r.syntax().kind()),
        Some(SyntaxKind::THIS_EXPR | SyntaxKind::BASE_EXPR | SyntaxKind::OBJECT_CREATION_EXPR)
    )
}

/// The node resolves to a method carrying type parameters, whether referenced
/// directly or bound through an extension reduction. The primitive
/// mis-qualifies these and the destination simplifier cannot reduce them
/// back down.
pub(crate) fn is_generic_method_reference(model: &SemanticModel, node: &SyntaxNode) -> bool {
    model
        .symbol_of(node)
        .is_some_and(|sym| sym.is_generic_method())
}

/// The node resolves to a non-static member whose containing type is not on
/// the enclosing type's base chain. The primitive would prefix it with a
/// base qualifier; the real receiver is a sibling or otherwise-scoped object
/// and must be synthesized directly instead.
pub(crate) fn needs_explicit_receiver(
    model: &SemanticModel,
    node: &SyntaxNode,
    res: &Resolution,
) -> bool {
    let sym = model.symbols().get(res.symbol);
    if sym.is_static || !sym.is_member() {
        return false;
    }
    let Some(containing) = sym.containing_type else {
        return false;
    };
    match model.enclosing_chain_contains(node.text_range().start(), containing) {
        Some(contains) => !contains,
        None => false,
    }
}

/// The candidate wraps the node in a conversion the original context already
/// performed implicitly (static type == converted type), and the original was
/// not itself written in that form.
pub(crate) fn is_redundant_conversion(
    node: &SyntaxNode,
    model: &SemanticModel,
    candidate: &SyntaxNode,
) -> bool {
    is_redundant_conversion_call(node, model, candidate)
        || is_redundant_cast(node, model, candidate)
}

fn is_redundant_conversion_call(
    node: &SyntaxNode,
    model: &SemanticModel,
    candidate: &SyntaxNode,
) -> bool {
    let Some(call) = CallExpr::cast(candidate.clone()) else {
        return false;
    };
    let Some(callee) = call.callee() else {
        return false;
    };
    if !compact_text(callee.syntax()).starts_with(CONVERSION_PREFIX) {
        return false;
    }
    // Already written as a conversion call: leave the candidate alone
    if let Some(original) = CallExpr::cast(node.clone()) {
        let original_is_conversion = original
            .callee()
            .map(|c| compact_text(c.syntax()).starts_with(CONVERSION_PREFIX))
            .unwrap_or(false);
        if original_is_conversion {
            return false;
        }
    }
    matches!(model.type_info(node), Some(info) if info.is_identity())
}

fn is_redundant_cast(node: &SyntaxNode, model: &SemanticModel, candidate: &SyntaxNode) -> bool {
    if candidate.kind() != SyntaxKind::CAST_EXPR {
        return false;
    }
    if node.kind() == candidate.kind() {
        return false;
    }
    matches!(model.type_info(node), Some(info) if info.is_identity())
}

/// Peel member accesses down to the innermost simple name, if any.
/// Calls and other node kinds have none.
pub(crate) fn innermost_name_ref(node: &SyntaxNode) -> Option<NameRef> {
    let mut current = node.clone();
    loop {
        match MemberAccessExpr::cast(current.clone()) {
            Some(access) => current = access.name()?.syntax().clone(),
            None => return NameRef::cast(current),
        }
    }
}

/// Trivia-insensitive text of a node
fn compact_text(node: &SyntaxNode) -> String {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
        .map(|t| t.text().to_string())
        .collect()
}
