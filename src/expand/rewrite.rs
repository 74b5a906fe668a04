//! Top-down rewrite driver.
//!
//! Walks the original tree, consults the eligibility queries, and splices
//! execution results into a rebuilt green tree. All decisions read the
//! original snapshot; an expanded node's interior is never revisited.

use rayon::prelude::*;
use rowan::{GreenNode, NodeOrToken};

use super::SyntaxExpander;
use crate::parser::{SyntaxNode, parse};
use crate::semantic::SemanticModel;

/// Rewrite one tree, returning the root of the expanded copy.
pub fn expand_tree(
    root: &SyntaxNode,
    model: &SemanticModel,
    expander: &impl SyntaxExpander,
) -> SyntaxNode {
    SyntaxNode::new_root(rewrite_node(root, model, expander))
}

fn rewrite_node(
    node: &SyntaxNode,
    model: &SemanticModel,
    expander: &impl SyntaxExpander,
) -> GreenNode {
    if expander.should_expand_node(model, node) {
        return expander.try_expand_node(node, model).green().into_owned();
    }
    if !expander.should_expand_within_node(model, node) {
        return node.green().into_owned();
    }
    let children: Vec<_> = node
        .children_with_tokens()
        .map(|element| match element {
            NodeOrToken::Node(child) => NodeOrToken::Node(rewrite_node(&child, model, expander)),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.green().to_owned()),
        })
        .collect();
    GreenNode::new(node.kind().into(), children)
}

/// Parse, bind, and rewrite many independent sources in parallel.
///
/// Each source gets its own snapshot; nothing is shared between tasks except
/// the expander itself.
pub fn expand_sources<X>(sources: &[&str], expander: &X) -> Vec<String>
where
    X: SyntaxExpander + Sync,
{
    sources
        .par_iter()
        .map(|source| {
            let parse = parse(source);
            let root = parse.syntax();
            let model = SemanticModel::bind(&root);
            expand_tree(&root, &model, expander).text().to_string()
        })
        .collect()
}
