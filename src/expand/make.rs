//! Direct construction of replacement nodes.
//!
//! The synthesis path builds a member access straight from green parts,
//! reusing the receiver expression's own syntax verbatim, so no reparse and
//! no precedence surprises are possible.

use rowan::{GreenNode, GreenToken, NodeOrToken};
use smol_str::SmolStr;
use thiserror::Error;

use crate::parser::ast::NameRef;
use crate::parser::{SyntaxKind, SyntaxNode};

/// Construction failures; callers treat these as "leave the node alone"
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MakeError {
    #[error("'{0}' is not a valid identifier")]
    InvalidName(SmolStr),
    #[error("receiver expression is empty")]
    EmptyReceiver,
}

/// `receiver.name`, with the receiver's syntax captured as-is
pub fn member_access(receiver: &SyntaxNode, name: &NameRef) -> Result<SyntaxNode, MakeError> {
    if receiver.text_range().is_empty() {
        return Err(MakeError::EmptyReceiver);
    }
    let name_green = name_ref_green(&name.text())?;
    let children = vec![
        NodeOrToken::Node(receiver.green().into_owned()),
        NodeOrToken::Token(GreenToken::new(SyntaxKind::DOT.into(), ".")),
        NodeOrToken::Node(name_green),
    ];
    Ok(SyntaxNode::new_root(GreenNode::new(
        SyntaxKind::MEMBER_ACCESS_EXPR.into(),
        children,
    )))
}

fn name_ref_green(text: &str) -> Result<GreenNode, MakeError> {
    if !is_identifier(text) {
        return Err(MakeError::InvalidName(SmolStr::new(text)));
    }
    Ok(GreenNode::new(
        SyntaxKind::NAME_REF.into(),
        vec![NodeOrToken::Token(GreenToken::new(
            SyntaxKind::IDENT.into(),
            text,
        ))],
    ))
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(unicode_ident::is_xid_continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::AstNode;
    use crate::parser::parse_expr;

    fn name_of(input: &str) -> NameRef {
        parse_expr(input)
            .syntax()
            .first_child()
            .and_then(NameRef::cast)
            .unwrap()
    }

    #[test]
    fn test_member_access_from_parts() {
        let receiver = parse_expr("buddy").syntax().first_child().unwrap();
        let name = name_of("total");
        let node = member_access(&receiver, &name).unwrap();
        assert_eq!(node.kind(), SyntaxKind::MEMBER_ACCESS_EXPR);
        assert_eq!(node.text().to_string(), "buddy.total");
    }

    #[test]
    fn test_member_access_keeps_complex_receiver() {
        let receiver = parse_expr("lookup(1).next").syntax().first_child().unwrap();
        let name = name_of("total");
        let node = member_access(&receiver, &name).unwrap();
        assert_eq!(node.text().to_string(), "lookup(1).next.total");
    }

    #[test]
    fn test_invalid_identifier_is_rejected() {
        assert_eq!(
            name_ref_green("not an ident"),
            Err(MakeError::InvalidName(SmolStr::new("not an ident")))
        );
        assert_eq!(name_ref_green(""), Err(MakeError::InvalidName(SmolStr::new(""))));
    }
}
