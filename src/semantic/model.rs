//! The semantic model: one immutable resolution snapshot per tree.
//!
//! All queries are pure reads over tables built by a single binding pass.
//! Node references are stored as `SyntaxNodePtr` (kind + range), so the
//! model is `Send + Sync` and safe to read concurrently.

use rowan::TokenAtOffset;
use rustc_hash::FxHashMap;

use super::symbols::{Symbol, SymbolId, SymbolTable};
use super::types::{TypeId, TypeTable};
use crate::base::TextSize;
use crate::parser::{GreenNode, SyntaxNode, SyntaxNodePtr};

/// The (static type, converted type) pair of an expression node.
///
/// `converted` differs from `ty` exactly when the surrounding context applies
/// an implicit widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub ty: TypeId,
    pub converted: TypeId,
}

impl TypeInfo {
    /// A conversion to `converted` would be a no-op
    pub fn is_identity(&self) -> bool {
        self.ty == self.converted
    }
}

/// The resolved meaning of a reference node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub symbol: SymbolId,
    /// Bound through an extension reduction on the receiver
    pub reduced: bool,
    /// The explicit receiver expression, when one exists: a member-access
    /// receiver or the subject of the enclosing `with` block. Absent for
    /// implicit-`this` members, locals, and static references.
    pub receiver: Option<SyntaxNodePtr>,
}

/// A member-reference operation with its captured receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberReference {
    pub member: SymbolId,
    pub instance: Option<SyntaxNodePtr>,
}

/// Immutable semantic snapshot over one parsed tree
#[derive(Debug)]
pub struct SemanticModel {
    pub(crate) green: GreenNode,
    pub(crate) types: TypeTable,
    pub(crate) symbols: SymbolTable,
    pub(crate) resolutions: FxHashMap<SyntaxNodePtr, Resolution>,
    pub(crate) type_facts: FxHashMap<SyntaxNodePtr, TypeInfo>,
    /// Declaration node → the named type it declares
    pub(crate) declared: FxHashMap<SyntaxNodePtr, TypeId>,
}

impl SemanticModel {
    /// Build the semantic snapshot for a parsed tree.
    pub fn bind(root: &SyntaxNode) -> SemanticModel {
        super::binder::bind(root)
    }

    /// A fresh cursor over the bound tree.
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Resolve a reference node to its symbol, if the binder gave it one.
    pub fn symbol(&self, node: &SyntaxNode) -> Option<&Resolution> {
        self.resolutions.get(&SyntaxNodePtr::new(node))
    }

    /// Shorthand for the symbol data behind a node's resolution.
    pub fn symbol_of(&self, node: &SyntaxNode) -> Option<&Symbol> {
        self.symbol(node).map(|res| self.symbols.get(res.symbol))
    }

    /// The (static, converted) type pair of an expression node.
    pub fn type_info(&self, node: &SyntaxNode) -> Option<TypeInfo> {
        self.type_facts.get(&SyntaxNodePtr::new(node)).copied()
    }

    /// The member-reference operation for a node resolving to a field,
    /// property, or method.
    pub fn member_reference(&self, node: &SyntaxNode) -> Option<MemberReference> {
        let res = self.symbol(node)?;
        if !self.symbols.get(res.symbol).is_member() {
            return None;
        }
        Some(MemberReference {
            member: res.symbol,
            instance: res.receiver.clone(),
        })
    }

    /// Materialize a stored receiver pointer against this model's tree.
    pub fn instance_syntax(&self, reference: &MemberReference) -> Option<SyntaxNode> {
        reference
            .instance
            .as_ref()
            .map(|ptr| ptr.to_node(&self.root()))
    }

    /// The named type a declaration node declares.
    pub fn declared_named_type(&self, node: &SyntaxNode) -> Option<TypeId> {
        self.declared.get(&SyntaxNodePtr::new(node)).copied()
    }

    /// The nearest enclosing declared named type for a position.
    ///
    /// Takes the covering token and walks the ancestor chain until a
    /// declaring node is found. Trivia belongs to the token that follows it;
    /// at the end of the source the walk steps back to the last real token.
    /// `None` when no declaration encloses the position.
    pub fn enclosing_named_type(&self, offset: TextSize) -> Option<TypeId> {
        let root = self.root();
        let offset = offset.min(root.text_range().end());
        let mut token = match root.token_at_offset(offset) {
            TokenAtOffset::None => root.last_token()?,
            TokenAtOffset::Single(t) => t,
            TokenAtOffset::Between(_, right) => right,
        };
        if token.kind().is_trivia() {
            let mut forward = token.clone();
            let forward = loop {
                match forward.next_token() {
                    Some(t) if t.kind().is_trivia() => forward = t,
                    other => break other,
                }
            };
            token = match forward {
                Some(t) => t,
                None => {
                    let mut back = token;
                    loop {
                        back = back.prev_token()?;
                        if !back.kind().is_trivia() {
                            break back;
                        }
                    }
                }
            };
        }
        token
            .parent_ancestors()
            .find_map(|node| self.declared.get(&SyntaxNodePtr::new(&node)).copied())
    }

    /// True when `target` appears on the base chain (self-inclusive) of the
    /// type enclosing `offset`. `None` when there is no enclosing type.
    pub fn enclosing_chain_contains(&self, offset: TextSize, target: TypeId) -> Option<bool> {
        let enclosing = self.enclosing_named_type(offset)?;
        Some(self.types.base_chain(enclosing).any(|t| t == target))
    }
}
