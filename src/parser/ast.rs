//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for dialect syntax nodes.
//! Each struct wraps a SyntaxNode and provides methods to access children.

use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn first_token_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    first_token_of_kind(node, kind).is_some()
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn class_decls(&self) -> impl Iterator<Item = ClassDecl> + '_ {
        self.0.children().filter_map(ClassDecl::cast)
    }

    pub fn extension_decls(&self) -> impl Iterator<Item = ExtensionDecl> + '_ {
        self.0.children().filter_map(ExtensionDecl::cast)
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(ClassDecl, CLASS_DECL);

impl ClassDecl {
    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn base_list(&self) -> Option<BaseList> {
        self.0.children().find_map(BaseList::cast)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        self.0.children().filter_map(Member::cast)
    }
}

ast_node!(ExtensionDecl, EXTENSION_DECL);

impl ExtensionDecl {
    pub fn target(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        self.0.children().filter_map(Member::cast)
    }
}

ast_node!(BaseList, BASE_LIST);

impl BaseList {
    pub fn types(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.0.children().filter_map(TypeRef::cast)
    }
}

/// Any member of a class or extension body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
}

impl AstNode for Member {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::FIELD_DECL | SyntaxKind::METHOD_DECL | SyntaxKind::PROPERTY_DECL
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FIELD_DECL => Some(Self::Field(FieldDecl(node))),
            SyntaxKind::METHOD_DECL => Some(Self::Method(MethodDecl(node))),
            SyntaxKind::PROPERTY_DECL => Some(Self::Property(PropertyDecl(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Field(n) => n.syntax(),
            Self::Method(n) => n.syntax(),
            Self::Property(n) => n.syntax(),
        }
    }
}

ast_node!(FieldDecl, FIELD_DECL);

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        has_token(&self.0, SyntaxKind::STATIC_KW)
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(MethodDecl, METHOD_DECL);

impl MethodDecl {
    pub fn is_static(&self) -> bool {
        has_token(&self.0, SyntaxKind::STATIC_KW)
    }

    pub fn return_ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn type_param_list(&self) -> Option<TypeParamList> {
        self.0.children().find_map(TypeParamList::cast)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        self.0.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

ast_node!(PropertyDecl, PROPERTY_DECL);

impl PropertyDecl {
    pub fn is_static(&self) -> bool {
        has_token(&self.0, SyntaxKind::STATIC_KW)
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }
}

ast_node!(TypeParamList, TYPE_PARAM_LIST);

impl TypeParamList {
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.0.children().filter_map(Name::cast)
    }

    pub fn arity(&self) -> usize {
        self.names().count()
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.0.children().filter_map(Param::cast)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }
}

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> SmolStr {
        first_token_of_kind(&self.0, SyntaxKind::IDENT)
            .map(|t| SmolStr::new(t.text()))
            .unwrap_or_default()
    }
}

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    /// The dotted path with trivia stripped, e.g. `Runtime.Conversions`
    pub fn path_text(&self) -> SmolStr {
        let mut out = String::new();
        for token in self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| !t.kind().is_trivia())
        {
            out.push_str(token.text());
        }
        SmolStr::new(out)
    }
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(Block, BLOCK);

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.0.children().filter_map(Stmt::cast)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Var(VarStmt),
    Expr(ExprStmt),
    With(WithStmt),
    Return(ReturnStmt),
    Block(Block),
}

impl AstNode for Stmt {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::VAR_STMT
                | SyntaxKind::EXPR_STMT
                | SyntaxKind::WITH_STMT
                | SyntaxKind::RETURN_STMT
                | SyntaxKind::BLOCK
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::VAR_STMT => Some(Self::Var(VarStmt(node))),
            SyntaxKind::EXPR_STMT => Some(Self::Expr(ExprStmt(node))),
            SyntaxKind::WITH_STMT => Some(Self::With(WithStmt(node))),
            SyntaxKind::RETURN_STMT => Some(Self::Return(ReturnStmt(node))),
            SyntaxKind::BLOCK => Some(Self::Block(Block(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Var(n) => n.syntax(),
            Self::Expr(n) => n.syntax(),
            Self::With(n) => n.syntax(),
            Self::Return(n) => n.syntax(),
            Self::Block(n) => n.syntax(),
        }
    }
}

ast_node!(VarStmt, VAR_STMT);

impl VarStmt {
    /// The declared type, absent for `var` declarations
    pub fn ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(WithStmt, WITH_STMT);

impl WithStmt {
    pub fn subject(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

ast_node!(ReturnStmt, RETURN_STMT);

impl ReturnStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    NameRef(NameRef),
    MemberAccess(MemberAccessExpr),
    Call(CallExpr),
    ObjectCreation(ObjectCreationExpr),
    This(ThisExpr),
    Base(BaseExpr),
    Cast(CastExpr),
    Paren(ParenExpr),
    Literal(Literal),
    Bin(BinExpr),
    Assign(AssignExpr),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_expr()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::NAME_REF => Some(Self::NameRef(NameRef(node))),
            SyntaxKind::MEMBER_ACCESS_EXPR => Some(Self::MemberAccess(MemberAccessExpr(node))),
            SyntaxKind::CALL_EXPR => Some(Self::Call(CallExpr(node))),
            SyntaxKind::OBJECT_CREATION_EXPR => {
                Some(Self::ObjectCreation(ObjectCreationExpr(node)))
            }
            SyntaxKind::THIS_EXPR => Some(Self::This(ThisExpr(node))),
            SyntaxKind::BASE_EXPR => Some(Self::Base(BaseExpr(node))),
            SyntaxKind::CAST_EXPR => Some(Self::Cast(CastExpr(node))),
            SyntaxKind::PAREN_EXPR => Some(Self::Paren(ParenExpr(node))),
            SyntaxKind::LITERAL => Some(Self::Literal(Literal(node))),
            SyntaxKind::BIN_EXPR => Some(Self::Bin(BinExpr(node))),
            SyntaxKind::ASSIGN_EXPR => Some(Self::Assign(AssignExpr(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::NameRef(n) => n.syntax(),
            Self::MemberAccess(n) => n.syntax(),
            Self::Call(n) => n.syntax(),
            Self::ObjectCreation(n) => n.syntax(),
            Self::This(n) => n.syntax(),
            Self::Base(n) => n.syntax(),
            Self::Cast(n) => n.syntax(),
            Self::Paren(n) => n.syntax(),
            Self::Literal(n) => n.syntax(),
            Self::Bin(n) => n.syntax(),
            Self::Assign(n) => n.syntax(),
        }
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn text(&self) -> SmolStr {
        first_token_of_kind(&self.0, SyntaxKind::IDENT)
            .map(|t| SmolStr::new(t.text()))
            .unwrap_or_default()
    }
}

ast_node!(MemberAccessExpr, MEMBER_ACCESS_EXPR);

impl MemberAccessExpr {
    pub fn receiver(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    /// The name after the dot. The receiver may itself be a NAME_REF, so
    /// this looks for the first NAME_REF following the DOT token.
    pub fn name(&self) -> Option<NameRef> {
        let mut seen_dot = false;
        for element in self.0.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::DOT => {
                    seen_dot = true;
                }
                rowan::NodeOrToken::Node(n) if seen_dot => {
                    if let Some(name) = NameRef::cast(n) {
                        return Some(name);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        self.0.children().find_map(ArgList::cast)
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

ast_node!(ObjectCreationExpr, OBJECT_CREATION_EXPR);

impl ObjectCreationExpr {
    pub fn ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        self.0.children().find_map(ArgList::cast)
    }
}

ast_node!(ThisExpr, THIS_EXPR);
ast_node!(BaseExpr, BASE_EXPR);

ast_node!(CastExpr, CAST_EXPR);

impl CastExpr {
    pub fn ty(&self) -> Option<TypeRef> {
        self.0.children().find_map(TypeRef::cast)
    }

    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

ast_node!(BinExpr, BIN_EXPR);

impl BinExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind().is_punct())
    }
}

ast_node!(AssignExpr, ASSIGN_EXPR);

impl AssignExpr {
    pub fn target(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn value(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn root(input: &str) -> SourceFile {
        let parse = parse(input);
        assert!(parse.ok(), "parse errors: {:?}", parse.errors);
        SourceFile::cast(parse.syntax()).unwrap()
    }

    #[test]
    fn test_class_shape() {
        let file = root("class Widget : Gadget { long total; void run() { } }");
        let class = file.class_decls().next().unwrap();
        assert_eq!(class.name().unwrap().text(), "Widget");
        let bases: Vec<_> = class
            .base_list()
            .unwrap()
            .types()
            .map(|t| t.path_text())
            .collect();
        assert_eq!(bases, vec!["Gadget"]);
        assert_eq!(class.members().count(), 2);
    }

    #[test]
    fn test_member_kinds() {
        let file = root(
            "class C { static int counter; long size { get; set; } T pick<T>(T v) { return v; } }",
        );
        let class = file.class_decls().next().unwrap();
        let members: Vec<_> = class.members().collect();
        assert!(matches!(members[0], Member::Field(_)));
        assert!(matches!(members[1], Member::Property(_)));
        assert!(matches!(members[2], Member::Method(_)));
        if let Member::Method(m) = &members[2] {
            assert_eq!(m.type_param_list().unwrap().arity(), 1);
        }
        if let Member::Field(f) = &members[0] {
            assert!(f.is_static());
        }
    }

    #[test]
    fn test_postfix_chain_shape() {
        let file = root("class C { void run() { buddy.pick(1).total = 2; } }");
        let text = file.syntax().text().to_string();
        assert_eq!(text, "class C { void run() { buddy.pick(1).total = 2; } }");

        let assign = file
            .syntax()
            .descendants()
            .find_map(AssignExpr::cast)
            .unwrap();
        let target = assign.target().unwrap();
        let Expr::MemberAccess(ma) = target else {
            panic!("expected member access target");
        };
        assert_eq!(ma.name().unwrap().text(), "total");
        assert!(matches!(ma.receiver(), Some(Expr::Call(_))));
    }

    #[test]
    fn test_cast_vs_paren() {
        let file = root("class C { void run() { var a = (long) n; var b = (n); } }");
        let cast = file.syntax().descendants().find_map(CastExpr::cast).unwrap();
        assert_eq!(cast.ty().unwrap().path_text(), "long");
        assert!(matches!(cast.inner(), Some(Expr::NameRef(_))));
        assert!(file.syntax().descendants().any(|n| n.kind() == SyntaxKind::PAREN_EXPR));
    }

    #[test]
    fn test_with_stmt_shape() {
        let file = root("class C { void run() { with (buddy) { total = 1; } } }");
        let with = file.syntax().descendants().find_map(WithStmt::cast).unwrap();
        let Some(Expr::NameRef(subject)) = with.subject() else {
            panic!("expected name ref subject");
        };
        assert_eq!(subject.text(), "buddy");
        assert_eq!(with.body().unwrap().statements().count(), 1);
    }

    #[test]
    fn test_new_receiver_call_shape() {
        let file = root("class C { void run() { new Widget().run(); } }");
        let call = file
            .syntax()
            .descendants()
            .filter_map(CallExpr::cast)
            .find(|c| matches!(c.callee(), Some(Expr::MemberAccess(_))))
            .unwrap();
        let Some(Expr::MemberAccess(ma)) = call.callee() else {
            unreachable!()
        };
        assert!(matches!(ma.receiver(), Some(Expr::ObjectCreation(_))));
    }

    #[test]
    fn test_lossless_roundtrip() {
        let source = "class C {\n    // tally\n    long total = 0;\n}\n";
        let parse = parse(source);
        assert_eq!(parse.syntax().text().to_string(), source);
    }
}
