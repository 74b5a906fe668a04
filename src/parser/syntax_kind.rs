//! Syntax kinds for the rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree of
//! the source dialect.

/// All syntax kinds (tokens and nodes) in the source dialect
///
/// Tokens are leaf elements (identifiers, keywords, punctuation).
/// Nodes are composite (declarations, statements, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,   // identifier
    INTEGER, // 42
    DECIMAL, // 3.14
    STRING,  // "hello"

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,   // {
    R_BRACE,   // }
    L_PAREN,   // (
    R_PAREN,   // )
    SEMICOLON, // ;
    COLON,     // :
    COMMA,     // ,
    DOT,       // .
    EQ,        // =
    EQ_EQ,     // ==
    BANG_EQ,   // !=
    LT,        // <
    GT,        // >
    LT_EQ,     // <=
    GT_EQ,     // >=
    PLUS,      // +
    MINUS,     // -
    STAR,      // *
    SLASH,     // /
    PERCENT,   // %
    AMP_AMP,   // &&
    PIPE_PIPE, // ||

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    CLASS_KW,
    EXTEND_KW,
    STATIC_KW,
    NEW_KW,
    THIS_KW,
    BASE_KW,
    WITH_KW,
    VAR_KW,
    RETURN_KW,
    GET_KW,
    SET_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    // =========================================================================
    // COMPOSITE NODES (non-terminals in the grammar)
    // =========================================================================
    // Root
    SOURCE_FILE,

    // Declarations
    CLASS_DECL,
    EXTENSION_DECL,
    BASE_LIST,
    FIELD_DECL,
    METHOD_DECL,
    PROPERTY_DECL,
    TYPE_PARAM_LIST,
    PARAM_LIST,
    PARAM,

    // Names and type references
    NAME,
    TYPE_REF,

    // Statements
    BLOCK,
    VAR_STMT,
    EXPR_STMT,
    WITH_STMT,
    RETURN_STMT,

    // Expressions
    NAME_REF,
    MEMBER_ACCESS_EXPR,
    CALL_EXPR,
    ARG_LIST,
    OBJECT_CREATION_EXPR,
    THIS_EXPR,
    BASE_EXPR,
    CAST_EXPR,
    PAREN_EXPR,
    LITERAL,
    BIN_EXPR,
    ASSIGN_EXPR,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::CLASS_KW as u16) && (self as u16) <= (Self::NULL_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::PIPE_PIPE as u16)
    }

    /// Check if this is an expression node
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            Self::NAME_REF
                | Self::MEMBER_ACCESS_EXPR
                | Self::CALL_EXPR
                | Self::OBJECT_CREATION_EXPR
                | Self::THIS_EXPR
                | Self::BASE_EXPR
                | Self::CAST_EXPR
                | Self::PAREN_EXPR
                | Self::LITERAL
                | Self::BIN_EXPR
                | Self::ASSIGN_EXPR
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DialectLanguage {}

impl rowan::Language for DialectLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<DialectLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<DialectLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<DialectLanguage>;
pub type SyntaxNodePtr = rowan::ast::SyntaxNodePtr<DialectLanguage>;
