//! Recursive descent parser for the source dialect
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse dialect source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    parser.finish()
}

/// Parse a standalone expression snippet.
///
/// The root is a SOURCE_FILE whose single child is the expression node;
/// trailing input is consumed into the root.
pub fn parse_expr(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_expr_root();
    parser.finish()
}

/// Token kinds that can begin an expression
const EXPR_START: &[SyntaxKind] = &[
    SyntaxKind::IDENT,
    SyntaxKind::INTEGER,
    SyntaxKind::DECIMAL,
    SyntaxKind::STRING,
    SyntaxKind::L_PAREN,
    SyntaxKind::THIS_KW,
    SyntaxKind::BASE_KW,
    SyntaxKind::NEW_KW,
    SyntaxKind::TRUE_KW,
    SyntaxKind::FALSE_KW,
    SyntaxKind::NULL_KW,
];

/// Binary operators, loosest-binding level first
const BIN_LEVELS: &[&[SyntaxKind]] = &[
    &[SyntaxKind::PIPE_PIPE],
    &[SyntaxKind::AMP_AMP],
    &[SyntaxKind::EQ_EQ, SyntaxKind::BANG_EQ],
    &[
        SyntaxKind::LT,
        SyntaxKind::GT,
        SyntaxKind::LT_EQ,
        SyntaxKind::GT_EQ,
    ],
    &[SyntaxKind::PLUS, SyntaxKind::MINUS],
    &[SyntaxKind::STAR, SyntaxKind::SLASH, SyntaxKind::PERCENT],
];

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at_eof(&self) -> bool {
        // Trailing trivia does not count as remaining input
        self.tokens[self.pos..].iter().all(|t| t.kind.is_trivia())
    }

    /// Look ahead n non-trivia tokens
    fn nth(&self, n: usize) -> SyntaxKind {
        let mut idx = self.pos;
        let mut count = 0;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return self.tokens[idx].kind;
                }
                count += 1;
            }
            idx += 1;
        }
        SyntaxKind::ERROR
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.nth(0) == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.nth(0))
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().map(|t| t.kind.is_trivia()).unwrap_or(false) {
            self.bump();
        }
    }

    /// Consume the next non-trivia token if it matches
    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.skip_trivia();
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(TextSize::new(0)));
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.builder.start_node(SyntaxKind::ERROR.into());
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        // Always make progress to prevent infinite loops
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    // =========================================================================
    // Grammar rules: declarations
    // =========================================================================

    /// SourceFile = (ClassDecl | ExtensionDecl)*
    fn parse_source_file(&mut self) {
        self.start_node(SyntaxKind::SOURCE_FILE);

        while !self.at_eof() {
            let pos_before = self.pos;
            match self.nth(0) {
                SyntaxKind::CLASS_KW => self.parse_class_decl(),
                SyntaxKind::EXTEND_KW => self.parse_extension_decl(),
                _ => self.error_recover(
                    "expected a class or extension declaration",
                    &[SyntaxKind::CLASS_KW, SyntaxKind::EXTEND_KW],
                ),
            }
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }
        self.skip_trivia();
        self.finish_node();
    }

    /// Root for expression snippets
    fn parse_expr_root(&mut self) {
        self.start_node(SyntaxKind::SOURCE_FILE);
        self.parse_expr();
        while !self.at_eof() {
            self.bump();
        }
        self.skip_trivia();
        self.finish_node();
    }

    /// ClassDecl = 'class' Name (':' BaseList)? '{' Member* '}'
    fn parse_class_decl(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::CLASS_DECL);
        self.expect(SyntaxKind::CLASS_KW);
        self.parse_name();
        if self.at(SyntaxKind::COLON) {
            self.skip_trivia();
            self.start_node(SyntaxKind::BASE_LIST);
            self.expect(SyntaxKind::COLON);
            self.parse_type_ref();
            while self.eat(SyntaxKind::COMMA) {
                self.parse_type_ref();
            }
            self.finish_node();
        }
        self.expect(SyntaxKind::L_BRACE);
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.parse_member();
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// ExtensionDecl = 'extend' TypeRef '{' Member* '}'
    fn parse_extension_decl(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::EXTENSION_DECL);
        self.expect(SyntaxKind::EXTEND_KW);
        self.parse_type_ref();
        self.expect(SyntaxKind::L_BRACE);
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.parse_member();
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// Member = 'static'? TypeRef Name (method | property | field tail)
    fn parse_member(&mut self) {
        let cp = self.checkpoint();
        self.eat(SyntaxKind::STATIC_KW);
        self.parse_type_ref();
        self.parse_name();
        match self.nth(0) {
            SyntaxKind::LT => {
                self.start_node_at(cp, SyntaxKind::METHOD_DECL);
                self.parse_type_param_list();
                self.parse_param_list();
                self.parse_block();
                self.finish_node();
            }
            SyntaxKind::L_PAREN => {
                self.start_node_at(cp, SyntaxKind::METHOD_DECL);
                self.parse_param_list();
                self.parse_block();
                self.finish_node();
            }
            SyntaxKind::L_BRACE => {
                self.start_node_at(cp, SyntaxKind::PROPERTY_DECL);
                self.expect(SyntaxKind::L_BRACE);
                if self.eat(SyntaxKind::GET_KW) {
                    self.expect(SyntaxKind::SEMICOLON);
                }
                if self.eat(SyntaxKind::SET_KW) {
                    self.expect(SyntaxKind::SEMICOLON);
                }
                self.expect(SyntaxKind::R_BRACE);
                self.finish_node();
            }
            SyntaxKind::EQ => {
                self.start_node_at(cp, SyntaxKind::FIELD_DECL);
                self.expect(SyntaxKind::EQ);
                self.parse_expr();
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            _ => {
                self.start_node_at(cp, SyntaxKind::FIELD_DECL);
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
        }
    }

    /// TypeParamList = '<' Name (',' Name)* '>'
    fn parse_type_param_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::TYPE_PARAM_LIST);
        self.expect(SyntaxKind::LT);
        self.parse_name();
        while self.eat(SyntaxKind::COMMA) {
            self.parse_name();
        }
        self.expect(SyntaxKind::GT);
        self.finish_node();
    }

    /// ParamList = '(' (Param (',' Param)*)? ')'
    fn parse_param_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::PARAM_LIST);
        self.expect(SyntaxKind::L_PAREN);
        if !self.at(SyntaxKind::R_PAREN) && !self.at_eof() {
            self.parse_param();
            while self.eat(SyntaxKind::COMMA) {
                self.parse_param();
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// Param = TypeRef Name
    fn parse_param(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::PARAM);
        self.parse_type_ref();
        self.parse_name();
        self.finish_node();
    }

    /// TypeRef = IDENT ('.' IDENT)*
    fn parse_type_ref(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::TYPE_REF);
        self.expect(SyntaxKind::IDENT);
        while self.nth(0) == SyntaxKind::DOT && self.nth(1) == SyntaxKind::IDENT {
            self.eat(SyntaxKind::DOT);
            self.expect(SyntaxKind::IDENT);
        }
        self.finish_node();
    }

    /// Name = IDENT
    fn parse_name(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::NAME);
        self.expect(SyntaxKind::IDENT);
        self.finish_node();
    }

    // =========================================================================
    // Grammar rules: statements
    // =========================================================================

    /// Block = '{' Stmt* '}'
    fn parse_block(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::BLOCK);
        self.expect(SyntaxKind::L_BRACE);
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.parse_stmt();
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    fn parse_stmt(&mut self) {
        self.skip_trivia();
        match self.nth(0) {
            SyntaxKind::WITH_KW => {
                self.start_node(SyntaxKind::WITH_STMT);
                self.expect(SyntaxKind::WITH_KW);
                self.expect(SyntaxKind::L_PAREN);
                self.parse_expr();
                self.expect(SyntaxKind::R_PAREN);
                self.parse_block();
                self.finish_node();
            }
            SyntaxKind::RETURN_KW => {
                self.start_node(SyntaxKind::RETURN_STMT);
                self.expect(SyntaxKind::RETURN_KW);
                if !self.at(SyntaxKind::SEMICOLON) && !self.at_eof() {
                    self.parse_expr();
                }
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            SyntaxKind::VAR_KW => {
                self.start_node(SyntaxKind::VAR_STMT);
                self.expect(SyntaxKind::VAR_KW);
                self.parse_name();
                self.expect(SyntaxKind::EQ);
                self.parse_expr();
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            SyntaxKind::L_BRACE => self.parse_block(),
            // Declared-type local: `long total = ...;`
            SyntaxKind::IDENT
                if self.nth(1) == SyntaxKind::IDENT && self.nth(2) == SyntaxKind::EQ =>
            {
                self.start_node(SyntaxKind::VAR_STMT);
                self.parse_type_ref();
                self.parse_name();
                self.expect(SyntaxKind::EQ);
                self.parse_expr();
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
            _ => {
                self.start_node(SyntaxKind::EXPR_STMT);
                self.parse_expr();
                self.expect(SyntaxKind::SEMICOLON);
                self.finish_node();
            }
        }
    }

    // =========================================================================
    // Grammar rules: expressions
    // =========================================================================

    fn parse_expr(&mut self) {
        self.parse_assign();
    }

    /// Assignment is right-associative
    fn parse_assign(&mut self) {
        let cp = self.checkpoint();
        self.parse_bin(0);
        if self.at(SyntaxKind::EQ) {
            self.start_node_at(cp, SyntaxKind::ASSIGN_EXPR);
            self.eat(SyntaxKind::EQ);
            self.parse_assign();
            self.finish_node();
        }
    }

    /// Left-associative binary levels, loosest first
    fn parse_bin(&mut self, level: usize) {
        if level == BIN_LEVELS.len() {
            return self.parse_postfix();
        }
        let cp = self.checkpoint();
        self.parse_bin(level + 1);
        while self.at_any(BIN_LEVELS[level]) {
            self.start_node_at(cp, SyntaxKind::BIN_EXPR);
            self.skip_trivia();
            self.bump(); // operator
            self.parse_bin(level + 1);
            self.finish_node();
        }
    }

    /// Postfix chain: member access and call
    fn parse_postfix(&mut self) {
        let cp = self.checkpoint();
        self.parse_primary();
        loop {
            if self.at(SyntaxKind::DOT) {
                self.start_node_at(cp, SyntaxKind::MEMBER_ACCESS_EXPR);
                self.eat(SyntaxKind::DOT);
                self.parse_name_ref();
                self.finish_node();
            } else if self.at(SyntaxKind::L_PAREN) {
                self.start_node_at(cp, SyntaxKind::CALL_EXPR);
                self.parse_arg_list();
                self.finish_node();
            } else {
                break;
            }
        }
    }

    fn parse_primary(&mut self) {
        self.skip_trivia();
        match self.nth(0) {
            SyntaxKind::L_PAREN => {
                // `(T) expr` is a cast when the parens hold a lone identifier
                // and an expression follows
                if self.nth(1) == SyntaxKind::IDENT
                    && self.nth(2) == SyntaxKind::R_PAREN
                    && EXPR_START.contains(&self.nth(3))
                {
                    self.start_node(SyntaxKind::CAST_EXPR);
                    self.expect(SyntaxKind::L_PAREN);
                    self.parse_type_ref();
                    self.expect(SyntaxKind::R_PAREN);
                    self.parse_postfix();
                    self.finish_node();
                } else {
                    self.start_node(SyntaxKind::PAREN_EXPR);
                    self.expect(SyntaxKind::L_PAREN);
                    self.parse_expr();
                    self.expect(SyntaxKind::R_PAREN);
                    self.finish_node();
                }
            }
            SyntaxKind::NEW_KW => {
                self.start_node(SyntaxKind::OBJECT_CREATION_EXPR);
                self.expect(SyntaxKind::NEW_KW);
                self.parse_type_ref();
                self.parse_arg_list();
                self.finish_node();
            }
            SyntaxKind::THIS_KW => {
                self.start_node(SyntaxKind::THIS_EXPR);
                self.expect(SyntaxKind::THIS_KW);
                self.finish_node();
            }
            SyntaxKind::BASE_KW => {
                self.start_node(SyntaxKind::BASE_EXPR);
                self.expect(SyntaxKind::BASE_KW);
                self.finish_node();
            }
            SyntaxKind::IDENT => self.parse_name_ref(),
            SyntaxKind::INTEGER
            | SyntaxKind::DECIMAL
            | SyntaxKind::STRING
            | SyntaxKind::TRUE_KW
            | SyntaxKind::FALSE_KW
            | SyntaxKind::NULL_KW => {
                self.skip_trivia();
                self.start_node(SyntaxKind::LITERAL);
                self.bump();
                self.finish_node();
            }
            _ => {
                self.error("expected expression");
                self.start_node(SyntaxKind::ERROR);
                if !self.at_eof()
                    && !self.at_any(&[
                        SyntaxKind::SEMICOLON,
                        SyntaxKind::R_BRACE,
                        SyntaxKind::R_PAREN,
                    ])
                {
                    self.skip_trivia();
                    self.bump();
                }
                self.finish_node();
            }
        }
    }

    /// NameRef = IDENT
    fn parse_name_ref(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::NAME_REF);
        self.expect(SyntaxKind::IDENT);
        self.finish_node();
    }

    /// ArgList = '(' (Expr (',' Expr)*)? ')'
    fn parse_arg_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::ARG_LIST);
        self.expect(SyntaxKind::L_PAREN);
        if !self.at(SyntaxKind::R_PAREN) && !self.at_eof() {
            self.parse_expr();
            while self.eat(SyntaxKind::COMMA) {
                self.parse_expr();
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }
}
