//! Shared fixtures and stub expanders for the integration tests.
#![allow(dead_code)]

use qualex::expand::Expander;
use qualex::parser::ast::{AstNode, CallExpr, Expr, NameRef, VarStmt};
use qualex::parser::{SyntaxKind, SyntaxNode, parse, parse_expr};
use qualex::semantic::{SemanticModel, SymbolKind};

/// One program exercising every corrective scenario: a `with` block whose
/// subject's members live outside the enclosing base chain, inherited
/// members, generic and extension-generic methods, instance-receiver calls,
/// widened and identity conversion contexts.
pub const FIXTURE: &str = r#"
class Sibling {
    long total;
    void bump() { }
}

extend Sibling {
    T grow<T>(T seed) {
        return seed;
    }
}

class Base {
    int shared_count;
}

class Conversions {
    static int to_int(int value) { return value; }
    static long to_long(long value) { return value; }
}

class Derived : Base {
    Sibling buddy;

    void update() {
        with (buddy) {
            total = 1;
        }
        shared_count = 2;
    }

    void bump_all() { }

    T pick<T>(T seed) {
        return seed;
    }

    long scale(long amount) {
        return amount;
    }

    void run() {
        new Sibling().bump();
        this.bump_all();
        int n = 3;
        scale(n);
        int copy = n;
        long wide = (long) n;
        int keep = Conversions.to_int(n);
        pick(4);
        var grown = buddy.grow(5);
    }
}
"#;

/// Parse and bind, asserting the source is well-formed.
pub fn analyze(source: &str) -> SemanticModel {
    let parse = parse(source);
    assert!(parse.ok(), "parse errors: {:?}", parse.errors);
    SemanticModel::bind(&parse.syntax())
}

/// Parse a standalone expression and return its node.
pub fn expr_node(input: &str) -> SyntaxNode {
    parse_expr(input).syntax().first_child().unwrap()
}

/// First NAME_REF with the given text.
pub fn find_name_ref(root: &SyntaxNode, text: &str) -> SyntaxNode {
    root.descendants()
        .filter_map(NameRef::cast)
        .find(|n| n.text() == text)
        .unwrap_or_else(|| panic!("no name ref '{text}'"))
        .syntax()
        .clone()
}

/// First call whose callee text (trivia included) equals `callee`.
pub fn find_call(root: &SyntaxNode, callee: &str) -> SyntaxNode {
    root.descendants()
        .filter_map(CallExpr::cast)
        .find(|c| {
            c.callee()
                .map(|e| e.syntax().text().to_string() == callee)
                .unwrap_or(false)
        })
        .unwrap_or_else(|| panic!("no call with callee '{callee}'"))
        .syntax()
        .clone()
}

/// First argument of the call with the given callee text.
pub fn find_call_arg(root: &SyntaxNode, callee: &str) -> SyntaxNode {
    let call = find_call(root, callee);
    CallExpr::cast(call)
        .unwrap()
        .arg_list()
        .and_then(|al| al.args().next())
        .unwrap_or_else(|| panic!("call '{callee}' has no arguments"))
        .syntax()
        .clone()
}

/// Initializer of the local declared with the given name.
pub fn find_var_init(root: &SyntaxNode, name: &str) -> SyntaxNode {
    root.descendants()
        .filter_map(VarStmt::cast)
        .find(|v| v.name().map(|n| n.text() == name).unwrap_or(false))
        .unwrap_or_else(|| panic!("no local '{name}'"))
        .initializer()
        .unwrap_or_else(|| panic!("local '{name}' has no initializer"))
        .syntax()
        .clone()
}

// ============================================================================
// Stub expanders
// ============================================================================

/// Declines to change anything.
pub struct PassThrough;

impl Expander for PassThrough {
    fn try_expand_node(&self, node: &SyntaxNode, _model: &SemanticModel) -> SyntaxNode {
        node.clone()
    }
}

/// Proves a code path never consults the primitive.
pub struct Unreachable;

impl Expander for Unreachable {
    fn try_expand_node(&self, node: &SyntaxNode, _model: &SemanticModel) -> SyntaxNode {
        panic!("primitive consulted for '{}'", node.text());
    }
}

/// Wraps every node in a runtime conversion call.
pub struct ConversionWrap;

impl Expander for ConversionWrap {
    fn try_expand_node(&self, node: &SyntaxNode, _model: &SemanticModel) -> SyntaxNode {
        expr_node(&format!("Conversions.to_long({})", node.text()))
    }
}

/// Wraps every node in an explicit cast.
pub struct CastWrap;

impl Expander for CastWrap {
    fn try_expand_node(&self, node: &SyntaxNode, _model: &SemanticModel) -> SyntaxNode {
        expr_node(&format!("(long) {}", node.text()))
    }
}

/// A minimal faithful primitive: qualifies bare instance field/property
/// references with `this`.
pub struct QualifyWithThis;

impl Expander for QualifyWithThis {
    fn try_expand_node(&self, node: &SyntaxNode, model: &SemanticModel) -> SyntaxNode {
        if node.kind() == SyntaxKind::NAME_REF {
            if let Some(res) = model.symbol(node) {
                let sym = model.symbols().get(res.symbol);
                let qualifiable = matches!(sym.kind, SymbolKind::Field | SymbolKind::Property)
                    && !sym.is_static
                    && res.receiver.is_none();
                if qualifiable {
                    return expr_node(&format!("this.{}", node.text()));
                }
            }
        }
        node.clone()
    }
}

/// Convenience: the parent expression node wrapping `node`, if any.
pub fn parent_expr(node: &SyntaxNode) -> Option<Expr> {
    node.parent().and_then(Expr::cast)
}
