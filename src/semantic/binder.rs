//! The binding pass: one walk over the tree that fills the semantic tables.
//!
//! Binding is deliberately lenient. Anything that does not resolve simply
//! gets no entry in the fact tables; downstream consumers treat missing
//! facts as "no semantic meaning" and fall back to leaving syntax alone.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{trace, warn};

use crate::base::{IStr, Interner};
use crate::parser::ast::{
    AssignExpr, AstNode, BinExpr, Block, CallExpr, CastExpr, ClassDecl, Expr, Literal, Member,
    MemberAccessExpr, MethodDecl, NameRef, SourceFile, Stmt,
};
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxNodePtr};

use super::model::{Resolution, SemanticModel, TypeInfo};
use super::symbols::{Symbol, SymbolId, SymbolKind, SymbolTable};
use super::types::{TypeId, TypeTable};

/// Build the semantic snapshot for a parsed tree.
pub(crate) fn bind(root: &SyntaxNode) -> SemanticModel {
    let mut binder = Binder::new();
    if let Some(file) = SourceFile::cast(root.clone()) {
        binder.declare_types(&file);
        binder.declare_members(&file);
        binder.declare_extensions(&file);
        binder.bind_bodies(&file);
    }
    SemanticModel {
        green: root.green().into_owned(),
        types: binder.types,
        symbols: binder.symbols,
        resolutions: binder.resolutions,
        type_facts: binder.type_facts,
        declared: binder.declared,
    }
}

/// An enclosing `with` block during body binding
struct WithFrame {
    subject_ty: Option<TypeId>,
    subject: SyntaxNodePtr,
}

struct Binder {
    interner: Interner,
    types: TypeTable,
    symbols: SymbolTable,
    resolutions: FxHashMap<SyntaxNodePtr, Resolution>,
    type_facts: FxHashMap<SyntaxNodePtr, TypeInfo>,
    declared: FxHashMap<SyntaxNodePtr, TypeId>,
    /// Local/param scopes, innermost last
    scopes: Vec<FxHashMap<IStr, SymbolId>>,
    /// Enclosing `with` frames, innermost last
    withs: Vec<WithFrame>,
    current_class: Option<TypeId>,
    current_return: Option<TypeId>,
}

impl Binder {
    fn new() -> Self {
        let interner = Interner::new();
        let types = TypeTable::with_builtins(&interner);
        Self {
            interner,
            types,
            symbols: SymbolTable::default(),
            resolutions: FxHashMap::default(),
            type_facts: FxHashMap::default(),
            declared: FxHashMap::default(),
            scopes: Vec::new(),
            withs: Vec::new(),
            current_class: None,
            current_return: None,
        }
    }

    // =========================================================================
    // Declaration phases
    // =========================================================================

    fn declare_types(&mut self, file: &SourceFile) {
        for class in file.class_decls() {
            let name_text = class.name().map(|n| n.text()).unwrap_or_default();
            if name_text.is_empty() {
                continue;
            }
            if self.types.lookup(&name_text).is_some() {
                warn!(
                    "[BIND] duplicate type name '{}', keeping first declaration",
                    name_text
                );
            }
            let name = self.interner.intern(&name_text);
            let tid = self.types.insert(name.clone(), None, false);
            self.declared.insert(SyntaxNodePtr::new(class.syntax()), tid);
            if self.symbols.class_symbol(tid).is_none() {
                let sid = self.symbols.alloc(Symbol {
                    name,
                    kind: SymbolKind::Class,
                    is_static: false,
                    is_extension: false,
                    containing_type: None,
                    ty: Some(tid),
                    type_params: 0,
                    params: Vec::new(),
                });
                self.symbols.set_class(tid, sid);
            }
        }
    }

    fn declare_members(&mut self, file: &SourceFile) {
        for class in file.class_decls() {
            let Some(tid) = self.declared_type_of(&class) else {
                continue;
            };
            let base = class
                .base_list()
                .and_then(|bl| bl.types().next())
                .map(|tr| tr.path_text());
            let base_id = match base {
                Some(name) => match self.types.lookup(&name) {
                    Some(id) => Some(id),
                    None => {
                        warn!("[BIND] unresolved base type '{}'", name);
                        Some(TypeId::OBJECT)
                    }
                },
                None => Some(TypeId::OBJECT),
            };
            self.types.set_base(tid, base_id);

            for member in class.members() {
                self.declare_member(tid, &member, false);
            }
        }
        self.warn_on_inheritance_cycles();
    }

    fn declare_extensions(&mut self, file: &SourceFile) {
        for ext in file.extension_decls() {
            let Some(target) = ext.target().map(|t| t.path_text()) else {
                continue;
            };
            let Some(tid) = self.types.lookup(&target) else {
                warn!("[BIND] extension of unknown type '{}'", target);
                continue;
            };
            for member in ext.members() {
                match member {
                    Member::Method(_) => self.declare_member(tid, &member, true),
                    _ => warn!("[BIND] only methods may extend '{}'", target),
                }
            }
        }
    }

    fn declare_member(&mut self, tid: TypeId, member: &Member, is_extension: bool) {
        match member {
            Member::Field(f) => {
                let Some(name_text) = f.name().map(|n| n.text()).filter(|t| !t.is_empty())
                else {
                    return;
                };
                let name = self.interner.intern(&name_text);
                let ty = f
                    .ty()
                    .and_then(|t| self.types.lookup(&t.path_text()));
                let sid = self.symbols.alloc(Symbol {
                    name: name.clone(),
                    kind: SymbolKind::Field,
                    is_static: f.is_static(),
                    is_extension: false,
                    containing_type: Some(tid),
                    ty,
                    type_params: 0,
                    params: Vec::new(),
                });
                if !self.symbols.add_member(tid, name, sid) {
                    warn!("[BIND] duplicate member '{}'", name_text);
                }
            }
            Member::Property(p) => {
                let Some(name_text) = p.name().map(|n| n.text()).filter(|t| !t.is_empty())
                else {
                    return;
                };
                let name = self.interner.intern(&name_text);
                let ty = p
                    .ty()
                    .and_then(|t| self.types.lookup(&t.path_text()));
                let sid = self.symbols.alloc(Symbol {
                    name: name.clone(),
                    kind: SymbolKind::Property,
                    is_static: p.is_static(),
                    is_extension: false,
                    containing_type: Some(tid),
                    ty,
                    type_params: 0,
                    params: Vec::new(),
                });
                if !self.symbols.add_member(tid, name, sid) {
                    warn!("[BIND] duplicate member '{}'", name_text);
                }
            }
            Member::Method(m) => {
                let Some(name_text) = m.name().map(|n| n.text()).filter(|t| !t.is_empty())
                else {
                    return;
                };
                let name = self.interner.intern(&name_text);
                let tp_names = type_param_names(m);
                let ty = m
                    .return_ty()
                    .and_then(|t| self.resolve_signature_type(&t.path_text(), &tp_names));
                let params = m
                    .param_list()
                    .map(|pl| {
                        pl.params()
                            .map(|p| {
                                p.ty().and_then(|t| {
                                    self.resolve_signature_type(&t.path_text(), &tp_names)
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let sid = self.symbols.alloc(Symbol {
                    name: name.clone(),
                    kind: SymbolKind::Method,
                    is_static: m.is_static(),
                    is_extension,
                    containing_type: Some(tid),
                    ty,
                    type_params: tp_names.len() as u16,
                    params,
                });
                let added = if is_extension {
                    self.symbols.add_extension(tid, name, sid)
                } else {
                    self.symbols.add_member(tid, name, sid)
                };
                if !added {
                    warn!("[BIND] duplicate member '{}'", name_text);
                }
            }
        }
    }

    /// A name in a method signature: type parameters shadow declared types
    fn resolve_signature_type(&self, name: &str, tp_names: &[SmolStr]) -> Option<TypeId> {
        if tp_names.iter().any(|tp| tp == name) {
            return None;
        }
        self.types.lookup(name)
    }

    fn warn_on_inheritance_cycles(&self) {
        for (_, &tid) in self.declared.iter() {
            let mut visited = FxHashSet::default();
            visited.insert(tid);
            let mut current = self.types.get(tid).base;
            while let Some(next) = current {
                if !visited.insert(next) {
                    warn!(
                        "[BIND] inheritance cycle through '{}'",
                        self.types.get(tid).name
                    );
                    break;
                }
                current = self.types.get(next).base;
            }
        }
    }

    // =========================================================================
    // Body binding
    // =========================================================================

    fn bind_bodies(&mut self, file: &SourceFile) {
        for class in file.class_decls() {
            let Some(tid) = self.declared_type_of(&class) else {
                continue;
            };
            self.current_class = Some(tid);
            for member in class.members() {
                match member {
                    Member::Field(f) => {
                        if let Some(init) = f.initializer() {
                            let init_ty = self.bind_expr(&init);
                            let field_ty = f
                                .name()
                                .and_then(|n| self.symbols.member(tid, &n.text()))
                                .and_then(|sid| self.symbols.get(sid).ty);
                            if let (Some(i), Some(d)) = (init_ty, field_ty) {
                                if self.types.widens_to(i, d) {
                                    self.set_converted(init.syntax(), d);
                                }
                            }
                        }
                    }
                    Member::Method(m) => self.bind_method(tid, &m),
                    Member::Property(_) => {}
                }
            }
            self.current_class = None;
        }
        for ext in file.extension_decls() {
            let Some(tid) = ext
                .target()
                .and_then(|t| self.types.lookup(&t.path_text()))
            else {
                continue;
            };
            self.current_class = Some(tid);
            for member in ext.members() {
                if let Member::Method(m) = member {
                    self.bind_method(tid, &m);
                }
            }
            self.current_class = None;
        }
    }

    fn bind_method(&mut self, tid: TypeId, m: &MethodDecl) {
        self.scopes.push(FxHashMap::default());
        let method_sym = m.name().and_then(|n| {
            let name = n.text();
            self.symbols
                .member(tid, &name)
                .or_else(|| self.symbols.extension(tid, &name))
        });
        self.current_return = method_sym.and_then(|sid| self.symbols.get(sid).ty);

        let tp_names = type_param_names(m);
        let params: Vec<_> = m
            .param_list()
            .map(|pl| pl.params().collect())
            .unwrap_or_default();
        for param in params {
            let Some(name_text) = param.name().map(|n| n.text()).filter(|t| !t.is_empty())
            else {
                continue;
            };
            let name = self.interner.intern(&name_text);
            let ty = param
                .ty()
                .and_then(|t| self.resolve_signature_type(&t.path_text(), &tp_names));
            let sid = self.symbols.alloc(Symbol {
                name: name.clone(),
                kind: SymbolKind::Param,
                is_static: false,
                is_extension: false,
                containing_type: None,
                ty,
                type_params: 0,
                params: Vec::new(),
            });
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert(name, sid);
            }
        }

        if let Some(body) = m.body() {
            self.bind_block(&body);
        }
        self.scopes.pop();
        self.current_return = None;
    }

    fn bind_block(&mut self, block: &Block) {
        self.scopes.push(FxHashMap::default());
        for stmt in block.statements() {
            self.bind_stmt(&stmt);
        }
        self.scopes.pop();
    }

    fn bind_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(v) => {
                let declared_ty = v.ty().and_then(|t| self.types.lookup(&t.path_text()));
                let init = v.initializer();
                let init_ty = init.as_ref().and_then(|e| self.bind_expr(e));
                if let (Some(d), Some(e), Some(i)) = (declared_ty, init.as_ref(), init_ty) {
                    if self.types.widens_to(i, d) {
                        self.set_converted(e.syntax(), d);
                    }
                }
                if let Some(name_text) =
                    v.name().map(|n| n.text()).filter(|t| !t.is_empty())
                {
                    let name = self.interner.intern(&name_text);
                    let sid = self.symbols.alloc(Symbol {
                        name: name.clone(),
                        kind: SymbolKind::Local,
                        is_static: false,
                        is_extension: false,
                        containing_type: None,
                        ty: declared_ty.or(init_ty),
                        type_params: 0,
                        params: Vec::new(),
                    });
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.insert(name, sid);
                    }
                }
            }
            Stmt::Expr(e) => {
                if let Some(expr) = e.expr() {
                    self.bind_expr(&expr);
                }
            }
            Stmt::With(w) => {
                let subject = w.subject();
                let subject_ty = subject.as_ref().and_then(|e| self.bind_expr(e));
                match subject {
                    Some(s) => {
                        self.withs.push(WithFrame {
                            subject_ty,
                            subject: SyntaxNodePtr::new(s.syntax()),
                        });
                        if let Some(body) = w.body() {
                            self.bind_block(&body);
                        }
                        self.withs.pop();
                    }
                    None => {
                        if let Some(body) = w.body() {
                            self.bind_block(&body);
                        }
                    }
                }
            }
            Stmt::Return(r) => {
                if let Some(expr) = r.expr() {
                    let ty = self.bind_expr(&expr);
                    if let (Some(t), Some(ret)) = (ty, self.current_return) {
                        if self.types.widens_to(t, ret) {
                            self.set_converted(expr.syntax(), ret);
                        }
                    }
                }
            }
            Stmt::Block(b) => self.bind_block(b),
        }
    }

    // =========================================================================
    // Expression binding
    // =========================================================================

    fn bind_expr(&mut self, expr: &Expr) -> Option<TypeId> {
        let ty = match expr {
            Expr::Literal(lit) => self.literal_type(lit),
            Expr::NameRef(name) => self.bind_name_ref(name),
            Expr::This(_) => self.current_class,
            Expr::Base(_) => self.current_class.and_then(|c| self.types.get(c).base),
            Expr::ObjectCreation(oc) => {
                let args: Vec<_> = oc
                    .arg_list()
                    .map(|al| al.args().collect())
                    .unwrap_or_default();
                for arg in &args {
                    self.bind_expr(arg);
                }
                let ty = oc.ty().and_then(|t| self.types.lookup(&t.path_text()));
                if ty.is_none() {
                    trace!("[BIND] unresolved constructed type");
                }
                ty
            }
            Expr::MemberAccess(ma) => self.bind_member_access(ma),
            Expr::Call(call) => self.bind_call(call),
            Expr::Cast(cast) => self.bind_cast(cast),
            Expr::Paren(p) => p.inner().and_then(|inner| self.bind_expr(&inner)),
            Expr::Bin(b) => self.bind_bin(b),
            Expr::Assign(a) => self.bind_assign(a),
        };
        if let Some(t) = ty {
            self.type_facts.insert(
                SyntaxNodePtr::new(expr.syntax()),
                TypeInfo { ty: t, converted: t },
            );
        }
        ty
    }

    fn literal_type(&self, lit: &Literal) -> Option<TypeId> {
        match lit.token()?.kind() {
            SyntaxKind::INTEGER => Some(TypeId::INT),
            SyntaxKind::DECIMAL => Some(TypeId::DOUBLE),
            SyntaxKind::STRING => Some(TypeId::STRING),
            SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => Some(TypeId::BOOL),
            SyntaxKind::NULL_KW => Some(TypeId::OBJECT),
            _ => None,
        }
    }

    fn bind_name_ref(&mut self, name: &NameRef) -> Option<TypeId> {
        let text = name.text();
        if text.is_empty() {
            return None;
        }

        // Locals and parameters, innermost scope first
        let mut local = None;
        for scope in self.scopes.iter().rev() {
            if let Some(&sid) = scope.get(text.as_str()) {
                local = Some(sid);
                break;
            }
        }
        if let Some(sid) = local {
            self.record(
                name.syntax(),
                Resolution {
                    symbol: sid,
                    reduced: false,
                    receiver: None,
                },
            );
            return self.symbols.get(sid).ty;
        }

        // Members of enclosing `with` subjects, innermost first
        for i in (0..self.withs.len()).rev() {
            let Some(subject_ty) = self.withs[i].subject_ty else {
                continue;
            };
            if let Some(sid) = self.lookup_member_in_chain(subject_ty, &text) {
                let subject = self.withs[i].subject.clone();
                trace!("[BIND] '{}' bound via with-subject", text);
                self.record(
                    name.syntax(),
                    Resolution {
                        symbol: sid,
                        reduced: false,
                        receiver: Some(subject),
                    },
                );
                return self.value_type(sid);
            }
        }

        // Members of the enclosing class, including inherited ones
        if let Some(class) = self.current_class {
            if let Some(sid) = self.lookup_member_in_chain(class, &text) {
                self.record(
                    name.syntax(),
                    Resolution {
                        symbol: sid,
                        reduced: false,
                        receiver: None,
                    },
                );
                return self.value_type(sid);
            }
        }

        // A type name; types have no value type
        if let Some(tid) = self.types.lookup(&text) {
            if let Some(sid) = self.symbols.class_symbol(tid) {
                self.record(
                    name.syntax(),
                    Resolution {
                        symbol: sid,
                        reduced: false,
                        receiver: None,
                    },
                );
            }
            return None;
        }

        trace!("[BIND] unresolved name '{}'", text);
        None
    }

    fn bind_member_access(&mut self, ma: &MemberAccessExpr) -> Option<TypeId> {
        let recv = ma.receiver();
        let recv_ty = recv.as_ref().and_then(|r| self.bind_expr(r));
        let name = ma.name()?;
        let text = name.text();
        if text.is_empty() {
            return None;
        }
        let recv_expr = recv?;

        // A class-name receiver makes this a static reference
        let receiver_class = self
            .resolutions
            .get(&SyntaxNodePtr::new(recv_expr.syntax()))
            .and_then(|r| {
                let sym = self.symbols.get(r.symbol);
                if sym.kind == SymbolKind::Class { sym.ty } else { None }
            });
        let (lookup_ty, receiver_is_type) = match receiver_class {
            Some(t) => (Some(t), true),
            None => (recv_ty, false),
        };
        let Some(lookup_ty) = lookup_ty else {
            trace!("[BIND] unresolved receiver for '{}'", text);
            return None;
        };

        if let Some(sid) = self.lookup_member_in_chain(lookup_ty, &text) {
            let receiver = if receiver_is_type {
                None
            } else {
                Some(SyntaxNodePtr::new(recv_expr.syntax()))
            };
            let res = Resolution {
                symbol: sid,
                reduced: false,
                receiver,
            };
            self.record(name.syntax(), res.clone());
            self.record(ma.syntax(), res);
            return self.value_type(sid);
        }

        // Extension methods bind through the receiver value
        if !receiver_is_type {
            if let Some(sid) = self.lookup_extension_in_chain(lookup_ty, &text) {
                let res = Resolution {
                    symbol: sid,
                    reduced: true,
                    receiver: Some(SyntaxNodePtr::new(recv_expr.syntax())),
                };
                self.record(name.syntax(), res.clone());
                self.record(ma.syntax(), res);
                return None;
            }
        }

        trace!("[BIND] unresolved member '{}'", text);
        None
    }

    fn bind_call(&mut self, call: &CallExpr) -> Option<TypeId> {
        let callee = call.callee();
        if let Some(c) = &callee {
            self.bind_expr(c);
        }
        let args: Vec<_> = call
            .arg_list()
            .map(|al| al.args().collect())
            .unwrap_or_default();
        let arg_tys: Vec<_> = args.iter().map(|a| self.bind_expr(a)).collect();

        let res = callee
            .as_ref()
            .and_then(|c| self.resolutions.get(&SyntaxNodePtr::new(c.syntax())))
            .cloned();
        if let Some(res) = res {
            let sym = self.symbols.get(res.symbol).clone();
            if sym.kind == SymbolKind::Method {
                self.record(call.syntax(), res);
                for ((arg, arg_ty), param_ty) in
                    args.iter().zip(arg_tys.iter()).zip(sym.params.iter())
                {
                    if let (Some(a), Some(p)) = (arg_ty, param_ty) {
                        if self.types.widens_to(*a, *p) {
                            self.set_converted(arg.syntax(), *p);
                        }
                    }
                }
                return sym.ty;
            }
        }
        None
    }

    fn bind_cast(&mut self, cast: &CastExpr) -> Option<TypeId> {
        let target = cast.ty().and_then(|t| self.types.lookup(&t.path_text()));
        let inner = cast.inner();
        let inner_ty = inner.as_ref().and_then(|i| self.bind_expr(i));
        if let (Some(t), Some(i), Some(ity)) = (target, inner.as_ref(), inner_ty) {
            if t != ity && self.types.is_numeric(t) && self.types.is_numeric(ity) {
                self.set_converted(i.syntax(), t);
            }
        }
        target
    }

    fn bind_bin(&mut self, bin: &BinExpr) -> Option<TypeId> {
        let lhs = bin.lhs();
        let rhs = bin.rhs();
        let lt = lhs.as_ref().and_then(|e| self.bind_expr(e));
        let rt = rhs.as_ref().and_then(|e| self.bind_expr(e));
        let op = bin.op()?.kind();
        match op {
            SyntaxKind::PLUS
            | SyntaxKind::MINUS
            | SyntaxKind::STAR
            | SyntaxKind::SLASH
            | SyntaxKind::PERCENT => {
                if op == SyntaxKind::PLUS
                    && (lt == Some(TypeId::STRING) || rt == Some(TypeId::STRING))
                {
                    return Some(TypeId::STRING);
                }
                let promoted = self.types.promote(lt?, rt?)?;
                self.promote_operand(lhs.as_ref(), lt, promoted);
                self.promote_operand(rhs.as_ref(), rt, promoted);
                Some(promoted)
            }
            SyntaxKind::EQ_EQ
            | SyntaxKind::BANG_EQ
            | SyntaxKind::LT
            | SyntaxKind::GT
            | SyntaxKind::LT_EQ
            | SyntaxKind::GT_EQ => {
                if let (Some(l), Some(r)) = (lt, rt) {
                    if let Some(promoted) = self.types.promote(l, r) {
                        self.promote_operand(lhs.as_ref(), lt, promoted);
                        self.promote_operand(rhs.as_ref(), rt, promoted);
                    }
                }
                Some(TypeId::BOOL)
            }
            SyntaxKind::AMP_AMP | SyntaxKind::PIPE_PIPE => Some(TypeId::BOOL),
            _ => None,
        }
    }

    fn promote_operand(&mut self, expr: Option<&Expr>, ty: Option<TypeId>, to: TypeId) {
        if let (Some(e), Some(t)) = (expr, ty) {
            if t != to {
                self.set_converted(e.syntax(), to);
            }
        }
    }

    fn bind_assign(&mut self, assign: &AssignExpr) -> Option<TypeId> {
        let target = assign.target();
        let value = assign.value();
        let target_ty = target.as_ref().and_then(|e| self.bind_expr(e));
        let value_ty = value.as_ref().and_then(|e| self.bind_expr(e));
        if let (Some(t), Some(v), Some(vt)) = (target_ty, value.as_ref(), value_ty) {
            if self.types.widens_to(vt, t) {
                self.set_converted(v.syntax(), t);
            }
        }
        target_ty
    }

    // =========================================================================
    // Lookup helpers
    // =========================================================================

    fn declared_type_of(&self, class: &ClassDecl) -> Option<TypeId> {
        self.declared
            .get(&SyntaxNodePtr::new(class.syntax()))
            .copied()
    }

    fn lookup_member_in_chain(&self, ty: TypeId, name: &str) -> Option<SymbolId> {
        self.types
            .base_chain(ty)
            .find_map(|t| self.symbols.member(t, name))
    }

    fn lookup_extension_in_chain(&self, ty: TypeId, name: &str) -> Option<SymbolId> {
        self.types
            .base_chain(ty)
            .find_map(|t| self.symbols.extension(t, name))
    }

    /// The type a reference to the symbol has in value position.
    /// Method groups have none until they are called.
    fn value_type(&self, sid: SymbolId) -> Option<TypeId> {
        let sym = self.symbols.get(sid);
        match sym.kind {
            SymbolKind::Method => None,
            _ => sym.ty,
        }
    }

    fn record(&mut self, node: &SyntaxNode, res: Resolution) {
        self.resolutions.insert(SyntaxNodePtr::new(node), res);
    }

    fn set_converted(&mut self, node: &SyntaxNode, to: TypeId) {
        if let Some(fact) = self.type_facts.get_mut(&SyntaxNodePtr::new(node)) {
            fact.converted = to;
        }
    }
}

/// Declared type-parameter names of a method
fn type_param_names(m: &MethodDecl) -> Vec<SmolStr> {
    m.type_param_list()
        .map(|tpl| tpl.names().map(|n| n.text()).collect())
        .unwrap_or_default()
}
