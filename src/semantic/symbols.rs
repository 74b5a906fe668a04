//! Symbol table: the resolved meaning of declarations.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::types::TypeId;
use crate::base::IStr;

/// Index of a symbol in the [`SymbolTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Field,
    Property,
    Method,
    Local,
    Param,
}

/// A resolved declaration
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: IStr,
    pub kind: SymbolKind,
    pub is_static: bool,
    /// Declared in an `extend` block rather than the type body
    pub is_extension: bool,
    pub containing_type: Option<TypeId>,
    /// Field/property type, method return type, or a class's own type.
    /// `None` when the declared type name does not resolve (e.g. a method
    /// type parameter).
    pub ty: Option<TypeId>,
    /// Generic arity for methods
    pub type_params: u16,
    /// Declared parameter types for methods, `None` per unresolvable name
    pub params: Vec<Option<TypeId>>,
}

impl Symbol {
    pub fn is_member(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Field | SymbolKind::Property | SymbolKind::Method
        )
    }

    /// A method declared with type parameters, whether referenced directly
    /// or bound through an extension reduction.
    pub fn is_generic_method(&self) -> bool {
        self.kind == SymbolKind::Method && self.type_params > 0
    }
}

/// All symbols of one program snapshot, with per-type member indexes
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Declared members per type, in declaration order; first declaration of
    /// a name wins
    members: FxHashMap<TypeId, IndexMap<IStr, SymbolId>>,
    /// Extension members per extended type
    extensions: FxHashMap<TypeId, IndexMap<IStr, SymbolId>>,
    /// The class symbol for each declared type
    classes: FxHashMap<TypeId, SymbolId>,
}

impl SymbolTable {
    pub(crate) fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub(crate) fn add_member(&mut self, ty: TypeId, name: IStr, id: SymbolId) -> bool {
        let slot = self.members.entry(ty).or_default();
        if slot.contains_key(&name) {
            return false;
        }
        slot.insert(name, id);
        true
    }

    pub(crate) fn add_extension(&mut self, ty: TypeId, name: IStr, id: SymbolId) -> bool {
        let slot = self.extensions.entry(ty).or_default();
        if slot.contains_key(&name) {
            return false;
        }
        slot.insert(name, id);
        true
    }

    pub(crate) fn set_class(&mut self, ty: TypeId, id: SymbolId) {
        self.classes.entry(ty).or_insert(id);
    }

    pub fn class_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        self.classes.get(&ty).copied()
    }

    /// Member declared directly on the type (no base-chain walk)
    pub fn member(&self, ty: TypeId, name: &str) -> Option<SymbolId> {
        self.members.get(&ty)?.get(name).copied()
    }

    /// Extension member registered for the type (no base-chain walk)
    pub fn extension(&self, ty: TypeId, name: &str) -> Option<SymbolId> {
        self.extensions.get(&ty)?.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
