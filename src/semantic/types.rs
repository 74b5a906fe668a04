//! Named types, base chains, and the implicit numeric conversions.

use indexmap::IndexMap;

use crate::base::{IStr, Interner};

/// Index of a named type in the [`TypeTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub const OBJECT: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const LONG: TypeId = TypeId(2);
    pub const DOUBLE: TypeId = TypeId(3);
    pub const BOOL: TypeId = TypeId(4);
    pub const STRING: TypeId = TypeId(5);
    pub const VOID: TypeId = TypeId(6);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A declared or builtin named type
#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: IStr,
    /// Direct base type; `None` for root and builtin types
    pub base: Option<TypeId>,
    pub builtin: bool,
}

/// All named types of one program snapshot
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<NamedType>,
    by_name: IndexMap<IStr, TypeId>,
}

impl TypeTable {
    /// Builtin names, in [`TypeId`] constant order
    const BUILTINS: [&'static str; 7] =
        ["object", "int", "long", "double", "bool", "string", "void"];

    pub(crate) fn with_builtins(interner: &Interner) -> Self {
        let mut table = Self::default();
        for name in Self::BUILTINS {
            table.insert(interner.intern(name), None, true);
        }
        table
    }

    /// Register a type; the first declaration of a name wins.
    pub(crate) fn insert(&mut self, name: IStr, base: Option<TypeId>, builtin: bool) -> TypeId {
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(NamedType {
            name: name.clone(),
            base,
            builtin,
        });
        self.by_name.insert(name, id);
        id
    }

    pub(crate) fn set_base(&mut self, id: TypeId, base: Option<TypeId>) {
        self.types[id.index()].base = base;
    }

    pub fn get(&self, id: TypeId) -> &NamedType {
        &self.types[id.index()]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The base chain starting at the type itself: `T, base(T), ...`
    ///
    /// Capped at the table size so a malformed inheritance cycle terminates.
    pub fn base_chain(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let cap = self.types.len() + 1;
        let mut current = Some(id);
        let mut steps = 0usize;
        std::iter::from_fn(move || {
            if steps >= cap {
                return None;
            }
            let id = current?;
            steps += 1;
            current = self.get(id).base;
            Some(id)
        })
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        matches!(id, TypeId::INT | TypeId::LONG | TypeId::DOUBLE)
    }

    /// Strict implicit widening (identity excluded)
    pub fn widens_to(&self, from: TypeId, to: TypeId) -> bool {
        matches!(
            (from, to),
            (TypeId::INT, TypeId::LONG)
                | (TypeId::INT, TypeId::DOUBLE)
                | (TypeId::LONG, TypeId::DOUBLE)
        )
    }

    /// Result type of a numeric binary operation
    pub fn promote(&self, lhs: TypeId, rhs: TypeId) -> Option<TypeId> {
        if !self.is_numeric(lhs) || !self.is_numeric(rhs) {
            return None;
        }
        Some(if lhs == TypeId::DOUBLE || rhs == TypeId::DOUBLE {
            TypeId::DOUBLE
        } else if lhs == TypeId::LONG || rhs == TypeId::LONG {
            TypeId::LONG
        } else {
            TypeId::INT
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_have_fixed_ids() {
        let interner = Interner::new();
        let table = TypeTable::with_builtins(&interner);
        assert_eq!(table.lookup("object"), Some(TypeId::OBJECT));
        assert_eq!(table.lookup("long"), Some(TypeId::LONG));
        assert_eq!(table.lookup("void"), Some(TypeId::VOID));
    }

    #[test]
    fn test_base_chain_is_self_inclusive() {
        let interner = Interner::new();
        let mut table = TypeTable::with_builtins(&interner);
        let base = table.insert(interner.intern("Gadget"), Some(TypeId::OBJECT), false);
        let derived = table.insert(interner.intern("Widget"), Some(base), false);
        let chain: Vec<_> = table.base_chain(derived).collect();
        assert_eq!(chain, vec![derived, base, TypeId::OBJECT]);
    }

    #[test]
    fn test_base_chain_cycle_terminates() {
        let interner = Interner::new();
        let mut table = TypeTable::with_builtins(&interner);
        let a = table.insert(interner.intern("A"), None, false);
        let b = table.insert(interner.intern("B"), Some(a), false);
        table.set_base(a, Some(b));
        assert!(table.base_chain(a).count() <= table.len() + 1);
    }

    #[test]
    fn test_widening() {
        let interner = Interner::new();
        let table = TypeTable::with_builtins(&interner);
        assert!(table.widens_to(TypeId::INT, TypeId::LONG));
        assert!(!table.widens_to(TypeId::LONG, TypeId::INT));
        assert!(!table.widens_to(TypeId::INT, TypeId::INT));
        assert_eq!(
            table.promote(TypeId::INT, TypeId::LONG),
            Some(TypeId::LONG)
        );
    }
}
