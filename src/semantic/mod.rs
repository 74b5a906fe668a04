//! Semantic analysis over one immutable tree snapshot.
//!
//! A single binding pass produces a [`SemanticModel`]: symbol resolution,
//! (static, converted) type pairs, member-reference operations with captured
//! receivers, and declaration lookups. The model is read-only afterwards and
//! safe for concurrent queries.

mod binder;
mod model;
mod symbols;
mod types;

pub use model::{MemberReference, Resolution, SemanticModel, TypeInfo};
pub use symbols::{Symbol, SymbolId, SymbolKind, SymbolTable};
pub use types::{NamedType, TypeId, TypeTable};
