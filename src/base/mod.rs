//! Foundation types for the qualex toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Interner`], [`IStr`] - String interning for symbol names
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//!
//! This module has NO dependencies on other qualex modules.

mod intern;

pub use intern::{IStr, Interner};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
