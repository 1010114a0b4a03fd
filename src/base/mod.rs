//! Foundation types for the protosense toolchain.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`] - Line/column positions for AST nodes
//! - Domain constants (file extension, scalar types, vendor path segments)
//!
//! This module has NO dependencies on other protosense modules.

pub mod constants;
mod position;
mod span;

pub use position::{Position, Span};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
