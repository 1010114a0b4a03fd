//! Protobuf syntax: the owned AST and the engines that produce it.
//!
//! - [`parser`] - direct recursive-descent parser (primary engine)
//! - [`lower`] - lowering from the lossless rowan tree (alternate engine)
//! - [`selector`] - chooses an engine per call, with fallback

pub mod ast;
mod comments;
mod literals;
pub mod lower;
pub mod parser;
pub mod selector;

pub use ast::*;
pub use parser::parse;
pub use selector::{
    ParseEngine, ParseEngineError, ParserSelector, ProtoParser, Strategy, TreeParser,
};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};
