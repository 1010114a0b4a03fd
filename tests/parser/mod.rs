//! Parser tests: tolerant parsing and engine selection.

pub mod tests_parse;
