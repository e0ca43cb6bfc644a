//! Markup parser and serializer for single-file components.
//!
//! This crate provides the attributed tree that template transformations
//! operate on:
//! - Lexer (tokenizer) using `logos`
//! - Error-recovering recursive descent parser
//! - Tree types that keep attribute order, raw values, and quoting
//! - A serializer that writes untouched nodes back unchanged
//!
//! # Example
//!
//! ```
//! use sfc_markup::{parse, serialize};
//!
//! let source = r#"<template><div v-if="ok">{{ msg }}</div></template>"#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert_eq!(serialize(&result.document), source);
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod serialize;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use serialize::{serialize, serialize_node};

/// The result of parsing markup.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document.
    pub document: Document,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses markup into a document.
///
/// This function will attempt to parse the entire input and recover from
/// errors where possible, returning both the tree and any errors encountered.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}
