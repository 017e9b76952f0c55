//! Shared intermediate types for the PHPDoc front-end.
//!
//! This crate defines the types every stage exchanges:
//!
//! - [`Span`] and [`SourcePosition`] for source locations
//! - [`LineBreaks`] for offset-to-line resolution
//! - [`Token`], [`DocTokenKind`] and [`SemanticValue`] for the scanner
//! - [`ParseElement`] and [`DocElement`] for the parser output
//!
//! It has no dependencies on the other compiler crates, so any stage
//! (and any embedding tool) can use it without pulling in the lexer or
//! parser.

pub mod element;
pub mod line_breaks;
pub mod position;
pub mod span;
pub mod token;

pub use element::{DocElement, DocElementType, ParseElement, TypeRef, Visibility};
pub use line_breaks::{LineBreaks, PositionOutOfRange};
pub use position::SourcePosition;
pub use span::Span;
pub use token::{DocTokenKind, SemanticValue, Token, TokenSet, PLAIN_TOKENS};
