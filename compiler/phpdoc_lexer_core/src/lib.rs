//! Raw tokenizer for PHPDoc comments.
//!
//! This crate turns comment text into a flat stream of [`RawToken`]s:
//! frame markers (`/**`, line decoration, `*/`), line terminators, and
//! the interior kinds (identifiers, tags, whitespace, punctuation).
//! Every byte of the input is covered by exactly one token.
//!
//! Keyword and tag resolution, payload extraction and position
//! computation all live in the scanner layer (`phpdoc_lexer`); this
//! crate only classifies bytes.

pub mod raw_scanner;
pub mod raw_token;

pub use raw_scanner::{tokenize, RawScanner};
pub use raw_token::RawToken;
