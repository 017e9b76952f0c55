//! Scanner layer for PHPDoc comments.
//!
//! Builds on `phpdoc_lexer_core`'s raw tokens to produce the token
//! stream the parser consumes:
//!
//! - [`Scanner`] discards frame markers, resolves keywords and tags,
//!   fills in string payloads and full source positions
//! - [`CompoundScanner`] optionally fuses runs of plain tokens into
//!   single `Compound` tokens, toggled by parser state

mod keywords;

pub mod compound;
pub mod scanner;

pub use compound::CompoundScanner;
pub use scanner::Scanner;
