//! Raw token definition.
//!
//! [`RawToken`] pairs a token kind with its byte span. Interior (within
//! one comment line) tokens come from a logos-derived lexer; the frame
//! markers `/**`, line decoration and line terminators are recognized by
//! the hand-written scanner in [`crate::raw_scanner`], which logos
//! cannot express because they are position-dependent.
//!
//! The raw layer does not resolve keywords: `array`, `public` and the
//! recognized `@` tags all surface as `Identifier` / `Tag` here and are
//! classified by the scanner layer above.

use logos::Logos;
use phpdoc_ir::{DocTokenKind, Span};

/// One raw token: kind plus byte span into the scanned text.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RawToken {
    pub kind: DocTokenKind,
    pub span: Span,
}

impl RawToken {
    #[inline]
    pub(crate) const fn new(kind: DocTokenKind, span: Span) -> Self {
        RawToken { kind, span }
    }
}

/// Logos lexer for line interiors.
///
/// Fed one line segment at a time (never a line terminator), so no
/// variant matches across lines. The catch-all `Symbol` rule guarantees
/// every byte of the segment is covered by some token.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(crate) enum InteriorToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"[0-9]+")]
    Integer,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("$")]
    Dollar,

    #[token("|")]
    Bar,

    #[token("*/")]
    End,

    // `@name`; specific tags are resolved by the scanner layer.
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_-]*")]
    Tag,

    // PHP identifier, optionally namespace-qualified (`\Foo\Bar`).
    #[regex(r"\\?[a-zA-Z_][a-zA-Z0-9_]*(\\[a-zA-Z_][a-zA-Z0-9_]*)*")]
    Ident,

    // Any other single character.
    #[regex(r".", priority = 0)]
    Symbol,
}

impl InteriorToken {
    /// Map an interior token to its raw kind.
    pub(crate) fn kind(self) -> DocTokenKind {
        match self {
            InteriorToken::Whitespace => DocTokenKind::Whitespace,
            InteriorToken::Integer => DocTokenKind::Integer,
            InteriorToken::LBracket => DocTokenKind::LBracket,
            InteriorToken::RBracket => DocTokenKind::RBracket,
            InteriorToken::Dollar => DocTokenKind::Dollar,
            InteriorToken::Bar => DocTokenKind::Bar,
            InteriorToken::End => DocTokenKind::End,
            InteriorToken::Tag => DocTokenKind::Tag,
            InteriorToken::Ident => DocTokenKind::Identifier,
            InteriorToken::Symbol => DocTokenKind::Symbol,
        }
    }
}
