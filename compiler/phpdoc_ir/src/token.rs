//! Token types for the PHPDoc scanner.
//!
//! A token pairs a kind with its semantic value (the matched lexeme for
//! textual kinds) and its full source position. Kinds cover the
//! structural comment markers, the payload-carrying plain kinds, the
//! recognized tag kinds, and the synthetic compound kind produced by the
//! compound-token adapter.

use crate::position::SourcePosition;
use std::fmt;

/// Token kinds produced by the lexer core and the scanner layers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum DocTokenKind {
    /// `/**` opening a doc comment. Discarded by the scanner layer.
    Begin,
    /// Leading `[ \t]*\*` decoration of a comment line. Discarded.
    LineBegin,
    /// `*/` closing a doc comment. Discarded.
    End,
    /// A line terminator. Rewritten to `Whitespace` with payload `"\n"`.
    Newline,

    Whitespace,
    Identifier,
    Integer,
    Symbol,
    LBracket,
    RBracket,
    Array,
    Public,
    Private,
    Protected,
    Dollar,
    Bar,

    /// `@param`
    TagParam,
    /// `@var`
    TagVar,
    /// `@return` / `@returns`
    TagReturn,
    /// `@throws`
    TagThrows,
    /// `@access`
    TagAccess,
    /// Any other `@name` tag.
    Tag,

    /// Synthetic token fusing a run of plain tokens; adapter output only.
    Compound,

    Error,
    Eof,
}

impl DocTokenKind {
    /// Stable bit index for [`TokenSet`] membership.
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// Kinds absorbed into compound tokens (and the kinds whose semantic
    /// value carries the matched lexeme).
    #[inline]
    pub const fn is_plain(self) -> bool {
        PLAIN_TOKENS.contains(self)
    }

    /// Human-readable name used in diagnostics.
    pub const fn describe(self) -> &'static str {
        match self {
            DocTokenKind::Begin => "'/**'",
            DocTokenKind::LineBegin => "line decoration",
            DocTokenKind::End => "'*/'",
            DocTokenKind::Newline => "line break",
            DocTokenKind::Whitespace => "whitespace",
            DocTokenKind::Identifier => "identifier",
            DocTokenKind::Integer => "integer",
            DocTokenKind::Symbol => "symbol",
            DocTokenKind::LBracket => "'['",
            DocTokenKind::RBracket => "']'",
            DocTokenKind::Array => "'array'",
            DocTokenKind::Public => "'public'",
            DocTokenKind::Private => "'private'",
            DocTokenKind::Protected => "'protected'",
            DocTokenKind::Dollar => "'$'",
            DocTokenKind::Bar => "'|'",
            DocTokenKind::TagParam => "'@param'",
            DocTokenKind::TagVar => "'@var'",
            DocTokenKind::TagReturn => "'@return'",
            DocTokenKind::TagThrows => "'@throws'",
            DocTokenKind::TagAccess => "'@access'",
            DocTokenKind::Tag => "tag",
            DocTokenKind::Compound => "text",
            DocTokenKind::Error => "invalid input",
            DocTokenKind::Eof => "end of input",
        }
    }
}

/// A set of token kinds using bitset representation for O(1) membership
/// testing. 25 kinds fit comfortably in a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSet(u32);

impl TokenSet {
    /// Create an empty token set.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a token kind to this set (builder pattern for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: DocTokenKind) -> Self {
        Self(self.0 | (1u32 << kind.discriminant_index()))
    }

    /// Union of two token sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if this set contains a token kind.
    #[inline]
    pub const fn contains(&self, kind: DocTokenKind) -> bool {
        (self.0 & (1u32 << kind.discriminant_index())) != 0
    }

    /// Check if this set is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Count the number of token kinds in this set.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// The "plain" kinds: fused into compound tokens by the adapter, and the
/// kinds whose semantic value is the exact matched lexeme.
pub const PLAIN_TOKENS: TokenSet = TokenSet::new()
    .with(DocTokenKind::Identifier)
    .with(DocTokenKind::Whitespace)
    .with(DocTokenKind::Integer)
    .with(DocTokenKind::Symbol)
    .with(DocTokenKind::LBracket)
    .with(DocTokenKind::RBracket)
    .with(DocTokenKind::Array)
    .with(DocTokenKind::Public)
    .with(DocTokenKind::Private)
    .with(DocTokenKind::Protected)
    .with(DocTokenKind::Dollar)
    .with(DocTokenKind::Bar);

/// Semantic value of a token: at most one payload per kind.
///
/// Textual kinds carry their lexeme; marker kinds and `Eof` carry
/// nothing. No kind of this grammar needs an opaque object payload.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub enum SemanticValue {
    #[default]
    None,
    Str(String),
}

impl SemanticValue {
    /// The string payload, or `""` for payload-less tokens.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            SemanticValue::None => "",
            SemanticValue::Str(s) => s,
        }
    }
}

impl fmt::Debug for SemanticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticValue::None => write!(f, "-"),
            SemanticValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A scanner-level token.
#[derive(Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: DocTokenKind,
    pub value: SemanticValue,
    pub position: SourcePosition,
}

impl Token {
    #[inline]
    pub fn new(kind: DocTokenKind, value: SemanticValue, position: SourcePosition) -> Self {
        Token {
            kind,
            value,
            position,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @ {:?}", self.kind, self.value, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminant_index_uniqueness() {
        let all = [
            DocTokenKind::Begin,
            DocTokenKind::LineBegin,
            DocTokenKind::End,
            DocTokenKind::Newline,
            DocTokenKind::Whitespace,
            DocTokenKind::Identifier,
            DocTokenKind::Integer,
            DocTokenKind::Symbol,
            DocTokenKind::LBracket,
            DocTokenKind::RBracket,
            DocTokenKind::Array,
            DocTokenKind::Public,
            DocTokenKind::Private,
            DocTokenKind::Protected,
            DocTokenKind::Dollar,
            DocTokenKind::Bar,
            DocTokenKind::TagParam,
            DocTokenKind::TagVar,
            DocTokenKind::TagReturn,
            DocTokenKind::TagThrows,
            DocTokenKind::TagAccess,
            DocTokenKind::Tag,
            DocTokenKind::Compound,
            DocTokenKind::Error,
            DocTokenKind::Eof,
        ];
        let mut seen = 0u32;
        for kind in all {
            let bit = 1u32 << kind.discriminant_index();
            assert_eq!(seen & bit, 0, "duplicate index for {kind:?}");
            seen |= bit;
        }
        assert_eq!(seen.count_ones() as usize, all.len());
    }

    #[test]
    fn test_plain_set() {
        assert!(DocTokenKind::Identifier.is_plain());
        assert!(DocTokenKind::Whitespace.is_plain());
        assert!(DocTokenKind::Dollar.is_plain());
        assert!(DocTokenKind::Bar.is_plain());
        assert!(!DocTokenKind::TagParam.is_plain());
        assert!(!DocTokenKind::Compound.is_plain());
        assert!(!DocTokenKind::Eof.is_plain());
        assert!(!DocTokenKind::Newline.is_plain());
        assert_eq!(PLAIN_TOKENS.count(), 12);
    }

    #[test]
    fn test_token_set_ops() {
        let set = TokenSet::new()
            .with(DocTokenKind::Public)
            .with(DocTokenKind::Private);
        assert!(set.contains(DocTokenKind::Public));
        assert!(!set.contains(DocTokenKind::Protected));
        let all = set.union(TokenSet::new().with(DocTokenKind::Protected));
        assert_eq!(all.count(), 3);
        assert!(TokenSet::new().is_empty());
    }

    #[test]
    fn test_semantic_value() {
        assert_eq!(SemanticValue::None.as_str(), "");
        assert_eq!(SemanticValue::Str("abc".to_owned()).as_str(), "abc");
        assert_eq!(SemanticValue::default(), SemanticValue::None);
    }
}
