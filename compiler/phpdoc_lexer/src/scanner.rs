//! Token fetch loop.
//!
//! [`Scanner`] turns the raw token stream into parser-facing tokens:
//!
//! - `Begin`, `LineBegin` and `End` frame markers are consumed silently
//! - `Newline` is rewritten to `Whitespace` with the normalized payload
//!   `"\n"`, so free text never depends on the source's terminator style
//! - plain tokens get their lexeme as string payload
//! - identifiers and tags are resolved against the keyword tables
//!
//! Positions are full line/column coordinates resolved against a
//! [`LineBreaks`] table built once per scanner.

use crate::keywords::{ident_keyword, tag_keyword};
use phpdoc_ir::{DocTokenKind, LineBreaks, SemanticValue, SourcePosition, Token};
use phpdoc_lexer_core::RawScanner;

pub struct Scanner<'a> {
    text: &'a str,
    raw: RawScanner<'a>,
    line_breaks: LineBreaks,
    saw_begin: bool,
    saw_end: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Scanner {
            text,
            raw: RawScanner::new(text),
            line_breaks: LineBreaks::create(text),
            saw_begin: false,
            saw_end: false,
        }
    }

    /// The line-break table for the scanned text.
    pub fn line_breaks(&self) -> &LineBreaks {
        &self.line_breaks
    }

    /// True when a `/**` opener was consumed without a matching `*/`.
    ///
    /// Only meaningful once the scanner has reached `Eof`.
    pub fn is_unterminated(&self) -> bool {
        self.saw_begin && !self.saw_end
    }

    /// Fetch the next parser-facing token.
    ///
    /// Returns `Eof` forever once the text is exhausted.
    pub fn fetch_token(&mut self) -> Token {
        loop {
            let raw = self.raw.next_token();
            let position = SourcePosition::from_span(&self.line_breaks, raw.span);
            let slice = &self.text[raw.span.to_range()];

            let token = match raw.kind {
                DocTokenKind::Begin => {
                    self.saw_begin = true;
                    continue;
                }
                DocTokenKind::End => {
                    self.saw_end = true;
                    continue;
                }
                DocTokenKind::LineBegin => continue,

                DocTokenKind::Newline => Token::new(
                    DocTokenKind::Whitespace,
                    SemanticValue::Str("\n".to_owned()),
                    position,
                ),

                DocTokenKind::Identifier => {
                    let kind = ident_keyword(slice).unwrap_or(DocTokenKind::Identifier);
                    Token::new(kind, SemanticValue::Str(slice.to_owned()), position)
                }

                DocTokenKind::Tag => match tag_keyword(slice) {
                    Some(kind) => Token::new(kind, SemanticValue::None, position),
                    // Generic tag: payload is the name without the '@'.
                    None => Token::new(
                        DocTokenKind::Tag,
                        SemanticValue::Str(slice[1..].to_owned()),
                        position,
                    ),
                },

                DocTokenKind::Whitespace
                | DocTokenKind::Integer
                | DocTokenKind::Symbol
                | DocTokenKind::LBracket
                | DocTokenKind::RBracket
                | DocTokenKind::Dollar
                | DocTokenKind::Bar
                | DocTokenKind::Error => {
                    Token::new(raw.kind, SemanticValue::Str(slice.to_owned()), position)
                }

                DocTokenKind::Eof => Token::new(DocTokenKind::Eof, SemanticValue::None, position),

                // Raw layer never produces these.
                DocTokenKind::Array
                | DocTokenKind::Public
                | DocTokenKind::Private
                | DocTokenKind::Protected
                | DocTokenKind::TagParam
                | DocTokenKind::TagVar
                | DocTokenKind::TagReturn
                | DocTokenKind::TagThrows
                | DocTokenKind::TagAccess
                | DocTokenKind::Compound => {
                    Token::new(raw.kind, SemanticValue::Str(slice.to_owned()), position)
                }
            };
            return token;
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn drain(text: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(text);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.fetch_token();
            let done = token.kind == DocTokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(text: &str) -> Vec<DocTokenKind> {
        drain(text).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn frame_markers_are_discarded() {
        assert_eq!(
            kinds("/**\n * hi\n */"),
            vec![
                DocTokenKind::Whitespace, // "\n"
                DocTokenKind::Identifier, // "hi"
                DocTokenKind::Whitespace, // "\n"
                DocTokenKind::Whitespace, // " "
                DocTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newline_normalized_to_whitespace() {
        for text in ["a\nb", "a\r\nb", "a\u{2028}b"] {
            let tokens = drain(text);
            assert_eq!(tokens[1].kind, DocTokenKind::Whitespace, "for {text:?}");
            assert_eq!(tokens[1].value.as_str(), "\n", "for {text:?}");
        }
    }

    #[test]
    fn payloads_carry_lexemes() {
        let tokens = drain("foo  42.");
        assert_eq!(tokens[0].value.as_str(), "foo");
        assert_eq!(tokens[1].value.as_str(), "  ");
        assert_eq!(tokens[2].value.as_str(), "42");
        assert_eq!(tokens[3].kind, DocTokenKind::Symbol);
        assert_eq!(tokens[3].value.as_str(), ".");
    }

    #[test]
    fn recognized_tags_have_no_payload() {
        let tokens = drain("@param @returns");
        assert_eq!(tokens[0].kind, DocTokenKind::TagParam);
        assert_eq!(tokens[0].value, SemanticValue::None);
        assert_eq!(tokens[2].kind, DocTokenKind::TagReturn);
    }

    #[test]
    fn generic_tag_payload_drops_the_at() {
        let tokens = drain("@since");
        assert_eq!(tokens[0].kind, DocTokenKind::Tag);
        assert_eq!(tokens[0].value.as_str(), "since");
    }

    #[test]
    fn type_keywords_resolved() {
        let tokens = drain("array public x");
        assert_eq!(tokens[0].kind, DocTokenKind::Array);
        assert_eq!(tokens[0].value.as_str(), "array");
        assert_eq!(tokens[2].kind, DocTokenKind::Public);
        assert_eq!(tokens[4].kind, DocTokenKind::Identifier);
    }

    #[test]
    fn positions_track_lines() {
        let tokens = drain("/**\n * @param int $x\n */");
        let param = tokens
            .iter()
            .find(|t| t.kind == DocTokenKind::TagParam)
            .expect("stream contains @param");
        assert_eq!(param.position.first_line, 2);
        let dollar = tokens
            .iter()
            .find(|t| t.kind == DocTokenKind::Dollar)
            .expect("stream contains $");
        assert_eq!(dollar.position.first_line, 2);
        assert!(dollar.position.first_column > param.position.first_column);
    }

    #[test]
    fn unterminated_comment_detected() {
        let mut scanner = Scanner::new("/** open");
        while scanner.fetch_token().kind != DocTokenKind::Eof {}
        assert!(scanner.is_unterminated());

        let mut scanner = Scanner::new("/** closed */");
        while scanner.fetch_token().kind != DocTokenKind::Eof {}
        assert!(!scanner.is_unterminated());

        // Plain text never saw an opener.
        let mut scanner = Scanner::new("no frame");
        while scanner.fetch_token().kind != DocTokenKind::Eof {}
        assert!(!scanner.is_unterminated());
    }

    #[test]
    fn eof_repeats() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Eof);
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Eof);
    }
}
