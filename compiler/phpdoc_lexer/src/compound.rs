//! Compound-token adapter.
//!
//! Free-text regions of a doc comment would otherwise reach the parser
//! as long runs of identifier/whitespace/punctuation tokens, forcing
//! the grammar to enumerate them everywhere text can appear. With
//! compounding enabled, [`CompoundScanner`] fuses each maximal run of
//! plain tokens into one `Compound` token whose payload is the
//! concatenated lexemes and whose position spans the whole run.
//!
//! The token that stops a run is buffered and returned by the next
//! fetch, so no token is ever dropped or duplicated. A run of length
//! zero yields a `Compound` with an empty payload positioned at the
//! start of the stopping token; `Eof` with nothing accumulated is
//! returned directly.
//!
//! Compounding is off by default; the parser's semantic actions toggle
//! it when entering and leaving structured tag regions.

use crate::scanner::Scanner;
use phpdoc_ir::{DocTokenKind, SemanticValue, SourcePosition, Token};

pub struct CompoundScanner<'a> {
    scanner: Scanner<'a>,
    pushback: Option<Token>,
    compound_tokens: bool,
}

impl<'a> CompoundScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        CompoundScanner {
            scanner: Scanner::new(text),
            pushback: None,
            compound_tokens: false,
        }
    }

    /// Access the underlying scanner (line breaks, termination state).
    pub fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }

    pub fn compound_tokens(&self) -> bool {
        self.compound_tokens
    }

    /// Toggle plain-token fusing. Takes effect on the next fetch; a
    /// buffered stopping token is still returned as-is first.
    pub fn set_compound_tokens(&mut self, enabled: bool) {
        self.compound_tokens = enabled;
    }

    /// Return `token` from the next fetch instead of advancing.
    ///
    /// At most one token can be buffered; fetching always drains the
    /// buffer before touching the scanner.
    pub fn push_back(&mut self, token: Token) {
        debug_assert!(self.pushback.is_none(), "pushback buffer already occupied");
        self.pushback = Some(token);
    }

    pub fn fetch_token(&mut self) -> Token {
        if let Some(token) = self.pushback.take() {
            return token;
        }

        let token = self.scanner.fetch_token();
        if !self.compound_tokens {
            return token;
        }

        if !token.kind.is_plain() {
            if token.kind == DocTokenKind::Eof {
                return token;
            }
            // Zero-length run: empty compound at the stopping token.
            let position = point_at_start(token.position);
            self.pushback = Some(token);
            return Token::new(
                DocTokenKind::Compound,
                SemanticValue::Str(String::new()),
                position,
            );
        }

        let mut text = token.value.as_str().to_owned();
        let mut position = token.position;
        loop {
            let next = self.scanner.fetch_token();
            if next.kind.is_plain() {
                text.push_str(next.value.as_str());
                position = position.merge(next.position);
            } else {
                self.pushback = Some(next);
                break;
            }
        }
        Token::new(DocTokenKind::Compound, SemanticValue::Str(text), position)
    }
}

/// Collapse a position to a zero-length span at its start.
fn point_at_start(position: SourcePosition) -> SourcePosition {
    SourcePosition {
        last_line: position.first_line,
        last_column: position.first_column,
        last_offset: position.first_offset,
        ..position
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

    fn drain(scanner: &mut CompoundScanner<'_>) -> Vec<Token> {
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

    fn concat_payloads(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn plain_run_becomes_one_compound() {
        let mut scanner = CompoundScanner::new("a b\nc");
        scanner.set_compound_tokens(true);

        let compound = scanner.fetch_token();
        assert_eq!(compound.kind, DocTokenKind::Compound);
        assert_eq!(compound.value.as_str(), "a b\nc");
        assert_eq!(compound.position.first_offset, 0);
        assert_eq!(compound.position.last_offset, 5);

        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Eof);
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Eof);
    }

    #[test]
    fn disabled_passes_tokens_through() {
        let mut scanner = CompoundScanner::new("a b");
        let kinds: Vec<_> = drain(&mut scanner).iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DocTokenKind::Identifier,
                DocTokenKind::Whitespace,
                DocTokenKind::Identifier,
                DocTokenKind::Eof,
            ]
        );
    }

    #[test]
    fn stopping_token_returned_next() {
        let mut scanner = CompoundScanner::new("some text @param int");
        scanner.set_compound_tokens(true);

        let compound = scanner.fetch_token();
        assert_eq!(compound.value.as_str(), "some text ");
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::TagParam);
    }

    #[test]
    fn empty_compound_before_immediate_stop() {
        let mut scanner = CompoundScanner::new("@param x");
        scanner.set_compound_tokens(true);

        let empty = scanner.fetch_token();
        assert_eq!(empty.kind, DocTokenKind::Compound);
        assert_eq!(empty.value.as_str(), "");
        assert_eq!(empty.position.first_offset, 0);
        assert_eq!(empty.position.last_offset, 0);

        assert_eq!(scanner.fetch_token().kind, DocTokenKind::TagParam);

        let rest = scanner.fetch_token();
        assert_eq!(rest.kind, DocTokenKind::Compound);
        assert_eq!(rest.value.as_str(), " x");
    }

    #[test]
    fn toggling_mid_stream() {
        let mut scanner = CompoundScanner::new("intro @param int $x tail text");
        scanner.set_compound_tokens(true);

        assert_eq!(scanner.fetch_token().value.as_str(), "intro ");
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::TagParam);

        // Structured region: read raw tokens.
        scanner.set_compound_tokens(false);
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Whitespace);
        assert_eq!(scanner.fetch_token().value.as_str(), "int");
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Whitespace);
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Dollar);
        assert_eq!(scanner.fetch_token().value.as_str(), "x");

        // Back to free text.
        scanner.set_compound_tokens(true);
        let tail = scanner.fetch_token();
        assert_eq!(tail.kind, DocTokenKind::Compound);
        assert_eq!(tail.value.as_str(), " tail text");
        assert_eq!(scanner.fetch_token().kind, DocTokenKind::Eof);
    }

    #[test]
    fn pushback_round_trip() {
        let mut scanner = CompoundScanner::new("a b");
        let first = scanner.fetch_token();
        scanner.push_back(first.clone());
        assert_eq!(scanner.fetch_token(), first);
    }

    #[test]
    fn compounding_preserves_all_text() {
        let sources = [
            "/**\n * Summary line.\n *\n * @param int|string $id The id.\n */",
            "a b\nc",
            "@see Other::thing",
            "",
            "/***/",
            "plain [brackets] and | bars $ 42",
        ];
        for source in sources {
            let mut plain = CompoundScanner::new(source);
            let mut fused = CompoundScanner::new(source);
            fused.set_compound_tokens(true);
            assert_eq!(
                concat_payloads(&drain(&mut plain)),
                concat_payloads(&drain(&mut fused)),
                "payload mismatch for {source:?}",
            );
        }
    }

    proptest::proptest! {
        #[test]
        fn fusing_never_changes_the_text(
            text in r"[a-z@ \t\n\$\|\[\]0-9\.\*/]{0,48}"
        ) {
            let mut plain = CompoundScanner::new(&text);
            let mut fused = CompoundScanner::new(&text);
            fused.set_compound_tokens(true);
            proptest::prop_assert_eq!(
                concat_payloads(&drain(&mut plain)),
                concat_payloads(&drain(&mut fused))
            );
        }
    }

    #[test]
    fn run_position_spans_first_to_last() {
        let text = "/**\n * one two\n */";
        let mut scanner = CompoundScanner::new(text);
        scanner.set_compound_tokens(true);

        let compound = scanner.fetch_token();
        assert_eq!(compound.kind, DocTokenKind::Compound);
        // "\n" after "/**" through the whitespace before "*/".
        assert_eq!(compound.position.first_offset, 3);
        assert_eq!(compound.position.first_line, 1);
        assert_eq!(compound.position.last_line, 3);
    }
}
