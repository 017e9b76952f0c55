//! Hand-written frame scanner over logos interior lexing.
//!
//! Three token classes are position-dependent and cannot be expressed
//! as context-free logos rules:
//!
//! - `Begin` (`/**`) only at the very start of the text
//! - `LineBegin` (`[ \t]*\*` plus one optional space) only at the start
//!   of a line, and only when the `*` does not open `*/`
//! - `Newline` for every supported line terminator
//!
//! The scanner recognizes those by hand and delegates everything else,
//! one line segment at a time, to [`InteriorToken`]'s lexer. Spans are
//! remapped from segment-relative to absolute byte offsets.
//!
//! Every byte of the input is covered by exactly one token; the final
//! token is always a zero-length `Eof` at the end of the text.

use crate::raw_token::{InteriorToken, RawToken};
use logos::Logos;
use phpdoc_ir::{DocTokenKind, Span};

/// Pull-based raw scanner.
///
/// Produces one [`RawToken`] per call to [`RawScanner::next_token`];
/// after the text is exhausted every call returns `Eof`.
pub struct RawScanner<'a> {
    text: &'a str,
    pos: usize,
    /// Byte offset of the next line terminator (or text end). Lazily
    /// recomputed whenever `pos` has moved past it.
    line_end: usize,
    at_line_start: bool,
}

impl<'a> RawScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        RawScanner {
            text,
            pos: 0,
            line_end: 0,
            at_line_start: true,
        }
    }

    /// Produce the next raw token.
    pub fn next_token(&mut self) -> RawToken {
        let start = self.pos;
        let bytes = self.text.as_bytes();

        if start >= self.text.len() {
            return RawToken::new(DocTokenKind::Eof, Span::point(start as u32));
        }

        if let Some(len) = terminator_len(bytes, start) {
            self.pos = start + len;
            self.at_line_start = true;
            return RawToken::new(
                DocTokenKind::Newline,
                Span::new(start as u32, self.pos as u32),
            );
        }

        if self.at_line_start {
            self.at_line_start = false;

            if start == 0 && self.text.starts_with("/**") {
                self.pos = 3;
                return RawToken::new(DocTokenKind::Begin, Span::new(0, 3));
            }

            if let Some(end) = self.line_decoration(start) {
                self.pos = end;
                return RawToken::new(
                    DocTokenKind::LineBegin,
                    Span::new(start as u32, end as u32),
                );
            }
        }

        self.interior_token(start)
    }

    /// Detect `[ \t]*\*` line decoration at `start`, returning the end
    /// offset of the decoration (including one optional space after the
    /// `*`), or `None` when the line has no decoration. A `*` that opens
    /// `*/` is never decoration.
    fn line_decoration(&self, start: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        let mut i = start;
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'*') || bytes.get(i + 1) == Some(&b'/') {
            return None;
        }
        let mut end = i + 1;
        if bytes.get(end) == Some(&b' ') {
            end += 1;
        }
        Some(end)
    }

    /// Lex one interior token starting at `start`.
    fn interior_token(&mut self, start: usize) -> RawToken {
        if start >= self.line_end {
            self.line_end = self.find_line_end(start);
        }
        // start < line_end: EOF and terminators were handled above, so
        // the segment is non-empty and the catch-all rule covers it.
        let segment = &self.text[start..self.line_end];
        let mut lexer = InteriorToken::lexer(segment);
        let kind = match lexer.next() {
            Some(Ok(token)) => token.kind(),
            Some(Err(())) => DocTokenKind::Error,
            None => DocTokenKind::Eof,
        };
        let span = lexer.span();
        self.pos = start + span.end;
        RawToken::new(
            kind,
            Span::new((start + span.start) as u32, self.pos as u32),
        )
    }

    /// Offset of the next line terminator at or after `from`, or the
    /// text length when the last line is unterminated.
    fn find_line_end(&self, from: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            if terminator_len(bytes, i).is_some() {
                return i;
            }
            i += 1;
        }
        bytes.len()
    }
}

impl Iterator for RawScanner<'_> {
    type Item = RawToken;

    fn next(&mut self) -> Option<RawToken> {
        let token = self.next_token();
        if token.kind == DocTokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Length in bytes of the line terminator at `i`, or `None`.
///
/// Recognized terminators match the line-break table in `phpdoc_ir`:
/// `\r\n`, `\r`, `\n`, U+0085, U+2028 and U+2029.
fn terminator_len(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes.get(i)? {
        b'\n' => Some(1),
        b'\r' => {
            if bytes.get(i + 1) == Some(&b'\n') {
                Some(2)
            } else {
                Some(1)
            }
        }
        0xC2 if bytes.get(i + 1) == Some(&0x85) => Some(2),
        0xE2 if bytes.get(i + 1) == Some(&0x80)
            && matches!(bytes.get(i + 2), Some(0xA8 | 0xA9)) =>
        {
            Some(3)
        }
        _ => None,
    }
}

/// Convenience: scan a text and collect all raw tokens except `Eof`.
pub fn tokenize(text: &str) -> Vec<RawToken> {
    RawScanner::new(text).collect()
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
    use proptest::prelude::*;

    fn kinds(text: &str) -> Vec<DocTokenKind> {
        tokenize(text).iter().map(|t| t.kind).collect()
    }

    fn slices(text: &str) -> Vec<&str> {
        tokenize(text)
            .iter()
            .map(|t| &text[t.span.to_range()])
            .collect()
    }

    #[test]
    fn spans_tile_the_input() {
        let sources = [
            "/** short */",
            "/**\n * line one\n * @param int $x\n */",
            "plain text, no frame",
            "a b\nc",
            "/***/",
            "",
            "  \t  ",
            "\r\n\r\u{85}\u{2028}\u{2029}",
        ];
        for source in sources {
            let tokens = tokenize(source);
            let mut offset = 0u32;
            for token in &tokens {
                assert_eq!(token.span.start, offset, "gap in {source:?}");
                offset = token.span.end;
            }
            assert_eq!(offset as usize, source.len(), "tail gap in {source:?}");
        }
    }

    #[test]
    fn frame_markers() {
        assert_eq!(
            kinds("/** x */"),
            vec![
                DocTokenKind::Begin,
                DocTokenKind::Whitespace,
                DocTokenKind::Identifier,
                DocTokenKind::Whitespace,
                DocTokenKind::End,
            ]
        );
    }

    #[test]
    fn empty_comment() {
        assert_eq!(kinds("/***/"), vec![DocTokenKind::Begin, DocTokenKind::End]);
    }

    #[test]
    fn line_decoration_with_trailing_space() {
        let text = "/**\n * text\n */";
        assert_eq!(
            kinds(text),
            vec![
                DocTokenKind::Begin,
                DocTokenKind::Newline,
                DocTokenKind::LineBegin,
                DocTokenKind::Identifier,
                DocTokenKind::Newline,
                DocTokenKind::Whitespace,
                DocTokenKind::End,
            ]
        );
        assert_eq!(
            slices(text),
            vec!["/**", "\n", " * ", "text", "\n", " ", "*/"]
        );
    }

    #[test]
    fn decoration_eats_at_most_one_space() {
        // Extra indentation after "* " stays as ordinary whitespace.
        let tokens = tokenize("/**\n *   deep\n */");
        assert_eq!(tokens[2].kind, DocTokenKind::LineBegin);
        assert_eq!(tokens[3].kind, DocTokenKind::Whitespace);
        assert_eq!(tokens[4].kind, DocTokenKind::Identifier);
    }

    #[test]
    fn star_slash_is_never_decoration() {
        // "  */" at line start must lex as whitespace + End, not as a
        // LineBegin swallowing the closing marker.
        assert_eq!(
            kinds("/**\n  */"),
            vec![
                DocTokenKind::Begin,
                DocTokenKind::Newline,
                DocTokenKind::Whitespace,
                DocTokenKind::End,
            ]
        );
    }

    #[test]
    fn bare_star_line() {
        assert_eq!(
            kinds("/**\n *\n */"),
            vec![
                DocTokenKind::Begin,
                DocTokenKind::Newline,
                DocTokenKind::LineBegin,
                DocTokenKind::Newline,
                DocTokenKind::Whitespace,
                DocTokenKind::End,
            ]
        );
    }

    #[test]
    fn tags_are_unresolved() {
        let tokens = tokenize("@param @see @custom-tag");
        assert_eq!(tokens[0].kind, DocTokenKind::Tag);
        assert_eq!(tokens[2].kind, DocTokenKind::Tag);
        assert_eq!(tokens[4].kind, DocTokenKind::Tag);
    }

    #[test]
    fn namespaced_identifier() {
        let text = r"\Foo\Bar baz";
        let tokens = tokenize(text);
        assert_eq!(tokens[0].kind, DocTokenKind::Identifier);
        assert_eq!(&text[tokens[0].span.to_range()], r"\Foo\Bar");
        assert_eq!(tokens[2].kind, DocTokenKind::Identifier);
    }

    #[test]
    fn structural_characters() {
        assert_eq!(
            kinds("[]$|"),
            vec![
                DocTokenKind::LBracket,
                DocTokenKind::RBracket,
                DocTokenKind::Dollar,
                DocTokenKind::Bar,
            ]
        );
    }

    #[test]
    fn catch_all_symbol() {
        assert_eq!(
            kinds(".,("),
            vec![
                DocTokenKind::Symbol,
                DocTokenKind::Symbol,
                DocTokenKind::Symbol,
            ]
        );
        // Lone '@' is not a tag.
        assert_eq!(kinds("@ "), vec![DocTokenKind::Symbol, DocTokenKind::Whitespace]);
    }

    #[test]
    fn integer_token() {
        let tokens = tokenize("123 4");
        assert_eq!(tokens[0].kind, DocTokenKind::Integer);
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[2].kind, DocTokenKind::Integer);
    }

    #[test]
    fn terminators() {
        assert_eq!(tokenize("\r\n")[0].span.len(), 2);
        assert_eq!(tokenize("\r")[0].span.len(), 1);
        assert_eq!(tokenize("\n")[0].span.len(), 1);
        assert_eq!(tokenize("\u{85}")[0].span.len(), 2);
        assert_eq!(tokenize("\u{2028}")[0].span.len(), 3);
        assert_eq!(tokenize("\u{2029}")[0].span.len(), 3);
        for text in ["\r\n", "\r", "\n", "\u{85}", "\u{2028}", "\u{2029}"] {
            assert_eq!(kinds(text), vec![DocTokenKind::Newline], "for {text:?}");
        }
    }

    #[test]
    fn eof_repeats() {
        let mut scanner = RawScanner::new("x");
        assert_eq!(scanner.next_token().kind, DocTokenKind::Identifier);
        for _ in 0..3 {
            let token = scanner.next_token();
            assert_eq!(token.kind, DocTokenKind::Eof);
            assert_eq!(token.span, Span::point(1));
        }
    }

    #[test]
    fn unframed_text() {
        assert_eq!(
            kinds("a b\nc"),
            vec![
                DocTokenKind::Identifier,
                DocTokenKind::Whitespace,
                DocTokenKind::Identifier,
                DocTokenKind::Newline,
                DocTokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn begin_only_at_offset_zero() {
        // A "/**" later in the text is ordinary interior content.
        let tokens = tokenize("x /**");
        assert!(tokens.iter().all(|t| t.kind != DocTokenKind::Begin));
    }

    proptest! {
        #[test]
        fn tokens_cover_arbitrary_input(text in r"[a-z@\*/ \t\r\n\$\|\[\]0-9\.]{0,64}") {
            let tokens = tokenize(&text);
            let mut offset = 0u32;
            for token in &tokens {
                prop_assert_eq!(token.span.start, offset);
                prop_assert!(token.span.end > token.span.start);
                offset = token.span.end;
            }
            prop_assert_eq!(offset as usize, text.len());
        }
    }
}
