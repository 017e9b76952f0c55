//! Line-break table: the text position index.
//!
//! Maps byte offsets to zero-based line numbers in O(log n) via binary
//! search over recorded line-end offsets. Built once from full source
//! text (or from a pre-scanned offset list) and immutable thereafter, so
//! it can be shared read-only across threads.
//!
//! Recognized line terminators: `\r\n`, lone `\r`, lone `\n`, and the
//! Unicode separators U+0085, U+2028, U+2029. Each recorded offset points
//! *past* its terminator, i.e. to the first byte of the next line.

use std::fmt;

/// Error returned when an offset lies outside `[0, text_length]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOutOfRange {
    /// The offending offset.
    pub position: u32,
    /// The indexed text's total length.
    pub text_length: u32,
}

impl fmt::Display for PositionOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position {} is out of range for text of length {}",
            self.position, self.text_length
        )
    }
}

impl std::error::Error for PositionOutOfRange {}

/// Physical storage for the line-end offsets.
///
/// The narrow form is chosen when every offset fits in 16 bits; both
/// forms answer every query identically.
#[derive(Clone, Debug)]
enum Repr {
    Narrow(Vec<u16>),
    Wide(Vec<u32>),
}

/// Ordered table of line-end offsets over one source text.
#[derive(Clone, Debug)]
pub struct LineBreaks {
    repr: Repr,
    text_length: u32,
}

impl LineBreaks {
    /// Scan `text` once and record every line terminator.
    ///
    /// O(n) in the text length.
    pub fn create(text: &str) -> Self {
        let mut offsets = Vec::new();
        let mut iter = text.char_indices().peekable();
        while let Some((i, c)) = iter.next() {
            match c {
                '\r' => {
                    // \r\n counts as a single terminator.
                    if matches!(iter.peek(), Some(&(_, '\n'))) {
                        iter.next();
                        offsets.push(i as u32 + 2);
                    } else {
                        offsets.push(i as u32 + 1);
                    }
                }
                '\n' => offsets.push(i as u32 + 1),
                '\u{0085}' | '\u{2028}' | '\u{2029}' => {
                    offsets.push((i + c.len_utf8()) as u32);
                }
                _ => {}
            }
        }
        Self::from_offsets(offsets, text.len() as u32)
    }

    /// Build from a pre-scanned list of line-end offsets.
    ///
    /// `offsets` must be strictly increasing and bounded by `text_length`;
    /// callers that already scanned the text for terminators (incremental
    /// re-indexing) use this to skip the second pass.
    pub fn from_offsets(offsets: Vec<u32>, text_length: u32) -> Self {
        debug_assert!(
            offsets.windows(2).all(|w| w[0] < w[1]),
            "line-end offsets must be strictly increasing"
        );
        debug_assert!(
            offsets.last().map_or(true, |&last| last <= text_length),
            "line-end offsets must not exceed the text length"
        );
        let repr = match offsets.last() {
            Some(&last) if last > u32::from(u16::MAX) => Repr::Wide(offsets),
            _ => Repr::Narrow(offsets.into_iter().map(|v| v as u16).collect()),
        };
        LineBreaks { repr, text_length }
    }

    /// Number of recorded line breaks.
    #[inline]
    pub fn count(&self) -> u32 {
        match &self.repr {
            Repr::Narrow(t) => t.len() as u32,
            Repr::Wide(t) => t.len() as u32,
        }
    }

    /// Number of lines: one more than the break count.
    #[inline]
    pub fn lines_count(&self) -> u32 {
        self.count() + 1
    }

    /// Total length of the indexed text, fixed at construction.
    #[inline]
    pub fn text_length(&self) -> u32 {
        self.text_length
    }

    /// Offset just past the `index`-th line terminator.
    ///
    /// # Panics
    /// Panics if `index >= count()`.
    #[inline]
    pub fn end_of_line_break(&self, index: u32) -> u32 {
        match &self.repr {
            Repr::Narrow(t) => u32::from(t[index as usize]),
            Repr::Wide(t) => t[index as usize],
        }
    }

    /// Zero-based line number containing `position`.
    ///
    /// Fails with [`PositionOutOfRange`] when `position > text_length()`
    /// (negative offsets are unrepresentable by the parameter type).
    /// `position == text_length()` maps to the last line. A position equal
    /// to a recorded break offset belongs to the *next* line, since break
    /// offsets point past their terminator.
    pub fn line_from_position(&self, position: u32) -> Result<u32, PositionOutOfRange> {
        if position > self.text_length {
            return Err(PositionOutOfRange {
                position,
                text_length: self.text_length,
            });
        }
        // Smallest i in [a, b) with position < end_of_line_break(i);
        // if no break lies past the position, it is on the last line.
        let mut a = 0u32;
        let mut b = self.count();
        while a < b {
            let mid = a + (b - a) / 2;
            if position < self.end_of_line_break(mid) {
                b = mid;
            } else {
                a = mid + 1;
            }
        }
        Ok(a)
    }

    /// Byte offset at which `line` (zero-based) starts.
    ///
    /// # Panics
    /// Panics if `line >= lines_count()`.
    #[inline]
    pub fn line_start(&self, line: u32) -> u32 {
        if line == 0 {
            0
        } else {
            self.end_of_line_break(line - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference count of fully completed terminators in `text[0..pos)`.
    fn naive_line(text: &str, pos: u32) -> u32 {
        let table = LineBreaks::create(text);
        let mut line = 0;
        for i in 0..table.count() {
            if table.end_of_line_break(i) <= pos {
                line += 1;
            }
        }
        line
    }

    fn wide_copy(table: &LineBreaks) -> LineBreaks {
        let offsets: Vec<u32> = (0..table.count()).map(|i| table.end_of_line_break(i)).collect();
        LineBreaks {
            repr: Repr::Wide(offsets),
            text_length: table.text_length(),
        }
    }

    #[test]
    fn test_line_boundaries() {
        // "ab\ncd\r\nef": breaks at 3 (past \n) and 7 (past \r\n).
        let table = LineBreaks::create("ab\ncd\r\nef");
        assert_eq!(table.count(), 2);
        assert_eq!(table.lines_count(), 3);
        assert_eq!(table.end_of_line_break(0), 3);
        assert_eq!(table.end_of_line_break(1), 7);
        assert_eq!(table.line_from_position(0), Ok(0));
        assert_eq!(table.line_from_position(2), Ok(0)); // the \n itself
        assert_eq!(table.line_from_position(3), Ok(1)); // 'c', right after \n
        assert_eq!(table.line_from_position(6), Ok(1)); // the \n of \r\n
        assert_eq!(table.line_from_position(7), Ok(2)); // 'e'
        assert_eq!(table.line_from_position(9), Ok(2)); // end of text
    }

    #[test]
    fn test_empty_text() {
        let table = LineBreaks::create("");
        assert_eq!(table.count(), 0);
        assert_eq!(table.lines_count(), 1);
        assert_eq!(table.text_length(), 0);
        assert_eq!(table.line_from_position(0), Ok(0));
    }

    #[test]
    fn test_out_of_range() {
        let table = LineBreaks::create("ab");
        assert_eq!(
            table.line_from_position(3),
            Err(PositionOutOfRange {
                position: 3,
                text_length: 2
            })
        );
    }

    #[test]
    fn test_end_of_text_is_last_line() {
        // Trailing terminator: the position past it is the final, empty line.
        let table = LineBreaks::create("a\nb\n");
        assert_eq!(table.lines_count(), 3);
        assert_eq!(table.line_from_position(4), Ok(2));

        // No trailing terminator.
        let table = LineBreaks::create("a\nb");
        assert_eq!(table.line_from_position(3), Ok(1));
    }

    #[test]
    fn test_lone_carriage_return() {
        let table = LineBreaks::create("a\rb\rc");
        assert_eq!(table.count(), 2);
        assert_eq!(table.end_of_line_break(0), 2);
        assert_eq!(table.end_of_line_break(1), 4);
        assert_eq!(table.line_from_position(2), Ok(1));
        assert_eq!(table.line_from_position(4), Ok(2));
    }

    #[test]
    fn test_unicode_terminators() {
        // U+0085 is 2 bytes, U+2028/U+2029 are 3 bytes in UTF-8.
        let text = "a\u{0085}b\u{2028}c\u{2029}d";
        let table = LineBreaks::create(text);
        assert_eq!(table.count(), 3);
        assert_eq!(table.end_of_line_break(0), 3);
        assert_eq!(table.end_of_line_break(1), 7);
        assert_eq!(table.end_of_line_break(2), 11);
        assert_eq!(table.line_from_position(3), Ok(1));
        assert_eq!(table.line_from_position(7), Ok(2));
        assert_eq!(table.line_from_position(11), Ok(3));
    }

    #[test]
    fn test_boundary_offset_belongs_to_next_line() {
        let table = LineBreaks::create("x\ny");
        // Offset 2 equals the recorded break offset and is on line 1.
        assert_eq!(table.end_of_line_break(0), 2);
        assert_eq!(table.line_from_position(1), Ok(0));
        assert_eq!(table.line_from_position(2), Ok(1));
    }

    #[test]
    fn test_monotonic_table() {
        let table = LineBreaks::create("a\nbb\r\nccc\rdddd\u{2028}e");
        for i in 1..table.count() {
            assert!(table.end_of_line_break(i - 1) < table.end_of_line_break(i));
        }
        assert_eq!(table.lines_count(), table.count() + 1);
    }

    #[test]
    fn test_from_offsets_roundtrip() {
        let text = "one\ntwo\nthree";
        let scanned = LineBreaks::create(text);
        let offsets: Vec<u32> = (0..scanned.count())
            .map(|i| scanned.end_of_line_break(i))
            .collect();
        let rebuilt = LineBreaks::from_offsets(offsets, text.len() as u32);
        for pos in 0..=text.len() as u32 {
            assert_eq!(
                scanned.line_from_position(pos),
                rebuilt.line_from_position(pos)
            );
        }
    }

    #[test]
    fn test_narrow_wide_equivalence() {
        let text = "alpha\nbeta\r\ngamma\rdelta";
        let narrow = LineBreaks::create(text);
        assert!(matches!(narrow.repr, Repr::Narrow(_)));
        let wide = wide_copy(&narrow);
        assert_eq!(narrow.count(), wide.count());
        for i in 0..narrow.count() {
            assert_eq!(narrow.end_of_line_break(i), wide.end_of_line_break(i));
        }
        for pos in 0..=text.len() as u32 {
            assert_eq!(narrow.line_from_position(pos), wide.line_from_position(pos));
        }
    }

    #[test]
    fn test_wide_selected_for_large_offsets() {
        let big = u32::from(u16::MAX) + 10;
        let table = LineBreaks::from_offsets(vec![5, big], big + 100);
        assert!(matches!(table.repr, Repr::Wide(_)));
        assert_eq!(table.end_of_line_break(1), big);
        assert_eq!(table.line_from_position(big), Ok(2));
    }

    #[test]
    fn test_line_start() {
        let table = LineBreaks::create("ab\ncd\nef");
        assert_eq!(table.line_start(0), 0);
        assert_eq!(table.line_start(1), 3);
        assert_eq!(table.line_start(2), 6);
    }

    proptest! {
        #[test]
        fn prop_line_matches_naive_count(
            text in proptest::collection::vec(
                prop_oneof![
                    Just("a".to_owned()),
                    Just("xyz".to_owned()),
                    Just("\n".to_owned()),
                    Just("\r".to_owned()),
                    Just("\r\n".to_owned()),
                    Just("\u{0085}".to_owned()),
                    Just("\u{2028}".to_owned()),
                    Just("\u{2029}".to_owned()),
                ],
                0..40,
            ).prop_map(|parts| parts.concat())
        ) {
            let table = LineBreaks::create(&text);
            prop_assert_eq!(table.lines_count(), table.count() + 1);
            for pos in 0..=text.len() as u32 {
                if !text.is_char_boundary(pos as usize) {
                    continue;
                }
                prop_assert_eq!(table.line_from_position(pos), Ok(naive_line(&text, pos)));
            }
            // End of text is always the last line, even when empty.
            prop_assert_eq!(
                table.line_from_position(text.len() as u32),
                Ok(table.lines_count() - 1)
            );
        }

        #[test]
        fn prop_narrow_wide_agree(
            text in proptest::collection::vec(
                prop_oneof![Just("word ".to_owned()), Just("\n".to_owned()), Just("\r\n".to_owned())],
                0..30,
            ).prop_map(|parts| parts.concat())
        ) {
            let narrow = LineBreaks::create(&text);
            let wide = wide_copy(&narrow);
            for pos in 0..=text.len() as u32 {
                prop_assert_eq!(narrow.line_from_position(pos), wide.line_from_position(pos));
            }
        }
    }
}
