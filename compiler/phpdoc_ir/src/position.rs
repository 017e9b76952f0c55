//! Full line/column source positions.
//!
//! [`SourcePosition`] is the position type carried on every token and
//! parse element: a half-open span with line/column coordinates at both
//! ends. Lines are 1-based, columns are 0-based byte columns within the
//! line, offsets are byte offsets from the start of the source.

use crate::line_breaks::LineBreaks;
use crate::span::Span;
use std::fmt;

/// A half-open source span with line/column coordinates.
///
/// Two sentinel values exist: [`SourcePosition::INVALID`] (all offsets
/// -1) and [`SourcePosition::INITIAL`] (line 1, column 0, offset 0).
/// A position is valid iff `first_offset != -1`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePosition {
    pub first_line: i32,
    pub first_column: i32,
    pub first_offset: i32,
    pub last_line: i32,
    pub last_column: i32,
    pub last_offset: i32,
}

impl SourcePosition {
    /// The invalid sentinel: every offset is -1.
    pub const INVALID: SourcePosition = SourcePosition {
        first_line: -1,
        first_column: -1,
        first_offset: -1,
        last_line: -1,
        last_column: -1,
        last_offset: -1,
    };

    /// The start-of-source sentinel: line 1, column 0, offset 0.
    pub const INITIAL: SourcePosition = SourcePosition {
        first_line: 1,
        first_column: 0,
        first_offset: 0,
        last_line: 1,
        last_column: 0,
        last_offset: 0,
    };

    /// A position is valid iff its first offset is not -1.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.first_offset != -1
    }

    /// Derive full coordinates for a byte span from a line-break table.
    ///
    /// The span must lie within the indexed text. Both endpoints are
    /// resolved independently; the end coordinate describes the offset
    /// one past the last byte, consistent with half-open spans.
    pub fn from_span(table: &LineBreaks, span: Span) -> SourcePosition {
        let (first_line, first_column) = line_col(table, span.start);
        let (last_line, last_column) = line_col(table, span.end);
        SourcePosition {
            first_line,
            first_column,
            first_offset: span.start as i32,
            last_line,
            last_column,
            last_offset: span.end as i32,
        }
    }

    /// Union of two positions; invalid operands are ignored.
    #[must_use]
    pub fn merge(self, other: SourcePosition) -> SourcePosition {
        match (self.is_valid(), other.is_valid()) {
            (true, true) => {
                let (lo, hi) = if self.first_offset <= other.first_offset {
                    (self, other)
                } else {
                    (other, self)
                };
                SourcePosition {
                    first_line: lo.first_line,
                    first_column: lo.first_column,
                    first_offset: lo.first_offset,
                    last_line: hi.last_line.max(lo.last_line),
                    last_column: if hi.last_offset >= lo.last_offset {
                        hi.last_column
                    } else {
                        lo.last_column
                    },
                    last_offset: hi.last_offset.max(lo.last_offset),
                }
            }
            (true, false) => self,
            (false, _) => other,
        }
    }
}

/// 1-based line and 0-based byte column for an offset.
///
/// Out-of-range offsets clamp to the end of the text; the scanner only
/// produces spans inside the text it indexed.
fn line_col(table: &LineBreaks, offset: u32) -> (i32, i32) {
    let offset = offset.min(table.text_length());
    let line = match table.line_from_position(offset) {
        Ok(line) => line,
        Err(_) => table.lines_count() - 1,
    };
    let column = offset - table.line_start(line);
    (line as i32 + 1, column as i32)
}

impl Default for SourcePosition {
    fn default() -> Self {
        SourcePosition::INVALID
    }
}

impl fmt::Debug for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(
                f,
                "{}:{}({})..{}:{}({})",
                self.first_line,
                self.first_column,
                self.first_offset,
                self.last_line,
                self.last_column,
                self.last_offset
            )
        } else {
            write!(f, "<invalid>")
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "line {}, column {}", self.first_line, self.first_column)
        } else {
            write!(f, "<invalid>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert!(!SourcePosition::INVALID.is_valid());
        assert!(SourcePosition::INITIAL.is_valid());
        assert_eq!(SourcePosition::INITIAL.first_line, 1);
        assert_eq!(SourcePosition::INITIAL.first_column, 0);
        assert_eq!(SourcePosition::default(), SourcePosition::INVALID);
    }

    #[test]
    fn test_from_span_single_line() {
        let table = LineBreaks::create("hello world");
        let pos = SourcePosition::from_span(&table, Span::new(6, 11));
        assert_eq!(pos.first_line, 1);
        assert_eq!(pos.first_column, 6);
        assert_eq!(pos.first_offset, 6);
        assert_eq!(pos.last_line, 1);
        assert_eq!(pos.last_column, 11);
        assert_eq!(pos.last_offset, 11);
    }

    #[test]
    fn test_from_span_across_lines() {
        let table = LineBreaks::create("ab\ncd\nef");
        let pos = SourcePosition::from_span(&table, Span::new(1, 7));
        assert_eq!(pos.first_line, 1);
        assert_eq!(pos.first_column, 1);
        assert_eq!(pos.last_line, 3);
        assert_eq!(pos.last_column, 1);
    }

    #[test]
    fn test_from_span_at_line_start() {
        let table = LineBreaks::create("ab\ncd");
        let pos = SourcePosition::from_span(&table, Span::new(3, 4));
        assert_eq!(pos.first_line, 2);
        assert_eq!(pos.first_column, 0);
    }

    #[test]
    fn test_merge() {
        let table = LineBreaks::create("ab\ncd\nef");
        let a = SourcePosition::from_span(&table, Span::new(0, 2));
        let b = SourcePosition::from_span(&table, Span::new(3, 5));
        let merged = a.merge(b);
        assert_eq!(merged.first_offset, 0);
        assert_eq!(merged.last_offset, 5);
        assert_eq!(merged.first_line, 1);
        assert_eq!(merged.last_line, 2);

        // Order must not matter.
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn test_merge_with_invalid() {
        let table = LineBreaks::create("abc");
        let a = SourcePosition::from_span(&table, Span::new(1, 2));
        assert_eq!(a.merge(SourcePosition::INVALID), a);
        assert_eq!(SourcePosition::INVALID.merge(a), a);
        assert_eq!(
            SourcePosition::INVALID.merge(SourcePosition::INVALID),
            SourcePosition::INVALID
        );
    }
}
