//! The doc-comment grammar and its parse table.
//!
//! The grammar recognizes a flat sequence of elements: runs of fused
//! text, and tag lines for `@param`, `@var`, `@return`, `@throws`,
//! `@access` and unrecognized `@name` tags. Each recognized tag is
//! split into a one-token marker nonterminal so the table gets a
//! default-reduce state right after the tag is shifted; the marker's
//! semantic action switches token fusing off before the structured
//! part of the tag (types, variable, access keyword) is read, and the
//! head production switches it back on for the trailing description.

use crate::table::{build, Grammar, NonterminalId, ParseTable, Production, Symbol, TerminalId};
use phpdoc_ir::DocTokenKind;
use std::sync::LazyLock;

/// Dense terminal indices. Order is arbitrary but fixed; the error and
/// EOF terminals must match [`doc_grammar`].
pub(crate) mod terminal {
    use super::TerminalId;

    pub const COMPOUND: TerminalId = 0;
    pub const TAG_PARAM: TerminalId = 1;
    pub const TAG_VAR: TerminalId = 2;
    pub const TAG_RETURN: TerminalId = 3;
    pub const TAG_THROWS: TerminalId = 4;
    pub const TAG_ACCESS: TerminalId = 5;
    pub const TAG: TerminalId = 6;
    pub const IDENTIFIER: TerminalId = 7;
    pub const WHITESPACE: TerminalId = 8;
    pub const INTEGER: TerminalId = 9;
    pub const SYMBOL: TerminalId = 10;
    pub const LBRACKET: TerminalId = 11;
    pub const RBRACKET: TerminalId = 12;
    pub const ARRAY: TerminalId = 13;
    pub const PUBLIC: TerminalId = 14;
    pub const PRIVATE: TerminalId = 15;
    pub const PROTECTED: TerminalId = 16;
    pub const DOLLAR: TerminalId = 17;
    pub const BAR: TerminalId = 18;
    pub const ERROR: TerminalId = 19;
    pub const EOF: TerminalId = 20;

    pub const COUNT: usize = 21;
}

/// Nonterminal indices; 0 is the augmented start symbol.
mod nt {
    use super::NonterminalId;

    pub const START: NonterminalId = 0;
    pub const DOC: NonterminalId = 1;
    pub const ELEMENTS: NonterminalId = 2;
    pub const ELEMENT: NonterminalId = 3;
    pub const PARAM_HEAD: NonterminalId = 4;
    pub const VAR_HEAD: NonterminalId = 5;
    pub const RETURN_HEAD: NonterminalId = 6;
    pub const THROWS_HEAD: NonterminalId = 7;
    pub const ACCESS_HEAD: NonterminalId = 8;
    pub const GENERIC_MARK: NonterminalId = 9;
    pub const PARAM_MARK: NonterminalId = 10;
    pub const VAR_MARK: NonterminalId = 11;
    pub const RETURN_MARK: NonterminalId = 12;
    pub const THROWS_MARK: NonterminalId = 13;
    pub const ACCESS_MARK: NonterminalId = 14;
    pub const ACCESS_KW: NonterminalId = 15;
    pub const OPT_VAR: NonterminalId = 16;
    pub const TYPE_REF: NonterminalId = 17;
    pub const TYPE_UNION: NonterminalId = 18;
    pub const TYPE_ATOM: NonterminalId = 19;
    pub const TYPE_NAME: NonterminalId = 20;
    pub const DIMS: NonterminalId = 21;
    pub const DESC: NonterminalId = 22;
    pub const DESC_ITEM: NonterminalId = 23;

    pub const COUNT: usize = 24;
}

/// Production indices, in the order [`doc_grammar`] lists them. The
/// reducer dispatches on these.
pub(crate) mod prod {
    pub const ELEMENT_COMPOUND: usize = 4;
    pub const ELEMENT_PARAM: usize = 5;
    pub const ELEMENT_VAR: usize = 6;
    pub const ELEMENT_RETURN: usize = 7;
    pub const ELEMENT_THROWS: usize = 8;
    pub const ELEMENT_ACCESS: usize = 9;
    pub const ELEMENT_GENERIC: usize = 10;
    pub const ELEMENT_ERROR: usize = 11;
    pub const PARAM_HEAD: usize = 12;
    pub const PARAM_MARK: usize = 13;
    pub const VAR_HEAD: usize = 14;
    pub const VAR_MARK: usize = 15;
    pub const RETURN_HEAD: usize = 16;
    pub const RETURN_MARK: usize = 17;
    pub const THROWS_HEAD: usize = 18;
    pub const THROWS_MARK: usize = 19;
    pub const ACCESS_HEAD: usize = 20;
    pub const ACCESS_MARK: usize = 21;
    pub const ACCESS_PUBLIC: usize = 22;
    pub const ACCESS_PRIVATE: usize = 23;
    pub const ACCESS_PROTECTED: usize = 24;
    pub const GENERIC_MARK: usize = 25;
    pub const OPT_VAR_SOME: usize = 26;
    pub const OPT_VAR_NONE: usize = 27;
    pub const TYPE_REF: usize = 28;
    pub const TYPE_UNION_MORE: usize = 29;
    pub const TYPE_UNION_ONE: usize = 30;
    pub const TYPE_ATOM: usize = 31;
    pub const TYPE_NAME_IDENT: usize = 32;
    pub const TYPE_NAME_ARRAY: usize = 33;
    pub const DIMS_MORE: usize = 34;
    pub const DIMS_NONE: usize = 35;
    pub const DESC_MORE: usize = 36;
    pub const DESC_EMPTY: usize = 37;
    /// First of the single-token `desc_item` alternatives; the run
    /// continues through [`DESC_ITEM_LAST`].
    pub const DESC_ITEM_FIRST: usize = 38;
    pub const DESC_ITEM_LAST: usize = 50;
}

/// Parser terminal for a token kind. Frame markers and newlines never
/// reach the parser; they map to the error terminal so the table has
/// no action for them.
pub(crate) fn terminal_id(kind: DocTokenKind) -> TerminalId {
    match kind {
        DocTokenKind::Compound => terminal::COMPOUND,
        DocTokenKind::TagParam => terminal::TAG_PARAM,
        DocTokenKind::TagVar => terminal::TAG_VAR,
        DocTokenKind::TagReturn => terminal::TAG_RETURN,
        DocTokenKind::TagThrows => terminal::TAG_THROWS,
        DocTokenKind::TagAccess => terminal::TAG_ACCESS,
        DocTokenKind::Tag => terminal::TAG,
        DocTokenKind::Identifier => terminal::IDENTIFIER,
        DocTokenKind::Whitespace => terminal::WHITESPACE,
        DocTokenKind::Integer => terminal::INTEGER,
        DocTokenKind::Symbol => terminal::SYMBOL,
        DocTokenKind::LBracket => terminal::LBRACKET,
        DocTokenKind::RBracket => terminal::RBRACKET,
        DocTokenKind::Array => terminal::ARRAY,
        DocTokenKind::Public => terminal::PUBLIC,
        DocTokenKind::Private => terminal::PRIVATE,
        DocTokenKind::Protected => terminal::PROTECTED,
        DocTokenKind::Dollar => terminal::DOLLAR,
        DocTokenKind::Bar => terminal::BAR,
        DocTokenKind::Eof => terminal::EOF,
        DocTokenKind::Error
        | DocTokenKind::Begin
        | DocTokenKind::LineBegin
        | DocTokenKind::End
        | DocTokenKind::Newline => terminal::ERROR,
    }
}

/// Token kind shown in diagnostics for a parser terminal.
pub(crate) fn terminal_kind(terminal: TerminalId) -> DocTokenKind {
    match terminal {
        terminal::COMPOUND => DocTokenKind::Compound,
        terminal::TAG_PARAM => DocTokenKind::TagParam,
        terminal::TAG_VAR => DocTokenKind::TagVar,
        terminal::TAG_RETURN => DocTokenKind::TagReturn,
        terminal::TAG_THROWS => DocTokenKind::TagThrows,
        terminal::TAG_ACCESS => DocTokenKind::TagAccess,
        terminal::TAG => DocTokenKind::Tag,
        terminal::IDENTIFIER => DocTokenKind::Identifier,
        terminal::WHITESPACE => DocTokenKind::Whitespace,
        terminal::INTEGER => DocTokenKind::Integer,
        terminal::SYMBOL => DocTokenKind::Symbol,
        terminal::LBRACKET => DocTokenKind::LBracket,
        terminal::RBRACKET => DocTokenKind::RBracket,
        terminal::ARRAY => DocTokenKind::Array,
        terminal::PUBLIC => DocTokenKind::Public,
        terminal::PRIVATE => DocTokenKind::Private,
        terminal::PROTECTED => DocTokenKind::Protected,
        terminal::DOLLAR => DocTokenKind::Dollar,
        terminal::BAR => DocTokenKind::Bar,
        terminal::EOF => DocTokenKind::Eof,
        _ => DocTokenKind::Error,
    }
}

fn doc_grammar() -> Grammar {
    use Symbol::{N, T};

    let p = |lhs, rhs| Production { lhs, rhs };
    let productions = vec![
        // 0
        p(nt::START, vec![N(nt::DOC)]),
        p(nt::DOC, vec![N(nt::ELEMENTS)]),
        p(nt::ELEMENTS, vec![N(nt::ELEMENTS), N(nt::ELEMENT)]),
        p(nt::ELEMENTS, vec![]),
        // 4: a text run outside any tag
        p(nt::ELEMENT, vec![T(terminal::COMPOUND)]),
        // 5..=10: tag elements, each ending in a free-form description
        p(nt::ELEMENT, vec![N(nt::PARAM_HEAD), N(nt::DESC)]),
        p(nt::ELEMENT, vec![N(nt::VAR_HEAD), N(nt::DESC)]),
        p(nt::ELEMENT, vec![N(nt::RETURN_HEAD), N(nt::DESC)]),
        p(nt::ELEMENT, vec![N(nt::THROWS_HEAD), N(nt::DESC)]),
        p(nt::ELEMENT, vec![N(nt::ACCESS_HEAD), N(nt::DESC)]),
        p(nt::ELEMENT, vec![N(nt::GENERIC_MARK), N(nt::DESC)]),
        // 11: error-recovery landing point
        p(nt::ELEMENT, vec![T(terminal::ERROR)]),
        // 12..=21: tag heads and their one-token markers
        p(
            nt::PARAM_HEAD,
            vec![N(nt::PARAM_MARK), N(nt::TYPE_REF), N(nt::OPT_VAR)],
        ),
        p(nt::PARAM_MARK, vec![T(terminal::TAG_PARAM)]),
        p(
            nt::VAR_HEAD,
            vec![N(nt::VAR_MARK), N(nt::TYPE_REF), N(nt::OPT_VAR)],
        ),
        p(nt::VAR_MARK, vec![T(terminal::TAG_VAR)]),
        p(nt::RETURN_HEAD, vec![N(nt::RETURN_MARK), N(nt::TYPE_REF)]),
        p(nt::RETURN_MARK, vec![T(terminal::TAG_RETURN)]),
        p(nt::THROWS_HEAD, vec![N(nt::THROWS_MARK), N(nt::TYPE_REF)]),
        p(nt::THROWS_MARK, vec![T(terminal::TAG_THROWS)]),
        p(nt::ACCESS_HEAD, vec![N(nt::ACCESS_MARK), N(nt::ACCESS_KW)]),
        p(nt::ACCESS_MARK, vec![T(terminal::TAG_ACCESS)]),
        // 22..=24
        p(nt::ACCESS_KW, vec![T(terminal::PUBLIC)]),
        p(nt::ACCESS_KW, vec![T(terminal::PRIVATE)]),
        p(nt::ACCESS_KW, vec![T(terminal::PROTECTED)]),
        // 25
        p(nt::GENERIC_MARK, vec![T(terminal::TAG)]),
        // 26..=27
        p(
            nt::OPT_VAR,
            vec![T(terminal::DOLLAR), T(terminal::IDENTIFIER)],
        ),
        p(nt::OPT_VAR, vec![]),
        // 28..=35: type references, `a|b|c` with `[]` suffixes
        p(nt::TYPE_REF, vec![N(nt::TYPE_UNION)]),
        p(
            nt::TYPE_UNION,
            vec![N(nt::TYPE_UNION), T(terminal::BAR), N(nt::TYPE_ATOM)],
        ),
        p(nt::TYPE_UNION, vec![N(nt::TYPE_ATOM)]),
        p(nt::TYPE_ATOM, vec![N(nt::TYPE_NAME), N(nt::DIMS)]),
        p(nt::TYPE_NAME, vec![T(terminal::IDENTIFIER)]),
        p(nt::TYPE_NAME, vec![T(terminal::ARRAY)]),
        p(
            nt::DIMS,
            vec![N(nt::DIMS), T(terminal::LBRACKET), T(terminal::RBRACKET)],
        ),
        p(nt::DIMS, vec![]),
        // 36..=37
        p(nt::DESC, vec![N(nt::DESC), N(nt::DESC_ITEM)]),
        p(nt::DESC, vec![]),
        // 38..=50: any non-tag token can appear in a description
        p(nt::DESC_ITEM, vec![T(terminal::COMPOUND)]),
        p(nt::DESC_ITEM, vec![T(terminal::IDENTIFIER)]),
        p(nt::DESC_ITEM, vec![T(terminal::WHITESPACE)]),
        p(nt::DESC_ITEM, vec![T(terminal::INTEGER)]),
        p(nt::DESC_ITEM, vec![T(terminal::SYMBOL)]),
        p(nt::DESC_ITEM, vec![T(terminal::LBRACKET)]),
        p(nt::DESC_ITEM, vec![T(terminal::RBRACKET)]),
        p(nt::DESC_ITEM, vec![T(terminal::ARRAY)]),
        p(nt::DESC_ITEM, vec![T(terminal::PUBLIC)]),
        p(nt::DESC_ITEM, vec![T(terminal::PRIVATE)]),
        p(nt::DESC_ITEM, vec![T(terminal::PROTECTED)]),
        p(nt::DESC_ITEM, vec![T(terminal::DOLLAR)]),
        p(nt::DESC_ITEM, vec![T(terminal::BAR)]),
    ];

    Grammar {
        terminal_count: terminal::COUNT,
        nonterminal_count: nt::COUNT,
        productions,
        eof: terminal::EOF,
        error: terminal::ERROR,
    }
}

/// The doc-comment parse table, built once per process.
pub(crate) static TABLE: LazyLock<ParseTable> = LazyLock::new(|| build(&doc_grammar()));

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use crate::table::{Action, StateId};

    /// State 0 default-reduces `elements -> ε`; its goto on `elements`
    /// is where every element starts.
    fn elements_state(table: &ParseTable) -> StateId {
        assert_eq!(table.default_reduce(0), Some(3));
        table
            .goto_state(0, nt::ELEMENTS)
            .expect("goto on elements from the start state")
    }

    #[test]
    fn table_builds() {
        assert!(TABLE.state_count() > 20);
        assert_eq!(TABLE.eof(), terminal::EOF);
        assert_eq!(TABLE.error(), terminal::ERROR);
    }

    #[test]
    fn tag_markers_reduce_without_lookahead() {
        // The states entered by shifting a recognized tag must reduce
        // their marker production before the next token is fetched, so
        // the fusing toggle lands ahead of the type tokens.
        let start = elements_state(&TABLE);
        for (tag, marker) in [
            (terminal::TAG_PARAM, prod::PARAM_MARK),
            (terminal::TAG_VAR, prod::VAR_MARK),
            (terminal::TAG_RETURN, prod::RETURN_MARK),
            (terminal::TAG_THROWS, prod::THROWS_MARK),
            (terminal::TAG_ACCESS, prod::ACCESS_MARK),
            (terminal::TAG, prod::GENERIC_MARK),
        ] {
            let Some(Action::Shift(state)) = TABLE.action(start, tag) else {
                panic!("tag terminal {tag} is not shiftable");
            };
            assert_eq!(TABLE.default_reduce(state), Some(marker));
        }
    }

    #[test]
    fn heads_reduce_without_lookahead() {
        // `param_head -> param_mark type_ref opt_var .` lives alone in
        // its state, so fusing switches back on before the description
        // is read. Walk there: shift @param, goto over the marker, the
        // type, and the variable.
        let start = elements_state(&TABLE);
        let Some(Action::Shift(marked)) = TABLE.action(start, terminal::TAG_PARAM) else {
            panic!("expected shift on @param");
        };
        assert_eq!(TABLE.default_reduce(marked), Some(prod::PARAM_MARK));
        let after_mark = TABLE
            .goto_state(start, nt::PARAM_MARK)
            .expect("goto on param_mark");
        let after_type = TABLE
            .goto_state(after_mark, nt::TYPE_REF)
            .expect("goto on type_ref");
        let after_var = TABLE
            .goto_state(after_type, nt::OPT_VAR)
            .expect("goto on opt_var");
        assert_eq!(TABLE.default_reduce(after_var), Some(prod::PARAM_HEAD));
    }

    #[test]
    fn error_terminal_is_shiftable_at_element_start() {
        let start = elements_state(&TABLE);
        assert!(matches!(
            TABLE.action(start, terminal::ERROR),
            Some(Action::Shift(_))
        ));
    }

    #[test]
    fn expected_terminals_at_element_start() {
        let start = elements_state(&TABLE);
        let expected = TABLE.expected_terminals(start);
        assert!(expected.contains(&terminal::COMPOUND));
        assert!(expected.contains(&terminal::TAG_PARAM));
        assert!(expected.contains(&terminal::EOF));
        assert!(!expected.contains(&terminal::ERROR));
        // Bare type tokens only appear inside tags.
        assert!(!expected.contains(&terminal::BAR));
    }

    #[test]
    fn terminal_mapping_round_trips() {
        for terminal in 0..terminal::COUNT as TerminalId {
            if terminal == terminal::ERROR {
                continue;
            }
            assert_eq!(terminal_id(terminal_kind(terminal)), terminal);
        }
    }

    #[test]
    fn discarded_kinds_map_to_error() {
        for kind in [
            DocTokenKind::Begin,
            DocTokenKind::LineBegin,
            DocTokenKind::End,
            DocTokenKind::Newline,
        ] {
            assert_eq!(terminal_id(kind), terminal::ERROR);
        }
    }
}
