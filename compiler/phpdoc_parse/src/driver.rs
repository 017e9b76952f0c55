//! Generic shift-reduce driver.
//!
//! The driver is independent of the doc grammar: it needs a
//! [`ParseTable`], a [`TokenProvider`] for input, and a
//! [`SemanticActions`] implementation for values. Two properties matter
//! to callers:
//!
//! - **Lazy lookahead.** A token is fetched only when the current state
//!   cannot decide without one. Combined with default-reduce states,
//!   this lets a reduction's semantic action toggle compound-token mode
//!   before the tokens it affects are read.
//! - **Error recovery.** On a syntax error the provider is told once per
//!   input position; if it elects to continue, the driver pops to a
//!   state that can shift the error terminal, shifts a synthetic error
//!   token, and discards input until parsing can resume. The parse
//!   always terminates: every recovery step either consumes input or
//!   reaches end of input and gives up.

use crate::table::{Action, ParseTable, StateId, TerminalId};
use phpdoc_ir::{SemanticValue, SourcePosition};
use thiserror::Error;
use tracing::{debug, trace};

/// One token as the driver sees it.
#[derive(Clone, Debug)]
pub struct FetchedToken {
    pub terminal: TerminalId,
    pub value: SemanticValue,
    pub position: SourcePosition,
}

/// Token input for the driver.
pub trait TokenProvider {
    /// Produce the next token. Must return the table's EOF terminal
    /// forever once input is exhausted.
    fn fetch_token(&mut self) -> FetchedToken;

    /// Forwarded from semantic actions that toggle plain-token fusing.
    fn set_compound_tokens(&mut self, enabled: bool);

    /// A syntax error at `position`: `found` was read where one of
    /// `expected` was required. Return `false` to abort the parse
    /// instead of attempting recovery.
    fn report_error(
        &mut self,
        found: TerminalId,
        position: SourcePosition,
        expected: &[TerminalId],
    ) -> bool;
}

/// Lexer-facing knobs a reduction may adjust.
pub struct ParserControls {
    pub compound_tokens: bool,
}

/// Value computation hooks.
pub trait SemanticActions {
    type Value;

    /// Value for a shifted terminal.
    fn shift(
        &mut self,
        terminal: TerminalId,
        value: SemanticValue,
        position: SourcePosition,
    ) -> Self::Value;

    /// Value for a reduced production. `children` holds one value per
    /// right-hand-side symbol; `position` is the merged span of the
    /// children (invalid for empty productions).
    fn reduce(
        &mut self,
        production: usize,
        children: Vec<Self::Value>,
        position: SourcePosition,
        controls: &mut ParserControls,
    ) -> Self::Value;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum DriverError {
    /// The provider declined recovery.
    #[error("syntax error at {position}")]
    Halted { position: SourcePosition },

    /// Recovery could not resynchronize before end of input.
    #[error("unrecoverable syntax error at {position}")]
    Unrecoverable { position: SourcePosition },
}

pub struct ShiftReduceParser<'t, P, A: SemanticActions> {
    table: &'t ParseTable,
    provider: P,
    actions: A,
    states: Vec<StateId>,
    values: Vec<A::Value>,
    positions: Vec<SourcePosition>,
    lookahead: Option<FetchedToken>,
    controls: ParserControls,
    provider_compounding: bool,
    last_error_offset: Option<i32>,
}

impl<'t, P: TokenProvider, A: SemanticActions> ShiftReduceParser<'t, P, A> {
    /// Create a parser. `compound_tokens` is the initial fusing mode,
    /// applied to the provider before the first fetch.
    pub fn new(table: &'t ParseTable, mut provider: P, actions: A, compound_tokens: bool) -> Self {
        provider.set_compound_tokens(compound_tokens);
        ShiftReduceParser {
            table,
            provider,
            actions,
            states: vec![0],
            values: Vec::new(),
            positions: Vec::new(),
            lookahead: None,
            controls: ParserControls { compound_tokens },
            provider_compounding: compound_tokens,
            last_error_offset: None,
        }
    }

    /// Run to acceptance or failure.
    pub fn run(&mut self) -> Result<(), DriverError> {
        loop {
            let state = self.top_state();

            if let Some(production) = self.table.default_reduce(state) {
                self.reduce(production)?;
                continue;
            }

            let terminal = self.peek().terminal;
            match self.table.action(state, terminal) {
                Some(Action::Shift(next)) => {
                    trace!(state, terminal, "shift");
                    // peek() filled the lookahead above.
                    if let Some(token) = self.lookahead.take() {
                        let value = self.actions.shift(token.terminal, token.value, token.position);
                        self.values.push(value);
                        self.positions.push(token.position);
                        self.states.push(next);
                    }
                }
                Some(Action::Reduce(production)) => self.reduce(production)?,
                Some(Action::Accept) => {
                    trace!("accept");
                    return Ok(());
                }
                None => self.recover(terminal)?,
            }
        }
    }

    /// Consume the parser, yielding the provider and actions back to
    /// the caller (diagnostics and output live there).
    pub fn into_parts(self) -> (P, A) {
        (self.provider, self.actions)
    }

    fn top_state(&self) -> StateId {
        // The stack always holds at least the start state.
        self.states.last().copied().unwrap_or(0)
    }

    fn peek(&mut self) -> &FetchedToken {
        let Self {
            lookahead, provider, ..
        } = self;
        lookahead.get_or_insert_with(|| provider.fetch_token())
    }

    fn reduce(&mut self, production: usize) -> Result<(), DriverError> {
        let (lhs, len) = self.table.production(production);
        trace!(production, len, "reduce");

        let children = self.values.split_off(self.values.len() - len);
        let child_positions = self.positions.split_off(self.positions.len() - len);
        self.states.truncate(self.states.len() - len);

        let position = child_positions
            .into_iter()
            .fold(SourcePosition::INVALID, SourcePosition::merge);

        let value = self
            .actions
            .reduce(production, children, position, &mut self.controls);

        if self.controls.compound_tokens != self.provider_compounding {
            self.provider_compounding = self.controls.compound_tokens;
            self.provider
                .set_compound_tokens(self.provider_compounding);
        }

        let state = self.top_state();
        let Some(next) = self.table.goto_state(state, lhs) else {
            // Unreachable for a well-formed table.
            return Err(DriverError::Unrecoverable { position });
        };
        self.states.push(next);
        self.values.push(value);
        self.positions.push(position);
        Ok(())
    }

    fn recover(&mut self, terminal: TerminalId) -> Result<(), DriverError> {
        let position = self.peek().position;
        let eof = self.table.eof();

        // Second failure at the same position: the error shift did not
        // make the token parsable, so drop the token itself.
        if self.last_error_offset == Some(position.first_offset) {
            if terminal == eof {
                return Err(DriverError::Unrecoverable { position });
            }
            debug!(%position, "discarding token during error recovery");
            self.lookahead = None;
            return Ok(());
        }
        self.last_error_offset = Some(position.first_offset);

        let expected = self.table.expected_terminals(self.top_state());
        debug!(%position, terminal, "syntax error");
        if !self.provider.report_error(terminal, position, &expected) {
            return Err(DriverError::Halted { position });
        }

        // Pop until a state can shift the error terminal, then shift a
        // synthetic error token there.
        let error = self.table.error();
        loop {
            let state = self.top_state();
            if let Some(Action::Shift(next)) = self.table.action(state, error) {
                let value = self.actions.shift(error, SemanticValue::None, position);
                self.values.push(value);
                self.positions.push(position);
                self.states.push(next);
                return Ok(());
            }
            if self.states.len() == 1 {
                // Nothing on the stack accepts an error token; skip
                // the offending input instead.
                if terminal == eof {
                    return Err(DriverError::Unrecoverable { position });
                }
                self.lookahead = None;
                return Ok(());
            }
            self.states.pop();
            self.values.pop();
            self.positions.pop();
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
    use crate::table::{build, Grammar, Production, Symbol};
    use pretty_assertions::assert_eq;

    // S' -> list; list -> list item | ε; item -> 'x' | error
    // Terminals: 0='x' 1=eof 2=error 3='y' (never valid)
    fn recovery_grammar() -> Grammar {
        use Symbol::{N, T};
        Grammar {
            terminal_count: 4,
            nonterminal_count: 3, // 0=S' 1=list 2=item
            productions: vec![
                Production { lhs: 0, rhs: vec![N(1)] },
                Production { lhs: 1, rhs: vec![N(1), N(2)] },
                Production { lhs: 1, rhs: vec![] },
                Production { lhs: 2, rhs: vec![T(0)] },
                Production { lhs: 2, rhs: vec![T(2)] },
            ],
            eof: 1,
            error: 2,
        }
    }

    fn pos(offset: i32) -> SourcePosition {
        SourcePosition {
            first_line: 1,
            first_column: offset,
            first_offset: offset,
            last_line: 1,
            last_column: offset + 1,
            last_offset: offset + 1,
        }
    }

    struct VecProvider {
        tokens: Vec<FetchedToken>,
        cursor: usize,
        errors: Vec<i32>,
        allow_recovery: bool,
        compounding_calls: Vec<bool>,
    }

    impl VecProvider {
        fn new(terminals: &[TerminalId], allow_recovery: bool) -> Self {
            let tokens = terminals
                .iter()
                .enumerate()
                .map(|(i, &t)| FetchedToken {
                    terminal: t,
                    value: SemanticValue::None,
                    position: pos(i as i32),
                })
                .collect();
            VecProvider {
                tokens,
                cursor: 0,
                errors: Vec::new(),
                allow_recovery,
                compounding_calls: Vec::new(),
            }
        }
    }

    impl TokenProvider for VecProvider {
        fn fetch_token(&mut self) -> FetchedToken {
            if let Some(token) = self.tokens.get(self.cursor) {
                self.cursor += 1;
                token.clone()
            } else {
                FetchedToken {
                    terminal: 1,
                    value: SemanticValue::None,
                    position: pos(self.tokens.len() as i32),
                }
            }
        }

        fn set_compound_tokens(&mut self, enabled: bool) {
            self.compounding_calls.push(enabled);
        }

        fn report_error(
            &mut self,
            _found: TerminalId,
            position: SourcePosition,
            expected: &[TerminalId],
        ) -> bool {
            assert!(!expected.is_empty());
            self.errors.push(position.first_offset);
            self.allow_recovery
        }
    }

    #[derive(Default)]
    struct CountingActions {
        reductions: Vec<usize>,
    }

    impl SemanticActions for CountingActions {
        type Value = ();

        fn shift(&mut self, _: TerminalId, _: SemanticValue, _: SourcePosition) {}

        fn reduce(
            &mut self,
            production: usize,
            _: Vec<()>,
            _: SourcePosition,
            _: &mut ParserControls,
        ) {
            self.reductions.push(production);
        }
    }

    fn run_parse(
        terminals: &[TerminalId],
        allow_recovery: bool,
    ) -> (Result<(), DriverError>, VecProvider, CountingActions) {
        let grammar = recovery_grammar();
        let table = build(&grammar);
        let provider = VecProvider::new(terminals, allow_recovery);
        let mut parser =
            ShiftReduceParser::new(&table, provider, CountingActions::default(), false);
        let result = parser.run();
        let (provider, actions) = parser.into_parts();
        (result, provider, actions)
    }

    #[test]
    fn clean_input_parses() {
        let (result, provider, actions) = run_parse(&[0, 0], false);
        assert_eq!(result, Ok(()));
        assert!(provider.errors.is_empty());
        // list->ε, item->x, list->list item, twice, then S' untouched
        // (accept fires before reducing production 0).
        assert_eq!(actions.reductions, vec![2, 3, 1, 3, 1]);
    }

    #[test]
    fn empty_input_parses() {
        let (result, provider, _) = run_parse(&[], false);
        assert_eq!(result, Ok(()));
        assert!(provider.errors.is_empty());
    }

    #[test]
    fn bad_token_recovers_once() {
        let (result, provider, actions) = run_parse(&[0, 3, 0], true);
        assert_eq!(result, Ok(()));
        // One report, at the offending token's offset.
        assert_eq!(provider.errors, vec![1]);
        // The error production was reduced.
        assert!(actions.reductions.contains(&4));
    }

    #[test]
    fn fail_fast_halts() {
        let (result, provider, _) = run_parse(&[0, 3, 0], false);
        assert_eq!(
            result,
            Err(DriverError::Halted { position: pos(1) })
        );
        assert_eq!(provider.errors, vec![1]);
    }

    #[test]
    fn garbage_run_terminates() {
        let (result, provider, _) = run_parse(&[3, 3, 3, 3], true);
        assert_eq!(result, Ok(()));
        // Every recovery episode consumed input; no hang.
        assert!(!provider.errors.is_empty());
    }

    #[test]
    fn initial_compounding_forwarded() {
        let grammar = recovery_grammar();
        let table = build(&grammar);
        let provider = VecProvider::new(&[], true);
        let mut parser = ShiftReduceParser::new(&table, provider, CountingActions::default(), true);
        parser.run().expect("empty parse succeeds");
        let (provider, _) = parser.into_parts();
        assert_eq!(provider.compounding_calls, vec![true]);
    }
}
