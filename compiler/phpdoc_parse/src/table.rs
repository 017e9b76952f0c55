//! SLR(1) parse-table construction.
//!
//! The grammar is supplied at runtime as plain production lists; the
//! builder computes nullability, FIRST and FOLLOW sets, the canonical
//! LR(0) collection, and an action/goto table. Conflicts are resolved
//! the conventional way: shift over reduce, earliest production among
//! competing reduces.
//!
//! A state whose only LR(0) item is complete reduces without consulting
//! the lookahead ([`ParseTable::default_reduce`]). The driver depends on
//! this: semantic actions fired by such reductions can retune the lexer
//! before the next token is fetched.

use rustc_hash::FxHashMap;
use tracing::trace;

pub type TerminalId = u16;
pub type NonterminalId = u16;
pub type StateId = u32;

/// Grammar symbol: terminal or nonterminal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Symbol {
    T(TerminalId),
    N(NonterminalId),
}

#[derive(Clone, Debug)]
pub struct Production {
    pub lhs: NonterminalId,
    pub rhs: Vec<Symbol>,
}

/// A context-free grammar over dense terminal/nonterminal indices.
///
/// Production 0 must be the augmented start `S' -> start`, with `S'`
/// appearing in no right-hand side.
pub struct Grammar {
    pub terminal_count: usize,
    pub nonterminal_count: usize,
    pub productions: Vec<Production>,
    /// Terminal signaling end of input.
    pub eof: TerminalId,
    /// Terminal shifted during error recovery.
    pub error: TerminalId,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Action {
    Shift(StateId),
    Reduce(usize),
    Accept,
}

/// Dense action/goto tables plus per-state default reductions.
pub struct ParseTable {
    terminal_count: usize,
    nonterminal_count: usize,
    state_count: usize,
    actions: Vec<Option<Action>>,
    gotos: Vec<Option<StateId>>,
    default_reduce: Vec<Option<usize>>,
    /// `(lhs, rhs_len)` per production, for the reduce step.
    productions: Vec<(NonterminalId, usize)>,
    eof: TerminalId,
    error: TerminalId,
}

impl ParseTable {
    #[inline]
    pub fn action(&self, state: StateId, terminal: TerminalId) -> Option<Action> {
        self.actions[state as usize * self.terminal_count + terminal as usize]
    }

    #[inline]
    pub fn goto_state(&self, state: StateId, nonterminal: NonterminalId) -> Option<StateId> {
        self.gotos[state as usize * self.nonterminal_count + nonterminal as usize]
    }

    /// Production to reduce in `state` regardless of lookahead, if any.
    #[inline]
    pub fn default_reduce(&self, state: StateId) -> Option<usize> {
        self.default_reduce[state as usize]
    }

    /// `(lhs, rhs_len)` of a production.
    #[inline]
    pub fn production(&self, index: usize) -> (NonterminalId, usize) {
        self.productions[index]
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    #[inline]
    pub fn eof(&self) -> TerminalId {
        self.eof
    }

    #[inline]
    pub fn error(&self) -> TerminalId {
        self.error
    }

    /// Terminals with any action in `state`, for diagnostics. The error
    /// terminal is omitted: it is never valid input.
    pub fn expected_terminals(&self, state: StateId) -> Vec<TerminalId> {
        let row = &self.actions
            [state as usize * self.terminal_count..(state as usize + 1) * self.terminal_count];
        row.iter()
            .enumerate()
            .filter(|(t, action)| action.is_some() && *t != self.error as usize)
            .map(|(t, _)| t as TerminalId)
            .collect()
    }
}

/// An LR(0) item: production index and dot offset.
type Item = (usize, usize);

fn closure(grammar: &Grammar, items: &mut Vec<Item>) {
    let mut seen: rustc_hash::FxHashSet<Item> = items.iter().copied().collect();
    let mut i = 0;
    while i < items.len() {
        let (p, dot) = items[i];
        if let Some(Symbol::N(n)) = grammar.productions[p].rhs.get(dot) {
            for (q, production) in grammar.productions.iter().enumerate() {
                if production.lhs == *n && seen.insert((q, 0)) {
                    items.push((q, 0));
                }
            }
        }
        i += 1;
    }
    items.sort_unstable();
}

/// Terminal sets as bitsets; the grammar stays comfortably below 64
/// terminals.
type TermSet = u64;

fn nullable_and_first(grammar: &Grammar) -> (Vec<bool>, Vec<TermSet>) {
    let mut nullable = vec![false; grammar.nonterminal_count];
    let mut first = vec![0 as TermSet; grammar.nonterminal_count];
    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            let lhs = production.lhs as usize;
            let mut all_nullable = true;
            for symbol in &production.rhs {
                match *symbol {
                    Symbol::T(t) => {
                        let bit = 1 << t;
                        if first[lhs] & bit == 0 {
                            first[lhs] |= bit;
                            changed = true;
                        }
                        all_nullable = false;
                    }
                    Symbol::N(n) => {
                        let add = first[n as usize] & !first[lhs];
                        if add != 0 {
                            first[lhs] |= add;
                            changed = true;
                        }
                        if !nullable[n as usize] {
                            all_nullable = false;
                        }
                    }
                }
                if !all_nullable {
                    break;
                }
            }
            if all_nullable && !nullable[lhs] {
                nullable[lhs] = true;
                changed = true;
            }
        }
    }
    (nullable, first)
}

fn follow_sets(grammar: &Grammar, nullable: &[bool], first: &[TermSet]) -> Vec<TermSet> {
    let mut follow = vec![0 as TermSet; grammar.nonterminal_count];
    follow[grammar.productions[0].lhs as usize] |= 1 << grammar.eof;
    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            let lhs = production.lhs as usize;
            for (i, symbol) in production.rhs.iter().enumerate() {
                let Symbol::N(n) = *symbol else { continue };
                let n = n as usize;
                // FIRST of what follows position i.
                let mut rest_nullable = true;
                let mut add: TermSet = 0;
                for rest in &production.rhs[i + 1..] {
                    match *rest {
                        Symbol::T(t) => {
                            add |= 1 << t;
                            rest_nullable = false;
                        }
                        Symbol::N(m) => {
                            add |= first[m as usize];
                            rest_nullable = nullable[m as usize];
                        }
                    }
                    if !rest_nullable {
                        break;
                    }
                }
                if rest_nullable {
                    add |= follow[lhs];
                }
                let new = add & !follow[n];
                if new != 0 {
                    follow[n] |= new;
                    changed = true;
                }
            }
        }
    }
    follow
}

/// Build the SLR(1) table for a grammar.
pub fn build(grammar: &Grammar) -> ParseTable {
    let (nullable, first) = nullable_and_first(grammar);
    let follow = follow_sets(grammar, &nullable, &first);

    // Canonical LR(0) collection.
    let mut states: Vec<Vec<Item>> = Vec::new();
    let mut index: FxHashMap<Vec<Item>, StateId> = FxHashMap::default();
    let mut transitions: Vec<Vec<(Symbol, StateId)>> = Vec::new();

    let mut start = vec![(0usize, 0usize)];
    closure(grammar, &mut start);
    index.insert(start.clone(), 0);
    states.push(start);

    let mut s = 0;
    while s < states.len() {
        let mut by_symbol: FxHashMap<Symbol, Vec<Item>> = FxHashMap::default();
        for &(p, dot) in &states[s] {
            if let Some(&symbol) = grammar.productions[p].rhs.get(dot) {
                by_symbol.entry(symbol).or_default().push((p, dot + 1));
            }
        }
        // Deterministic state numbering regardless of hash order.
        let mut outgoing: Vec<(Symbol, Vec<Item>)> = by_symbol.into_iter().collect();
        outgoing.sort_unstable_by_key(|(symbol, _)| match *symbol {
            Symbol::T(t) => (0u8, t),
            Symbol::N(n) => (1u8, n),
        });

        let mut trans = Vec::with_capacity(outgoing.len());
        for (symbol, mut kernel) in outgoing {
            closure(grammar, &mut kernel);
            let id = if let Some(&id) = index.get(&kernel) {
                id
            } else {
                let id = states.len() as StateId;
                index.insert(kernel.clone(), id);
                states.push(kernel);
                id
            };
            trans.push((symbol, id));
        }
        transitions.push(trans);
        s += 1;
    }

    // Fill action/goto tables.
    let state_count = states.len();
    let mut actions: Vec<Option<Action>> = vec![None; state_count * grammar.terminal_count];
    let mut gotos: Vec<Option<StateId>> = vec![None; state_count * grammar.nonterminal_count];

    let set_action = |actions: &mut Vec<Option<Action>>, s: usize, t: usize, new: Action| {
        let cell = &mut actions[s * grammar.terminal_count + t];
        match (*cell, new) {
            (None, _) => *cell = Some(new),
            // Shift over reduce.
            (Some(Action::Shift(_) | Action::Accept), Action::Reduce(_)) => {
                trace!(state = s, terminal = t, "shift/reduce conflict, shifting");
            }
            // Earliest production among competing reduces.
            (Some(Action::Reduce(a)), Action::Reduce(b)) => {
                trace!(state = s, terminal = t, "reduce/reduce conflict");
                if b < a {
                    *cell = Some(Action::Reduce(b));
                }
            }
            (Some(Action::Reduce(_)), _) => *cell = Some(new),
            (Some(Action::Shift(_) | Action::Accept), _) => {}
        }
    };

    for (s, items) in states.iter().enumerate() {
        for &(symbol, target) in &transitions[s] {
            match symbol {
                Symbol::T(t) => set_action(&mut actions, s, t as usize, Action::Shift(target)),
                Symbol::N(n) => {
                    gotos[s * grammar.nonterminal_count + n as usize] = Some(target);
                }
            }
        }
        for &(p, dot) in items {
            if dot != grammar.productions[p].rhs.len() {
                continue;
            }
            if p == 0 {
                set_action(&mut actions, s, grammar.eof as usize, Action::Accept);
                continue;
            }
            let lhs_follow = follow[grammar.productions[p].lhs as usize];
            for t in 0..grammar.terminal_count {
                if lhs_follow & (1 << t) != 0 {
                    set_action(&mut actions, s, t, Action::Reduce(p));
                }
            }
        }
    }

    // Default reductions: exactly one item, complete, not the start
    // production, and no shift or accept action in the row.
    let mut default_reduce = vec![None; state_count];
    for (s, items) in states.iter().enumerate() {
        let completed: Vec<usize> = items
            .iter()
            .filter(|&&(p, dot)| dot == grammar.productions[p].rhs.len())
            .map(|&(p, _)| p)
            .collect();
        let [p] = completed[..] else { continue };
        if p == 0 {
            continue;
        }
        let row = &actions[s * grammar.terminal_count..(s + 1) * grammar.terminal_count];
        let has_shift = row
            .iter()
            .any(|a| matches!(a, Some(Action::Shift(_) | Action::Accept)));
        if !has_shift {
            default_reduce[s] = Some(p);
        }
    }

    ParseTable {
        terminal_count: grammar.terminal_count,
        nonterminal_count: grammar.nonterminal_count,
        state_count,
        actions,
        gotos,
        default_reduce,
        productions: grammar
            .productions
            .iter()
            .map(|p| (p.lhs, p.rhs.len()))
            .collect(),
        eof: grammar.eof,
        error: grammar.error,
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

    // Toy grammar:
    //   S' -> expr
    //   expr -> expr '+' atom | atom
    //   atom -> 'x' | '(' expr ')'
    // Terminals: 0='x' 1='+' 2='(' 3=')' 4=eof 5=error
    fn toy() -> Grammar {
        use Symbol::{N, T};
        Grammar {
            terminal_count: 6,
            nonterminal_count: 3, // 0=S' 1=expr 2=atom
            productions: vec![
                Production { lhs: 0, rhs: vec![N(1)] },
                Production { lhs: 1, rhs: vec![N(1), T(1), N(2)] },
                Production { lhs: 1, rhs: vec![N(2)] },
                Production { lhs: 2, rhs: vec![T(0)] },
                Production { lhs: 2, rhs: vec![T(2), N(1), T(3)] },
            ],
            eof: 4,
            error: 5,
        }
    }

    /// Drive the table over a terminal sequence without semantics.
    fn accepts(table: &ParseTable, input: &[TerminalId]) -> bool {
        let mut states = vec![0 as StateId];
        let mut cursor = 0;
        // Bounded to catch table bugs that would otherwise spin.
        for _ in 0..10_000 {
            let state = *states.last().expect("state stack is never empty");
            let action = if let Some(p) = table.default_reduce(state) {
                Action::Reduce(p)
            } else {
                let lookahead = input.get(cursor).copied().unwrap_or(table.eof());
                match table.action(state, lookahead) {
                    Some(action) => action,
                    None => return false,
                }
            };
            match action {
                Action::Shift(next) => {
                    states.push(next);
                    cursor += 1;
                }
                Action::Reduce(p) => {
                    let (lhs, len) = table.production(p);
                    states.truncate(states.len() - len);
                    let top = *states.last().expect("reduce popped the start state");
                    match table.goto_state(top, lhs) {
                        Some(next) => states.push(next),
                        None => return false,
                    }
                }
                Action::Accept => return cursor == input.len(),
            }
        }
        false
    }

    #[test]
    fn accepts_valid_expressions() {
        let table = build(&toy());
        assert!(accepts(&table, &[0])); // x
        assert!(accepts(&table, &[0, 1, 0])); // x+x
        assert!(accepts(&table, &[2, 0, 3])); // (x)
        assert!(accepts(&table, &[2, 0, 1, 0, 3, 1, 0])); // (x+x)+x
    }

    #[test]
    fn rejects_invalid_expressions() {
        let table = build(&toy());
        assert!(!accepts(&table, &[])); // empty
        assert!(!accepts(&table, &[1])); // +
        assert!(!accepts(&table, &[0, 1])); // x+
        assert!(!accepts(&table, &[2, 0])); // (x
        assert!(!accepts(&table, &[0, 0])); // x x
    }

    #[test]
    fn marker_state_reduces_by_default() {
        // The state reached by shifting 'x' holds only `atom -> x .`
        // and must reduce without lookahead.
        let table = build(&toy());
        let state0_on_x = match table.action(0, 0) {
            Some(Action::Shift(s)) => s,
            other => panic!("expected shift on 'x', got {other:?}"),
        };
        assert_eq!(table.default_reduce(state0_on_x), Some(3));
    }

    #[test]
    fn accept_state_is_not_default_reduce() {
        let table = build(&toy());
        for state in 0..table.state_count() as StateId {
            if table.action(state, table.eof()) == Some(Action::Accept) {
                assert_eq!(table.default_reduce(state), None);
            }
        }
    }

    #[test]
    fn expected_terminals_omit_error() {
        let table = build(&toy());
        let expected = table.expected_terminals(0);
        assert!(expected.contains(&0)); // 'x'
        assert!(expected.contains(&2)); // '('
        assert!(!expected.contains(&5)); // error terminal
        assert!(!expected.contains(&1)); // '+' is not a valid start
    }

    #[test]
    fn right_recursive_runs_shift_greedily() {
        //   S' -> s
        //   s -> 'x' s | 'x'
        use Symbol::{N, T};
        let grammar = Grammar {
            terminal_count: 3, // 0='x' 1=eof 2=error
            nonterminal_count: 2,
            productions: vec![
                Production { lhs: 0, rhs: vec![N(1)] },
                Production { lhs: 1, rhs: vec![T(0), N(1)] },
                Production { lhs: 1, rhs: vec![T(0)] },
            ],
            eof: 1,
            error: 2,
        };
        let table = build(&grammar);
        // After shifting 'x', seeing another 'x' must shift (grow the
        // run) rather than reduce `s -> x`.
        let after_x = match table.action(0, 0) {
            Some(Action::Shift(s)) => s,
            other => panic!("expected shift on 'x', got {other:?}"),
        };
        assert!(matches!(table.action(after_x, 0), Some(Action::Shift(_))));
        assert_eq!(table.action(after_x, 1), Some(Action::Reduce(2)));
        // 'x x x' accepted.
        assert!(accepts(&table, &[0, 0, 0]));
    }
}
