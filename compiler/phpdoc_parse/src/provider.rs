//! Token supply for the doc parser.
//!
//! Wraps a [`CompoundScanner`] behind the driver's [`TokenProvider`]
//! contract and owns the diagnostics collected along the way: invalid
//! characters at fetch time, a missing `*/` at end of input, and
//! syntax errors forwarded by the driver.

use crate::driver::{FetchedToken, TokenProvider};
use crate::grammar::{terminal_id, terminal_kind};
use crate::table::TerminalId;
use crate::RecoveryPolicy;
use phpdoc_diagnostic::{unexpected_token, unterminated_comment, Diagnostic, ErrorCode};
use phpdoc_ir::{DocTokenKind, SourcePosition};
use phpdoc_lexer::CompoundScanner;

pub(crate) struct DocTokenProvider<'a> {
    scanner: CompoundScanner<'a>,
    policy: RecoveryPolicy,
    diagnostics: Vec<Diagnostic>,
    compounding: bool,
    reported_unterminated: bool,
}

impl<'a> DocTokenProvider<'a> {
    pub(crate) fn new(text: &'a str, policy: RecoveryPolicy) -> Self {
        DocTokenProvider {
            scanner: CompoundScanner::new(text),
            policy,
            diagnostics: Vec::new(),
            compounding: false,
            reported_unterminated: false,
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl TokenProvider for DocTokenProvider<'_> {
    fn fetch_token(&mut self) -> FetchedToken {
        loop {
            let token = self.scanner.fetch_token();
            match token.kind {
                // With fusing off the parser reads the structured part
                // of a tag; whitespace only separates those tokens.
                DocTokenKind::Whitespace if !self.compounding => continue,
                DocTokenKind::Error => {
                    self.diagnostics.push(Diagnostic::error(
                        ErrorCode::E0002,
                        format!("invalid character {:?}", token.value.as_str()),
                        token.position,
                    ));
                    continue;
                }
                DocTokenKind::Eof => {
                    if self.scanner.scanner().is_unterminated() && !self.reported_unterminated {
                        self.reported_unterminated = true;
                        self.diagnostics.push(unterminated_comment(token.position));
                    }
                }
                _ => {}
            }
            return FetchedToken {
                terminal: terminal_id(token.kind),
                value: token.value,
                position: token.position,
            };
        }
    }

    fn set_compound_tokens(&mut self, enabled: bool) {
        self.compounding = enabled;
        self.scanner.set_compound_tokens(enabled);
    }

    fn report_error(
        &mut self,
        found: TerminalId,
        position: SourcePosition,
        expected: &[TerminalId],
    ) -> bool {
        let expected = expected.iter().map(|&t| terminal_kind(t)).collect();
        self.diagnostics
            .push(unexpected_token(terminal_kind(found), position, expected));
        self.policy != RecoveryPolicy::FailFast
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
    use crate::grammar::terminal;
    use pretty_assertions::assert_eq;

    fn terminals(text: &str, compounding: bool) -> Vec<TerminalId> {
        let mut provider = DocTokenProvider::new(text, RecoveryPolicy::SkipAndResync);
        provider.set_compound_tokens(compounding);
        let mut out = Vec::new();
        loop {
            let token = provider.fetch_token();
            let done = token.terminal == terminal::EOF;
            out.push(token.terminal);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn whitespace_skipped_while_fusing_is_off() {
        assert_eq!(
            terminals("int|string $id", false),
            vec![
                terminal::IDENTIFIER,
                terminal::BAR,
                terminal::IDENTIFIER,
                terminal::DOLLAR,
                terminal::IDENTIFIER,
                terminal::EOF,
            ]
        );
    }

    #[test]
    fn fused_text_is_one_compound() {
        assert_eq!(
            terminals("some plain text", true),
            vec![terminal::COMPOUND, terminal::EOF]
        );
    }

    #[test]
    fn unterminated_comment_warns_once_at_eof() {
        let mut provider = DocTokenProvider::new("/** hi", RecoveryPolicy::SkipAndResync);
        provider.set_compound_tokens(true);
        loop {
            if provider.fetch_token().terminal == terminal::EOF {
                break;
            }
        }
        // A second fetch at EOF must not duplicate the warning.
        let again = provider.fetch_token();
        assert_eq!(again.terminal, terminal::EOF);
        let diagnostics = provider.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::E0001);
    }

    #[test]
    fn terminated_comment_has_no_diagnostics() {
        let mut provider = DocTokenProvider::new("/** hi */", RecoveryPolicy::SkipAndResync);
        provider.set_compound_tokens(true);
        loop {
            if provider.fetch_token().terminal == terminal::EOF {
                break;
            }
        }
        assert!(provider.into_diagnostics().is_empty());
    }

    #[test]
    fn fail_fast_declines_recovery() {
        let mut provider = DocTokenProvider::new("", RecoveryPolicy::FailFast);
        let keep_going = provider.report_error(
            terminal::BAR,
            SourcePosition::INITIAL,
            &[terminal::IDENTIFIER],
        );
        assert!(!keep_going);
        let diagnostics = provider.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::E1001);
        assert_eq!(diagnostics[0].expected, vec![DocTokenKind::Identifier]);
    }
}
