//! Shift-reduce parser for PHPDoc comments.
//!
//! The crate has two layers. [`table`] and [`driver`] are a generic
//! SLR(1) engine: a table builder over plain production lists and a
//! driver that runs any such table against a [`driver::TokenProvider`],
//! with yacc-style error recovery. The doc grammar itself, its semantic
//! actions and the token supply live in private modules; callers use
//! [`parse_doc`] or [`parse_doc_with`].
//!
//! ```
//! use phpdoc_parse::parse_doc;
//!
//! let outcome = parse_doc("/** @param int $id The identifier. */");
//! assert_eq!(outcome.elements.len(), 1);
//! assert!(outcome.diagnostics.is_empty());
//! ```

pub mod driver;
pub mod table;

mod grammar;
mod provider;
mod reduce;

use crate::driver::ShiftReduceParser;
use crate::provider::DocTokenProvider;
use crate::reduce::Reducer;
use phpdoc_diagnostic::Diagnostic;
use phpdoc_ir::ParseElement;
use thiserror::Error;
use tracing::debug;

pub use crate::driver::DriverError;

/// What to do when the input does not match the grammar.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum RecoveryPolicy {
    /// Stop at the first syntax error.
    FailFast,
    /// Report the error, skip to the next parsable point, continue.
    #[default]
    SkipAndResync,
}

/// Parse result: the flat element list plus everything reported along
/// the way. Elements and diagnostics are independent; a doc comment
/// with recoverable errors yields both.
#[derive(Debug)]
pub struct ParseOutcome {
    pub elements: Vec<ParseElement>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A parse that stopped early. The partial [`ParseOutcome`] is kept:
/// elements completed before the stop are still valid.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ParseError {
    pub reason: DriverError,
    pub outcome: ParseOutcome,
}

fn run_parse(text: &str, policy: RecoveryPolicy) -> Result<ParseOutcome, ParseError> {
    let provider = DocTokenProvider::new(text, policy);
    let mut parser = ShiftReduceParser::new(&grammar::TABLE, provider, Reducer::default(), true);
    let result = parser.run();
    let (provider, reducer) = parser.into_parts();
    let outcome = ParseOutcome {
        elements: reducer.into_elements(),
        diagnostics: provider.into_diagnostics(),
    };
    debug!(
        elements = outcome.elements.len(),
        diagnostics = outcome.diagnostics.len(),
        "doc comment parsed"
    );
    match result {
        Ok(()) => Ok(outcome),
        Err(reason) => Err(ParseError { reason, outcome }),
    }
}

/// Parse a doc comment, recovering from syntax errors. Always produces
/// an outcome; malformed input shows up as diagnostics, not a failure.
pub fn parse_doc(text: &str) -> ParseOutcome {
    match run_parse(text, RecoveryPolicy::SkipAndResync) {
        Ok(outcome) => outcome,
        Err(error) => error.outcome,
    }
}

/// Parse a doc comment under an explicit [`RecoveryPolicy`].
pub fn parse_doc_with(text: &str, policy: RecoveryPolicy) -> Result<ParseOutcome, ParseError> {
    run_parse(text, policy)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use phpdoc_diagnostic::{ErrorCode, Severity};
    use phpdoc_ir::{DocElement, DocElementType, TypeRef, Visibility};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn elements(text: &str) -> Vec<DocElement> {
        let outcome = parse_doc(text);
        assert!(
            outcome.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            outcome.diagnostics
        );
        outcome.elements.into_iter().map(|e| e.element).collect()
    }

    #[test]
    fn full_doc_comment() {
        let text = "/**\n\
                    \x20* Summary text.\n\
                    \x20*\n\
                    \x20* @param int|string $id The identifier.\n\
                    \x20* @return bool True on success.\n\
                    \x20* @access public\n\
                    \x20* @since 1.0\n\
                    \x20*/";
        assert_eq!(
            elements(text),
            vec![
                DocElement::Text {
                    text: "Summary text.".to_owned()
                },
                DocElement::Param {
                    types: vec![TypeRef::new("int"), TypeRef::new("string")],
                    variable: Some("id".to_owned()),
                    description: "The identifier.".to_owned(),
                },
                DocElement::Returns {
                    types: vec![TypeRef::new("bool")],
                    description: "True on success.".to_owned(),
                },
                DocElement::Access {
                    visibility: Visibility::Public,
                    description: String::new(),
                },
                DocElement::Tag {
                    name: "since".to_owned(),
                    text: "1.0".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn empty_input() {
        let outcome = parse_doc("");
        assert!(outcome.elements.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn empty_comment() {
        let outcome = parse_doc("/***/");
        assert!(outcome.elements.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn bare_text_is_one_element() {
        assert_eq!(
            elements("just some words"),
            vec![DocElement::Text {
                text: "just some words".to_owned()
            }]
        );
    }

    #[test]
    fn param_without_variable() {
        assert_eq!(
            elements("/** @param int The id. */"),
            vec![DocElement::Param {
                types: vec![TypeRef::new("int")],
                variable: None,
                description: "The id.".to_owned(),
            }]
        );
    }

    #[test]
    fn array_dimensions_and_unions() {
        assert_eq!(
            elements("/** @var array|int[][] $grid */"),
            vec![DocElement::Var {
                types: vec![TypeRef::new("array"), TypeRef::array_of("int", 2)],
                variable: Some("grid".to_owned()),
                description: String::new(),
            }]
        );
    }

    #[test]
    fn throws_with_namespaced_class() {
        assert_eq!(
            elements("/** @throws \\App\\NotFound when missing */"),
            vec![DocElement::Throws {
                types: vec![TypeRef::new("\\App\\NotFound")],
                description: "when missing".to_owned(),
            }]
        );
    }

    #[test]
    fn tag_at_end_of_input() {
        assert_eq!(
            parse_doc("/** @return bool */").elements[0].element_type,
            DocElementType::Returns
        );
    }

    #[test]
    fn positions_cover_the_tag_line() {
        let outcome = parse_doc("/**\n * @param int $id\n */");
        assert_eq!(outcome.elements.len(), 1);
        let position = outcome.elements[0].position;
        assert!(position.is_valid());
        assert_eq!(position.first_line, 2);
    }

    #[test]
    fn bad_access_keyword_recovers() {
        let outcome = parse_doc("/** @access wrong\n * @access private\n */");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, ErrorCode::E1001);
        // Parsing resumed: the second tag survives.
        assert_eq!(
            outcome.elements,
            vec![phpdoc_ir::ParseElement::new(
                DocElement::Access {
                    visibility: Visibility::Private,
                    description: String::new(),
                },
                outcome.elements[0].position,
            )]
        );
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let result = parse_doc_with("/** @access wrong */", RecoveryPolicy::FailFast);
        let error = result.expect_err("malformed input must fail under FailFast");
        assert!(matches!(error.reason, DriverError::Halted { .. }));
        assert_eq!(error.outcome.diagnostics.len(), 1);
    }

    #[test]
    fn unterminated_comment_warns_but_parses() {
        let outcome = parse_doc("/** @param int $x");
        assert_eq!(
            outcome.elements,
            vec![phpdoc_ir::ParseElement::new(
                DocElement::Param {
                    types: vec![TypeRef::new("int")],
                    variable: Some("x".to_owned()),
                    description: String::new(),
                },
                outcome.elements[0].position,
            )]
        );
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, ErrorCode::E0001);
        assert_eq!(outcome.diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn garbage_never_loses_the_text() {
        let outcome = parse_doc("?? !! ~~");
        assert_eq!(
            outcome.elements,
            vec![phpdoc_ir::ParseElement::new(
                DocElement::Text {
                    text: "?? !! ~~".to_owned()
                },
                outcome.elements[0].position,
            )]
        );
    }

    proptest! {
        #[test]
        fn parse_terminates_on_arbitrary_input(text in ".{0,200}") {
            // Must neither panic nor spin, whatever the input.
            let _ = parse_doc(&text);
        }

        #[test]
        fn plain_words_round_trip(words in "[a-z]{1,8}( [a-z]{1,8}){0,5}") {
            let outcome = parse_doc(&words);
            prop_assert_eq!(outcome.elements.len(), 1);
            match &outcome.elements[0].element {
                DocElement::Text { text } => prop_assert_eq!(text, &words),
                other => prop_assert!(false, "expected text, got {:?}", other),
            }
        }
    }
}
