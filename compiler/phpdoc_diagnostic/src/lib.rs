//! Diagnostic system for the PHPDoc front-end.
//!
//! Small by design: a stable error-code enum, a severity, and one
//! [`Diagnostic`] struct shared by the scanner and the parser. Rendering
//! is left to callers; [`Diagnostic`] implements `Display` for plain
//! one-line output.

mod diagnostic;
mod error_code;

pub use diagnostic::{unexpected_token, unterminated_comment, Diagnostic, Severity};
pub use error_code::ErrorCode;
