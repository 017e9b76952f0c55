//! Error codes for all front-end diagnostics.
//!
//! Format: E#### where the first digit indicates the phase:
//! - E0xxx: scanner errors
//! - E1xxx: parser errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Scanner errors (E0xxx)
    /// `/**` without a matching `*/`
    E0001,
    /// Invalid character in the comment
    E0002,

    // Parser errors (E1xxx)
    /// Unexpected token
    E1001,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_name() {
        assert_eq!(ErrorCode::E0001.to_string(), "E0001");
        assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    }
}
