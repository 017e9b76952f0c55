//! Keyword and tag resolution.
//!
//! The raw layer surfaces every word as `Identifier` and every `@name`
//! as a generic `Tag`; the scanner resolves the handful the grammar
//! treats specially. Lookups are case-sensitive, matching PHP's
//! conventional lowercase spelling in doc comments.

use phpdoc_ir::DocTokenKind;

/// Resolve an identifier that the type grammar treats as a keyword.
///
/// Returns `None` for ordinary identifiers.
#[inline]
pub(crate) fn ident_keyword(text: &str) -> Option<DocTokenKind> {
    match text {
        "array" => Some(DocTokenKind::Array),
        "public" => Some(DocTokenKind::Public),
        "private" => Some(DocTokenKind::Private),
        "protected" => Some(DocTokenKind::Protected),
        _ => None,
    }
}

/// Resolve a recognized tag (including its `@`).
///
/// Returns `None` for tags the grammar keeps generic.
#[inline]
pub(crate) fn tag_keyword(text: &str) -> Option<DocTokenKind> {
    match text {
        "@param" => Some(DocTokenKind::TagParam),
        "@var" => Some(DocTokenKind::TagVar),
        "@return" | "@returns" => Some(DocTokenKind::TagReturn),
        "@throws" => Some(DocTokenKind::TagThrows),
        "@access" => Some(DocTokenKind::TagAccess),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_keywords() {
        assert_eq!(ident_keyword("array"), Some(DocTokenKind::Array));
        assert_eq!(ident_keyword("public"), Some(DocTokenKind::Public));
        assert_eq!(ident_keyword("private"), Some(DocTokenKind::Private));
        assert_eq!(ident_keyword("protected"), Some(DocTokenKind::Protected));
    }

    #[test]
    fn ordinary_identifiers() {
        assert_eq!(ident_keyword("int"), None);
        assert_eq!(ident_keyword("Array"), None);
        assert_eq!(ident_keyword(""), None);
    }

    #[test]
    fn recognized_tags() {
        assert_eq!(tag_keyword("@param"), Some(DocTokenKind::TagParam));
        assert_eq!(tag_keyword("@var"), Some(DocTokenKind::TagVar));
        assert_eq!(tag_keyword("@return"), Some(DocTokenKind::TagReturn));
        assert_eq!(tag_keyword("@returns"), Some(DocTokenKind::TagReturn));
        assert_eq!(tag_keyword("@throws"), Some(DocTokenKind::TagThrows));
        assert_eq!(tag_keyword("@access"), Some(DocTokenKind::TagAccess));
    }

    #[test]
    fn generic_tags_stay_generic() {
        assert_eq!(tag_keyword("@see"), None);
        assert_eq!(tag_keyword("@since"), None);
        assert_eq!(tag_keyword("@Param"), None);
    }
}
