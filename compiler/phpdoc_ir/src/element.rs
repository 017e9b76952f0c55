//! Parsed documentation elements.
//!
//! The parser flattens a doc comment into a sequence of
//! [`ParseElement`]s. Each element is either free-form text or one
//! structured tag. No nesting: description text following a tag is
//! folded into that tag's element.

use crate::position::SourcePosition;
use std::fmt;

/// Discriminant for [`DocElement`], usable without matching the payload.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DocElementType {
    Text,
    Param,
    Var,
    Returns,
    Throws,
    Access,
    Tag,
}

impl fmt::Display for DocElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocElementType::Text => "text",
            DocElementType::Param => "param",
            DocElementType::Var => "var",
            DocElementType::Returns => "returns",
            DocElementType::Throws => "throws",
            DocElementType::Access => "access",
            DocElementType::Tag => "tag",
        };
        f.write_str(name)
    }
}

/// A single type in a `type|other|...` union.
///
/// `array_dims` counts trailing `[]` pairs, so `int[][]` is
/// `TypeRef { name: "int", array_dims: 2 }`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeRef {
    pub name: String,
    pub array_dims: u8,
}

impl TypeRef {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            array_dims: 0,
        }
    }

    #[inline]
    pub fn array_of(name: impl Into<String>, dims: u8) -> Self {
        TypeRef {
            name: name.into(),
            array_dims: dims,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Visibility named by an `@access` tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        };
        f.write_str(name)
    }
}

/// Payload of one parsed element.
///
/// `description` and `text` fields hold whitespace-trimmed text;
/// variable names are stored without the leading `$`, and generic tag
/// names without the leading `@`.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DocElement {
    /// Free-form text between tags.
    Text { text: String },
    /// `@param type $name description`
    Param {
        types: Vec<TypeRef>,
        variable: Option<String>,
        description: String,
    },
    /// `@var type $name description`
    Var {
        types: Vec<TypeRef>,
        variable: Option<String>,
        description: String,
    },
    /// `@return type description`
    Returns {
        types: Vec<TypeRef>,
        description: String,
    },
    /// `@throws type description`
    Throws {
        types: Vec<TypeRef>,
        description: String,
    },
    /// `@access public|private|protected`
    Access {
        visibility: Visibility,
        description: String,
    },
    /// Any other `@name text` tag, kept verbatim.
    Tag { name: String, text: String },
}

impl DocElement {
    /// The discriminant of this element.
    pub fn element_type(&self) -> DocElementType {
        match self {
            DocElement::Text { .. } => DocElementType::Text,
            DocElement::Param { .. } => DocElementType::Param,
            DocElement::Var { .. } => DocElementType::Var,
            DocElement::Returns { .. } => DocElementType::Returns,
            DocElement::Throws { .. } => DocElementType::Throws,
            DocElement::Access { .. } => DocElementType::Access,
            DocElement::Tag { .. } => DocElementType::Tag,
        }
    }
}

/// One entry of the flat parse output.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseElement {
    pub element_type: DocElementType,
    pub element: DocElement,
    pub position: SourcePosition,
}

impl ParseElement {
    #[inline]
    pub fn new(element: DocElement, position: SourcePosition) -> Self {
        ParseElement {
            element_type: element.element_type(),
            element,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        assert_eq!(TypeRef::new("int").to_string(), "int");
        assert_eq!(TypeRef::array_of("string", 2).to_string(), "string[][]");
    }

    #[test]
    fn test_element_type_matches_payload() {
        let element = DocElement::Param {
            types: vec![TypeRef::new("int")],
            variable: Some("id".to_owned()),
            description: String::new(),
        };
        assert_eq!(element.element_type(), DocElementType::Param);

        let wrapped = ParseElement::new(element, SourcePosition::INVALID);
        assert_eq!(wrapped.element_type, DocElementType::Param);
    }

    #[test]
    fn test_visibility_display() {
        assert_eq!(Visibility::Public.to_string(), "public");
        assert_eq!(Visibility::Protected.to_string(), "protected");
    }
}
