//! Semantic actions for the doc grammar.
//!
//! Values flow bottom-up as [`Val`]s; completed elements are emitted
//! eagerly into the reducer's output vector, so everything reduced
//! before an aborted parse is still available. Marker reductions turn
//! token fusing off, head reductions turn it back on.

use crate::driver::{ParserControls, SemanticActions};
use crate::grammar::prod;
use crate::table::TerminalId;
use phpdoc_ir::{DocElement, ParseElement, SemanticValue, SourcePosition, TypeRef, Visibility};

/// Partially built tag, between its head reduction and the trailing
/// description.
pub(crate) enum Head {
    Param {
        types: Vec<TypeRef>,
        variable: Option<String>,
    },
    Var {
        types: Vec<TypeRef>,
        variable: Option<String>,
    },
    Returns {
        types: Vec<TypeRef>,
    },
    Throws {
        types: Vec<TypeRef>,
    },
    Access {
        visibility: Visibility,
    },
    Generic {
        name: String,
    },
}

/// One semantic value on the parse stack. Crate-visible because it is
/// the associated `Value` type of the `SemanticActions` impl; the
/// module itself stays private.
pub(crate) enum Val {
    None,
    Text(String),
    Types(Vec<TypeRef>),
    TypeName(String),
    Dims(u8),
    Var(Option<String>),
    Visibility(Visibility),
    Head(Head),
}

fn take_text(val: Val) -> String {
    match val {
        Val::Text(text) => text,
        _ => String::new(),
    }
}

fn take_types(val: Val) -> Vec<TypeRef> {
    match val {
        Val::Types(types) => types,
        _ => Vec::new(),
    }
}

/// Builds the flat element list while the driver runs.
#[derive(Default)]
pub(crate) struct Reducer {
    elements: Vec<ParseElement>,
}

impl Reducer {
    pub(crate) fn into_elements(self) -> Vec<ParseElement> {
        self.elements
    }

    fn emit(&mut self, element: DocElement, position: SourcePosition) {
        self.elements.push(ParseElement::new(element, position));
    }

    fn emit_tag(&mut self, head: Val, desc: Val, position: SourcePosition) {
        let description = take_text(desc).trim().to_owned();
        let Val::Head(head) = head else { return };
        let element = match head {
            Head::Param { types, variable } => DocElement::Param {
                types,
                variable,
                description,
            },
            Head::Var { types, variable } => DocElement::Var {
                types,
                variable,
                description,
            },
            Head::Returns { types } => DocElement::Returns { types, description },
            Head::Throws { types } => DocElement::Throws { types, description },
            Head::Access { visibility } => DocElement::Access {
                visibility,
                description,
            },
            Head::Generic { name } => DocElement::Tag {
                name,
                text: description,
            },
        };
        self.emit(element, position);
    }
}

impl SemanticActions for Reducer {
    type Value = Val;

    fn shift(&mut self, _terminal: TerminalId, value: SemanticValue, _: SourcePosition) -> Val {
        match value {
            SemanticValue::Str(text) => Val::Text(text),
            SemanticValue::None => Val::None,
        }
    }

    fn reduce(
        &mut self,
        production: usize,
        children: Vec<Val>,
        position: SourcePosition,
        controls: &mut ParserControls,
    ) -> Val {
        let mut children = children.into_iter();
        let mut next = || children.next().unwrap_or(Val::None);

        match production {
            prod::ELEMENT_COMPOUND => {
                let text = take_text(next());
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    self.emit(
                        DocElement::Text {
                            text: trimmed.to_owned(),
                        },
                        position,
                    );
                }
                Val::None
            }
            prod::ELEMENT_PARAM
            | prod::ELEMENT_VAR
            | prod::ELEMENT_RETURN
            | prod::ELEMENT_THROWS
            | prod::ELEMENT_ACCESS
            | prod::ELEMENT_GENERIC => {
                let head = next();
                let desc = next();
                self.emit_tag(head, desc, position);
                Val::None
            }
            prod::ELEMENT_ERROR => {
                // Recovery may have fired while fusing was off.
                controls.compound_tokens = true;
                Val::None
            }
            prod::PARAM_MARK
            | prod::VAR_MARK
            | prod::RETURN_MARK
            | prod::THROWS_MARK
            | prod::ACCESS_MARK => {
                // The structured part of the tag is read token by token.
                controls.compound_tokens = false;
                Val::None
            }
            prod::PARAM_HEAD | prod::VAR_HEAD => {
                let _mark = next();
                let types = take_types(next());
                let variable = match next() {
                    Val::Var(variable) => variable,
                    _ => None,
                };
                controls.compound_tokens = true;
                Val::Head(if production == prod::PARAM_HEAD {
                    Head::Param { types, variable }
                } else {
                    Head::Var { types, variable }
                })
            }
            prod::RETURN_HEAD | prod::THROWS_HEAD => {
                let _mark = next();
                let types = take_types(next());
                controls.compound_tokens = true;
                Val::Head(if production == prod::RETURN_HEAD {
                    Head::Returns { types }
                } else {
                    Head::Throws { types }
                })
            }
            prod::ACCESS_HEAD => {
                let _mark = next();
                let visibility = match next() {
                    Val::Visibility(visibility) => visibility,
                    _ => Visibility::Public,
                };
                controls.compound_tokens = true;
                Val::Head(Head::Access { visibility })
            }
            prod::ACCESS_PUBLIC => Val::Visibility(Visibility::Public),
            prod::ACCESS_PRIVATE => Val::Visibility(Visibility::Private),
            prod::ACCESS_PROTECTED => Val::Visibility(Visibility::Protected),
            prod::GENERIC_MARK => {
                // Fusing stays on: an unrecognized tag has no
                // structured part, only free text.
                Val::Head(Head::Generic {
                    name: take_text(next()),
                })
            }
            prod::OPT_VAR_SOME => {
                let _dollar = next();
                Val::Var(Some(take_text(next())))
            }
            prod::OPT_VAR_NONE => Val::Var(None),
            prod::TYPE_REF | prod::TYPE_UNION_ONE => next(),
            prod::TYPE_UNION_MORE => {
                let mut types = take_types(next());
                let _bar = next();
                types.extend(take_types(next()));
                Val::Types(types)
            }
            prod::TYPE_ATOM => {
                let name = match next() {
                    Val::TypeName(name) => name,
                    _ => String::new(),
                };
                let dims = match next() {
                    Val::Dims(dims) => dims,
                    _ => 0,
                };
                Val::Types(vec![TypeRef::array_of(name, dims)])
            }
            prod::TYPE_NAME_IDENT | prod::TYPE_NAME_ARRAY => Val::TypeName(take_text(next())),
            prod::DIMS_MORE => {
                let dims = match next() {
                    Val::Dims(dims) => dims,
                    _ => 0,
                };
                Val::Dims(dims.saturating_add(1))
            }
            prod::DIMS_NONE => Val::Dims(0),
            prod::DESC_MORE => {
                let mut text = take_text(next());
                text.push_str(&take_text(next()));
                Val::Text(text)
            }
            prod::DESC_EMPTY => Val::Text(String::new()),
            prod::DESC_ITEM_FIRST..=prod::DESC_ITEM_LAST => next(),
            // Start, doc, elements: nothing to compute.
            _ => Val::None,
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

    fn reduce_val(reducer: &mut Reducer, production: usize, children: Vec<Val>) -> Val {
        let mut controls = ParserControls {
            compound_tokens: true,
        };
        reducer.reduce(production, children, SourcePosition::INVALID, &mut controls)
    }

    #[test]
    fn union_accumulates_types() {
        let mut reducer = Reducer::default();
        let atom = |name: &str, dims| Val::Types(vec![TypeRef::array_of(name, dims)]);
        let one = reduce_val(&mut reducer, prod::TYPE_UNION_ONE, vec![atom("int", 0)]);
        let two = reduce_val(
            &mut reducer,
            prod::TYPE_UNION_MORE,
            vec![one, Val::Text("|".to_owned()), atom("string", 1)],
        );
        assert_eq!(
            take_types(two),
            vec![TypeRef::new("int"), TypeRef::array_of("string", 1)]
        );
    }

    #[test]
    fn dims_count_bracket_pairs() {
        let mut reducer = Reducer::default();
        let zero = reduce_val(&mut reducer, prod::DIMS_NONE, vec![]);
        let one = reduce_val(
            &mut reducer,
            prod::DIMS_MORE,
            vec![zero, Val::Text("[".to_owned()), Val::Text("]".to_owned())],
        );
        let Val::Dims(dims) = one else {
            panic!("expected a dims value");
        };
        assert_eq!(dims, 1);
    }

    #[test]
    fn marker_turns_fusing_off_and_head_back_on() {
        let mut reducer = Reducer::default();
        let mut controls = ParserControls {
            compound_tokens: true,
        };
        reducer.reduce(
            prod::PARAM_MARK,
            vec![Val::None],
            SourcePosition::INVALID,
            &mut controls,
        );
        assert!(!controls.compound_tokens);
        reducer.reduce(
            prod::PARAM_HEAD,
            vec![Val::None, Val::Types(Vec::new()), Val::Var(None)],
            SourcePosition::INVALID,
            &mut controls,
        );
        assert!(controls.compound_tokens);
    }

    #[test]
    fn blank_text_runs_are_dropped() {
        let mut reducer = Reducer::default();
        reduce_val(
            &mut reducer,
            prod::ELEMENT_COMPOUND,
            vec![Val::Text("  \n ".to_owned())],
        );
        assert!(reducer.into_elements().is_empty());
    }

    #[test]
    fn tag_description_is_trimmed() {
        let mut reducer = Reducer::default();
        let head = Val::Head(Head::Returns {
            types: vec![TypeRef::new("bool")],
        });
        reduce_val(
            &mut reducer,
            prod::ELEMENT_RETURN,
            vec![head, Val::Text("  true on success \n".to_owned())],
        );
        let elements = reducer.into_elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(
            elements[0].element,
            DocElement::Returns {
                types: vec![TypeRef::new("bool")],
                description: "true on success".to_owned(),
            }
        );
    }
}
