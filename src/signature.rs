//! The signature grammar and its type trees.
//!
//! [`parse`] turns a signature such as `a{sv}` into a [`TypeNode`] and
//! [`emit`] turns it back. Parsing never fails outright: anything that does
//! not describe exactly one complete type comes back as a node of kind
//! [`TypeKind::Invalid`] carrying the offending text.

use crate::error::{Error, Result};
use crate::policy::DBUS_MAX_DEPTH;
use crate::primitives::Primitive;

use serde::{Deserialize, Serialize};

pub mod tokenizer;

pub use tokenizer::{
    dictionary_key_value, expect_single_type, next_complete_type, struct_fields, tokenize_all,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Invalid,
    Primitive(Primitive),
    /// `a` followed by a single primitive code, e.g. `ai` or `as`.
    PrimitiveArray(Primitive),
    /// An array of arrays or of dictionaries, e.g. `aai` or `aa{sv}`.
    Array(Box<TypeNode>),
    Struct(Vec<TypeNode>),
    StructArray(Vec<TypeNode>),
    Dictionary(Box<TypeNode>, Box<TypeNode>),
}

/// A parsed signature.
///
/// The text the node was parsed from is kept next to its kind; use it in
/// preference to [`emit`] when the exact original spelling matters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub signature: String,
}

impl TypeNode {
    pub fn is_valid(&self) -> bool {
        self.kind != TypeKind::Invalid
    }
}

/// A method or signal argument: its type and, where introspection data
/// supplied one, its name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: Option<String>,
    pub ty: TypeNode,
}

/// Containers nested deeper than [`DBUS_MAX_DEPTH`] make the whole
/// signature invalid.
pub fn parse(sig: &str) -> TypeNode {
    parse_nested(sig, 0)
}

fn parse_nested(sig: &str, depth: usize) -> TypeNode {
    TypeNode {
        kind: parse_kind(sig, depth).unwrap_or(TypeKind::Invalid),
        signature: sig.to_owned(),
    }
}

fn parse_kind(sig: &str, depth: usize) -> Option<TypeKind> {
    match sig.as_bytes() {
        [code] => Primitive::from_code(*code).map(TypeKind::Primitive),
        [b'a', code] => Primitive::from_code(*code).map(TypeKind::PrimitiveArray),
        [b'a', b'{', ..] => {
            let depth = enter(depth)?;
            let (key, value) = dictionary_key_value(sig).ok()?;
            let key = valid(parse_nested(key, depth))?;
            let value = valid(parse_nested(value, depth))?;
            Some(TypeKind::Dictionary(Box::new(key), Box::new(value)))
        }
        [b'a', b'(', ..] => parse_fields(&sig[1..], enter(depth)?).map(TypeKind::StructArray),
        [b'a', b'a', ..] => {
            let element = valid(parse_nested(&sig[1..], enter(depth)?))?;
            Some(TypeKind::Array(Box::new(element)))
        }
        [b'(', ..] => parse_fields(sig, enter(depth)?).map(TypeKind::Struct),
        _ => None,
    }
}

fn enter(depth: usize) -> Option<usize> {
    if depth < DBUS_MAX_DEPTH {
        Some(depth + 1)
    } else {
        None
    }
}

fn parse_fields(sig: &str, depth: usize) -> Option<Vec<TypeNode>> {
    struct_fields(sig)
        .ok()?
        .into_iter()
        .map(|field| valid(parse_nested(field, depth)))
        .collect()
}

fn valid(node: TypeNode) -> Option<TypeNode> {
    if node.is_valid() {
        Some(node)
    } else {
        None
    }
}

/// Parses every complete type of a multi-type signature, such as the
/// argument list of a method. Fails if any of them is invalid.
pub fn parse_sequence(sig: &str) -> Result<Vec<TypeNode>> {
    tokenize_all(sig)?
        .into_iter()
        .map(|token| {
            let node = parse(token);
            if node.is_valid() {
                Ok(node)
            } else {
                Err(Error::InvalidSignature(token.to_owned()))
            }
        })
        .collect()
}

/// Pairs the types of `sig` with `names`. Types without a name get `None`;
/// surplus names are dropped.
pub fn parameter_info<S: AsRef<str>>(sig: &str, names: &[S]) -> Result<Vec<ParameterInfo>> {
    let mut names = names.iter();
    Ok(parse_sequence(sig)?
        .into_iter()
        .map(|ty| ParameterInfo {
            name: names.next().map(|name| name.as_ref().to_owned()),
            ty,
        })
        .collect())
}

pub fn emit(node: &TypeNode) -> String {
    let mut out = String::with_capacity(node.signature.len());
    emit_into(node, &mut out);
    out
}

fn emit_into(node: &TypeNode, out: &mut String) {
    match &node.kind {
        TypeKind::Invalid => out.push_str(&node.signature),
        TypeKind::Primitive(primitive) => out.push(primitive.code() as char),
        TypeKind::PrimitiveArray(primitive) => {
            out.push('a');
            out.push(primitive.code() as char);
        }
        TypeKind::Array(element) => {
            out.push('a');
            emit_into(element, out);
        }
        TypeKind::Struct(fields) => emit_struct(fields, out),
        TypeKind::StructArray(fields) => {
            out.push('a');
            emit_struct(fields, out);
        }
        TypeKind::Dictionary(key, value) => {
            out.push_str("a{");
            emit_into(key, out);
            emit_into(value, out);
            out.push('}');
        }
    }
}

fn emit_struct(fields: &[TypeNode], out: &mut String) {
    out.push('(');
    for field in fields {
        emit_into(field, out);
    }
    out.push(')');
}
