//! Wire arguments: the transport-side representation of a message
//! argument.
//!
//! A [`WireArg`] is what a bus connection hands out for each argument of a
//! received message and what it expects for each argument of an outgoing
//! one. Unlike [`Value`](crate::value::Value) it is shaped exactly like the
//! wire: every array knows its element signature and every variant knows
//! the signature of its content.

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WireArg {
    Bool(bool),
    Byte(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    Str(String),
    ObjectPath(String),
    Signature(String),
    Variant {
        signature: String,
        value: Box<WireArg>,
    },
    Struct(Vec<WireArg>),
    Array {
        element_signature: String,
        elements: Vec<WireArg>,
    },
    DictEntry(Box<WireArg>, Box<WireArg>),
}

impl WireArg {
    /// Wraps `value` in a variant carrying its signature.
    pub fn variant(value: WireArg) -> WireArg {
        WireArg::Variant {
            signature: value.signature(),
            value: Box::new(value),
        }
    }

    /// Builds an array, checking that every element has `element_signature`.
    pub fn array(element_signature: impl Into<String>, elements: Vec<WireArg>) -> Result<WireArg> {
        let element_signature = element_signature.into();
        for element in &elements {
            let sig = element.signature();
            if sig != element_signature {
                return Err(Error::MismatchSignature(element_signature, sig));
            }
        }
        Ok(WireArg::Array {
            element_signature,
            elements,
        })
    }

    pub fn dict_entry(key: WireArg, value: WireArg) -> WireArg {
        WireArg::DictEntry(Box::new(key), Box::new(value))
    }

    /// The complete signature of this argument.
    pub fn signature(&self) -> String {
        let mut sig = String::new();
        self.push_signature(&mut sig);
        sig
    }

    fn push_signature(&self, sig: &mut String) {
        match self {
            WireArg::Struct(members) => {
                sig.push('(');
                for member in members {
                    member.push_signature(sig);
                }
                sig.push(')');
            }
            WireArg::Array {
                element_signature, ..
            } => {
                sig.push('a');
                sig.push_str(element_signature);
            }
            WireArg::DictEntry(key, value) => {
                sig.push('{');
                key.push_signature(sig);
                value.push_signature(sig);
                sig.push('}');
            }
            other => sig.push(other.type_code() as char),
        }
    }

    /// The leading signature character of this argument.
    pub fn type_code(&self) -> u8 {
        match self {
            WireArg::Bool(_) => b'b',
            WireArg::Byte(_) => b'y',
            WireArg::Int16(_) => b'n',
            WireArg::Uint16(_) => b'q',
            WireArg::Int32(_) => b'i',
            WireArg::Uint32(_) => b'u',
            WireArg::Int64(_) => b'x',
            WireArg::Uint64(_) => b't',
            WireArg::Double(_) => b'd',
            WireArg::Str(_) => b's',
            WireArg::ObjectPath(_) => b'o',
            WireArg::Signature(_) => b'g',
            WireArg::Variant { .. } => b'v',
            WireArg::Struct(_) => b'(',
            WireArg::Array { .. } => b'a',
            WireArg::DictEntry(..) => b'{',
        }
    }

    /// Number of members of a struct, elements of an array, or 2 for a
    /// dictionary entry. `None` for scalars and variants.
    pub fn element_count(&self) -> Option<usize> {
        match self {
            WireArg::Struct(members) => Some(members.len()),
            WireArg::Array { elements, .. } => Some(elements.len()),
            WireArg::DictEntry(..) => Some(2),
            _ => None,
        }
    }

    pub fn element(&self, index: usize) -> Option<&WireArg> {
        match self {
            WireArg::Struct(members) => members.get(index),
            WireArg::Array { elements, .. } => elements.get(index),
            WireArg::DictEntry(key, value) => match index {
                0 => Some(&**key),
                1 => Some(&**value),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn variant_signature(&self) -> Option<&str> {
        match self {
            WireArg::Variant { signature, .. } => Some(signature.as_str()),
            _ => None,
        }
    }

    pub fn variant_value(&self) -> Option<&WireArg> {
        match self {
            WireArg::Variant { value, .. } => Some(&**value),
            _ => None,
        }
    }

    /// Replaces the signature carried by a variant. Returns `false` and
    /// leaves `self` alone if it is not a variant.
    pub fn set_variant_signature(&mut self, sig: impl Into<String>) -> bool {
        match self {
            WireArg::Variant { signature, .. } => {
                *signature = sig.into();
                true
            }
            _ => false,
        }
    }
}
