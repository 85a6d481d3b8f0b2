//! Decoding wire arguments into [`Value`]s.
//!
//! Decoding is driven by the signature: each level of the signature picks
//! how the corresponding wire argument is read, and any disagreement
//! between the two aborts the whole decode with the first error found.

use crate::arg::WireArg;
use crate::error::{Error, Result};
use crate::policy::{CodecPolicy, DefaultCodecPolicy};
use crate::primitives::{Primitive, WILDCARD};
use crate::signature::{dictionary_key_value, expect_single_type, struct_fields};
use crate::value::Value;

use log::{trace, warn};

/// Decodes `wire` as a value of type `sig` using the default policy.
pub fn decode(wire: &WireArg, sig: &str) -> Result<Value> {
    decode_with_policy(wire, sig, DefaultCodecPolicy)
}

pub fn decode_with_policy(wire: &WireArg, sig: &str, policy: impl CodecPolicy) -> Result<Value> {
    let decoder = Decoder { policy };
    expect_concrete_type(sig)
        .and_then(|()| decoder.decode(wire, sig, 0))
        .map_err(|err| {
            warn!("decoding {:?} failed: {}", sig, err);
            err
        })
}

/// Wildcards only make sense when encoding; a decoded value always has a
/// concrete type.
fn expect_concrete_type(sig: &str) -> Result<()> {
    expect_single_type(sig)?;
    if sig.bytes().any(|c| c == WILDCARD) {
        return Err(Error::UnrecognizedSignatureCharacter(WILDCARD as char));
    }
    Ok(())
}

fn mismatch(sig: &str, wire: &WireArg) -> Error {
    Error::SignatureMismatch {
        expected: sig.to_owned(),
        found: wire.signature(),
    }
}

/// Converts a scalar wire argument without looking at any signature.
fn scalar_value(wire: &WireArg) -> Option<Value> {
    let value = match wire {
        WireArg::Bool(v) => Value::Bool(*v),
        WireArg::Byte(v) => Value::Byte(*v),
        WireArg::Int16(v) => Value::Int16(*v),
        WireArg::Uint16(v) => Value::Uint16(*v),
        WireArg::Int32(v) => Value::Int32(*v),
        WireArg::Uint32(v) => Value::Uint32(*v),
        WireArg::Int64(v) => Value::Int64(*v),
        WireArg::Uint64(v) => Value::Uint64(*v),
        WireArg::Double(v) => Value::Double(*v),
        WireArg::Str(v) => Value::Str(v.clone()),
        WireArg::ObjectPath(v) => Value::ObjectPath(v.clone()),
        WireArg::Signature(v) => Value::Signature(v.clone()),
        WireArg::Variant { .. }
        | WireArg::Struct(_)
        | WireArg::Array { .. }
        | WireArg::DictEntry(..) => return None,
    };
    Some(value)
}

fn decode_scalar(wire: &WireArg, sig: &str, code: u8) -> Result<Value> {
    if wire.type_code() != code {
        return Err(mismatch(sig, wire));
    }
    scalar_value(wire).ok_or_else(|| mismatch(sig, wire))
}

struct Decoder<P: CodecPolicy> {
    policy: P,
}

impl<P: CodecPolicy> Decoder<P> {
    // `sig` is always exactly one complete type here.
    fn decode(&self, wire: &WireArg, sig: &str, depth: usize) -> Result<Value> {
        trace!("decode {:?} from {:?} at depth {}", sig, wire.type_code() as char, depth);
        let code = sig.as_bytes()[0];
        match code {
            b'(' => self.decode_struct(wire, sig, depth),
            b'a' => match sig.as_bytes()[1] {
                b'{' => self.decode_dict(wire, sig, depth),
                element if element != b'v' && Primitive::from_code(element).is_some() => {
                    self.decode_primitive_array(wire, sig, depth)
                }
                _ => self.decode_array(wire, sig, depth),
            },
            b'v' => self.decode_variant(wire, depth),
            _ if Primitive::from_code(code).is_some() => decode_scalar(wire, sig, code),
            _ => Err(Error::UnrecognizedSignatureCharacter(code as char)),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        let max = self.policy.max_depth();
        if depth >= max {
            return Err(Error::DepthExceeded(max));
        }
        Ok(depth + 1)
    }

    fn decode_struct(&self, wire: &WireArg, sig: &str, depth: usize) -> Result<Value> {
        let field_sigs = struct_fields(sig)?;

        // A struct handed over inside a variant is read through the variant.
        let wire = wire.variant_value().unwrap_or(wire);
        let members = match wire {
            WireArg::Struct(members) => members,
            other => return Err(mismatch(sig, other)),
        };
        if members.len() != field_sigs.len() {
            return Err(Error::MemberCountMismatch {
                signature: sig.to_owned(),
                expected: field_sigs.len(),
                found: members.len(),
            });
        }

        let depth = self.enter(depth)?;
        let fields = field_sigs
            .iter()
            .zip(members)
            .map(|(field_sig, member)| self.decode(member, field_sig, depth))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Struct {
            fields,
            signature: sig.to_owned(),
        })
    }

    fn decode_primitive_array(&self, wire: &WireArg, sig: &str, depth: usize) -> Result<Value> {
        let (wire_element_sig, elements) = match wire {
            WireArg::Array {
                element_signature,
                elements,
            } => (element_signature, elements),
            other => return Err(mismatch(sig, other)),
        };
        let element_sig = &sig[1..];
        if wire_element_sig != element_sig {
            return Err(mismatch(sig, wire));
        }
        self.enter(depth)?;

        // The element type is settled once for the whole array, so elements
        // are converted directly without per-element dispatch.
        let code = element_sig.as_bytes()[0];
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match scalar_value(element) {
                Some(value) if element.type_code() == code => values.push(value),
                _ => return Err(mismatch(element_sig, element)),
            }
        }
        Ok(Value::Array(values))
    }

    fn decode_array(&self, wire: &WireArg, sig: &str, depth: usize) -> Result<Value> {
        let elements = match wire {
            WireArg::Array { elements, .. } => elements,
            other => return Err(mismatch(sig, other)),
        };
        let element_sig = &sig[1..];
        let depth = self.enter(depth)?;
        let values = elements
            .iter()
            .map(|element| self.decode(element, element_sig, depth))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(values))
    }

    fn decode_dict(&self, wire: &WireArg, sig: &str, depth: usize) -> Result<Value> {
        let (key_sig, value_sig) = dictionary_key_value(sig)?;
        let entries = match wire {
            WireArg::Array { elements, .. } => elements,
            other => return Err(mismatch(sig, other)),
        };

        let depth = self.enter(depth)?;
        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            let (key, value) = match entry {
                WireArg::DictEntry(key, value) => (key, value),
                other => return Err(mismatch(&sig[1..], other)),
            };
            let key = self.decode(key, key_sig, depth)?;
            let value = self.decode(value, value_sig, depth)?;
            pairs.push((key, value));
        }
        Ok(Value::Dict(pairs))
    }

    fn decode_variant(&self, wire: &WireArg, depth: usize) -> Result<Value> {
        let (mut signature, mut inner) = match wire {
            WireArg::Variant { signature, value } => (signature.as_str(), &**value),
            other => return Err(mismatch("v", other)),
        };

        // Variants directly inside variants carry no information of their
        // own; decode the innermost one.
        while signature == "v" {
            match inner {
                WireArg::Variant {
                    signature: inner_signature,
                    value,
                } => {
                    signature = inner_signature;
                    inner = value;
                }
                other => return Err(mismatch("v", other)),
            }
        }

        expect_concrete_type(signature)?;
        let depth = self.enter(depth)?;
        let value = self.decode(inner, signature, depth)?;
        Ok(Value::Variant {
            value: Box::new(value),
            signature: signature.to_owned(),
        })
    }
}
