//! Encoding [`Value`]s into wire arguments.
//!
//! Encoding is driven by the value rather than the declared signature:
//! scalars are always written at their own type, and the declared signature
//! only shapes containers. A declared variant boxes the value at its
//! natural signature, and a `*` wildcard anywhere in the declared signature
//! is replaced by the signature of whatever is encoded there. For a
//! dictionary with a wildcard key, the first encoded key decides the key
//! type of the whole dictionary.

use crate::arg::WireArg;
use crate::error::{Error, Result};
use crate::policy::{CodecPolicy, DefaultCodecPolicy};
use crate::primitives::WILDCARD;
use crate::signature::{dictionary_key_value, expect_single_type, struct_fields};
use crate::value::Value;

use log::{trace, warn};

/// Encodes `value` for a slot declared as `declared_sig` using the default
/// policy.
pub fn encode(value: &Value, declared_sig: &str) -> Result<WireArg> {
    encode_with_policy(value, declared_sig, DefaultCodecPolicy)
}

pub fn encode_with_policy(
    value: &Value,
    declared_sig: &str,
    policy: impl CodecPolicy,
) -> Result<WireArg> {
    let encoder = Encoder { policy };
    expect_single_type(declared_sig)
        .and_then(|()| encoder.encode(value, declared_sig, 0))
        .map_err(|err| {
            warn!("encoding {} as {:?} failed: {}", value.kind_name(), declared_sig, err);
            err
        })
}

fn value_mismatch(sig: &str, value: &Value) -> Error {
    Error::ValueMismatch {
        expected: sig.to_owned(),
        found: value.kind_name(),
    }
}

/// Fills in wildcards of a container slot that never saw a value.
fn resolve_unused_wildcards(sig: &str, fallback: &str) -> String {
    sig.replace("{*", "{s").replace('*', fallback)
}

/// Settles the common signature of the encoded elements of one container
/// slot. A wildcard slot whose elements came out with different types is
/// turned into a slot of variants.
fn settle_slot(declared: &str, encoded: Vec<WireArg>) -> (String, Vec<WireArg>) {
    let first = match encoded.first() {
        Some(first) => first.signature(),
        None => return (resolve_unused_wildcards(declared, "v"), encoded),
    };
    let wildcard = declared.bytes().any(|c| c == WILDCARD);
    if wildcard && encoded.iter().skip(1).any(|element| element.signature() != first) {
        trace!("heterogeneous {:?} slot boxed into variants", declared);
        let boxed = encoded.into_iter().map(WireArg::variant).collect();
        return ("v".to_owned(), boxed);
    }
    (first, encoded)
}

struct Encoder<P: CodecPolicy> {
    policy: P,
}

impl<P: CodecPolicy> Encoder<P> {
    fn encode(&self, value: &Value, sig: &str, depth: usize) -> Result<WireArg> {
        trace!("encode {} as {:?} at depth {}", value.kind_name(), sig, depth);
        match sig.as_bytes().first().copied() {
            None => Err(Error::EmptySignature),
            Some(b'v') => self.encode_variant(value, depth),
            Some(WILDCARD) => self.encode(value, &value.natural_signature(), depth),
            Some(_) => match value {
                Value::Bool(v) => Ok(WireArg::Bool(*v)),
                Value::Byte(v) => Ok(WireArg::Byte(*v)),
                Value::Int16(v) => Ok(WireArg::Int16(*v)),
                Value::Uint16(v) => Ok(WireArg::Uint16(*v)),
                Value::Int32(v) => Ok(WireArg::Int32(*v)),
                Value::Uint32(v) => Ok(WireArg::Uint32(*v)),
                Value::Int64(v) => Ok(WireArg::Int64(*v)),
                Value::Uint64(v) => Ok(WireArg::Uint64(*v)),
                Value::Double(v) => Ok(WireArg::Double(*v)),
                Value::Str(v) => Ok(WireArg::Str(v.clone())),
                Value::ObjectPath(v) => Ok(WireArg::ObjectPath(v.clone())),
                Value::Signature(v) => Ok(WireArg::Signature(v.clone())),
                Value::Struct { fields, .. } => self.encode_struct(value, fields, sig, depth),
                Value::Array(elements) => self.encode_array(value, elements, sig, depth),
                Value::Dict(pairs) => self.encode_dict(value, pairs, sig, depth),
                // A concrete slot holds the content, not the variant box.
                Value::Variant { value: inner, .. } => self.encode(inner, sig, depth),
            },
        }
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        let max = self.policy.max_depth();
        if depth >= max {
            return Err(Error::DepthExceeded(max));
        }
        Ok(depth + 1)
    }

    fn encode_variant(&self, value: &Value, depth: usize) -> Result<WireArg> {
        let depth = self.enter(depth)?;
        let inner = match value {
            Value::Variant {
                value: inner,
                signature,
            } => {
                expect_single_type(signature)?;
                self.encode(inner, signature, depth)?
            }
            other => self.encode(other, &other.natural_signature(), depth)?,
        };
        Ok(WireArg::variant(inner))
    }

    fn encode_struct(
        &self,
        value: &Value,
        fields: &[Value],
        sig: &str,
        depth: usize,
    ) -> Result<WireArg> {
        if !sig.starts_with('(') {
            return Err(value_mismatch(sig, value));
        }
        let field_sigs = struct_fields(sig)?;
        if fields.len() != field_sigs.len() {
            return Err(Error::MemberCountMismatch {
                signature: sig.to_owned(),
                expected: field_sigs.len(),
                found: fields.len(),
            });
        }

        let depth = self.enter(depth)?;
        let members = fields
            .iter()
            .zip(field_sigs)
            .map(|(field, field_sig)| self.encode(field, field_sig, depth))
            .collect::<Result<Vec<_>>>()?;
        Ok(WireArg::Struct(members))
    }

    fn encode_array(
        &self,
        value: &Value,
        elements: &[Value],
        sig: &str,
        depth: usize,
    ) -> Result<WireArg> {
        if !sig.starts_with('a') || sig.starts_with("a{") {
            return Err(value_mismatch(sig, value));
        }
        let element_sig = &sig[1..];

        let depth = self.enter(depth)?;
        let encoded = elements
            .iter()
            .map(|element| self.encode(element, element_sig, depth))
            .collect::<Result<Vec<_>>>()?;
        let (element_signature, encoded) = settle_slot(element_sig, encoded);
        WireArg::array(element_signature, encoded)
    }

    fn encode_dict(
        &self,
        value: &Value,
        pairs: &[(Value, Value)],
        sig: &str,
        depth: usize,
    ) -> Result<WireArg> {
        if !sig.starts_with("a{") {
            return Err(value_mismatch(sig, value));
        }
        let (declared_key_sig, value_sig) = dictionary_key_value(sig)?;

        let depth = self.enter(depth)?;
        let mut key_sig = declared_key_sig.to_owned();
        let mut keys = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key = self.encode(key, &key_sig, depth)?;
            // The first key settles a wildcard key type for the remaining
            // entries. Keys are assumed to share one type.
            if keys.is_empty() && declared_key_sig.bytes().any(|c| c == WILDCARD) {
                key_sig = key.signature();
            }
            keys.push(key);
            values.push(self.encode(value, value_sig, depth)?);
        }

        if keys.is_empty() {
            key_sig = resolve_unused_wildcards(declared_key_sig, "s");
        }
        let (value_sig, values) = settle_slot(value_sig, values);
        let entries = keys
            .into_iter()
            .zip(values)
            .map(|(key, value)| WireArg::dict_entry(key, value))
            .collect();
        WireArg::array(format!("{{{}{}}}", key_sig, value_sig), entries)
    }
}
