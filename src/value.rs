use serde::{Deserialize, Serialize};

/// A dynamically typed value exchanged with a peer.
///
/// Dictionaries are ordered sequences of pairs: decoding preserves the
/// order the peer sent and keeps duplicate keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
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
    /// Struct fields along with the signature the struct was decoded from.
    Struct {
        fields: Vec<Value>,
        signature: String,
    },
    Array(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    /// A self-describing value and its concrete signature.
    Variant {
        value: Box<Value>,
        signature: String,
    },
}

impl Value {
    pub fn structure(fields: Vec<Value>, signature: impl Into<String>) -> Value {
        Value::Struct {
            fields,
            signature: signature.into(),
        }
    }

    pub fn variant(value: Value, signature: impl Into<String>) -> Value {
        Value::Variant {
            value: Box::new(value),
            signature: signature.into(),
        }
    }

    /// The signature this value is encoded at when the declared signature
    /// leaves the choice to the value.
    ///
    /// Arrays become arrays of variants and dictionaries get a wildcard key
    /// with variant values, since their elements may differ in type. The
    /// returned signature may therefore contain the `*` wildcard.
    pub fn natural_signature(&self) -> String {
        match self {
            Value::Struct { fields, signature } => {
                if signature.is_empty() {
                    let mut sig = String::from("(");
                    for field in fields {
                        sig.push_str(&field.natural_signature());
                    }
                    sig.push(')');
                    sig
                } else {
                    signature.clone()
                }
            }
            Value::Array(_) => "av".to_owned(),
            Value::Dict(_) => "a{*v}".to_owned(),
            Value::Variant { .. } => "v".to_owned(),
            scalar => (scalar.scalar_code().unwrap_or(b'v') as char).to_string(),
        }
    }

    /// The primitive code of a scalar value, `None` for containers and
    /// variants.
    pub fn scalar_code(&self) -> Option<u8> {
        match self {
            Value::Bool(_) => Some(b'b'),
            Value::Byte(_) => Some(b'y'),
            Value::Int16(_) => Some(b'n'),
            Value::Uint16(_) => Some(b'q'),
            Value::Int32(_) => Some(b'i'),
            Value::Uint32(_) => Some(b'u'),
            Value::Int64(_) => Some(b'x'),
            Value::Uint64(_) => Some(b't'),
            Value::Double(_) => Some(b'd'),
            Value::Str(_) => Some(b's'),
            Value::ObjectPath(_) => Some(b'o'),
            Value::Signature(_) => Some(b'g'),
            Value::Struct { .. } | Value::Array(_) | Value::Dict(_) | Value::Variant { .. } => None,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Int16(_) => "int16",
            Value::Uint16(_) => "uint16",
            Value::Int32(_) => "int32",
            Value::Uint32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::Uint64(_) => "uint64",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::ObjectPath(_) => "object path",
            Value::Signature(_) => "signature",
            Value::Struct { .. } => "struct",
            Value::Array(_) => "array",
            Value::Dict(_) => "dictionary",
            Value::Variant { .. } => "variant",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Uint16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use test_log::test;

    #[test]
    fn natural_signatures() {
        assert_eq!(Value::from(3i32).natural_signature(), "i");
        assert_eq!(Value::from("x").natural_signature(), "s");
        assert_eq!(Value::ObjectPath("/".to_owned()).natural_signature(), "o");
        assert_eq!(Value::Array(vec![Value::from(1u8)]).natural_signature(), "av");
        assert_eq!(Value::Dict(Vec::new()).natural_signature(), "a{*v}");
        assert_eq!(
            Value::variant(Value::from(1u32), "u").natural_signature(),
            "v"
        );
    }

    #[test]
    fn struct_signature_prefers_origin() {
        let decoded = Value::structure(vec![Value::from(1i32), Value::from(2i32)], "(ii)");
        assert_eq!(decoded.natural_signature(), "(ii)");

        let built = Value::structure(
            vec![Value::from(1i16), Value::Array(Vec::new()), Value::from(true)],
            "",
        );
        assert_eq!(built.natural_signature(), "(navb)");
    }

    #[test]
    fn scalar_codes() {
        assert_eq!(Value::Double(0.5).scalar_code(), Some(b'd'));
        assert_eq!(Value::Signature("i".to_owned()).scalar_code(), Some(b'g'));
        assert_eq!(Value::Array(Vec::new()).scalar_code(), None);
    }
}
