use serde::{Deserialize, Serialize};

use std::mem::size_of;

/// Marks a position in a declared signature whose concrete type is taken
/// from the value being encoded.
pub const WILDCARD: u8 = b'*';

/// The single-character type codes of the signature grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Bool,
    Byte,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Double,
    Str,
    ObjectPath,
    SignatureStr,
    Variant,
}

impl Primitive {
    pub fn from_code(code: u8) -> Option<Primitive> {
        match code {
            b'b' => Some(Primitive::Bool),
            b'y' => Some(Primitive::Byte),
            b'n' => Some(Primitive::Int16),
            b'q' => Some(Primitive::Uint16),
            b'i' => Some(Primitive::Int32),
            b'u' => Some(Primitive::Uint32),
            b'x' => Some(Primitive::Int64),
            b't' => Some(Primitive::Uint64),
            b'd' => Some(Primitive::Double),
            b's' => Some(Primitive::Str),
            b'o' => Some(Primitive::ObjectPath),
            b'g' => Some(Primitive::SignatureStr),
            b'v' => Some(Primitive::Variant),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Primitive::Bool => b'b',
            Primitive::Byte => b'y',
            Primitive::Int16 => b'n',
            Primitive::Uint16 => b'q',
            Primitive::Int32 => b'i',
            Primitive::Uint32 => b'u',
            Primitive::Int64 => b'x',
            Primitive::Uint64 => b't',
            Primitive::Double => b'd',
            Primitive::Str => b's',
            Primitive::ObjectPath => b'o',
            Primitive::SignatureStr => b'g',
            Primitive::Variant => b'v',
        }
    }

    /// Alignment of the type in a marshaled message body.
    pub fn alignment(self) -> usize {
        match self {
            Primitive::Byte | Primitive::SignatureStr | Primitive::Variant => 1,
            Primitive::Int16 | Primitive::Uint16 => 2,
            Primitive::Bool
            | Primitive::Int32
            | Primitive::Uint32
            | Primitive::Str
            | Primitive::ObjectPath => 4,
            Primitive::Int64 | Primitive::Uint64 | Primitive::Double => 8,
        }
    }

}

/// Alignment of the complete type starting with `code`.
pub(crate) fn code_alignment(code: u8) -> Option<usize> {
    match code {
        b'a' => Some(4),
        b'(' | b'{' => Some(8),
        _ => Primitive::from_code(code).map(Primitive::alignment),
    }
}

pub(crate) trait DbusPrimitive {
    fn signature() -> u8;
    fn alignment() -> usize;
    fn size(&self) -> usize;
    fn serialize(&self, out: &mut [u8]);
}

macro_rules! basic_primitive {
    ($type:ident, $sig:expr) => {
        impl DbusPrimitive for $type {
            fn signature() -> u8 {
                $sig as u8
            }

            fn size(&self) -> usize {
                size_of::<$type>()
            }

            fn serialize(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn alignment() -> usize {
                size_of::<$type>()
            }
        }
    };
}

basic_primitive!(u8, 'y');
basic_primitive!(f64, 'd');
basic_primitive!(i16, 'n');
basic_primitive!(u16, 'q');
basic_primitive!(i32, 'i');
basic_primitive!(u32, 'u');
basic_primitive!(i64, 'x');
basic_primitive!(u64, 't');

impl DbusPrimitive for bool {
    fn signature() -> u8 {
        b'b'
    }

    fn size(&self) -> usize {
        4
    }

    fn serialize(&self, out: &mut [u8]) {
        out.copy_from_slice(&(*self as u32).to_le_bytes());
    }

    fn alignment() -> usize {
        4
    }
}

impl DbusPrimitive for &str {
    fn signature() -> u8 {
        b's'
    }

    fn size(&self) -> usize {
        self.as_bytes().len() + 5 // size and terminating null
    }

    fn serialize(&self, out: &mut [u8]) {
        let bytes = self.as_bytes();
        out[0..4].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
        out[4..4 + bytes.len()].copy_from_slice(bytes);
        out[4 + bytes.len()] = 0u8;
    }

    fn alignment() -> usize {
        4
    }
}

/// Borrowed signature text, marshaled with a one-byte length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SignatureRef<'a>(pub &'a str);

impl DbusPrimitive for SignatureRef<'_> {
    fn signature() -> u8 {
        b'g'
    }

    fn size(&self) -> usize {
        self.0.as_bytes().len() + 2 // size and terminating null
    }

    fn serialize(&self, out: &mut [u8]) {
        let bytes = self.0.as_bytes();
        out[0] = bytes.len() as u8;
        out[1..1 + bytes.len()].copy_from_slice(bytes);
        out[1 + bytes.len()] = 0u8;
    }

    fn alignment() -> usize {
        1
    }
}

/// Borrowed object path, marshaled like a string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ObjectPathRef<'a>(pub &'a str);

impl DbusPrimitive for ObjectPathRef<'_> {
    fn signature() -> u8 {
        b'o'
    }

    fn size(&self) -> usize {
        self.0.size()
    }

    fn serialize(&self, out: &mut [u8]) {
        DbusPrimitive::serialize(&self.0, out)
    }

    fn alignment() -> usize {
        4
    }
}
