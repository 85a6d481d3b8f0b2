use std;
use std::str::Utf8Error;

use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

/// The two families of failure this crate produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The signature text itself cannot be used.
    MalformedSignature,
    /// A value or wire argument does not have the shape its signature
    /// describes.
    WireFormat,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("empty signature")]
    EmptySignature,
    #[error("unterminated bracket at {0} in signature {1:?}")]
    MismatchedSignatureBracketing(usize, String),
    #[error("unrecognized signature character {0:?}")]
    UnrecognizedSignatureCharacter(char),
    #[error("invalid struct signature {0:?}")]
    InvalidStructSignature(String),
    #[error("invalid dictionary signature {0:?}")]
    InvalidDictionarySignature(String),
    #[error("invalid signature {0:?}")]
    InvalidSignature(String),

    #[error("signature {expected:?} does not match wire argument of type {found:?}")]
    SignatureMismatch { expected: String, found: String },
    #[error("value {found} cannot be encoded as {expected:?}")]
    ValueMismatch { expected: String, found: &'static str },
    #[error("struct {signature:?} has {expected} fields but {found} members were given")]
    MemberCountMismatch {
        signature: String,
        expected: usize,
        found: usize,
    },
    #[error("array element signature {1:?} does not match {0:?}")]
    MismatchSignature(String, String),
    #[error("array element overran its end: at {0}, end is {1}")]
    ArrayElementOverrun(usize, usize),
    #[error("read past end of data at {0}")]
    IndexOutOfBounds(usize),
    #[error("{0} bytes of data left over")]
    LeftoverData(usize),
    #[error("invalid boolean value {0}")]
    InvalidBoolValue(u32),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptySignature
            | Error::MismatchedSignatureBracketing(..)
            | Error::UnrecognizedSignatureCharacter(_)
            | Error::InvalidStructSignature(_)
            | Error::InvalidDictionarySignature(_)
            | Error::InvalidSignature(_) => ErrorKind::MalformedSignature,
            Error::SignatureMismatch { .. }
            | Error::ValueMismatch { .. }
            | Error::MemberCountMismatch { .. }
            | Error::MismatchSignature(..)
            | Error::ArrayElementOverrun(..)
            | Error::IndexOutOfBounds(_)
            | Error::LeftoverData(_)
            | Error::InvalidBoolValue(_)
            | Error::Utf8(_)
            | Error::DepthExceeded(_) => ErrorKind::WireFormat,
        }
    }

    pub fn is_malformed_signature(&self) -> bool {
        self.kind() == ErrorKind::MalformedSignature
    }

    pub fn is_wire_format(&self) -> bool {
        self.kind() == ErrorKind::WireFormat
    }
}
