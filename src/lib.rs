//! D-Bus type signatures and dynamically typed message arguments.
//!
//! This crate sits between a D-Bus transport and code that only learns the
//! shape of its data at runtime, such as a bridge exposing whatever objects
//! introspection turns up. It does not talk to a bus itself.
//!
//! Signatures are handled by the [`signature`] module: [`parse`] builds a
//! [`TypeNode`] tree from signature text and [`emit`] writes it back.
//! Parsed trees can be shared through a [`SignatureRegistry`].
//!
//! Values move between two representations. A [`WireArg`] is shaped
//! exactly like the wire and is what a transport produces and consumes. A
//! [`Value`] is what application code works with. [`decode`] turns the
//! former into the latter under a signature, and [`encode`] goes the other
//! way, with the value deciding the concrete type wherever the declared
//! signature leaves room for it (a variant or a `*` wildcard). The
//! [`policy`] module configures limits for both directions.
//!
//! Wire arguments can be marshaled to and from bytes with [`Message`].
//!
//! [`parse`]: crate::signature::parse()
//! [`emit`]: crate::signature::emit()
//! [`TypeNode`]: crate::signature::TypeNode
//! [`SignatureRegistry`]: crate::registry::SignatureRegistry
//! [`WireArg`]: crate::arg::WireArg
//! [`Value`]: crate::value::Value
//! [`decode`]: crate::de::decode()
//! [`encode`]: crate::ser::encode()
//! [`Message`]: crate::message::Message

mod align;
pub mod annotations;
pub mod arg;
pub mod de;
pub mod error;
pub mod message;
pub mod policy;
pub mod primitives;
pub mod registry;
pub mod ser;
pub mod signature;
pub mod value;

pub use annotations::{Annotations, EmitsChangedSignal};
pub use arg::WireArg;
pub use de::{decode, decode_with_policy};
pub use error::{Error, ErrorKind, Result};
pub use message::Message;
pub use registry::SignatureRegistry;
pub use ser::{encode, encode_with_policy};
pub use signature::{emit, parameter_info, parse, parse_sequence, ParameterInfo, TypeKind, TypeNode};
pub use value::Value;
