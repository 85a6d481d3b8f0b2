//! Configuration for [`decode_with_policy`] and [`encode_with_policy`].
//!
//! [`decode_with_policy`]: crate::de::decode_with_policy()
//! [`encode_with_policy`]: crate::ser::encode_with_policy()

/// The D-Bus limit on container nesting: 32 levels of arrays plus 32
/// levels of structs.
pub const DBUS_MAX_DEPTH: usize = 64;

pub trait CodecPolicy: Clone {
    /// Deepest container nesting accepted before giving up with
    /// [`Error::DepthExceeded`](crate::error::Error::DepthExceeded).
    fn max_depth(&self) -> usize;
}

#[derive(Clone, Debug)]
pub struct DefaultCodecPolicy;

impl CodecPolicy for DefaultCodecPolicy {
    fn max_depth(&self) -> usize {
        DBUS_MAX_DEPTH
    }
}

/// A policy with an explicit depth limit.
#[derive(Clone, Debug)]
pub struct DepthLimitPolicy(pub usize);

impl CodecPolicy for DepthLimitPolicy {
    fn max_depth(&self) -> usize {
        self.0
    }
}
