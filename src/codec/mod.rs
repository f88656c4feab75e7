//! Pluggable payload codecs.
//!
//! A [`Codec`] turns a typed in-memory value into the byte payload stored at
//! a node and back. Codecs are passed explicitly to every binding; there is
//! no implicit default. A structured codec reports an absent payload as
//! [`CodecError::EmptyPayload`](crate::CodecError::EmptyPayload) so the
//! synchronizers can treat "nothing to sync yet" differently from malformed
//! data.

mod bin;
mod json;
mod raw;
mod text;

pub use bin::*;
pub use json::*;
pub use raw::*;
pub use text::*;


use crate::CodecError;

/// Encode/decode strategy for node payloads.
pub trait Codec: Send + Sync + 'static {
    /// The in-memory shape this codec produces and consumes.
    type Value: Clone + Send + Sync + 'static;

    fn encode(
        &self,
        value: &Self::Value,
    ) -> Result<Vec<u8>, CodecError>;

    fn decode(
        &self,
        data: &[u8],
    ) -> Result<Self::Value, CodecError>;
}
