use super::Codec;
use crate::CodecError;

/// UTF-8 text payloads.
///
/// An empty payload decodes to the empty string rather than signaling
/// [`CodecError::EmptyPayload`]: for text bindings the empty string is a
/// legitimate value.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringCodec;

impl Codec for StringCodec {
    type Value = String;

    fn encode(
        &self,
        value: &String,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(
        &self,
        data: &[u8],
    ) -> Result<String, CodecError> {
        Ok(String::from_utf8(data.to_vec())?)
    }
}
