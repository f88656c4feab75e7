use super::Codec;
use crate::CodecError;

/// Byte pass-through, for callers that do their own marshalling.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawCodec;

impl Codec for RawCodec {
    type Value = Vec<u8>;

    fn encode(
        &self,
        value: &Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(value.clone())
    }

    fn decode(
        &self,
        data: &[u8],
    ) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}
