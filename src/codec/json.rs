use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::CodecError;

/// JSON payloads for any serde type.
///
/// Decoding an empty payload yields [`CodecError::EmptyPayload`] instead of
/// a parse error, so synchronizers skip the round without logging.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;

    fn encode(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(
        &self,
        data: &[u8],
    ) -> Result<T, CodecError> {
        if data.is_empty() {
            return Err(CodecError::EmptyPayload);
        }
        Ok(serde_json::from_slice(data)?)
    }
}
