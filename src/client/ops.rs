//! Read and write helpers on top of the store session.
//!
//! Writes auto-create missing ancestor paths, so a value can be pushed into
//! a tree that does not exist yet.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::Client;
use crate::utils::join_path;
use crate::Codec;
use crate::CodecError;
use crate::Result;

impl Client {
    /// Read and decode the value at `path`.
    pub async fn get<C: Codec>(
        &self,
        path: &str,
        codec: &C,
    ) -> Result<C::Value> {
        let (data, _stat) = self.store().get(path).await?;
        Ok(codec.decode(&data)?)
    }

    /// Read the raw payload at `path`.
    pub async fn get_raw(
        &self,
        path: &str,
    ) -> Result<Vec<u8>> {
        let (data, _stat) = self.store().get(path).await?;
        Ok(data)
    }

    pub async fn get_string(
        &self,
        path: &str,
    ) -> Result<String> {
        let data = self.get_raw(path).await?;
        Ok(String::from_utf8(data).map_err(CodecError::from)?)
    }

    /// Read and decode a JSON value at `path`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T> {
        let data = self.get_raw(path).await?;
        if data.is_empty() {
            return Err(CodecError::EmptyPayload.into());
        }
        Ok(serde_json::from_slice(&data).map_err(CodecError::from)?)
    }

    pub async fn get_children(
        &self,
        path: &str,
    ) -> Result<Vec<String>> {
        Ok(self.store().children(path).await?)
    }

    pub async fn exists(
        &self,
        path: &str,
    ) -> Result<bool> {
        Ok(self.store().exists(path).await?)
    }

    /// Write raw bytes at `path`, creating missing ancestors first.
    pub async fn set_raw(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<()> {
        debug!(%path, "set node");
        self.ensure_path(path).await?;
        Ok(self.store().set(path, data).await?)
    }

    /// Encode and write a value at `path`.
    pub async fn set_value<C: Codec>(
        &self,
        path: &str,
        value: &C::Value,
        codec: &C,
    ) -> Result<()> {
        let data = codec.encode(value)?;
        self.set_raw(path, &data).await
    }

    pub async fn set_string(
        &self,
        path: &str,
        value: &str,
    ) -> Result<()> {
        self.set_raw(path, value.as_bytes()).await
    }

    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<()> {
        let data = serde_json::to_vec(value).map_err(CodecError::from)?;
        self.set_raw(path, &data).await
    }

    /// Encode and write a value at `parent/child`.
    pub async fn set_child_value<C: Codec>(
        &self,
        parent: &str,
        child: &str,
        value: &C::Value,
        codec: &C,
    ) -> Result<()> {
        let data = codec.encode(value)?;
        self.set_raw(&join_path(parent, child), &data).await
    }

    pub async fn set_child_string(
        &self,
        parent: &str,
        child: &str,
        value: &str,
    ) -> Result<()> {
        self.set_raw(&join_path(parent, child), value.as_bytes()).await
    }

    pub async fn set_child_json<T: Serialize + ?Sized>(
        &self,
        parent: &str,
        child: &str,
        value: &T,
    ) -> Result<()> {
        self.set_json(&join_path(parent, child), value).await
    }
}
