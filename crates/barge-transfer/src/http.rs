//! Streaming byte source abstraction and the reqwest-backed adapter.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt, stream::BoxStream};

use crate::error::SourceError;

/// Chunked byte stream handed from the source to the object store.
pub type ByteStream = BoxStream<'static, Result<Bytes, SourceError>>;

/// An opened streaming read: the declared length (if the source declared
/// one) and the bytes themselves.
pub struct SourceStream {
    pub total_bytes: Option<u64>,
    pub bytes: ByteStream,
}

/// Capability to open a streaming GET against a file URL.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Open `url` for streaming. A non-2xx response or connection failure
    /// is an error here; read failures surface later through the stream.
    async fn open(&self, url: &str) -> Result<SourceStream, SourceError>;
}

#[async_trait]
impl<F: FileSource + ?Sized> FileSource for std::sync::Arc<F> {
    async fn open(&self, url: &str) -> Result<SourceStream, SourceError> {
        (**self).open(url).await
    }
}

/// [`FileSource`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestSource {
    client: reqwest::Client,
}

impl ReqwestSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestSource {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl FileSource for ReqwestSource {
    async fn open(&self, url: &str) -> Result<SourceStream, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length();
        let bytes = response
            .bytes_stream()
            .map_err(|e| SourceError::Read(e.to_string()))
            .boxed();

        Ok(SourceStream { total_bytes, bytes })
    }
}
