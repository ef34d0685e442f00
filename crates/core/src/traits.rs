//! ObjectStore trait definition
//!
//! This trait defines the four bucket operations the CLI is built on.
//! It keeps the command handlers independent of the S3 SDK.

use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::deadline::Deadline;
use crate::error::Result;

/// Boxed byte source or object body
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Streaming body of an opened object
///
/// The underlying connection is released when this value is dropped.
pub struct ObjectBody {
    /// Object size as reported by the store
    pub content_length: Option<u64>,

    pub reader: ObjectReader,
}

impl ObjectBody {
    pub fn new(reader: ObjectReader, content_length: Option<u64>) -> Self {
        Self {
            content_length,
            reader,
        }
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Payload of an upload
pub enum UploadSource {
    /// Local file, read by the uploader itself
    File(PathBuf),

    /// Byte stream of unknown length, such as stdin
    Stream(ObjectReader),
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::File(path) => f.debug_tuple("File").field(path).finish(),
            UploadSource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Options for uploads
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Content type stored with the object
    pub content_type: Option<String>,
}

/// Trait for bucket operations
///
/// Implemented by the S3 adapter; tests substitute an in-memory store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List every key under `prefix`, following pagination to the end
    async fn list(&self, deadline: &Deadline, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Open an object for streaming reads
    async fn open(&self, deadline: &Deadline, bucket: &str, key: &str) -> Result<ObjectBody>;

    /// Upload `source` to `key`
    async fn upload(
        &self,
        deadline: &Deadline,
        bucket: &str,
        key: &str,
        source: UploadSource,
        options: UploadOptions,
    ) -> Result<()>;

    /// Delete `key`
    async fn delete(&self, deadline: &Deadline, bucket: &str, key: &str) -> Result<()>;
}
