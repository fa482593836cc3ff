//! In-memory image store for tests and local development.
//!
//! Mirrors the S3 backend's observable behavior: inline stores succeed for
//! well-formed payloads, grants are single-use keys, and committing a key
//! that was never granted or stored fails the same way a missing S3 object
//! would.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use super::{ImageStore, UploadGrant, decode_data_uri, extension_for, object_key};
use crate::errors::Error;

const BASE_URL: &str = "https://images.invalid";
const KEY_PREFIX: &str = "profile-images";

#[derive(Default)]
struct Inner {
    stored: HashSet<String>,
    granted: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryImageStore {
    inner: Mutex<Inner>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn public_url(key: &str) -> String {
        format!("{BASE_URL}/{key}")
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store(&self, payload: &str, owner_email: &str) -> Result<String, Error> {
        let image = decode_data_uri(payload)?;
        let key = object_key(KEY_PREFIX, owner_email, image.extension());

        let mut inner = self.inner.lock().await;
        inner.stored.insert(key.clone());
        Ok(Self::public_url(&key))
    }

    async fn create_upload_grant(&self, owner_email: &str, content_type: &str) -> Result<UploadGrant, Error> {
        let extension = extension_for(content_type).ok_or_else(|| Error::ImageProcessing {
            operation: format!("create upload grant: unsupported content type {content_type}"),
        })?;
        let key = object_key(KEY_PREFIX, owner_email, extension);

        let mut inner = self.inner.lock().await;
        inner.granted.insert(key.clone());

        Ok(UploadGrant {
            upload_url: format!("{BASE_URL}/upload/{key}"),
            object_key: key,
        })
    }

    async fn commit_reference(&self, object_key: &str) -> Result<String, Error> {
        let mut inner = self.inner.lock().await;
        if inner.granted.remove(object_key) || inner.stored.contains(object_key) {
            inner.stored.insert(object_key.to_string());
            return Ok(Self::public_url(object_key));
        }

        Err(Error::ImageProcessing {
            operation: "commit upload reference: object was never granted".to_string(),
        })
    }
}
