//! Image ingestion collaborator.
//!
//! Profile images arrive two ways: as an inline `data:image/...;base64,`
//! payload stored server-side, or through a pre-signed upload grant that the
//! client uploads against directly and then commits. Either path ends in a
//! public URL that gets persisted on the identity record.
//!
//! Backends: [`S3ImageStore`] for production, [`MemoryImageStore`] for tests
//! and local development.

pub mod memory;
pub mod s3;

pub use memory::MemoryImageStore;
pub use s3::S3ImageStore;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use utoipa::ToSchema;

use crate::errors::Error;

/// Content types accepted for profile images
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// A pre-signed upload grant: where to PUT the bytes, and the object key to
/// commit afterwards
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadGrant {
    pub upload_url: String,
    pub object_key: String,
}

/// Image store collaborator.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an inline base64 image payload and return its public URL
    async fn store(&self, payload: &str, owner_email: &str) -> Result<String, Error>;

    /// Mint a pre-signed upload grant for a direct client upload
    async fn create_upload_grant(&self, owner_email: &str, content_type: &str) -> Result<UploadGrant, Error>;

    /// Resolve a previously granted object key to its public URL
    async fn commit_reference(&self, object_key: &str) -> Result<String, Error>;
}

fn data_uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^data:image/(jpeg|png|gif);base64,(.+)$").expect("static regex"))
}

/// Whether a payload has the accepted `data:image/...;base64,` shape.
/// Used by boundary validation before the payload ever reaches a store.
pub fn is_image_data_uri(payload: &str) -> bool {
    data_uri_regex().is_match(payload)
}

/// A decoded inline image payload
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl DecodedImage {
    pub fn extension(&self) -> &'static str {
        extension_for(&self.content_type).unwrap_or("jpg")
    }
}

/// File extension for an accepted content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Decode an inline `data:image/...;base64,` payload
pub fn decode_data_uri(payload: &str) -> Result<DecodedImage, Error> {
    let captures = data_uri_regex().captures(payload).ok_or_else(|| Error::ImageProcessing {
        operation: "decode image payload: not a data:image base64 URI".to_string(),
    })?;

    let subtype = &captures[1];
    let data = &captures[2];

    let bytes = general_purpose::STANDARD.decode(data).map_err(|e| Error::ImageProcessing {
        operation: format!("decode image payload: {e}"),
    })?;

    Ok(DecodedImage {
        bytes,
        content_type: format!("image/{subtype}"),
    })
}

/// Object key for a freshly ingested image
fn object_key(prefix: &str, owner_email: &str, extension: &str) -> String {
    format!("{}/{}-{}.{}", prefix, owner_email, uuid::Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_data_uri_shapes() {
        assert!(is_image_data_uri(&format!("data:image/png;base64,{PIXEL}")));
        assert!(is_image_data_uri("data:image/jpeg;base64,abcd"));
        assert!(is_image_data_uri("data:image/gif;base64,abcd"));

        assert!(!is_image_data_uri("data:image/webp;base64,abcd"));
        assert!(!is_image_data_uri("data:text/plain;base64,abcd"));
        assert!(!is_image_data_uri("not an image at all"));
        assert!(!is_image_data_uri("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_data_uri() {
        let decoded = decode_data_uri(&format!("data:image/png;base64,{PIXEL}")).unwrap();
        assert_eq!(decoded.content_type, "image/png");
        assert_eq!(decoded.extension(), "png");
        assert!(!decoded.bytes.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let result = decode_data_uri("data:image/png;base64,@@not-base64@@");
        assert!(matches!(result, Err(Error::ImageProcessing { .. })));
    }

    #[test]
    fn test_object_keys_are_unique_per_call() {
        let a = object_key("profile-images", "a@b.com", "png");
        let b = object_key("profile-images", "a@b.com", "png");
        assert_ne!(a, b);
        assert!(a.starts_with("profile-images/a@b.com-"));
        assert!(a.ends_with(".png"));
    }
}
