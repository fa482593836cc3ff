//! S3-backed image store.
//!
//! Inline payloads are decoded and written server-side with `PutObject`;
//! the pre-signed variant mints a time-bounded `PUT` URL so the client
//! uploads directly, then commits the object key back to us.

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::time::Duration;
use tracing::instrument;

use super::{ImageStore, UploadGrant, decode_data_uri, extension_for, object_key};
use crate::config::ImagesConfig;
use crate::errors::Error;

pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    key_prefix: String,
    public_base_url: Option<String>,
    grant_expiry: Duration,
}

impl S3ImageStore {
    /// Build a store from configuration; AWS credentials and region come from
    /// the default provider chain.
    pub async fn new(images: &ImagesConfig, bucket: String) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = aws_sdk_s3::Client::new(&config);

        Self {
            client,
            bucket,
            key_prefix: images.key_prefix.clone(),
            public_base_url: images.public_base_url.clone(),
            grant_expiry: images.upload_grant_expiry,
        }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    #[instrument(skip(self, payload), err)]
    async fn store(&self, payload: &str, owner_email: &str) -> Result<String, Error> {
        let image = decode_data_uri(payload)?;
        let key = object_key(&self.key_prefix, owner_email, image.extension());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(image.bytes))
            .content_type(&image.content_type)
            .send()
            .await
            .map_err(|e| Error::ImageProcessing {
                operation: format!("store profile image: {e}"),
            })?;

        Ok(self.public_url(&key))
    }

    #[instrument(skip(self), err)]
    async fn create_upload_grant(&self, owner_email: &str, content_type: &str) -> Result<UploadGrant, Error> {
        let extension = extension_for(content_type).ok_or_else(|| Error::ImageProcessing {
            operation: format!("create upload grant: unsupported content type {content_type}"),
        })?;
        let key = object_key(&self.key_prefix, owner_email, extension);

        let presigning = PresigningConfig::expires_in(self.grant_expiry).map_err(|e| Error::ImageProcessing {
            operation: format!("create upload grant: {e}"),
        })?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| Error::ImageProcessing {
                operation: format!("create upload grant: {e}"),
            })?;

        Ok(UploadGrant {
            upload_url: presigned.uri().to_string(),
            object_key: key,
        })
    }

    #[instrument(skip(self), err)]
    async fn commit_reference(&self, object_key: &str) -> Result<String, Error> {
        // Only keys we could have granted are committable
        if !object_key.starts_with(&format!("{}/", self.key_prefix)) {
            return Err(Error::InvalidInput {
                message: "Unknown object key".to_string(),
            });
        }

        // The object must actually have been uploaded against the grant
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .map_err(|e| Error::ImageProcessing {
                operation: format!("commit upload reference: {e}"),
            })?;

        Ok(self.public_url(object_key))
    }
}
