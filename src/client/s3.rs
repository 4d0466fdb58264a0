//! S3-compatible blob client using the MinIO SDK
//!
//! Works with AWS S3, MinIO, and any S3-compatible object storage. The
//! container maps to a bucket; paths map to object keys.

use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use minio::s3::{
    client::Client,
    creds::StaticProvider,
    http::BaseUrl,
    segmented_bytes::SegmentedBytes,
    types::{S3Api, ToStream},
};

use super::{BlobAttributes, BlobClient, ListPage};
use crate::config::AccountConfig;
use crate::error::{Result, StorageError};
use crate::mime;

/// [`BlobClient`] backed by an S3-compatible service.
pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an [`AccountConfig`].
    pub fn from_config(config: &AccountConfig) -> Result<Self> {
        let base_url = BaseUrl::from_str(&config.endpoint)
            .map_err(|e| StorageError::Transport(format!("invalid endpoint URL: {e}")))?;
        let credentials = StaticProvider::new(&config.account, &config.key, None);
        let client = Client::new(base_url, Some(Box::new(credentials)), None, None)
            .map_err(|e| StorageError::Transport(format!("failed to create S3 client: {e}")))?;
        Ok(Self::new(client))
    }

    fn map_get_error(container: &str, path: &str, error: impl ToString) -> StorageError {
        let message = error.to_string();
        if message.contains("NoSuchKey") || message.contains("404") {
            StorageError::NotFound {
                key: path.to_string(),
                container: container.to_string(),
            }
        } else {
            StorageError::Transport(format!("failed to get `{path}`: {message}"))
        }
    }
}

#[async_trait]
impl BlobClient for S3Client {
    async fn get(&self, container: &str, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object(container, path)
            .send()
            .await
            .map_err(|e| Self::map_get_error(container, path, e))?;

        let content = response.content.to_segmented_bytes().await.map_err(|e| {
            StorageError::Transport(format!("failed to read `{path}` content: {e}"))
        })?;
        Ok(content.to_bytes().to_vec())
    }

    async fn put(
        &self,
        container: &str,
        path: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<()> {
        // The minio put builder carries no content-type parameter; the
        // declared type is dropped on this backend.
        let bytes = SegmentedBytes::from(Bytes::from(data));
        self.client
            .put_object(container, path, bytes)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("failed to put `{path}`: {e}")))?;
        Ok(())
    }

    async fn delete(&self, container: &str, path: &str) -> Result<()> {
        self.client
            .delete_object(container, path)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("failed to delete `{path}`: {e}")))?;
        Ok(())
    }

    async fn exists(&self, container: &str, path: &str) -> Result<bool> {
        match self.client.stat_object(container, path).send().await {
            Ok(_) => Ok(true),
            Err(e) => match Self::map_get_error(container, path, e) {
                StorageError::NotFound { .. } => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn attributes(&self, container: &str, path: &str) -> Result<BlobAttributes> {
        let response = self
            .client
            .stat_object(container, path)
            .send()
            .await
            .map_err(|e| Self::map_get_error(container, path, e))?;

        // The stat response exposes no stored content type or modification
        // time through this SDK surface.
        Ok(BlobAttributes {
            content_type: mime::APPLICATION_OCTET_STREAM.to_string(),
            length: response.size,
            last_modified: None,
        })
    }

    async fn list_page(
        &self,
        container: &str,
        prefix: &str,
        flat: bool,
        cursor: Option<&str>,
    ) -> Result<ListPage> {
        // The SDK's listing stream cannot be suspended across calls, so the
        // cursor counts consumed pages and the listing is re-issued and
        // skipped forward on each call.
        let consumed: usize = match cursor {
            Some(cursor) => cursor.parse().map_err(|_| {
                StorageError::InvalidArgument(format!("malformed continuation cursor `{cursor}`"))
            })?,
            None => 0,
        };

        let mut pages = self
            .client
            .list_objects(container)
            .prefix(Some(prefix.to_string()))
            .recursive(flat)
            .to_stream()
            .await;

        let mut skipped = 0;
        while skipped < consumed {
            if pages.next().await.is_none() {
                return Ok(ListPage::default());
            }
            skipped += 1;
        }

        match pages.next().await {
            None => Ok(ListPage::default()),
            Some(Err(e)) => Err(StorageError::Transport(format!(
                "failed to list `{prefix}`: {e}"
            ))),
            Some(Ok(response)) => Ok(ListPage {
                names: response.contents.into_iter().map(|entry| entry.name).collect(),
                next: Some((consumed + 1).to_string()),
            }),
        }
    }

    async fn ensure_container(&self, container: &str) -> Result<bool> {
        let response = self
            .client
            .bucket_exists(container)
            .send()
            .await
            .map_err(|e| {
                StorageError::Transport(format!("failed to check container `{container}`: {e}"))
            })?;
        if response.exists {
            return Ok(false);
        }
        self.client.create_bucket(container).send().await.map_err(|e| {
            StorageError::Transport(format!("failed to create container `{container}`: {e}"))
        })?;
        Ok(true)
    }
}
