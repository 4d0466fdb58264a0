//! Storage account and container handles, plus local file transfer

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, warn};

use crate::client::{BlobAttributes, BlobClient, list_blobs};
use crate::error::{Result, StorageError};
use crate::mime;

/// Outcome of an existence probe.
///
/// A transport failure during the probe is reported as [`Unknown`] rather
/// than coalesced into "absent"; the caller decides the fallback policy.
///
/// [`Unknown`]: Presence::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    Unknown,
}

/// Handle to one storage account.
///
/// Immutable and cheap to clone; all repositories against the account share
/// the same client.
#[derive(Clone)]
pub struct StorageAccount {
    client: Arc<dyn BlobClient>,
}

impl StorageAccount {
    pub fn new(client: Arc<dyn BlobClient>) -> Self {
        Self { client }
    }

    /// Resolve a container handle. The container is not created until
    /// [`Container::ensure`] or a file upload touches it.
    pub fn container(&self, name: impl Into<String>) -> Container {
        Container {
            client: Arc::clone(&self.client),
            name: name.into(),
        }
    }

    /// Probe for an object in the named container.
    pub async fn is_object_present(&self, container: &str, path: &str) -> Presence {
        self.container(container).probe(path).await
    }

    /// Upload a local file into `remote_directory` of the container,
    /// creating the container if needed. The content type follows the
    /// file's extension. Returns the blob path written.
    ///
    /// Fails with [`StorageError::LocalFileMissing`] before any network
    /// call if the source file does not exist.
    pub async fn upload_file(
        &self,
        local_path: impl AsRef<Path>,
        container: &str,
        remote_directory: &str,
    ) -> Result<String> {
        let local_path = local_path.as_ref();
        if fs::metadata(local_path).await.is_err() {
            return Err(StorageError::LocalFileMissing(local_path.to_path_buf()));
        }
        let file_name = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StorageError::InvalidArgument(format!(
                    "`{}` has no usable file name",
                    local_path.display()
                ))
            })?;

        let container = self.container(container);
        if container.ensure().await? {
            debug!(container = %container.name(), "generated container");
        }

        let blob_path = format!("{remote_directory}/{file_name}")
            .replace('\\', "/")
            .trim_start_matches('/')
            .to_string();
        let content_type = mime::content_type_for_path(local_path);
        let data = fs::read(local_path).await?;

        debug!(container = %container.name(), %blob_path, content_type, "uploading file");
        container.put(&blob_path, data, content_type).await?;
        Ok(blob_path)
    }

    /// Download a blob to `{local_root}/{container}/{remote_path}`, with
    /// `/` translated to the platform separator and parent directories
    /// created as needed. Ensures the container first and returns the local
    /// path written.
    pub async fn download_file(
        &self,
        local_root: impl AsRef<Path>,
        container: &str,
        remote_path: &str,
    ) -> Result<PathBuf> {
        let container = self.container(container);
        if container.ensure().await? {
            debug!(container = %container.name(), "generated container");
        }

        let data = container.get(remote_path).await?;

        let mut local_path = local_root.as_ref().join(container.name());
        for segment in remote_path.split('/').filter(|segment| !segment.is_empty()) {
            local_path.push(segment);
        }
        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        debug!(remote_path, local_path = %local_path.display(), "downloading file");
        fs::write(&local_path, data).await?;
        Ok(local_path)
    }
}

/// Handle to one logical container, shared by all repositories against it.
#[derive(Clone)]
pub struct Container {
    client: Arc<dyn BlobClient>,
    name: String,
}

impl Container {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Idempotent create-if-absent; `true` iff creation actually occurred.
    pub async fn ensure(&self) -> Result<bool> {
        self.client.ensure_container(&self.name).await
    }

    pub async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.client.get(&self.name, path).await
    }

    pub async fn put(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.client.put(&self.name, path, data, content_type).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.client.delete(&self.name, path).await
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        self.client.exists(&self.name, path).await
    }

    pub async fn attributes(&self, path: &str) -> Result<BlobAttributes> {
        self.client.attributes(&self.name, path).await
    }

    /// Enumerate blob names under `prefix`, capped at `page_limit` pages.
    pub async fn list(&self, prefix: &str, flat: bool, page_limit: usize) -> Result<Vec<String>> {
        list_blobs(self.client.as_ref(), &self.name, prefix, flat, page_limit).await
    }

    /// Tri-state existence probe via fetch-attributes.
    pub async fn probe(&self, path: &str) -> Presence {
        match self.attributes(path).await {
            Ok(_) => Presence::Present,
            Err(error) if error.is_not_found() => Presence::Absent,
            Err(error) => {
                warn!(container = %self.name, path, %error, "existence probe failed");
                Presence::Unknown
            }
        }
    }
}
