//! Generic CRUD over JSON-serialized entities

use std::any::Any;
use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::DEFAULT_FAN_OUT;
use crate::account::Container;
use crate::client::DEFAULT_PAGE_LIMIT;
use crate::error::{Result, StorageError};
use crate::keys::BlobKeys;
use crate::mime;

/// Well-known path of the optional wholesale index blob.
pub const INDEX_PATH: &str = "index.json";

/// Repository of typed entities stored as `{namespace}/{key}.json`.
///
/// The key map is built once by the caller and shared read-only; the
/// repository holds no other state, so handles are cheap to clone and safe
/// to use concurrently.
#[derive(Clone)]
pub struct EntityRepository {
    keys: Arc<BlobKeys>,
    container: Container,
    fan_out: usize,
}

impl EntityRepository {
    pub fn new(keys: Arc<BlobKeys>, container: Container) -> Self {
        Self {
            keys,
            container,
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Bound the concurrency of [`load_all`](Self::load_all) (minimum 1).
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Serialize the entity to indented JSON and upload it, overwriting any
    /// previous version. The key comes from the registered accessor.
    pub async fn save<T>(&self, item: &T) -> Result<()>
    where
        T: Serialize + Any,
    {
        let key = self.keys.key_of(item)?;
        let path = self.keys.entity_path::<T>(&key)?;
        debug!(container = %self.container.name(), %path, "saving entity");

        let json = serde_json::to_string_pretty(item)?;
        self.container
            .put(&path, json.into_bytes(), mime::APPLICATION_JSON)
            .await
    }

    /// Load one entity by key. Absent blobs fail with
    /// [`StorageError::NotFound`] naming the key and container.
    pub async fn load<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Any,
    {
        let path = self.keys.entity_path::<T>(key)?;
        debug!(container = %self.container.name(), %path, "loading entity");

        self.check_reference(&path, key).await?;
        let data = self.container.get(&path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Load every entity under the type's namespace, downloading at most
    /// `fan_out` blobs concurrently. Output order follows completion order.
    pub async fn load_all<T>(&self) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Any,
    {
        let prefix = format!("{}/", self.keys.namespace_of::<T>()?);
        let names = self.container.list(&prefix, true, DEFAULT_PAGE_LIMIT).await?;
        debug!(container = %self.container.name(), count = names.len(), "loading all entities");

        let fetches = names.into_iter().map(|name| {
            let container = self.container.clone();
            async move {
                let data = container.get(&name).await?;
                Ok::<T, StorageError>(serde_json::from_slice(&data)?)
            }
        });
        stream::iter(fetches)
            .buffer_unordered(self.fan_out)
            .try_collect()
            .await
    }

    /// Existence check only; no content fetch.
    pub async fn exists<T>(&self, key: &str) -> Result<bool>
    where
        T: Any,
    {
        let path = self.keys.entity_path::<T>(key)?;
        self.container.exists(&path).await
    }

    /// Remove the entity unconditionally. Deleting an absent entity is not
    /// an error.
    pub async fn delete<T>(&self, key: &str) -> Result<()>
    where
        T: Any,
    {
        let path = self.keys.entity_path::<T>(key)?;
        debug!(container = %self.container.name(), %path, "deleting entity");
        self.container.delete(&path).await
    }

    /// Read the wholesale index blob at [`INDEX_PATH`].
    ///
    /// The index is maintained alongside the per-entity blobs by the
    /// caller; this layer performs no reconciliation between the two.
    pub async fn read_index<T>(&self) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.check_reference(INDEX_PATH, INDEX_PATH).await?;
        let data = self.container.get(INDEX_PATH).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Replace the wholesale index blob at [`INDEX_PATH`].
    pub async fn write_index<T>(&self, items: &[T]) -> Result<()>
    where
        T: Serialize,
    {
        let json = serde_json::to_string_pretty(items)?;
        self.container
            .put(INDEX_PATH, json.into_bytes(), mime::APPLICATION_JSON)
            .await
    }

    async fn check_reference(&self, path: &str, key: &str) -> Result<()> {
        if self.container.exists(path).await? {
            Ok(())
        } else {
            Err(StorageError::NotFound {
                key: key.to_string(),
                container: self.container.name().to_string(),
            })
        }
    }
}
