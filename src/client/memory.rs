//! In-memory blob client for testing and development

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{BlobAttributes, BlobClient, ListPage};
use crate::error::{Result, StorageError};

/// Listing page size when none is given. Real stores page in the
/// thousands; the small default keeps continuation logic exercised.
pub const DEFAULT_PAGE_SIZE: usize = 64;

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
    last_modified: OffsetDateTime,
}

type Containers = HashMap<String, BTreeMap<String, StoredBlob>>;

/// In-memory [`BlobClient`] with marker-based listing continuation.
///
/// Containers are provisioned on first write. Blob names are kept sorted,
/// and each listing page resumes strictly after the cursor name.
#[derive(Debug)]
pub struct MemoryClient {
    containers: Mutex<Containers>,
    page_size: usize,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// A client whose listings page at `page_size` names (minimum 1).
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            containers: Mutex::new(HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Containers>> {
        self.containers
            .lock()
            .map_err(|_| StorageError::Transport("lock poisoned".to_string()))
    }

    /// Names of all provisioned containers (useful for testing).
    pub fn container_names(&self) -> Vec<String> {
        self.containers.lock().unwrap().keys().cloned().collect()
    }

    /// All blob names in a container (useful for testing).
    pub fn keys(&self, container: &str) -> Vec<String> {
        self.containers
            .lock()
            .unwrap()
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of blobs in a container.
    pub fn len(&self, container: &str) -> usize {
        self.containers
            .lock()
            .unwrap()
            .get(container)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Whether a container holds no blobs.
    pub fn is_empty(&self, container: &str) -> bool {
        self.len(container) == 0
    }

    /// Drop all containers and blobs.
    pub fn clear(&self) {
        self.containers.lock().unwrap().clear();
    }

    fn not_found(container: &str, path: &str) -> StorageError {
        StorageError::NotFound {
            key: path.to_string(),
            container: container.to_string(),
        }
    }
}

#[async_trait]
impl BlobClient for MemoryClient {
    async fn get(&self, container: &str, path: &str) -> Result<Vec<u8>> {
        let containers = self.lock()?;
        containers
            .get(container)
            .and_then(|blobs| blobs.get(path))
            .map(|blob| blob.data.clone())
            .ok_or_else(|| Self::not_found(container, path))
    }

    async fn put(
        &self,
        container: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let mut containers = self.lock()?;
        containers.entry(container.to_string()).or_default().insert(
            path.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
                last_modified: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn delete(&self, container: &str, path: &str) -> Result<()> {
        let mut containers = self.lock()?;
        if let Some(blobs) = containers.get_mut(container) {
            blobs.remove(path);
        }
        Ok(())
    }

    async fn exists(&self, container: &str, path: &str) -> Result<bool> {
        let containers = self.lock()?;
        Ok(containers
            .get(container)
            .is_some_and(|blobs| blobs.contains_key(path)))
    }

    async fn attributes(&self, container: &str, path: &str) -> Result<BlobAttributes> {
        let containers = self.lock()?;
        containers
            .get(container)
            .and_then(|blobs| blobs.get(path))
            .map(|blob| BlobAttributes {
                content_type: blob.content_type.clone(),
                length: blob.data.len() as u64,
                last_modified: Some(blob.last_modified),
            })
            .ok_or_else(|| Self::not_found(container, path))
    }

    async fn list_page(
        &self,
        container: &str,
        prefix: &str,
        flat: bool,
        cursor: Option<&str>,
    ) -> Result<ListPage> {
        let containers = self.lock()?;
        let Some(blobs) = containers.get(container) else {
            return Ok(ListPage::default());
        };

        let matching = blobs.keys().filter(|name| name.starts_with(prefix));
        let entries: Vec<String> = if flat {
            matching.cloned().collect()
        } else {
            // One level only: collapse deeper paths into `segment/` entries.
            let mut level = BTreeSet::new();
            for name in matching {
                match name[prefix.len()..].split_once('/') {
                    Some((segment, _)) => level.insert(format!("{prefix}{segment}/")),
                    None => level.insert(name.clone()),
                };
            }
            level.into_iter().collect()
        };

        // Entries are sorted; resume strictly after the marker.
        let start = match cursor {
            Some(marker) => entries.partition_point(|entry| entry.as_str() <= marker),
            None => 0,
        };
        let names: Vec<String> = entries[start..].iter().take(self.page_size).cloned().collect();
        let next = if start + names.len() < entries.len() {
            names.last().cloned()
        } else {
            None
        };

        Ok(ListPage { names, next })
    }

    async fn ensure_container(&self, container: &str) -> Result<bool> {
        let mut containers = self.lock()?;
        if containers.contains_key(container) {
            Ok(false)
        } else {
            containers.insert(container.to_string(), BTreeMap::new());
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let client = MemoryClient::new();
        let data = b"{\"hello\":true}".to_vec();

        client.put("files", "test/file.json", data.clone(), "application/json").await.unwrap();
        assert_eq!(client.get("files", "test/file.json").await.unwrap(), data);
        assert!(client.exists("files", "test/file.json").await.unwrap());
        assert!(!client.exists("files", "nonexistent").await.unwrap());

        let attributes = client.attributes("files", "test/file.json").await.unwrap();
        assert_eq!(attributes.content_type, "application/json");
        assert_eq!(attributes.length, data.len() as u64);
        assert!(attributes.last_modified.is_some());

        client.delete("files", "test/file.json").await.unwrap();
        assert!(!client.exists("files", "test/file.json").await.unwrap());
        assert!(client.get("files", "test/file.json").await.is_err());
    }

    #[tokio::test]
    async fn test_get_not_found_names_key_and_container() {
        let client = MemoryClient::new();
        match client.get("files", "missing.json").await {
            Err(StorageError::NotFound { key, container }) => {
                assert_eq!(key, "missing.json");
                assert_eq!(container, "files");
            }
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let client = MemoryClient::new();
        client.delete("files", "never-existed.json").await.unwrap();
        client.delete("no-such-container", "x.json").await.unwrap();
    }

    #[tokio::test]
    async fn test_marker_continuation_walks_all_pages() {
        let client = MemoryClient::with_page_size(2);
        for name in ["a.json", "b.json", "c.json", "d.json", "e.json"] {
            client.put("files", name, Vec::new(), "application/json").await.unwrap();
        }

        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = client.list_page("files", "", true, cursor.as_deref()).await.unwrap();
            collected.extend(page.names);
            pages += 1;
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(collected, vec!["a.json", "b.json", "c.json", "d.json", "e.json"]);
    }

    #[tokio::test]
    async fn test_non_flat_listing_collapses_directories() {
        let client = MemoryClient::new();
        for name in ["BlogEntry/a.json", "BlogEntry/b.json", "index.json"] {
            client.put("files", name, Vec::new(), "application/json").await.unwrap();
        }

        let page = client.list_page("files", "", false, None).await.unwrap();
        assert_eq!(page.names, vec!["BlogEntry/", "index.json"]);
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_ensure_container_reports_creation_once() {
        let client = MemoryClient::new();
        assert!(client.ensure_container("fresh").await.unwrap());
        assert!(!client.ensure_container("fresh").await.unwrap());
    }
}
