//! Store boundary: the `BlobClient` trait and the paginated listing loop
//!
//! Every operation addresses an object by container name plus `/`-delimited
//! path. Implementations talk to one storage account; the in-memory client
//! backs tests and development, the minio-backed client (feature `s3`)
//! talks to S3-compatible services.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::Result;

pub mod memory;

pub use memory::MemoryClient;

#[cfg(feature = "s3")]
pub mod s3;

#[cfg(feature = "s3")]
pub use s3::S3Client;

/// Metadata of a stored object, as returned by a fetch-attributes probe.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobAttributes {
    pub content_type: String,
    pub length: u64,
    /// Not every backend reports a modification time.
    pub last_modified: Option<OffsetDateTime>,
}

/// One page of a listing: blob names in store order plus the continuation
/// cursor for the next page (`None` when the listing is exhausted).
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub names: Vec<String>,
    pub next: Option<String>,
}

/// Boundary to the underlying blob store.
///
/// Transport errors propagate unwrapped; this layer performs no retry and
/// no partial-result suppression.
#[async_trait]
pub trait BlobClient: Send + Sync {
    /// Download an object. `NotFound` if it is absent.
    async fn get(&self, container: &str, path: &str) -> Result<Vec<u8>>;

    /// Upload an object with the given content type, overwriting any
    /// existing object at the path. No optimistic concurrency check.
    async fn put(&self, container: &str, path: &str, data: Vec<u8>, content_type: &str)
    -> Result<()>;

    /// Remove an object. Deleting an absent object is not an error.
    async fn delete(&self, container: &str, path: &str) -> Result<()>;

    /// Existence check without a content fetch.
    async fn exists(&self, container: &str, path: &str) -> Result<bool>;

    /// Fetch object metadata. `NotFound` if the object is absent.
    async fn attributes(&self, container: &str, path: &str) -> Result<BlobAttributes>;

    /// Fetch one page of names under `prefix`, resuming at `cursor`.
    ///
    /// `flat` recurses through virtual subfolders; otherwise one level is
    /// returned, with virtual directories as trailing-slash entries.
    async fn list_page(
        &self,
        container: &str,
        prefix: &str,
        flat: bool,
        cursor: Option<&str>,
    ) -> Result<ListPage>;

    /// Idempotent create-if-absent; `true` iff creation actually occurred.
    async fn ensure_container(&self, container: &str) -> Result<bool>;
}

/// Page-count cap used by repository enumeration.
pub const DEFAULT_PAGE_LIMIT: usize = 5;

/// Enumerate blob names under `prefix`, following the continuation cursor
/// until the store reports no more data or `page_limit` pages were fetched.
///
/// `page_limit` is clamped to a minimum of 1. Results accumulate in fetch
/// order; no ordering is guaranteed beyond what the store returns.
pub async fn list_blobs(
    client: &dyn BlobClient,
    container: &str,
    prefix: &str,
    flat: bool,
    page_limit: usize,
) -> Result<Vec<String>> {
    let page_limit = page_limit.max(1);
    let mut names = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = client
            .list_page(container, prefix, flat, cursor.as_deref())
            .await?;
        names.extend(page.names);
        cursor = page.next;
        pages += 1;
        if cursor.is_none() || pages >= page_limit {
            break;
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_client(paths: &[&str]) -> MemoryClient {
        let client = MemoryClient::with_page_size(2);
        for path in paths {
            client.put("files", path, b"{}".to_vec(), "application/json").await.unwrap();
        }
        client
    }

    #[tokio::test]
    async fn test_page_limit_caps_results() {
        let client = seeded_client(&["a.json", "b.json", "c.json", "d.json", "e.json"]).await;

        let one_page = list_blobs(&client, "files", "", true, 1).await.unwrap();
        assert_eq!(one_page.len(), 2);

        let all = list_blobs(&client, "files", "", true, 10).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_page_limit_clamps_to_one() {
        let client = seeded_client(&["a.json", "b.json", "c.json"]).await;
        let listed = list_blobs(&client, "files", "", true, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_container_lists_empty() {
        let client = MemoryClient::new();
        let listed = list_blobs(&client, "nowhere", "", true, 5).await.unwrap();
        assert!(listed.is_empty());
    }
}
