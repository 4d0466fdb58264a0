//! # Tidepool
//!
//! A thin access layer over cloud blob storage:
//! - Typed entity repositories storing JSON blobs as `{namespace}/{key}.json`
//! - A tagged-document repository for semi-structured JSON identified by a
//!   configurable tag property
//! - Paginated blob listing with a continuation cursor and a page-count cap
//! - Account/container accessors with idempotent container creation and
//!   local file transfer
//!
//! It is a mapping and convenience layer, not a storage engine: there is no
//! indexing, no transactions, and no consistency beyond what the underlying
//! store offers. Backends plug in through the [`BlobClient`] trait; an
//! in-memory client covers tests and development, and an S3-compatible
//! client is available behind the `s3` feature.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use tidepool::{BlobKeys, EntityRepository, MemoryClient, StorageAccount};
//!
//! #[derive(Serialize, Deserialize)]
//! struct BlogEntry {
//!     slug: String,
//!     title: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let account = StorageAccount::new(Arc::new(MemoryClient::new()));
//! let container = account.container("day-path");
//! container.ensure().await?;
//!
//! // Register each entity type's namespace and key accessor once, at startup.
//! let mut keys = BlobKeys::new();
//! keys.add("BlogEntry", |entry: &BlogEntry| entry.slug.clone());
//!
//! let repository = EntityRepository::new(Arc::new(keys), container);
//! repository
//!     .save(&BlogEntry { slug: "my-post".into(), title: "My Post".into() })
//!     .await?;
//!
//! // Stored at `BlogEntry/my-post.json`.
//! let entry: BlogEntry = repository.load("my-post").await?;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod keys;
pub mod mime;
pub mod repository;

pub use account::{Container, Presence, StorageAccount};
pub use client::{BlobAttributes, BlobClient, DEFAULT_PAGE_LIMIT, ListPage, MemoryClient, list_blobs};
pub use config::AccountConfig;
pub use document::{SetFilter, TaggedDocument};
pub use error::{Result, StorageError};
pub use keys::BlobKeys;
pub use repository::{DEFAULT_FAN_OUT, EntityRepository, TaggedDocumentRepository};

#[cfg(feature = "s3")]
pub use client::S3Client;
