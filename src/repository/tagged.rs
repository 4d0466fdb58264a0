//! CRUD for tagged JSON documents

use futures_util::{StreamExt, TryStreamExt, stream};
use serde_json::{Value, json};
use tracing::debug;

use super::DEFAULT_FAN_OUT;
use crate::account::Container;
use crate::client::DEFAULT_PAGE_LIMIT;
use crate::document::{DEFAULT_TAG_PROPERTY, SetFilter, TaggedDocument};
use crate::error::Result;
use crate::keys::tag_path;
use crate::mime;

/// Repository of [`TaggedDocument`]s stored as `{tag}.json`.
#[derive(Clone)]
pub struct TaggedDocumentRepository {
    container: Container,
    tag_property: String,
    fan_out: usize,
}

impl TaggedDocumentRepository {
    /// A repository reading tags from the default `"Tag"` property.
    pub fn new(container: Container) -> Self {
        Self {
            container,
            tag_property: DEFAULT_TAG_PROPERTY.to_string(),
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Read tags from a different property of the source JSON.
    pub fn with_tag_property(mut self, tag_property: impl Into<String>) -> Self {
        self.tag_property = tag_property.into();
        self
    }

    /// Bound the concurrency of [`load_set`](Self::load_set) (minimum 1).
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    pub fn tag_property(&self) -> &str {
        &self.tag_property
    }

    /// Upload the full JSON body to the path derived from the tag.
    pub async fn save(&self, document: &TaggedDocument) -> Result<()> {
        let path = tag_path(document.tag())?;
        debug!(container = %self.container.name(), tag = document.tag(), "saving document");

        let json = document.to_json()?;
        self.container
            .put(&path, json.into_bytes(), mime::APPLICATION_JSON)
            .await
    }

    /// Download one document and reconstruct it with the configured tag
    /// property.
    pub async fn load(&self, tag: &str) -> Result<TaggedDocument> {
        let path = tag_path(tag)?;
        debug!(container = %self.container.name(), tag, "loading document");

        let data = self.container.get(&path).await?;
        let body: Value = serde_json::from_slice(&data)?;
        TaggedDocument::from_value(body, &self.tag_property)
    }

    /// Load the subset of documents whose blob path satisfies the filter,
    /// wrapped in a `{"set": [...]}` envelope.
    ///
    /// Selected blobs download under a bound of `fan_out` in-flight
    /// requests and collect in completion order: the result is a set, not a
    /// sequence.
    pub async fn load_set(&self, filter: &SetFilter) -> Result<Value> {
        let prefix = filter
            .directory()
            .map(|directory| format!("{}/", directory.trim_end_matches('/')))
            .unwrap_or_default();
        let names = self.container.list(&prefix, true, DEFAULT_PAGE_LIMIT).await?;
        let selected: Vec<String> = names.into_iter().filter(|name| filter.accepts(name)).collect();
        debug!(container = %self.container.name(), count = selected.len(), "loading document set");

        let fetches = selected.into_iter().map(|name| {
            let container = self.container.clone();
            let tag_property = self.tag_property.clone();
            async move {
                let data = container.get(&name).await?;
                let body: Value = serde_json::from_slice(&data)?;
                TaggedDocument::from_value(body, &tag_property)
            }
        });
        let documents: Vec<TaggedDocument> = stream::iter(fetches)
            .buffer_unordered(self.fan_out)
            .try_collect()
            .await?;

        let set: Vec<Value> = documents.into_iter().map(TaggedDocument::into_body).collect();
        Ok(json!({ "set": set }))
    }

    /// Existence check for the blob behind a tag.
    pub async fn has(&self, tag: &str) -> Result<bool> {
        let path = tag_path(tag)?;
        self.container.exists(&path).await
    }

    /// Remove the blob behind a tag. Deleting an absent document is not an
    /// error.
    pub async fn delete(&self, tag: &str) -> Result<()> {
        let path = tag_path(tag)?;
        debug!(container = %self.container.name(), tag, "deleting document");
        self.container.delete(&path).await
    }
}
