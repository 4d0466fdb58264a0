//! Semi-structured JSON documents identified by a tag

use serde_json::Value;

use crate::error::{Result, StorageError};

/// Default name of the tag property.
pub const DEFAULT_TAG_PROPERTY: &str = "Tag";

/// A JSON object plus the string tag extracted from one of its properties.
///
/// The tag is the document's repository identity. A document whose tag
/// property is absent or not a string is rejected at construction with
/// [`StorageError::MissingTag`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedDocument {
    tag: String,
    body: Value,
}

impl TaggedDocument {
    /// Parse raw JSON and extract the tag from `tag_property`.
    pub fn from_json(json: &str, tag_property: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?, tag_property)
    }

    /// Wrap an already-parsed JSON value, extracting the tag from
    /// `tag_property`.
    pub fn from_value(body: Value, tag_property: &str) -> Result<Self> {
        let tag = body
            .get(tag_property)
            .and_then(Value::as_str)
            .filter(|tag| !tag.is_empty())
            .ok_or_else(|| StorageError::MissingTag(tag_property.to_string()))?
            .to_string();
        Ok(Self { tag, body })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// The full JSON body as indented text, ready for upload.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.body)?)
    }
}

/// Selects a subset of objects during a set load: a predicate over each
/// object's path, plus an optional directory scope for the listing.
///
/// The default filter accepts everything.
pub struct SetFilter {
    directory: Option<String>,
    predicate: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl Default for SetFilter {
    fn default() -> Self {
        Self {
            directory: None,
            predicate: Box::new(|_| true),
        }
    }
}

impl SetFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            directory: None,
            predicate: Box::new(predicate),
        }
    }

    /// Scope the listing to one logical directory.
    pub fn in_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    pub fn accepts(&self, path: &str) -> bool {
        (self.predicate)(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_extraction() {
        let doc = TaggedDocument::from_json(r#"{"id":"abc","content":"hello"}"#, "id").unwrap();
        assert_eq!(doc.tag(), "abc");
        assert_eq!(doc.body()["content"], "hello");
    }

    #[test]
    fn test_missing_tag_property_is_rejected() {
        let result = TaggedDocument::from_json(r#"{"content":"hello"}"#, "id");
        match result {
            Err(StorageError::MissingTag(property)) => assert_eq!(property, "id"),
            other => panic!("expected MissingTag, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_non_string_tag_is_rejected() {
        assert!(TaggedDocument::from_json(r#"{"id":42}"#, "id").is_err());
        assert!(TaggedDocument::from_json(r#"{"id":""}"#, "id").is_err());
    }

    #[test]
    fn test_default_filter_accepts_all() {
        let filter = SetFilter::default();
        assert!(filter.accepts("anything.json"));
        assert!(filter.directory().is_none());
    }

    #[test]
    fn test_scoped_filter() {
        let filter = SetFilter::new(|path| path.ends_with(".json")).in_directory("notes");
        assert_eq!(filter.directory(), Some("notes"));
        assert!(filter.accepts("notes/a.json"));
        assert!(!filter.accepts("notes/a.png"));
    }
}
