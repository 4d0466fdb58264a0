//! Key-accessor registry and blob path mapping
//!
//! Repositories address blobs through two deterministic path conventions:
//! `{namespace}/{key}.json` for typed entities and `{tag}.json` for tagged
//! documents. The namespace is supplied explicitly at registration rather
//! than derived from type metadata, so two types with the same simple name
//! can never collide in the store.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use crate::error::{Result, StorageError};

struct KeyAccessor {
    namespace: String,
    get: Box<dyn Fn(&dyn Any) -> String + Send + Sync>,
}

/// A build-once map from entity types to their namespace and key accessor.
///
/// Populated at startup by the caller, immutable afterwards, and safe for
/// concurrent lookup; repositories share it behind an `Arc`.
#[derive(Default)]
pub struct BlobKeys {
    accessors: HashMap<TypeId, KeyAccessor>,
}

impl BlobKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key accessor for `T` under an explicit namespace.
    ///
    /// Exactly one accessor per type; registering a type twice is a
    /// programming error and panics.
    pub fn add<T, F>(&mut self, namespace: impl Into<String>, accessor: F)
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let entry = KeyAccessor {
            namespace: namespace.into(),
            get: Box::new(move |item: &dyn Any| {
                let item = item
                    .downcast_ref::<T>()
                    .expect("key accessor invoked with the type it was registered for");
                accessor(item)
            }),
        };
        if self.accessors.insert(TypeId::of::<T>(), entry).is_some() {
            panic!("key accessor for `{}` registered twice", type_name::<T>());
        }
    }

    /// Extract the key value from an entity instance.
    pub fn key_of<T: Any>(&self, item: &T) -> Result<String> {
        let accessor = self.lookup::<T>()?;
        Ok((accessor.get)(item))
    }

    /// The storage namespace registered for `T`.
    pub fn namespace_of<T: Any>(&self) -> Result<&str> {
        Ok(&self.lookup::<T>()?.namespace)
    }

    /// Blob path of the entity of type `T` with the given key.
    ///
    /// Keys are used verbatim as a path segment; callers supply path-safe
    /// keys.
    pub fn entity_path<T: Any>(&self, key: &str) -> Result<String> {
        Ok(format!("{}/{}.json", self.namespace_of::<T>()?, key))
    }

    fn lookup<T: Any>(&self) -> Result<&KeyAccessor> {
        self.accessors
            .get(&TypeId::of::<T>())
            .ok_or(StorageError::UnregisteredType(type_name::<T>()))
    }
}

/// Blob path of a tagged document: the tag itself, with `.json` appended
/// iff it is not already present.
pub fn tag_path(tag: &str) -> Result<String> {
    if tag.is_empty() {
        return Err(StorageError::InvalidArgument(
            "the expected repository tag is not here".to_string(),
        ));
    }
    if tag.ends_with(".json") {
        Ok(tag.to_string())
    } else {
        Ok(format!("{tag}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BlogEntry {
        slug: String,
    }

    struct Comment;

    #[test]
    fn test_entity_path_mapping() {
        let mut keys = BlobKeys::new();
        keys.add("BlogEntry", |entry: &BlogEntry| entry.slug.clone());

        let entry = BlogEntry { slug: "my-post".to_string() };
        assert_eq!(keys.key_of(&entry).unwrap(), "my-post");
        assert_eq!(keys.namespace_of::<BlogEntry>().unwrap(), "BlogEntry");
        assert_eq!(keys.entity_path::<BlogEntry>("my-post").unwrap(), "BlogEntry/my-post.json");
    }

    #[test]
    fn test_unregistered_type_is_an_error() {
        let keys = BlobKeys::new();
        match keys.namespace_of::<Comment>() {
            Err(StorageError::UnregisteredType(name)) => assert!(name.contains("Comment")),
            other => panic!("expected UnregisteredType, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_double_registration_panics() {
        let mut keys = BlobKeys::new();
        keys.add("BlogEntry", |entry: &BlogEntry| entry.slug.clone());
        keys.add("Entries", |entry: &BlogEntry| entry.slug.clone());
    }

    #[test]
    fn test_tag_path_appends_json_once() {
        assert_eq!(tag_path("abc").unwrap(), "abc.json");
        assert_eq!(tag_path("abc.json").unwrap(), "abc.json");
        assert!(tag_path("").is_err());
    }
}
