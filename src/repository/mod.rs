//! JSON repositories over one container

mod entity;
mod tagged;

pub use entity::{EntityRepository, INDEX_PATH};
pub use tagged::TaggedDocumentRepository;

/// Default bound on concurrent in-flight downloads during bulk loads.
///
/// Bulk loads dispatch one download per discovered blob; the bound keeps
/// the number of open connections against the store finite.
pub const DEFAULT_FAN_OUT: usize = 16;
