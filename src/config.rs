//! Account configuration consumed by remote backends

use crate::error::{Result, StorageError};

/// Connection settings for a storage account.
///
/// Loading happens at construction time; a missing variable is reported
/// immediately as [`StorageError::ConfigurationMissing`], never deferred to
/// the first request.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Account name (access key id for S3-compatible stores).
    pub account: String,

    /// Account access key.
    pub key: String,

    /// Service endpoint URL.
    pub endpoint: String,

    /// Default container for repositories against this account.
    pub container: String,
}

impl AccountConfig {
    /// Build the configuration from environment variables.
    ///
    /// Expects:
    /// - `TIDEPOOL_ACCOUNT`
    /// - `TIDEPOOL_ACCESS_KEY`
    /// - `TIDEPOOL_ENDPOINT`
    /// - `TIDEPOOL_CONTAINER`
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            account: require("TIDEPOOL_ACCOUNT")?,
            key: require("TIDEPOOL_ACCESS_KEY")?,
            endpoint: require("TIDEPOOL_ENDPOINT")?,
            container: require("TIDEPOOL_CONTAINER")?,
        })
    }
}

fn require(name: &'static str) -> Result<String> {
    std::env::var(name).map_err(|_| StorageError::ConfigurationMissing(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_is_reported_by_name() {
        // None of the TIDEPOOL_* variables are set in the test environment.
        match AccountConfig::from_env() {
            Err(StorageError::ConfigurationMissing(name)) => {
                assert!(name.starts_with("TIDEPOOL_"));
            }
            other => panic!("expected ConfigurationMissing, got {other:?}"),
        }
    }
}
