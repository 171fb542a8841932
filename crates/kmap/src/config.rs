//! Configuration file handling.
//!
//! Settings live in a small YAML file (`kmap.yaml`) found by walking up from
//! the dataset's directory, or named explicitly on the command line.

use crate::error::{Error, Result};
use crate::graph::{GraphConfig, GraphMeta};
use crate::id_generation::{DEFAULT_ID_LENGTH, MAX_ID_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "kmap.yaml";

/// Shortest generated id length accepted in configuration
pub const MIN_ID_LENGTH: usize = 4;

/// Maximum directory depth to traverse when searching for a config file
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for kmap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct KmapConfig {
    /// Accept cycle-inducing edges instead of rejecting them
    #[serde(default)]
    pub allow_cycles: bool,

    /// Length of generated node and edge ids
    #[serde(default = "default_id_length")]
    pub id_length: usize,

    /// Graph id written on export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,

    /// Graph title written on export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_title: Option<String>,
}

fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}

impl Default for KmapConfig {
    fn default() -> Self {
        Self {
            allow_cycles: false,
            id_length: DEFAULT_ID_LENGTH,
            graph_id: None,
            graph_title: None,
        }
    }
}

impl KmapConfig {
    /// Load and validate configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file can't be read and `Error::Config` if
    /// it is not valid YAML or holds out-of-range values.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on serialization failure and `Error::Io` if
    /// the file can't be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `id-length` is out of range.
    pub fn validate(&self) -> Result<()> {
        validate_id_length(self.id_length)
    }

    /// Engine settings derived from this file.
    #[must_use]
    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            allow_cycles: self.allow_cycles,
            id_length: self.id_length,
        }
    }

    /// Export metadata derived from this file.
    #[must_use]
    pub fn graph_meta(&self) -> GraphMeta {
        GraphMeta {
            id: self.graph_id.clone(),
            title: self.graph_title.clone(),
        }
    }
}

/// Validate a generated-id length.
///
/// # Errors
///
/// Returns `Error::Config` unless `length` is between [`MIN_ID_LENGTH`] and
/// [`MAX_ID_LENGTH`].
pub fn validate_id_length(length: usize) -> Result<()> {
    if length < MIN_ID_LENGTH {
        return Err(Error::Config(format!(
            "id-length must be at least {MIN_ID_LENGTH}"
        )));
    }

    if length > MAX_ID_LENGTH {
        return Err(Error::Config(format!(
            "id-length cannot exceed {MAX_ID_LENGTH}"
        )));
    }

    Ok(())
}

/// Find a config file by searching up the directory tree.
///
/// Starts from the given directory and traverses parent directories until a
/// `kmap.yaml` is found, the root is reached, or the maximum traversal depth
/// is exceeded.
#[must_use]
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case::minimum(4)]
    #[case::default_length(8)]
    #[case::maximum(12)]
    fn test_validate_id_length_valid(#[case] length: usize) {
        assert!(validate_id_length(length).is_ok());
    }

    #[rstest]
    #[case::zero(0, "at least 4")]
    #[case::too_short(3, "at least 4")]
    #[case::too_long(13, "cannot exceed 12")]
    fn test_validate_id_length_invalid(#[case] length: usize, #[case] expected_error: &str) {
        let err_msg = validate_id_length(length).unwrap_err().to_string();
        assert!(
            err_msg.contains(expected_error),
            "Expected error to contain '{expected_error}', got: '{err_msg}'"
        );
    }

    #[test]
    fn test_config_default() {
        let config = KmapConfig::default();
        assert!(!config.allow_cycles);
        assert_eq!(config.id_length, DEFAULT_ID_LENGTH);
        assert_eq!(config.graph_config(), GraphConfig::default());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: KmapConfig = serde_yaml::from_str("allow-cycles: true\n").unwrap();
        assert!(config.allow_cycles);
        assert_eq!(config.id_length, DEFAULT_ID_LENGTH);
        assert!(config.graph_meta().title.is_none());
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);

        let original = KmapConfig {
            allow_cycles: true,
            id_length: 6,
            graph_id: Some("calc".to_string()),
            graph_title: Some("Calculus".to_string()),
        };
        original.save(&config_path).await.unwrap();

        let loaded = KmapConfig::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);

        KmapConfig::default().save(&config_path).await.unwrap();
        let content = tokio::fs::read_to_string(&config_path).await.unwrap();

        assert!(content.contains("allow-cycles: false"));
        assert!(content.contains("id-length: 8"));
        assert!(!content.contains("graph-title"));
    }

    #[tokio::test]
    async fn test_load_rejects_out_of_range_length() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&config_path, "id-length: 40\n").await.unwrap();

        let result = KmapConfig::load(&config_path).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&config_path, "allow-cycles: [unterminated\n")
            .await
            .unwrap();

        assert!(matches!(
            KmapConfig::load(&config_path).await,
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "allow-cycles: false\n").unwrap();

        let sub_dir = temp_dir.path().join("sub").join("nested");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let found = find_config(&sub_dir);
        assert_eq!(found, Some(temp_dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("empty");
        std::fs::create_dir_all(&nested).unwrap();

        // A kmap.yaml above the temp dir would be found; only assert on the temp tree
        let found = find_config(&nested);
        assert!(found.is_none_or(|path| !path.starts_with(temp_dir.path())));
    }
}
