//! Project configuration: where raw compendia live and where outputs go
//!
//! A configuration is resolved once at startup (by name from the built-in
//! registry, or from a JSON file) and passed explicitly to the pipeline.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompendiumError, Result};
use crate::merge::GeneFilterParams;

/// Names of the built-in configurations
pub const VALID_CONFIGS: &[&str] = &["default", "test"];

/// A downloadable source file: local file name and its URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetTarget {
    pub file_name: String,
    pub url: String,
}

/// Directory layout, output file names and gene filters for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub project_root: PathBuf,
    pub data_dir: String,
    pub raw_data_dir: String,
    pub processed_dir: String,
    pub expression_file: String,
    pub clinical_file: String,
    pub layout_file: String,
    pub expression_targets: Vec<DatasetTarget>,
    pub clinical_targets: Vec<DatasetTarget>,
    pub filters: GeneFilterParams,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            project_root: PathBuf::from(".."),
            data_dir: "data".to_string(),
            raw_data_dir: "raw".to_string(),
            processed_dir: "processed".to_string(),
            expression_file: "processed_compendium.tsv".to_string(),
            clinical_file: "processed_clinical_data.tsv".to_string(),
            layout_file: "layout.tsv".to_string(),
            expression_targets: Vec::new(),
            clinical_targets: Vec::new(),
            filters: GeneFilterParams::none(),
        }
    }
}

impl ProjectConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.filters.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for a command: a JSON file wins over a built-in name
    pub fn resolve(name: &str, config_file: Option<&str>) -> Result<Self> {
        match config_file {
            Some(path) => {
                log::info!("Loading configuration from: {}", path);
                Self::from_json_file(path)
            }
            None => ConfigRegistry::builtin().get(name).cloned(),
        }
    }

    pub fn data_dir_path(&self) -> PathBuf {
        self.project_root.join(&self.data_dir)
    }

    pub fn raw_data_dir_path(&self) -> PathBuf {
        self.data_dir_path().join(&self.raw_data_dir)
    }

    pub fn processed_dir_path(&self) -> PathBuf {
        self.data_dir_path().join(&self.processed_dir)
    }

    pub fn expression_file_path(&self) -> PathBuf {
        self.processed_dir_path().join(&self.expression_file)
    }

    pub fn clinical_file_path(&self) -> PathBuf {
        self.processed_dir_path().join(&self.clinical_file)
    }

    pub fn layout_file_path(&self) -> PathBuf {
        self.processed_dir_path().join(&self.layout_file)
    }

    /// Local paths of the expression source files
    pub fn expression_target_paths(&self) -> Vec<PathBuf> {
        self.target_paths(&self.expression_targets)
    }

    /// Local paths of the clinical source files
    pub fn clinical_target_paths(&self) -> Vec<PathBuf> {
        self.target_paths(&self.clinical_targets)
    }

    /// (local path, URL) pairs for the expression source files
    pub fn expression_url_targets(&self) -> Vec<(PathBuf, &str)> {
        self.url_targets(&self.expression_targets)
    }

    /// (local path, URL) pairs for the clinical source files
    pub fn clinical_url_targets(&self) -> Vec<(PathBuf, &str)> {
        self.url_targets(&self.clinical_targets)
    }

    fn target_paths(&self, targets: &[DatasetTarget]) -> Vec<PathBuf> {
        let raw = self.raw_data_dir_path();
        targets.iter().map(|t| raw.join(&t.file_name)).collect()
    }

    fn url_targets<'a>(&self, targets: &'a [DatasetTarget]) -> Vec<(PathBuf, &'a str)> {
        let raw = self.raw_data_dir_path();
        targets
            .iter()
            .map(|t| (raw.join(&t.file_name), t.url.as_str()))
            .collect()
    }
}

/// Named configurations
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    configs: Vec<ProjectConfig>,
}

impl ConfigRegistry {
    /// Registry holding the built-in configurations
    pub fn builtin() -> Self {
        let test = ProjectConfig {
            name: "test".to_string(),
            project_root: PathBuf::from("."),
            data_dir: "test_data".to_string(),
            ..ProjectConfig::default()
        };
        Self {
            configs: vec![ProjectConfig::default(), test],
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.configs.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&ProjectConfig> {
        self.configs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CompendiumError::UnknownConfig {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_paths() {
        let config = ProjectConfig::default();
        assert_eq!(config.raw_data_dir_path(), Path::new("../data/raw"));
        assert_eq!(
            config.expression_file_path(),
            Path::new("../data/processed/processed_compendium.tsv")
        );
        assert_eq!(
            config.clinical_file_path(),
            Path::new("../data/processed/processed_clinical_data.tsv")
        );
    }

    #[test]
    fn test_target_paths_under_raw_dir() {
        let config = ProjectConfig {
            expression_targets: vec![DatasetTarget {
                file_name: "tumor_expression.tsv".to_string(),
                url: "https://example.org/tumor_expression.tsv".to_string(),
            }],
            ..ProjectConfig::default()
        };
        assert_eq!(
            config.expression_target_paths(),
            vec![PathBuf::from("../data/raw/tumor_expression.tsv")]
        );
        let targets = config.expression_url_targets();
        assert_eq!(targets[0].1, "https://example.org/tumor_expression.tsv");
        assert!(config.clinical_target_paths().is_empty());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ConfigRegistry::builtin();
        assert_eq!(registry.names(), VALID_CONFIGS.to_vec());
        assert_eq!(registry.get("test").unwrap().data_dir, "test_data");

        let err = registry.get("nope").unwrap_err();
        assert!(err.to_string().contains("default, test"));
    }

    #[test]
    fn test_from_json_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name": "lab", "project_root": "/srv", "filters": {{"variance_percentile": 25.0}}}}"#
        )
        .unwrap();

        let config = ProjectConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.name, "lab");
        assert_eq!(config.raw_data_dir_path(), Path::new("/srv/data/raw"));
        assert_eq!(config.filters.variance_percentile, Some(25.0));
        assert_eq!(config.filters.minimum_expression, None);
    }

    #[test]
    fn test_resolve_prefers_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "lab", "layout_file": "lab_layout.tsv"}}"#).unwrap();
        let path = file.path().to_str().unwrap();

        let config = ProjectConfig::resolve("test", Some(path)).unwrap();
        assert_eq!(config.name, "lab");
        assert_eq!(
            config.layout_file_path(),
            Path::new("../data/processed/lab_layout.tsv")
        );

        let builtin = ProjectConfig::resolve("test", None).unwrap();
        assert_eq!(builtin.layout_file_path(), Path::new("./test_data/processed/layout.tsv"));
        assert!(matches!(
            ProjectConfig::resolve("nope", None),
            Err(CompendiumError::UnknownConfig { .. })
        ));
    }

    #[test]
    fn test_from_json_rejects_bad_filter() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"filters": {{"variance_percentile": 150.0}}}}"#).unwrap();
        assert!(matches!(
            ProjectConfig::from_json_file(file.path()),
            Err(CompendiumError::InvalidFilter { .. })
        ));
    }
}
