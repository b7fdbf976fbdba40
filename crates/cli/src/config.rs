//! Configuration file support for cleaning pipelines

use anyhow::{Context, Result};
use custdedup_core::{DedupConfig, ReplicationPlan};
use custdedup_validate::ValidatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete pipeline configuration
///
/// Stages run in a fixed order: date cleaning, validation (report only),
/// deduplication, replication. Any stage left out is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<DateColumnConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidatorConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplication: Option<DedupConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication: Option<ReplicationPlan>,
}

impl PipelineConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                extension
            )),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let content = match extension {
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            "toml" => toml::to_string_pretty(self)?,
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
                    extension
                ))
            }
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Clean signup dates, validate, then keep one row per email
    pub fn default_customers() -> Self {
        Self {
            dates: vec![DateColumnConfig {
                column: "signup_date".to_string(),
                format: default_date_format(),
            }],
            validation: Some(ValidatorConfig::default()),
            deduplication: Some(DedupConfig::default()),
            replication: None,
        }
    }
}

/// A date column to normalize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateColumnConfig {
    pub column: String,
    #[serde(default = "default_date_format")]
    pub format: String,
}

fn default_date_format() -> String {
    custdedup_formats::dates::DEFAULT_DATE_FORMAT.to_string()
}

/// Load validator settings from file
pub fn load_validator_config(path: &Path) -> Result<ValidatorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read validator config: {}", path.display()))?;

    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    match extension {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML validator config: {}", path.display())),
        "toml" => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML validator config: {}", path.display())),
        _ => Err(anyhow::anyhow!(
            "Unsupported config file format: {}. Use .yaml, .yml, or .toml",
            extension
        )),
    }
}
