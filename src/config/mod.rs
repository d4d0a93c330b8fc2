//! Configuration loading and management
//!
//! A configuration file declares runtime DTO schemas and the scaffolding
//! settings used by `make-dto`:
//!
//! ```yaml
//! scaffold:
//!   namespace: dto
//!   output_dir: src/dto
//!
//! schemas:
//!   - name: create_user
//!     whitelist: true
//!     defaults:
//!       role: user
//!     rules:
//!       name: required|string|max:255
//!       email: required|email
//!       role: in:user,admin
//!     filters:
//!       email: [trim, lowercase]
//! ```

use crate::core::Fields;
use crate::core::pipeline::Pipeline;
use crate::core::validation::{RuleSet, Rules, filters};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A DTO shape declared in configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaConfig {
    /// Schema name (e.g., "create_user")
    pub name: String,

    /// Restrict fields to keys with rules
    #[serde(default)]
    pub whitelist: bool,

    /// Drop null inputs before defaults are applied
    #[serde(default)]
    pub strip_nulls: bool,

    /// Default values
    #[serde(default)]
    pub defaults: Fields,

    /// Rule-sets in textual form (`required|string|max:255`)
    #[serde(default)]
    pub rules: IndexMap<String, String>,

    /// Filter names per key (`trim`, `round_decimals:2`, ...)
    #[serde(default)]
    pub filters: IndexMap<String, Vec<String>>,
}

impl SchemaConfig {
    /// Parse the rule strings
    pub fn parsed_rules(&self) -> Result<Rules> {
        let mut rules = Rules::new();
        for (key, text) in &self.rules {
            let set: RuleSet = text
                .parse()
                .with_context(|| format!("Invalid rules for '{}' in schema '{}'", key, self.name))?;
            rules.insert(key.clone(), set);
        }
        Ok(rules)
    }

    /// Build the construction pipeline for this schema
    pub fn to_pipeline(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(self.name.clone())
            .with_defaults(self.defaults.clone())
            .with_rules(self.parsed_rules()?)
            .whitelist(self.whitelist)
            .strip_nulls(self.strip_nulls);

        for (key, names) in &self.filters {
            for name in names {
                let filter = filters::by_name(name)
                    .with_context(|| format!("Invalid filter for '{}' in schema '{}'", key, self.name))?;
                pipeline = pipeline.with_shared_filter(key.clone(), filter);
            }
        }

        Ok(pipeline)
    }
}

/// Settings for the `make-dto` scaffolding command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaffoldConfig {
    /// Root module path of generated DTOs (e.g., "dto" or "app::dto")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory generated files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Custom stub template; the built-in stub is used when unset
    #[serde(default)]
    pub stub: Option<PathBuf>,
}

fn default_namespace() -> String {
    "dto".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("src/dto")
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            output_dir: default_output_dir(),
            stub: None,
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DtoConfig {
    /// Scaffolding settings
    #[serde(default)]
    pub scaffold: Option<ScaffoldConfig>,

    /// Runtime schemas
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

impl DtoConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse config file '{}'", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations
    ///
    /// Schemas with the same name are replaced by the later definition while
    /// keeping the position of the first one; the last scaffold section wins.
    pub fn merge(configs: Vec<DtoConfig>) -> Self {
        let mut scaffold = None;
        let mut schemas: IndexMap<String, SchemaConfig> = IndexMap::new();

        for config in configs {
            if config.scaffold.is_some() {
                scaffold = config.scaffold;
            }
            for schema in config.schemas {
                schemas.insert(schema.name.clone(), schema);
            }
        }

        Self {
            scaffold,
            schemas: schemas.into_values().collect(),
        }
    }

    /// Scaffolding settings, falling back to defaults
    pub fn scaffold(&self) -> ScaffoldConfig {
        self.scaffold.clone().unwrap_or_default()
    }

    /// Find a schema by name
    pub fn schema(&self, name: &str) -> Option<&SchemaConfig> {
        self.schemas.iter().find(|schema| schema.name == name)
    }

    /// Build the pipeline for a named schema
    pub fn pipeline(&self, name: &str) -> Result<Pipeline> {
        self.schema(name)
            .with_context(|| format!("Unknown schema '{}'", name))?
            .to_pipeline()
    }
}
