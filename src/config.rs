use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{FLAT_TAG, STRUCTURED_CONTAINER, STRUCTURED_FIELD};
use crate::error::{ReplaceError, Result};
use crate::pipeline::processing::FieldLocator;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub locator: LocatorConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// Every <Postnummer> element anywhere in the document
    #[default]
    Flat,
    /// <PostNr> directly under each <Post> element
    Structured,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocatorConfig {
    pub strategy: LocatorStrategy,
    pub tag: String,
    pub container: String,
    pub field: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            strategy: LocatorStrategy::Flat,
            tag: FLAT_TAG.to_string(),
            container: STRUCTURED_CONTAINER.to_string(),
            field: STRUCTURED_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Prepended to the file name of each written document
    pub prefix: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ReplaceError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let names = [
            ("tag", &self.locator.tag),
            ("container", &self.locator.container),
            ("field", &self.locator.field),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(ReplaceError::Config(format!("locator.{} must not be empty", key)));
            }
        }
        Ok(())
    }

    /// Locator for this run; `strategy` overrides the configured one when given.
    pub fn locator(&self, strategy: Option<LocatorStrategy>) -> FieldLocator {
        match strategy.unwrap_or(self.locator.strategy) {
            LocatorStrategy::Flat => FieldLocator::FlatScan {
                tag: self.locator.tag.clone(),
            },
            LocatorStrategy::Structured => FieldLocator::StructuredScan {
                container: self.locator.container.clone(),
                field: self.locator.field.clone(),
            },
        }
    }
}
