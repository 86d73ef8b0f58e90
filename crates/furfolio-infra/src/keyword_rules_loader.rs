//! Behavior keyword rules loaded from TOML
//!
//! ```toml
//! [[rules]]
//! category = "aggressive"
//! keywords = ["bite", "growl", "snapped"]
//! ```
//!
//! Rule order in the file is classification priority.

use std::fs;
use std::path::Path;

use furfolio_domain::service::{KeywordClassifier, KeywordRule};
use furfolio_types::{ConfigError, Error, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct KeywordRulesFile {
    rules: Vec<KeywordRule>,
}

#[derive(Debug)]
pub struct KeywordRulesLoader {
    rules: Vec<KeywordRule>,
}

impl KeywordRulesLoader {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to read keyword rules file {}: {}",
                path.display(),
                e
            )))
        })?;
        let loader = Self::load_from_str(&content)?;
        debug!(path = %path.display(), rules = loader.rules.len(), "loaded keyword rules");
        Ok(loader)
    }

    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let file: KeywordRulesFile = toml::from_str(toml_content).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to parse keyword rules TOML: {}",
                e
            )))
        })?;
        if file.rules.iter().all(|r| r.keywords.is_empty()) {
            return Err(Error::Config(ConfigError::Invalid(
                "keyword rules file defines no keywords".to_string(),
            )));
        }
        Ok(Self { rules: file.rules })
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn into_classifier(self) -> KeywordClassifier {
        KeywordClassifier::new(self.rules)
    }
}
