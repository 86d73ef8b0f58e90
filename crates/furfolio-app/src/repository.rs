//! Repository adapters for persistence layer

use std::path::{Path, PathBuf};

use furfolio_domain::service::KeywordClassifier;
use furfolio_infra::keyword_rules_loader::KeywordRulesLoader;
use furfolio_infra::persistence::CsvSnapshotRepository;
use furfolio_types::Result;

use crate::config::Config;

/// Open the CSV export directory named by the config
pub fn open_snapshot_repo(config: &Config) -> Result<CsvSnapshotRepository> {
    let data_dir = config.data_dir()?;
    CsvSnapshotRepository::open(data_dir)
}

/// Open a CSV export directory at a custom location
pub fn open_snapshot_repo_at(data_dir: PathBuf) -> Result<CsvSnapshotRepository> {
    CsvSnapshotRepository::open(data_dir)
}

/// Keyword classifier from the configured rule file, or the built-in table
pub fn load_classifier(rules_path: Option<&Path>) -> Result<KeywordClassifier> {
    match rules_path {
        Some(path) => Ok(KeywordRulesLoader::load_from_file(path)?.into_classifier()),
        None => Ok(KeywordClassifier::default()),
    }
}
