//! Infrastructure layer - CSV snapshot loaders, keyword rule files, repositories

pub mod csv_loader;
pub mod keyword_rules_loader;
pub mod persistence;
