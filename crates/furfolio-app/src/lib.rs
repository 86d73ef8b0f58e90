//! Application service layer - analytics use cases, config, audit log, export

pub mod app;
pub mod audit;
pub mod config;
pub mod export;
pub mod repository;
