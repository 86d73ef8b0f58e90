//! Furfolio domain layer
//!
//! Read-only grooming business records, the repository seam they are loaded
//! through, and the analytics engines that aggregate them. Every engine is a
//! set of pure functions over slices; nothing here performs IO or mutates its
//! input.

pub mod model;
pub mod repository;
pub mod service;
