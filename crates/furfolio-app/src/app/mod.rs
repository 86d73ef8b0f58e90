//! Use cases

pub mod analytics_service;

pub use analytics_service::{
    AnalyticsService, AnalyticsServiceError, FullReport, ServiceOverview, Snapshot, TrendReport,
};
