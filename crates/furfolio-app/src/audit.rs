//! In-memory audit trail of analytics runs

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUDIT_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    SnapshotLoaded,
    ServiceMetrics,
    Trends,
    Forecast,
    Retention,
    Churn,
    Behavior,
    Loyalty,
    Report,
    Export,
}

impl AuditKind {
    pub fn label(&self) -> &'static str {
        match self {
            AuditKind::SnapshotLoaded => "snapshot_loaded",
            AuditKind::ServiceMetrics => "service_metrics",
            AuditKind::Trends => "trends",
            AuditKind::Forecast => "forecast",
            AuditKind::Retention => "retention",
            AuditKind::Churn => "churn",
            AuditKind::Behavior => "behavior",
            AuditKind::Loyalty => "loyalty",
            AuditKind::Report => "report",
            AuditKind::Export => "export",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditKind,
    pub timestamp: DateTime<Utc>,
    pub detail: String,
}

/// Bounded event log; the oldest event is dropped when full
#[derive(Debug, Clone)]
pub struct AuditLog {
    events: VecDeque<AuditEvent>,
    capacity: usize,
}

impl AuditLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_AUDIT_CAPACITY)),
            capacity,
        }
    }

    pub fn record(&mut self, kind: AuditKind, detail: impl Into<String>) {
        self.push(AuditEvent {
            kind,
            timestamp: Utc::now(),
            detail: detail.into(),
        });
    }

    pub fn push(&mut self, event: AuditEvent) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn events(&self) -> impl Iterator<Item = &AuditEvent> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&AuditEvent> {
        self.events.back()
    }

    pub fn of_kind(&self, kind: AuditKind) -> impl Iterator<Item = &AuditEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut log = AuditLog::with_capacity(3);
        for i in 0..10 {
            log.record(AuditKind::Trends, format!("run {}", i));
            assert!(log.len() <= 3);
        }
        let details: Vec<&str> = log.events().map(|e| e.detail.as_str()).collect();
        assert_eq!(details, vec!["run 7", "run 8", "run 9"]);
        assert_eq!(log.latest().unwrap().detail, "run 9");
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut log = AuditLog::with_capacity(0);
        log.record(AuditKind::Churn, "ignored");
        assert!(log.is_empty());
    }

    #[test]
    fn test_filter_by_kind() {
        let mut log = AuditLog::default();
        log.record(AuditKind::Retention, "a");
        log.record(AuditKind::Churn, "b");
        log.record(AuditKind::Retention, "c");
        assert_eq!(log.of_kind(AuditKind::Retention).count(), 2);
        assert_eq!(log.capacity(), DEFAULT_AUDIT_CAPACITY);

        log.clear();
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&AuditKind::SnapshotLoaded).unwrap();
        assert_eq!(json, "\"snapshot_loaded\"");
        assert_eq!(AuditKind::SnapshotLoaded.label(), "snapshot_loaded");
    }
}
