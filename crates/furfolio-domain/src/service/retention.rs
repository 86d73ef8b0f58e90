//! Retention tagging from days-since-visit thresholds

use std::collections::HashMap;

use chrono::NaiveDate;
use furfolio_types::ConfigError;
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, DogOwner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionTag {
    New,
    Active,
    Returning,
    AtRisk,
    Inactive,
}

impl RetentionTag {
    pub const ALL: [RetentionTag; 5] = [
        RetentionTag::New,
        RetentionTag::Active,
        RetentionTag::Returning,
        RetentionTag::AtRisk,
        RetentionTag::Inactive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RetentionTag::New => "new",
            RetentionTag::Active => "active",
            RetentionTag::Returning => "returning",
            RetentionTag::AtRisk => "at-risk",
            RetentionTag::Inactive => "inactive",
        }
    }

    /// Tags that still count as retained customers
    pub fn is_retained(&self) -> bool {
        matches!(
            self,
            RetentionTag::New | RetentionTag::Active | RetentionTag::Returning
        )
    }
}

/// Day-count cutoffs, all measured against the evaluation date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionThresholds {
    #[serde(default = "default_new_customer_days")]
    pub new_customer_days: u32,
    #[serde(default = "default_active_days")]
    pub active_days: u32,
    #[serde(default = "default_at_risk_days")]
    pub at_risk_days: u32,
    #[serde(default = "default_inactive_days")]
    pub inactive_days: u32,
}

fn default_new_customer_days() -> u32 {
    30
}

fn default_active_days() -> u32 {
    60
}

fn default_at_risk_days() -> u32 {
    90
}

fn default_inactive_days() -> u32 {
    180
}

impl Default for RetentionThresholds {
    fn default() -> Self {
        Self {
            new_customer_days: default_new_customer_days(),
            active_days: default_active_days(),
            at_risk_days: default_at_risk_days(),
            inactive_days: default_inactive_days(),
        }
    }
}

impl RetentionThresholds {
    /// Require `new_customer <= active <= at_risk < inactive`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.new_customer_days > self.active_days {
            return Err(ConfigError::Invalid(format!(
                "retention.new_customer_days ({}) must not exceed retention.active_days ({})",
                self.new_customer_days, self.active_days
            )));
        }
        if self.active_days > self.at_risk_days {
            return Err(ConfigError::Invalid(format!(
                "retention.active_days ({}) must not exceed retention.at_risk_days ({})",
                self.active_days, self.at_risk_days
            )));
        }
        if self.at_risk_days >= self.inactive_days {
            return Err(ConfigError::Invalid(format!(
                "retention.at_risk_days ({}) must be below retention.inactive_days ({})",
                self.at_risk_days, self.inactive_days
            )));
        }
        Ok(())
    }
}

/// Visit facts for one owner as of a given day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitHistory {
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
    pub visit_count: usize,
    /// Days between the last two visits
    pub gap_before_last_days: Option<i64>,
}

impl VisitHistory {
    /// Build from an owner's appointments; only completed visits on or
    /// before `today` are counted.
    pub fn from_appointments<'a, I>(appointments: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Appointment>,
    {
        let mut days: Vec<NaiveDate> = appointments
            .into_iter()
            .filter(|a| a.is_visit())
            .map(Appointment::day)
            .filter(|d| *d <= today)
            .collect();
        days.sort_unstable();

        let gap_before_last_days = match days.as_slice() {
            [.., prev, last] => Some((*last - *prev).num_days()),
            _ => None,
        };

        Self {
            first_visit: days.first().copied(),
            last_visit: days.last().copied(),
            visit_count: days.len(),
            gap_before_last_days,
        }
    }

    pub fn days_since_last_visit(&self, today: NaiveDate) -> Option<i64> {
        self.last_visit.map(|d| days_between(d, today))
    }

    pub fn days_since_first_visit(&self, today: NaiveDate) -> Option<i64> {
        self.first_visit.map(|d| days_between(d, today))
    }
}

fn days_between(earlier: NaiveDate, today: NaiveDate) -> i64 {
    (today - earlier).num_days().max(0)
}

/// Tag a customer. Rules are checked in order and the first match wins:
///
/// 1. inactive: last visit more than `inactive_days` ago
/// 2. at-risk: last visit more than `at_risk_days` ago
/// 3. new: no visits yet, or first visit within `new_customer_days`
/// 4. active: last visit within `active_days` and no lapse before it
/// 5. returning: everything else
///
/// A lapse is a gap between the last two visits longer than `at_risk_days`.
pub fn retention_tag(
    history: &VisitHistory,
    today: NaiveDate,
    thresholds: &RetentionThresholds,
) -> RetentionTag {
    let (Some(since_last), Some(since_first)) = (
        history.days_since_last_visit(today),
        history.days_since_first_visit(today),
    ) else {
        return RetentionTag::New;
    };

    if since_last > i64::from(thresholds.inactive_days) {
        return RetentionTag::Inactive;
    }
    if since_last > i64::from(thresholds.at_risk_days) {
        return RetentionTag::AtRisk;
    }
    if since_first <= i64::from(thresholds.new_customer_days) {
        return RetentionTag::New;
    }
    let lapsed = history
        .gap_before_last_days
        .is_some_and(|gap| gap > i64::from(thresholds.at_risk_days));
    if since_last <= i64::from(thresholds.active_days) && !lapsed {
        return RetentionTag::Active;
    }
    RetentionTag::Returning
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRetention {
    pub owner_id: String,
    pub owner_name: String,
    pub tag: RetentionTag,
    pub days_since_last_visit: Option<i64>,
    pub visit_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: RetentionTag,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionReport {
    pub as_of: NaiveDate,
    pub thresholds: RetentionThresholds,
    pub customers: Vec<CustomerRetention>,
    /// One entry per tag, in `RetentionTag::ALL` order
    pub tag_counts: Vec<TagCount>,
    /// Share of customers tagged new, active or returning
    pub retention_rate: f64,
}

impl RetentionReport {
    pub fn count(&self, tag: RetentionTag) -> usize {
        self.tag_counts
            .iter()
            .find(|c| c.tag == tag)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Tag every owner and summarize the distribution
pub fn analyze_retention(
    owners: &[DogOwner],
    appointments: &[Appointment],
    today: NaiveDate,
    thresholds: &RetentionThresholds,
) -> RetentionReport {
    let mut by_owner: HashMap<&str, Vec<&Appointment>> = HashMap::new();
    for appt in appointments {
        by_owner.entry(appt.owner_id.as_str()).or_default().push(appt);
    }

    let customers: Vec<CustomerRetention> = owners
        .iter()
        .map(|owner| {
            let history = VisitHistory::from_appointments(
                by_owner.get(owner.id.as_str()).into_iter().flatten().copied(),
                today,
            );
            CustomerRetention {
                owner_id: owner.id.clone(),
                owner_name: owner.name.clone(),
                tag: retention_tag(&history, today, thresholds),
                days_since_last_visit: history.days_since_last_visit(today),
                visit_count: history.visit_count,
            }
        })
        .collect();

    let tag_counts: Vec<TagCount> = RetentionTag::ALL
        .iter()
        .map(|&tag| TagCount {
            tag,
            count: customers.iter().filter(|c| c.tag == tag).count(),
        })
        .collect();

    let retained = customers.iter().filter(|c| c.tag.is_retained()).count();
    let retention_rate = if customers.is_empty() {
        0.0
    } else {
        retained as f64 / customers.len() as f64
    };

    RetentionReport {
        as_of: today,
        thresholds: *thresholds,
        customers,
        tag_counts,
        retention_rate,
    }
}
