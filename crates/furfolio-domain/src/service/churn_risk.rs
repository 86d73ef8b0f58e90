//! RFM-based churn risk scoring
//!
//! Recency, frequency and monetary value are each normalized into a
//! `[0, 1]` risk component and combined with configurable weights.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use furfolio_types::{ConfigError, MAX_SPAN_DAYS};
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, Charge, DogOwner};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChurnModel {
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,
    #[serde(default = "default_frequency_weight")]
    pub frequency_weight: f64,
    #[serde(default = "default_monetary_weight")]
    pub monetary_weight: f64,
    /// Days without a visit at which recency risk saturates
    #[serde(default = "default_recency_horizon_days")]
    pub recency_horizon_days: u32,
    /// Visits per lookback window that count as fully engaged
    #[serde(default = "default_frequency_target")]
    pub frequency_target: u32,
    /// Spend per lookback window that counts as fully engaged
    #[serde(default = "default_monetary_target")]
    pub monetary_target: f64,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

fn default_recency_weight() -> f64 {
    0.5
}

fn default_frequency_weight() -> f64 {
    0.3
}

fn default_monetary_weight() -> f64 {
    0.2
}

fn default_recency_horizon_days() -> u32 {
    180
}

fn default_frequency_target() -> u32 {
    12
}

fn default_monetary_target() -> f64 {
    600.0
}

fn default_lookback_days() -> u32 {
    365
}

impl Default for ChurnModel {
    fn default() -> Self {
        Self {
            recency_weight: default_recency_weight(),
            frequency_weight: default_frequency_weight(),
            monetary_weight: default_monetary_weight(),
            recency_horizon_days: default_recency_horizon_days(),
            frequency_target: default_frequency_target(),
            monetary_target: default_monetary_target(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl ChurnModel {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [self.recency_weight, self.frequency_weight, self.monetary_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid(
                "churn weights must be finite and non-negative".to_string(),
            ));
        }
        if self.lookback_days == 0 || self.lookback_days > MAX_SPAN_DAYS {
            return Err(ConfigError::Invalid(format!(
                "churn.lookback_days must be within 1..={}, got {}",
                MAX_SPAN_DAYS, self.lookback_days
            )));
        }
        Ok(())
    }

    /// Weights scaled to sum to 1; all zero when every weight is zero
    fn normalized_weights(&self) -> (f64, f64, f64) {
        let clean = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let (r, f, m) = (
            clean(self.recency_weight),
            clean(self.frequency_weight),
            clean(self.monetary_weight),
        );
        let sum = r + f + m;
        if sum == 0.0 {
            (0.0, 0.0, 0.0)
        } else {
            (r / sum, f / sum, m / sum)
        }
    }
}

/// Raw recency / frequency / monetary values for one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmProfile {
    pub owner_id: String,
    /// Days since the last completed visit; None if there never was one
    pub recency_days: Option<i64>,
    /// Completed visits inside the lookback window
    pub frequency: usize,
    /// Charged amount inside the lookback window
    pub monetary: f64,
}

/// Per-dimension risk in `[0, 1]`, higher meaning more likely to churn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RfmScores {
    pub recency: f64,
    pub frequency: f64,
    pub monetary: f64,
}

impl RfmScores {
    pub fn from_profile(profile: &RfmProfile, model: &ChurnModel) -> Self {
        let recency = match profile.recency_days {
            None => 1.0,
            Some(days) => {
                let horizon = f64::from(model.recency_horizon_days.max(1));
                (days.max(0) as f64 / horizon).min(1.0)
            }
        };
        let frequency = if model.frequency_target == 0 {
            0.0
        } else {
            1.0 - (profile.frequency as f64 / f64::from(model.frequency_target)).min(1.0)
        };
        let monetary = if model.monetary_target > 0.0 && model.monetary_target.is_finite() {
            let spent = if profile.monetary.is_finite() {
                profile.monetary.max(0.0)
            } else {
                0.0
            };
            1.0 - (spent / model.monetary_target).min(1.0)
        } else {
            0.0
        };
        Self {
            recency,
            frequency,
            monetary,
        }
    }
}

/// Weighted churn risk, clamped to `[0, 1]`
pub fn churn_risk(profile: &RfmProfile, model: &ChurnModel) -> f64 {
    let scores = RfmScores::from_profile(profile, model);
    combine(&scores, model)
}

fn combine(scores: &RfmScores, model: &ChurnModel) -> f64 {
    let (wr, wf, wm) = model.normalized_weights();
    (wr * scores.recency + wf * scores.frequency + wm * scores.monetary).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.33 {
            RiskLevel::Low
        } else if score < 0.66 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnAssessment {
    pub owner_name: String,
    pub profile: RfmProfile,
    pub scores: RfmScores,
    pub risk: f64,
    pub level: RiskLevel,
}

/// RFM profile for each owner, in owner order
pub fn build_profiles(
    owners: &[DogOwner],
    appointments: &[Appointment],
    charges: &[Charge],
    today: NaiveDate,
    lookback_days: u32,
) -> Vec<RfmProfile> {
    let window_start = today
        .checked_sub_signed(Duration::days(i64::from(lookback_days.max(1)) - 1))
        .unwrap_or(NaiveDate::MIN);
    let in_window = |day: NaiveDate| day >= window_start && day <= today;

    #[derive(Default)]
    struct Acc {
        last_visit: Option<NaiveDate>,
        frequency: usize,
        monetary: f64,
    }

    let mut by_owner: HashMap<&str, Acc> = HashMap::new();
    for appt in appointments.iter().filter(|a| a.is_visit()) {
        let day = appt.day();
        if day > today {
            continue;
        }
        let acc = by_owner.entry(appt.owner_id.as_str()).or_default();
        acc.last_visit = acc.last_visit.max(Some(day));
        if in_window(day) {
            acc.frequency += 1;
        }
    }
    for charge in charges {
        if in_window(charge.date.date()) {
            by_owner.entry(charge.owner_id.as_str()).or_default().monetary += charge.amount;
        }
    }

    owners
        .iter()
        .map(|owner| {
            let acc = by_owner.get(owner.id.as_str());
            RfmProfile {
                owner_id: owner.id.clone(),
                recency_days: acc
                    .and_then(|a| a.last_visit)
                    .map(|d| (today - d).num_days()),
                frequency: acc.map(|a| a.frequency).unwrap_or(0),
                monetary: acc.map(|a| a.monetary).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Score every owner, riskiest first
pub fn assess_customers(
    owners: &[DogOwner],
    appointments: &[Appointment],
    charges: &[Charge],
    today: NaiveDate,
    model: &ChurnModel,
) -> Vec<ChurnAssessment> {
    let profiles = build_profiles(owners, appointments, charges, today, model.lookback_days);
    let mut assessments: Vec<ChurnAssessment> = owners
        .iter()
        .zip(profiles)
        .map(|(owner, profile)| {
            let scores = RfmScores::from_profile(&profile, model);
            let risk = combine(&scores, model);
            ChurnAssessment {
                owner_name: owner.name.clone(),
                profile,
                scores,
                risk,
                level: RiskLevel::from_score(risk),
            }
        })
        .collect();
    assessments.sort_by(|a, b| {
        b.risk
            .total_cmp(&a.risk)
            .then_with(|| a.profile.owner_id.cmp(&b.profile.owner_id))
    });
    assessments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppointmentStatus, ServiceType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    fn visit(id: &str, owner: &str, days_ago: i64) -> Appointment {
        let date = (today() - Duration::days(days_ago)).and_hms_opt(14, 0, 0).unwrap();
        Appointment::new(id, owner, date, ServiceType::BasicBath)
    }

    fn charge(id: &str, owner: &str, days_ago: i64, amount: f64) -> Charge {
        let date = (today() - Duration::days(days_ago)).and_hms_opt(14, 30, 0).unwrap();
        Charge::new(id, owner, date, amount)
    }

    fn profile(recency: Option<i64>, frequency: usize, monetary: f64) -> RfmProfile {
        RfmProfile {
            owner_id: "o".to_string(),
            recency_days: recency,
            frequency,
            monetary,
        }
    }

    #[test]
    fn test_fully_engaged_customer_has_zero_risk() {
        let model = ChurnModel::default();
        assert_eq!(churn_risk(&profile(Some(0), 12, 600.0), &model), 0.0);
        assert_eq!(churn_risk(&profile(Some(0), 40, 5000.0), &model), 0.0);
    }

    #[test]
    fn test_never_visited_is_max_risk() {
        let model = ChurnModel::default();
        assert!((churn_risk(&profile(None, 0, 0.0), &model) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_combination() {
        let model = ChurnModel::default();
        // recency 90/180 = 0.5, frequency 1 - 6/12 = 0.5, monetary 1 - 150/600 = 0.75
        let risk = churn_risk(&profile(Some(90), 6, 150.0), &model);
        let expected = 0.5 * 0.5 + 0.3 * 0.5 + 0.2 * 0.75;
        assert!((risk - expected).abs() < 1e-9);
        assert_eq!(RiskLevel::from_score(risk), RiskLevel::Medium);
    }

    #[test]
    fn test_weights_are_normalized() {
        let doubled = ChurnModel {
            recency_weight: 1.0,
            frequency_weight: 0.6,
            monetary_weight: 0.4,
            ..ChurnModel::default()
        };
        let p = profile(Some(45), 3, 100.0);
        assert!((churn_risk(&p, &doubled) - churn_risk(&p, &ChurnModel::default())).abs() < 1e-9);

        let zero = ChurnModel {
            recency_weight: 0.0,
            frequency_weight: 0.0,
            monetary_weight: 0.0,
            ..ChurnModel::default()
        };
        assert_eq!(churn_risk(&p, &zero), 0.0);
    }

    #[test]
    fn test_risk_stays_in_unit_interval() {
        let model = ChurnModel::default();
        for recency in [None, Some(0), Some(30), Some(500), Some(-4)] {
            for frequency in [0, 3, 100] {
                for monetary in [-50.0, 0.0, 300.0, 1e9, f64::NAN] {
                    let risk = churn_risk(&profile(recency, frequency, monetary), &model);
                    assert!((0.0..=1.0).contains(&risk), "risk {} out of range", risk);
                }
            }
        }
    }

    #[test]
    fn test_build_profiles_respects_lookback() {
        let owners = vec![DogOwner::new("o1", "Avery"), DogOwner::new("o2", "Blake")];
        let appts = vec![
            visit("1", "o1", 10),
            visit("2", "o1", 100),
            visit("3", "o1", 400),
            visit("4", "o1", 5).with_status(AppointmentStatus::NoShow),
            visit("5", "o1", -10).with_status(AppointmentStatus::Scheduled),
        ];
        let charges = vec![
            charge("c1", "o1", 10, 70.0),
            charge("c2", "o1", 400, 500.0),
            charge("c3", "o2", 3, 25.0),
        ];
        let profiles = build_profiles(&owners, &appts, &charges, today(), 365);
        assert_eq!(profiles[0].recency_days, Some(10));
        assert_eq!(profiles[0].frequency, 2);
        assert!((profiles[0].monetary - 70.0).abs() < 1e-9);
        assert_eq!(profiles[1].recency_days, None);
        assert_eq!(profiles[1].frequency, 0);
        assert!((profiles[1].monetary - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_assess_sorted_by_risk() {
        let owners = vec![
            DogOwner::new("o1", "Avery"),
            DogOwner::new("o2", "Blake"),
            DogOwner::new("o3", "Casey"),
        ];
        let appts = vec![visit("1", "o1", 3), visit("2", "o3", 150)];
        let assessments =
            assess_customers(&owners, &appts, &[], today(), &ChurnModel::default());
        let order: Vec<&str> = assessments
            .iter()
            .map(|a| a.profile.owner_id.as_str())
            .collect();
        assert_eq!(order, vec!["o2", "o3", "o1"]);
        assert_eq!(assessments[0].level, RiskLevel::High);
        assert_eq!(assessments[0].owner_name, "Blake");
    }

    #[test]
    fn test_model_validation() {
        assert!(ChurnModel::default().validate().is_ok());
        let negative = ChurnModel {
            monetary_weight: -0.1,
            ..ChurnModel::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_lookback_bounds() {
        let profiles = build_profiles(
            &[DogOwner::new("o1", "Avery")],
            &[visit("a1", "o1", 3000)],
            &[],
            today(),
            u32::MAX,
        );
        assert_eq!(profiles[0].frequency, 1);

        let oversized = ChurnModel {
            lookback_days: MAX_SPAN_DAYS + 1,
            ..ChurnModel::default()
        };
        assert!(oversized.validate().is_err());
    }
}
