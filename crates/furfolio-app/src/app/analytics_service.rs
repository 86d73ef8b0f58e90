//! Analytics Service - core use case over a grooming data snapshot
//!
//! This service orchestrates the analytics workflow:
//! 1. Validate the configuration
//! 2. Load the keyword classifier (custom rules or built-in table)
//! 3. Read one snapshot of owners, appointments, charges and notes
//! 4. Run each engine with the configured parameters
//! 5. Record every run in the audit log
//! 6. Return serializable reports, or bundle them into a full report

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use furfolio_domain::model::{Appointment, Charge, DogOwner, PetBehaviorLog, ServiceType};
use furfolio_domain::repository::GroomingDataRepository;
use furfolio_domain::service::{
    analyze_retention, assess_customers, average_duration, compare_windows, forecast_bookings,
    loyalty_for_owners, most_popular_service, no_show_rate, overall_trend, revenue_by_month,
    score_by_dog, score_logs, service_metrics, top_customers_by_revenue, BookingForecast,
    ChurnAssessment, CustomerLoyalty, CustomerRevenue, DogBehavior, KeywordClassifier,
    MonthlyRevenue, RetentionReport, ServiceMetricsReport, ServiceTrend, TrendOptions,
    WindowComparison,
};
use furfolio_types::{DateRange, Error, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audit::{AuditKind, AuditLog};
use crate::config::Config;
use crate::repository::load_classifier;

/// How many customers the overview ranks by revenue
const TOP_CUSTOMER_LIMIT: usize = 10;

/// Errors specific to the analytics service
#[derive(Debug, Error)]
pub enum AnalyticsServiceError {
    #[error("Data load failed: {0}")]
    DataLoad(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),
}

impl From<Error> for AnalyticsServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(e) => AnalyticsServiceError::ConfigError(e.to_string()),
            Error::Excel(msg) => AnalyticsServiceError::ExportFailed(msg),
            _ => AnalyticsServiceError::DataLoad(err.to_string()),
        }
    }
}

/// Immutable copy of every record the engines read
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub owners: Vec<DogOwner>,
    pub appointments: Vec<Appointment>,
    pub charges: Vec<Charge>,
    pub behavior_logs: Vec<PetBehaviorLog>,
}

impl Snapshot {
    pub fn load<R: GroomingDataRepository + ?Sized>(repo: &R) -> Result<Self> {
        Ok(Self {
            owners: repo.find_owners()?,
            appointments: repo.find_appointments()?,
            charges: repo.find_charges()?,
            behavior_logs: repo.find_behavior_logs()?,
        })
    }

    /// Appointments whose owner is not in the owner list
    fn orphaned_appointments(&self) -> usize {
        if self.owners.is_empty() {
            return 0;
        }
        let known: HashSet<&str> = self.owners.iter().map(|o| o.id.as_str()).collect();
        self.appointments
            .iter()
            .filter(|a| !known.contains(a.owner_id.as_str()))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOverview {
    #[serde(flatten)]
    pub metrics: ServiceMetricsReport,
    pub average_duration_minutes: f64,
    pub most_popular: Option<ServiceType>,
    pub no_show_rate: f64,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub top_customers: Vec<CustomerRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub as_of: NaiveDate,
    pub options: TrendOptions,
    pub overall: WindowComparison,
    pub services: Vec<ServiceTrend>,
}

/// Every report for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    pub as_of: NaiveDate,
    pub services: ServiceOverview,
    pub trends: TrendReport,
    pub forecast: BookingForecast,
    pub retention: RetentionReport,
    pub churn: Vec<ChurnAssessment>,
    pub behavior: Vec<DogBehavior>,
    pub loyalty: Vec<CustomerLoyalty>,
}

pub struct AnalyticsService {
    snapshot: Snapshot,
    config: Config,
    classifier: KeywordClassifier,
    audit: AuditLog,
}

impl AnalyticsService {
    pub fn new(
        snapshot: Snapshot,
        config: Config,
    ) -> std::result::Result<Self, AnalyticsServiceError> {
        config
            .validate()
            .map_err(|e| AnalyticsServiceError::ConfigError(e.to_string()))?;
        let classifier = load_classifier(config.keyword_rules.as_deref())?;

        let orphaned = snapshot.orphaned_appointments();
        if orphaned > 0 {
            warn!(count = orphaned, "appointments reference unknown owners");
        }

        let mut audit = AuditLog::with_capacity(config.audit_capacity);
        audit.record(
            AuditKind::SnapshotLoaded,
            format!(
                "{} owners, {} appointments, {} charges, {} behavior logs",
                snapshot.owners.len(),
                snapshot.appointments.len(),
                snapshot.charges.len(),
                snapshot.behavior_logs.len()
            ),
        );

        Ok(Self {
            snapshot,
            config,
            classifier,
            audit,
        })
    }

    pub fn from_repository<R: GroomingDataRepository + ?Sized>(
        repo: &R,
        config: Config,
    ) -> std::result::Result<Self, AnalyticsServiceError> {
        let snapshot = Snapshot::load(repo)?;
        Self::new(snapshot, config)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn service_overview(&mut self) -> ServiceOverview {
        let appts = &self.snapshot.appointments;
        let metrics = service_metrics(appts, &self.snapshot.charges);
        let overview = ServiceOverview {
            average_duration_minutes: average_duration(appts),
            most_popular: most_popular_service(appts),
            no_show_rate: no_show_rate(appts),
            revenue_by_month: revenue_by_month(&self.snapshot.charges),
            top_customers: top_customers_by_revenue(&self.snapshot.charges, TOP_CUSTOMER_LIMIT),
            metrics,
        };
        debug!(
            services = overview.metrics.services.len(),
            revenue = overview.metrics.total_revenue,
            "computed service metrics"
        );
        self.audit.record(
            AuditKind::ServiceMetrics,
            format!(
                "{} services, {} appointments",
                overview.metrics.services.len(),
                overview.metrics.total_count
            ),
        );
        overview
    }

    /// Window comparison ending at the close of `today`
    pub fn trends(&mut self, today: NaiveDate) -> TrendReport {
        let now = end_of_day(today);
        let options = self.config.trends;
        let report = TrendReport {
            as_of: today,
            overall: overall_trend(&self.snapshot.appointments, now, &options),
            services: compare_windows(&self.snapshot.appointments, now, &options),
            options,
        };
        self.audit.record(
            AuditKind::Trends,
            format!(
                "{}-day windows, overall {}",
                report.options.window_days,
                report.overall.direction.label()
            ),
        );
        report
    }

    pub fn forecast(&mut self, today: NaiveDate) -> BookingForecast {
        let range = DateRange::ending_at(today, self.config.forecast_history_days);
        let forecast = forecast_bookings(
            &self.snapshot.appointments,
            range,
            self.config.smoothing_alpha,
            self.config.forecast_horizon_days,
        );
        self.audit.record(
            AuditKind::Forecast,
            format!(
                "alpha {:.2}, level {:.2}/day over {} days",
                forecast.alpha,
                forecast.level,
                forecast.forecast.len()
            ),
        );
        forecast
    }

    pub fn retention(&mut self, today: NaiveDate) -> RetentionReport {
        let report = analyze_retention(
            &self.snapshot.owners,
            &self.snapshot.appointments,
            today,
            &self.config.retention,
        );
        self.audit.record(
            AuditKind::Retention,
            format!(
                "{} customers, retention {:.1}%",
                report.customers.len(),
                report.retention_rate * 100.0
            ),
        );
        report
    }

    pub fn churn(&mut self, today: NaiveDate) -> Vec<ChurnAssessment> {
        let assessments = assess_customers(
            &self.snapshot.owners,
            &self.snapshot.appointments,
            &self.snapshot.charges,
            today,
            &self.config.churn,
        );
        let high = assessments
            .iter()
            .filter(|a| a.level == furfolio_domain::service::RiskLevel::High)
            .count();
        self.audit.record(
            AuditKind::Churn,
            format!("{} customers, {} high risk", assessments.len(), high),
        );
        assessments
    }

    /// Behavior summaries per dog, or for the one dog given
    pub fn behavior(&mut self, dog_id: Option<&str>) -> Vec<DogBehavior> {
        let dogs = match dog_id {
            Some(id) => {
                let logs: Vec<PetBehaviorLog> = self
                    .snapshot
                    .behavior_logs
                    .iter()
                    .filter(|l| l.dog_id == id)
                    .cloned()
                    .collect();
                if logs.is_empty() {
                    Vec::new()
                } else {
                    vec![DogBehavior {
                        dog_id: id.to_string(),
                        summary: score_logs(&logs, &self.classifier),
                    }]
                }
            }
            None => score_by_dog(&self.snapshot.behavior_logs, &self.classifier),
        };
        let flagged = dogs.iter().filter(|d| d.summary.needs_attention).count();
        self.audit.record(
            AuditKind::Behavior,
            format!("{} dogs, {} need attention", dogs.len(), flagged),
        );
        dogs
    }

    pub fn loyalty(&mut self, today: NaiveDate) -> Vec<CustomerLoyalty> {
        let loyalty = loyalty_for_owners(
            &self.snapshot.owners,
            &self.snapshot.appointments,
            today,
            &self.config.loyalty,
        );
        self.audit
            .record(AuditKind::Loyalty, format!("{} customers", loyalty.len()));
        loyalty
    }

    pub fn full_report(&mut self, today: NaiveDate) -> FullReport {
        let report = FullReport {
            as_of: today,
            services: self.service_overview(),
            trends: self.trends(today),
            forecast: self.forecast(today),
            retention: self.retention(today),
            churn: self.churn(today),
            behavior: self.behavior(None),
            loyalty: self.loyalty(today),
        };
        info!(as_of = %today, "built full analytics report");
        self.audit
            .record(AuditKind::Report, format!("full report as of {}", today));
        report
    }

    /// Note an action performed outside the engines, e.g. an export
    pub fn record(&mut self, kind: AuditKind, detail: impl Into<String>) {
        self.audit.record(kind, detail);
    }
}

/// Exclusive upper bound of `today`, so bookings made today count as recent
fn end_of_day(today: NaiveDate) -> NaiveDateTime {
    today.and_time(NaiveTime::default()) + Duration::days(1)
}
