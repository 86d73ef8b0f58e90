//! Analytics engines
//!
//! Stateless aggregation over record slices. Empty input yields zero or
//! empty results rather than errors.

pub mod behavior_scoring;
pub mod churn_risk;
pub mod loyalty;
pub mod retention;
pub mod service_analytics;
pub mod service_trend;

pub use behavior_scoring::{
    classify_note, score_by_dog, score_logs, BehaviorCategory, BehaviorSummary, DogBehavior,
    KeywordClassifier, KeywordRule,
};
pub use churn_risk::{
    assess_customers, build_profiles, churn_risk, ChurnAssessment, ChurnModel, RfmProfile,
    RfmScores, RiskLevel,
};
pub use loyalty::{
    loyalty_for_owners, loyalty_status, CustomerLoyalty, LoyaltyProgram, LoyaltyStatus,
    LoyaltyTier,
};
pub use retention::{
    analyze_retention, retention_tag, CustomerRetention, RetentionReport, RetentionTag,
    RetentionThresholds, VisitHistory,
};
pub use service_analytics::{
    average_duration, most_popular_service, no_show_rate, revenue_by_month, service_metrics,
    top_customers_by_revenue, CustomerRevenue, MonthlyRevenue, ServiceMetrics,
    ServiceMetricsReport,
};
pub use service_trend::{
    compare_windows, daily_counts, exponential_smoothing, forecast_bookings, overall_trend,
    percent_change, BookingForecast, DailyCount, DailyForecast, ServiceTrend, TrendDirection,
    TrendOptions, WindowComparison,
};
