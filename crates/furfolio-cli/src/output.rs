//! Output formatting module

use furfolio_app::app::{FullReport, ServiceOverview, TrendReport};
use furfolio_domain::service::{
    BookingForecast, ChurnAssessment, CustomerLoyalty, DogBehavior, RetentionReport,
    RetentionTag, RiskLevel, WindowComparison,
};
use furfolio_types::{OutputFormat, Result};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub fn output_services(output_format: OutputFormat, overview: &ServiceOverview) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(overview);
    }
    print_services(overview);
    Ok(())
}

fn print_services(overview: &ServiceOverview) {
    let metrics = &overview.metrics;
    println!("\nService Metrics");
    println!("===============");
    println!(
        "{:<20} {:>6} {:>10} {:>12}",
        "Service", "Count", "Avg min", "Revenue"
    );
    println!("{}", "-".repeat(51));
    for s in &metrics.services {
        println!(
            "{:<20} {:>6} {:>10.1} {:>12.2}",
            s.service_type.label(),
            s.count,
            s.average_duration_minutes,
            s.total_revenue
        );
    }
    println!("{}", "-".repeat(51));
    println!(
        "{:<20} {:>6} {:>10.1} {:>12.2}",
        "Total", metrics.total_count, overview.average_duration_minutes, metrics.total_revenue
    );
    println!();
    println!("Unattributed:    {:.2}", metrics.unattributed_revenue);
    println!("No-show rate:    {}", percent(overview.no_show_rate));
    if let Some(ref service) = overview.most_popular {
        println!("Most popular:    {}", service);
    }

    if !overview.top_customers.is_empty() {
        println!("\nTop customers by revenue:");
        for c in &overview.top_customers {
            println!("  {:<16} {:>10.2} ({} charges)", c.owner_id, c.total, c.charge_count);
        }
    }
}

fn trend_line(label: &str, c: &WindowComparison) -> String {
    format!(
        "{:<20} {:>7} {:>9} {:>+9.1}%  {}",
        label,
        c.recent_count,
        c.previous_count,
        c.percent_change,
        c.direction.label()
    )
}

pub fn output_trends(output_format: OutputFormat, report: &TrendReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }
    print_trends(report);
    Ok(())
}

fn print_trends(report: &TrendReport) {
    println!(
        "\nBooking Trends ({}-day windows, as of {})",
        report.options.window_days, report.as_of
    );
    println!("==========================================");
    println!(
        "{:<20} {:>7} {:>9} {:>10}  {}",
        "Service", "Recent", "Previous", "Change", "Trend"
    );
    println!("{}", "-".repeat(60));
    for t in &report.services {
        println!("{}", trend_line(t.service_type.label(), &t.comparison));
    }
    println!("{}", "-".repeat(60));
    println!("{}", trend_line("All services", &report.overall));
}

pub fn output_forecast(output_format: OutputFormat, forecast: &BookingForecast) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(forecast);
    }

    println!("\nBooking Forecast (alpha {:.2})", forecast.alpha);
    println!("=============================");
    let total: usize = forecast.history.iter().map(|d| d.count).sum();
    if let (Some(first), Some(last)) = (forecast.history.first(), forecast.history.last()) {
        println!(
            "History:         {} to {} ({} bookings)",
            first.date, last.date, total
        );
    }
    println!("Smoothed level:  {:.2} bookings/day", forecast.level);
    println!();
    for day in &forecast.forecast {
        println!("  {}  {:>6.2}", day.date, day.expected);
    }
    Ok(())
}

pub fn output_retention(output_format: OutputFormat, report: &RetentionReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }
    print_retention(report);
    Ok(())
}

fn print_retention(report: &RetentionReport) {
    println!("\nCustomer Retention (as of {})", report.as_of);
    println!("====================================");
    for tag in RetentionTag::ALL {
        println!("  {:<10} {:>5}", tag.label(), report.count(tag));
    }
    println!("Retention rate:  {}", percent(report.retention_rate));
    println!();
    println!(
        "{:<12} {:<24} {:<10} {:>6} {:>10}",
        "Owner", "Name", "Tag", "Visits", "Last (d)"
    );
    println!("{}", "-".repeat(66));
    for c in &report.customers {
        println!(
            "{:<12} {:<24} {:<10} {:>6} {:>10}",
            c.owner_id,
            c.owner_name,
            c.tag.label(),
            c.visit_count,
            c.days_since_last_visit
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

pub fn output_churn(output_format: OutputFormat, assessments: &[ChurnAssessment]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(assessments);
    }

    println!("\nChurn Risk");
    println!("==========");
    println!(
        "{:<12} {:<24} {:>6} {:<7} {:>8} {:>6} {:>10}",
        "Owner", "Name", "Risk", "Level", "Recency", "Visits", "Spend"
    );
    println!("{}", "-".repeat(79));
    for a in assessments {
        let p = &a.profile;
        println!(
            "{:<12} {:<24} {:>6.2} {:<7} {:>8} {:>6} {:>10.2}",
            p.owner_id,
            a.owner_name,
            a.risk,
            a.level.label(),
            p.recency_days
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string()),
            p.frequency,
            p.monetary
        );
    }
    Ok(())
}

pub fn output_behavior(output_format: OutputFormat, dogs: &[DogBehavior]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(dogs);
    }

    println!("\nBehavior Summary");
    println!("================");
    if dogs.is_empty() {
        println!("No behavior logs");
        return Ok(());
    }
    for dog in dogs {
        let s = &dog.summary;
        let flag = if s.needs_attention { "  [attention]" } else { "" };
        println!(
            "{:<12} {:>3} notes  avg severity {:.2}  dominant {:<12} latest {}{}",
            dog.dog_id,
            s.total_logs,
            s.average_severity,
            s.dominant.map(|c| c.label()).unwrap_or("-"),
            s.latest.map(|c| c.label()).unwrap_or("-"),
            flag
        );
    }
    Ok(())
}

pub fn output_loyalty(output_format: OutputFormat, loyalty: &[CustomerLoyalty]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(loyalty);
    }

    println!("\nLoyalty");
    println!("=======");
    println!(
        "{:<12} {:<24} {:>6} {:<9} {:>7} {:>8}",
        "Owner", "Name", "Visits", "Tier", "Rewards", "Next in"
    );
    println!("{}", "-".repeat(71));
    for c in loyalty {
        let s = &c.status;
        println!(
            "{:<12} {:<24} {:>6} {:<9} {:>7} {:>8}",
            c.owner_id,
            c.owner_name,
            s.visits,
            s.tier.label(),
            s.rewards_earned,
            s.visits_until_next_reward
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

pub fn output_report(output_format: OutputFormat, report: &FullReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }

    println!("Furfolio Report as of {}", report.as_of);
    print_services(&report.services);
    print_trends(&report.trends);
    print_retention(&report.retention);

    let high_risk = report
        .churn
        .iter()
        .filter(|a| a.level == RiskLevel::High)
        .count();
    println!("\nHigh churn risk: {} of {} customers", high_risk, report.churn.len());
    let flagged = report
        .behavior
        .iter()
        .filter(|d| d.summary.needs_attention)
        .count();
    println!("Dogs needing attention: {}", flagged);
    println!(
        "Forecast level: {:.2} bookings/day over the next {} days",
        report.forecast.level,
        report.forecast.forecast.len()
    );
    Ok(())
}
