//! Excel export of the full analytics report

use std::path::Path;

use furfolio_domain::service::RetentionTag;
use furfolio_types::{Error, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::app::FullReport;
use crate::audit::AuditLog;

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Write the report to an `.xlsx` workbook, one sheet per analysis.
/// The audit trail goes to an Activity sheet when given.
pub fn export_report_to_excel(
    report: &FullReport,
    audit: Option<&AuditLog>,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    write_summary_sheet(workbook.add_worksheet(), report)?;
    write_services_sheet(workbook.add_worksheet(), report)?;
    write_retention_sheet(workbook.add_worksheet(), report)?;
    write_churn_sheet(workbook.add_worksheet(), report)?;
    write_loyalty_sheet(workbook.add_worksheet(), report)?;
    if let Some(audit) = audit {
        write_activity_sheet(workbook.add_worksheet(), audit)?;
    }

    workbook.save(output_path).map_err(excel_err)?;
    info!(path = %output_path.display(), "exported report workbook");

    Ok(())
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, format)
            .map_err(excel_err)?;
    }
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, report: &FullReport) -> Result<()> {
    sheet.set_name("Summary").map_err(excel_err)?;
    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "Furfolio Analytics Report", &header_format)
        .map_err(excel_err)?;

    let services = &report.services;
    let rows: Vec<(&str, String)> = vec![
        ("As of:", report.as_of.to_string()),
        ("Appointments:", services.metrics.total_count.to_string()),
        ("Revenue:", format!("{:.2}", services.metrics.total_revenue)),
        (
            "Unattributed revenue:",
            format!("{:.2}", services.metrics.unattributed_revenue),
        ),
        (
            "Average duration (min):",
            format!("{:.1}", services.average_duration_minutes),
        ),
        (
            "Most popular service:",
            services
                .most_popular
                .as_ref()
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("No-show rate:", format!("{:.1}%", services.no_show_rate * 100.0)),
        (
            "Booking trend:",
            format!(
                "{} ({:+.1}%)",
                report.trends.overall.direction.label(),
                report.trends.overall.percent_change
            ),
        ),
        (
            "Forecast (bookings/day):",
            format!("{:.2}", report.forecast.level),
        ),
        (
            "Retention rate:",
            format!("{:.1}%", report.retention.retention_rate * 100.0),
        ),
    ];

    for (i, (label, value)) in rows.iter().enumerate() {
        let row = (i + 2) as u32;
        sheet.write_string(row, 0, *label).map_err(excel_err)?;
        sheet.write_string(row, 1, value).map_err(excel_err)?;
    }

    let mut row = (rows.len() + 3) as u32;
    sheet
        .write_string_with_format(row, 0, "Retention Tags", &header_format)
        .map_err(excel_err)?;
    row += 1;
    for tag in RetentionTag::ALL {
        sheet.write_string(row, 0, tag.label()).map_err(excel_err)?;
        sheet
            .write_number(row, 1, report.retention.count(tag) as f64)
            .map_err(excel_err)?;
        row += 1;
    }

    sheet.set_column_width(0, 26).map_err(excel_err)?;
    sheet.set_column_width(1, 20).map_err(excel_err)?;

    Ok(())
}

fn write_services_sheet(sheet: &mut Worksheet, report: &FullReport) -> Result<()> {
    sheet.set_name("Services").map_err(excel_err)?;
    let header_format = Format::new().set_bold();
    write_headers(
        sheet,
        &[
            "Service",
            "Appointments",
            "Avg Duration (min)",
            "Timed",
            "Revenue",
            "Trend",
            "Change %",
        ],
        &header_format,
    )?;

    for (i, metrics) in report.services.metrics.services.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet
            .write_string(row, 0, metrics.service_type.label())
            .map_err(excel_err)?;
        sheet
            .write_number(row, 1, metrics.count as f64)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 2, metrics.average_duration_minutes)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 3, metrics.timed_count as f64)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 4, metrics.total_revenue)
            .map_err(excel_err)?;

        if let Some(trend) = report
            .trends
            .services
            .iter()
            .find(|t| t.service_type == metrics.service_type)
        {
            sheet
                .write_string(row, 5, trend.comparison.direction.label())
                .map_err(excel_err)?;
            sheet
                .write_number(row, 6, trend.comparison.percent_change)
                .map_err(excel_err)?;
        }
    }

    sheet.set_column_width(0, 18).map_err(excel_err)?;
    sheet.set_column_width(2, 18).map_err(excel_err)?;

    Ok(())
}

fn write_retention_sheet(sheet: &mut Worksheet, report: &FullReport) -> Result<()> {
    sheet.set_name("Retention").map_err(excel_err)?;
    let header_format = Format::new().set_bold();
    write_headers(
        sheet,
        &["Owner ID", "Name", "Tag", "Visits", "Days Since Last Visit"],
        &header_format,
    )?;

    for (i, customer) in report.retention.customers.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet
            .write_string(row, 0, &customer.owner_id)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 1, &customer.owner_name)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 2, customer.tag.label())
            .map_err(excel_err)?;
        sheet
            .write_number(row, 3, customer.visit_count as f64)
            .map_err(excel_err)?;
        if let Some(days) = customer.days_since_last_visit {
            sheet.write_number(row, 4, days as f64).map_err(excel_err)?;
        }
    }

    sheet.set_column_width(1, 24).map_err(excel_err)?;

    Ok(())
}

fn write_churn_sheet(sheet: &mut Worksheet, report: &FullReport) -> Result<()> {
    sheet.set_name("Churn").map_err(excel_err)?;
    let header_format = Format::new().set_bold();
    write_headers(
        sheet,
        &[
            "Owner ID",
            "Name",
            "Risk",
            "Level",
            "Recency (days)",
            "Visits",
            "Spend",
        ],
        &header_format,
    )?;

    for (i, assessment) in report.churn.iter().enumerate() {
        let row = (i + 1) as u32;
        let profile = &assessment.profile;
        sheet
            .write_string(row, 0, &profile.owner_id)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 1, &assessment.owner_name)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 2, assessment.risk)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 3, assessment.level.label())
            .map_err(excel_err)?;
        if let Some(days) = profile.recency_days {
            sheet.write_number(row, 4, days as f64).map_err(excel_err)?;
        }
        sheet
            .write_number(row, 5, profile.frequency as f64)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 6, profile.monetary)
            .map_err(excel_err)?;
    }

    sheet.set_column_width(1, 24).map_err(excel_err)?;

    Ok(())
}

fn write_loyalty_sheet(sheet: &mut Worksheet, report: &FullReport) -> Result<()> {
    sheet.set_name("Loyalty").map_err(excel_err)?;
    let header_format = Format::new().set_bold();
    write_headers(
        sheet,
        &["Owner ID", "Name", "Visits", "Tier", "Rewards", "Visits To Next"],
        &header_format,
    )?;

    for (i, customer) in report.loyalty.iter().enumerate() {
        let row = (i + 1) as u32;
        let status = &customer.status;
        sheet
            .write_string(row, 0, &customer.owner_id)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 1, &customer.owner_name)
            .map_err(excel_err)?;
        sheet
            .write_number(row, 2, status.visits as f64)
            .map_err(excel_err)?;
        sheet
            .write_string(row, 3, status.tier.label())
            .map_err(excel_err)?;
        sheet
            .write_number(row, 4, status.rewards_earned as f64)
            .map_err(excel_err)?;
        if let Some(next) = status.visits_until_next_reward {
            sheet.write_number(row, 5, next as f64).map_err(excel_err)?;
        }
    }

    sheet.set_column_width(1, 24).map_err(excel_err)?;

    Ok(())
}

fn write_activity_sheet(sheet: &mut Worksheet, audit: &AuditLog) -> Result<()> {
    sheet.set_name("Activity").map_err(excel_err)?;
    let header_format = Format::new().set_bold();
    write_headers(sheet, &["Timestamp", "Kind", "Detail"], &header_format)?;

    for (i, event) in audit.events().enumerate() {
        let row = (i + 1) as u32;
        sheet
            .write_string(row, 0, event.timestamp.to_rfc3339())
            .map_err(excel_err)?;
        sheet
            .write_string(row, 1, event.kind.label())
            .map_err(excel_err)?;
        sheet
            .write_string(row, 2, &event.detail)
            .map_err(excel_err)?;
    }

    sheet.set_column_width(0, 28).map_err(excel_err)?;
    sheet.set_column_width(2, 48).map_err(excel_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AnalyticsService, Snapshot};
    use crate::audit::AuditKind;
    use crate::config::Config;
    use chrono::NaiveDate;
    use furfolio_domain::model::{Appointment, DogOwner, ServiceType};
    use tempfile::tempdir;

    #[test]
    fn test_export_writes_workbook() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let snapshot = Snapshot {
            owners: vec![DogOwner::new("o1", "Alice")],
            appointments: vec![Appointment::new(
                "a1",
                "o1",
                date.and_hms_opt(9, 0, 0).unwrap(),
                ServiceType::FullGroom,
            )],
            ..Snapshot::default()
        };
        let mut service = AnalyticsService::new(snapshot, Config::default()).unwrap();
        let report = service.full_report(date);
        service.record(AuditKind::Export, "test");

        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        export_report_to_excel(&report, Some(service.audit_log()), &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_export_empty_report() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut service = AnalyticsService::new(Snapshot::default(), Config::default()).unwrap();
        let report = service.full_report(date);

        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        export_report_to_excel(&report, None, &path).unwrap();
        assert!(path.exists());
    }
}
