//! Per-service counts, durations and revenue

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, AppointmentStatus, Charge, ServiceType};

/// Aggregates for one service category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub service_type: ServiceType,
    pub count: usize,
    /// Mean over appointments with a recorded duration; 0 if none
    pub average_duration_minutes: f64,
    /// How many appointments contributed a duration
    pub timed_count: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetricsReport {
    pub services: Vec<ServiceMetrics>,
    pub total_count: usize,
    /// Sum of `total_revenue` over `services`
    pub total_revenue: f64,
    /// Charges with no usable appointment link (retail, cancelled, unknown id)
    pub unattributed_revenue: f64,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    duration_sum: u64,
    timed: usize,
    revenue: f64,
}

/// Group appointments and charges by service type.
///
/// Cancelled appointments are skipped; their charges fall into
/// `unattributed_revenue` together with charges that reference no known
/// appointment.
pub fn service_metrics(appointments: &[Appointment], charges: &[Charge]) -> ServiceMetricsReport {
    let mut by_service: HashMap<&ServiceType, Accumulator> = HashMap::new();
    let mut service_of: HashMap<&str, &ServiceType> = HashMap::new();

    for appt in appointments.iter().filter(|a| !a.is_cancelled()) {
        service_of.insert(appt.id.as_str(), &appt.service_type);
        let acc = by_service.entry(&appt.service_type).or_default();
        acc.count += 1;
        if let Some(minutes) = appt.duration_minutes {
            acc.duration_sum += u64::from(minutes);
            acc.timed += 1;
        }
    }

    let mut unattributed_revenue = 0.0;
    for charge in charges {
        let service = charge
            .appointment_id
            .as_deref()
            .and_then(|id| service_of.get(id).copied());
        match service {
            Some(service) => by_service.entry(service).or_default().revenue += charge.amount,
            None => unattributed_revenue += charge.amount,
        }
    }

    let mut services: Vec<ServiceMetrics> = by_service
        .into_iter()
        .map(|(service_type, acc)| ServiceMetrics {
            service_type: service_type.clone(),
            count: acc.count,
            average_duration_minutes: if acc.timed == 0 {
                0.0
            } else {
                acc.duration_sum as f64 / acc.timed as f64
            },
            timed_count: acc.timed,
            total_revenue: acc.revenue,
        })
        .collect();
    services.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.service_type.label().cmp(b.service_type.label()))
    });

    let total_count = services.iter().map(|s| s.count).sum();
    let total_revenue = services.iter().map(|s| s.total_revenue).sum();

    ServiceMetricsReport {
        services,
        total_count,
        total_revenue,
        unattributed_revenue,
    }
}

/// Mean duration in minutes over non-cancelled appointments that recorded
/// one, matching the per-service figures of [`service_metrics`]
pub fn average_duration(appointments: &[Appointment]) -> f64 {
    let (sum, n) = appointments
        .iter()
        .filter(|a| !a.is_cancelled())
        .filter_map(|a| a.duration_minutes)
        .fold((0u64, 0usize), |(sum, n), m| (sum + u64::from(m), n + 1));
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}

/// Most booked service, ignoring cancellations. Ties go to the label that
/// sorts first.
pub fn most_popular_service(appointments: &[Appointment]) -> Option<ServiceType> {
    let mut counts: HashMap<&ServiceType, usize> = HashMap::new();
    for appt in appointments.iter().filter(|a| !a.is_cancelled()) {
        *counts.entry(&appt.service_type).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(sa, ca), (sb, cb)| ca.cmp(cb).then_with(|| sb.label().cmp(sa.label())))
        .map(|(service, _)| service.clone())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub charge_count: usize,
}

/// Charge totals bucketed by calendar month, oldest first
pub fn revenue_by_month(charges: &[Charge]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for charge in charges {
        let key = (charge.date.year(), charge.date.month());
        let entry = months.entry(key).or_insert((0.0, 0));
        entry.0 += charge.amount;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|((year, month), (total, charge_count))| MonthlyRevenue {
            year,
            month,
            total,
            charge_count,
        })
        .collect()
}

/// Share of due appointments (completed or no-show) that were missed
pub fn no_show_rate(appointments: &[Appointment]) -> f64 {
    let mut due = 0usize;
    let mut missed = 0usize;
    for appt in appointments {
        match appt.status {
            AppointmentStatus::Completed => due += 1,
            AppointmentStatus::NoShow => {
                due += 1;
                missed += 1;
            }
            _ => {}
        }
    }
    if due == 0 {
        0.0
    } else {
        missed as f64 / due as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub owner_id: String,
    pub total: f64,
    pub charge_count: usize,
}

/// Highest-spending owners, at most `limit` of them
pub fn top_customers_by_revenue(charges: &[Charge], limit: usize) -> Vec<CustomerRevenue> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for charge in charges {
        let entry = totals.entry(charge.owner_id.as_str()).or_insert((0.0, 0));
        entry.0 += charge.amount;
        entry.1 += 1;
    }
    let mut ranked: Vec<CustomerRevenue> = totals
        .into_iter()
        .map(|(owner_id, (total, charge_count))| CustomerRevenue {
            owner_id: owner_id.to_string(),
            total,
            charge_count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.owner_id.cmp(&b.owner_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn sample_appointments() -> Vec<Appointment> {
        vec![
            Appointment::new("a1", "o1", at(2024, 1, 5), ServiceType::FullGroom).with_duration(90),
            Appointment::new("a2", "o2", at(2024, 1, 6), ServiceType::FullGroom).with_duration(120),
            Appointment::new("a3", "o1", at(2024, 2, 1), ServiceType::FullGroom),
            Appointment::new("a4", "o3", at(2024, 2, 2), ServiceType::NailTrim).with_duration(15),
            Appointment::new("a5", "o3", at(2024, 2, 3), ServiceType::BasicBath)
                .with_status(AppointmentStatus::Cancelled),
        ]
    }

    fn sample_charges() -> Vec<Charge> {
        vec![
            Charge::new("c1", "o1", at(2024, 1, 5), 80.0).for_appointment("a1"),
            Charge::new("c2", "o2", at(2024, 1, 6), 95.5).for_appointment("a2"),
            Charge::new("c3", "o3", at(2024, 2, 2), 20.0).for_appointment("a4"),
            Charge::new("c4", "o3", at(2024, 2, 3), 10.0).for_appointment("a5"),
            Charge::new("c5", "o1", at(2024, 2, 1), 12.0),
        ]
    }

    #[test]
    fn test_metrics_per_service() {
        let report = service_metrics(&sample_appointments(), &sample_charges());
        assert_eq!(report.services.len(), 2);

        let groom = &report.services[0];
        assert_eq!(groom.service_type, ServiceType::FullGroom);
        assert_eq!(groom.count, 3);
        assert_eq!(groom.timed_count, 2);
        assert!((groom.average_duration_minutes - 105.0).abs() < 1e-9);
        assert!((groom.total_revenue - 175.5).abs() < 1e-9);

        let nails = &report.services[1];
        assert_eq!(nails.service_type, ServiceType::NailTrim);
        assert_eq!(nails.count, 1);
    }

    #[test]
    fn test_category_totals_sum_to_overall() {
        let report = service_metrics(&sample_appointments(), &sample_charges());
        let count: usize = report.services.iter().map(|s| s.count).sum();
        let revenue: f64 = report.services.iter().map(|s| s.total_revenue).sum();
        assert_eq!(report.total_count, count);
        assert_eq!(report.total_count, 4);
        assert!((report.total_revenue - revenue).abs() < 1e-9);
        // cancelled appointment's charge and the walk-in charge
        assert!((report.unattributed_revenue - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let report = service_metrics(&[], &[]);
        assert!(report.services.is_empty());
        assert_eq!(report.total_count, 0);
        assert_eq!(report.total_revenue, 0.0);
        assert_eq!(average_duration(&[]), 0.0);
        assert_eq!(most_popular_service(&[]), None);
        assert_eq!(no_show_rate(&[]), 0.0);
    }

    #[test]
    fn test_average_duration_ignores_missing() {
        let appts = sample_appointments();
        // 90, 120, 15 recorded; a3 and a5 have none
        assert!((average_duration(&appts) - 75.0).abs() < 1e-9);

        let untimed = vec![Appointment::new("x", "o", at(2024, 1, 1), ServiceType::Teeth)];
        assert_eq!(average_duration(&untimed), 0.0);
    }

    #[test]
    fn test_average_duration_skips_cancelled() {
        let mut appts = sample_appointments();
        appts.push(
            Appointment::new("a6", "o2", at(2024, 2, 4), ServiceType::FullGroom)
                .with_duration(600)
                .with_status(AppointmentStatus::Cancelled),
        );
        assert!((average_duration(&appts) - 75.0).abs() < 1e-9);

        let report = service_metrics(&appts, &[]);
        let timed: usize = report.services.iter().map(|s| s.timed_count).sum();
        let minutes: f64 = report
            .services
            .iter()
            .map(|s| s.average_duration_minutes * s.timed_count as f64)
            .sum();
        assert!((minutes / timed as f64 - average_duration(&appts)).abs() < 1e-9);
    }

    #[test]
    fn test_most_popular_tie_breaks_by_label() {
        let appts = vec![
            Appointment::new("1", "o", at(2024, 1, 1), ServiceType::NailTrim),
            Appointment::new("2", "o", at(2024, 1, 2), ServiceType::BasicBath),
        ];
        assert_eq!(most_popular_service(&appts), Some(ServiceType::BasicBath));
        assert_eq!(
            most_popular_service(&sample_appointments()),
            Some(ServiceType::FullGroom)
        );
    }

    #[test]
    fn test_revenue_by_month() {
        let months = revenue_by_month(&sample_charges());
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 1));
        assert!((months[0].total - 175.5).abs() < 1e-9);
        assert_eq!(months[1].charge_count, 3);
    }

    #[test]
    fn test_no_show_rate() {
        let appts = vec![
            Appointment::new("1", "o", at(2024, 1, 1), ServiceType::BasicBath),
            Appointment::new("2", "o", at(2024, 1, 2), ServiceType::BasicBath)
                .with_status(AppointmentStatus::NoShow),
            Appointment::new("3", "o", at(2024, 1, 3), ServiceType::BasicBath)
                .with_status(AppointmentStatus::Scheduled),
            Appointment::new("4", "o", at(2024, 1, 4), ServiceType::BasicBath)
                .with_status(AppointmentStatus::Cancelled),
        ];
        assert!((no_show_rate(&appts) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_top_customers() {
        let top = top_customers_by_revenue(&sample_charges(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].owner_id, "o2");
        assert_eq!(top[1].owner_id, "o1");
        assert!((top[1].total - 92.0).abs() < 1e-9);
    }
}
