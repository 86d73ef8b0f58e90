//! Windowed booking trends and exponential-smoothing forecasts

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use furfolio_types::DateRange;
use serde::{Deserialize, Serialize};

use crate::model::{Appointment, ServiceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Steady,
}

impl TrendDirection {
    /// Classify a percent change; values inside `±band` are steady
    pub fn from_percent(percent: f64, band: f64) -> Self {
        let band = band.abs();
        if percent > band {
            TrendDirection::Rising
        } else if percent < -band {
            TrendDirection::Falling
        } else {
            TrendDirection::Steady
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Steady => "steady",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendOptions {
    /// Length of each comparison window
    pub window_days: u32,
    /// Percent changes within this band count as steady
    pub steady_band_percent: f64,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            window_days: 30,
            steady_band_percent: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowComparison {
    pub recent_count: usize,
    pub previous_count: usize,
    pub percent_change: f64,
    pub direction: TrendDirection,
}

impl WindowComparison {
    fn new(recent_count: usize, previous_count: usize, band: f64) -> Self {
        let percent_change = percent_change(recent_count, previous_count);
        Self {
            recent_count,
            previous_count,
            percent_change,
            direction: TrendDirection::from_percent(percent_change, band),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTrend {
    pub service_type: ServiceType,
    #[serde(flatten)]
    pub comparison: WindowComparison,
}

/// Growth from `previous` to `recent` in percent.
///
/// A zero previous count reports 100% growth when anything was booked
/// recently and 0% otherwise.
pub fn percent_change(recent: usize, previous: usize) -> f64 {
    if previous == 0 {
        return if recent > 0 { 100.0 } else { 0.0 };
    }
    (recent as f64 - previous as f64) / previous as f64 * 100.0
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Window {
    Recent,
    Previous,
}

/// Half-open windows `[now - w, now)` and `[now - 2w, now - w)`
fn window_of(date: NaiveDateTime, now: NaiveDateTime, window_days: u32) -> Option<Window> {
    let width = Duration::days(i64::from(window_days.max(1)));
    let cutoff = now.checked_sub_signed(width).unwrap_or(NaiveDateTime::MIN);
    let start = cutoff.checked_sub_signed(width).unwrap_or(NaiveDateTime::MIN);
    if date >= cutoff && date < now {
        Some(Window::Recent)
    } else if date >= start && date < cutoff {
        Some(Window::Previous)
    } else {
        None
    }
}

/// Compare booking counts per service between the recent and previous window.
///
/// Services booked in either window are listed, busiest recent first.
pub fn compare_windows(
    appointments: &[Appointment],
    now: NaiveDateTime,
    options: &TrendOptions,
) -> Vec<ServiceTrend> {
    let mut counts: HashMap<&ServiceType, (usize, usize)> = HashMap::new();
    for appt in appointments.iter().filter(|a| !a.is_cancelled()) {
        match window_of(appt.date, now, options.window_days) {
            Some(Window::Recent) => counts.entry(&appt.service_type).or_default().0 += 1,
            Some(Window::Previous) => counts.entry(&appt.service_type).or_default().1 += 1,
            None => {}
        }
    }

    let mut trends: Vec<ServiceTrend> = counts
        .into_iter()
        .map(|(service_type, (recent, previous))| ServiceTrend {
            service_type: service_type.clone(),
            comparison: WindowComparison::new(recent, previous, options.steady_band_percent),
        })
        .collect();
    trends.sort_by(|a, b| {
        b.comparison
            .recent_count
            .cmp(&a.comparison.recent_count)
            .then_with(|| a.service_type.label().cmp(b.service_type.label()))
    });
    trends
}

/// Same comparison as [`compare_windows`] across all services
pub fn overall_trend(
    appointments: &[Appointment],
    now: NaiveDateTime,
    options: &TrendOptions,
) -> WindowComparison {
    let (recent, previous) = appointments
        .iter()
        .filter(|a| !a.is_cancelled())
        .fold((0, 0), |(recent, previous), appt| {
            match window_of(appt.date, now, options.window_days) {
                Some(Window::Recent) => (recent + 1, previous),
                Some(Window::Previous) => (recent, previous + 1),
                None => (recent, previous),
            }
        });
    WindowComparison::new(recent, previous, options.steady_band_percent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Non-cancelled bookings per calendar day over `range`, zero-filled
pub fn daily_counts(appointments: &[Appointment], range: DateRange) -> Vec<DailyCount> {
    let mut buckets = vec![0usize; range.len_days() as usize];
    for appt in appointments.iter().filter(|a| !a.is_cancelled()) {
        let day = appt.day();
        if range.contains(day) {
            buckets[(day - range.start).num_days() as usize] += 1;
        }
    }
    range
        .days()
        .zip(buckets)
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Simple exponential smoothing seeded with the first observation.
///
/// `s_0 = x_0`, `s_t = alpha * x_t + (1 - alpha) * s_{t-1}`. `alpha` is
/// clamped to `[0, 1]`.
pub fn exponential_smoothing(series: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    let mut smoothed = Vec::with_capacity(series.len());
    let mut iter = series.iter();
    let Some(&seed) = iter.next() else {
        return smoothed;
    };
    let mut level = seed;
    smoothed.push(level);
    for &x in iter {
        level = alpha * x + (1.0 - alpha) * level;
        smoothed.push(level);
    }
    smoothed
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub expected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingForecast {
    pub alpha: f64,
    pub history: Vec<DailyCount>,
    pub smoothed: Vec<f64>,
    /// Last smoothed value; the flat level projected forward
    pub level: f64,
    pub forecast: Vec<DailyForecast>,
}

/// Smooth daily bookings over `range` and project `horizon_days` ahead
pub fn forecast_bookings(
    appointments: &[Appointment],
    range: DateRange,
    alpha: f64,
    horizon_days: u32,
) -> BookingForecast {
    let history = daily_counts(appointments, range);
    let series: Vec<f64> = history.iter().map(|d| d.count as f64).collect();
    let smoothed = exponential_smoothing(&series, alpha);
    let level = smoothed.last().copied().unwrap_or(0.0);

    let forecast = (1..=i64::from(horizon_days))
        .map_while(|offset| range.end.checked_add_signed(Duration::days(offset)))
        .map(|date| DailyForecast {
            date,
            expected: level,
        })
        .collect();

    BookingForecast {
        alpha: if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) },
        history,
        smoothed,
        level,
        forecast,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppointmentStatus;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(9, 30, 0).unwrap()
    }

    fn booking(id: &str, date: NaiveDate, service: ServiceType) -> Appointment {
        Appointment::new(id, "owner", at(date), service)
    }

    #[test]
    fn test_percent_change_zero_previous() {
        assert_eq!(percent_change(0, 0), 0.0);
        assert_eq!(percent_change(4, 0), 100.0);
        assert_eq!(percent_change(6, 4), 50.0);
        assert_eq!(percent_change(1, 4), -75.0);
    }

    #[test]
    fn test_direction_band() {
        assert_eq!(TrendDirection::from_percent(4.9, 5.0), TrendDirection::Steady);
        assert_eq!(TrendDirection::from_percent(-5.0, 5.0), TrendDirection::Steady);
        assert_eq!(TrendDirection::from_percent(5.1, 5.0), TrendDirection::Rising);
        assert_eq!(TrendDirection::from_percent(-30.0, 5.0), TrendDirection::Falling);
    }

    #[test]
    fn test_compare_windows_disjoint() {
        let now = day(2024, 3, 31).and_hms_opt(0, 0, 0).unwrap();
        let options = TrendOptions {
            window_days: 10,
            steady_band_percent: 5.0,
        };
        let appts = vec![
            // recent window [03-21, 03-31)
            booking("1", day(2024, 3, 21), ServiceType::FullGroom),
            booking("2", day(2024, 3, 30), ServiceType::FullGroom),
            booking("3", day(2024, 3, 25), ServiceType::NailTrim),
            // previous window [03-11, 03-21)
            booking("4", day(2024, 3, 11), ServiceType::FullGroom),
            booking("5", day(2024, 3, 20), ServiceType::NailTrim),
            booking("6", day(2024, 3, 15), ServiceType::NailTrim),
            // outside both
            booking("7", day(2024, 3, 10), ServiceType::FullGroom),
            booking("8", day(2024, 3, 31), ServiceType::FullGroom),
            booking("9", day(2024, 3, 22), ServiceType::FullGroom)
                .with_status(AppointmentStatus::Cancelled),
        ];

        let trends = compare_windows(&appts, now, &options);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].service_type, ServiceType::FullGroom);
        assert_eq!(trends[0].comparison.recent_count, 2);
        assert_eq!(trends[0].comparison.previous_count, 1);
        assert_eq!(trends[0].comparison.percent_change, 100.0);
        assert_eq!(trends[0].comparison.direction, TrendDirection::Rising);
        assert_eq!(trends[1].comparison.recent_count, 1);
        assert_eq!(trends[1].comparison.previous_count, 2);
        assert_eq!(trends[1].comparison.direction, TrendDirection::Falling);

        let overall = overall_trend(&appts, now, &options);
        assert_eq!(overall.recent_count, 3);
        assert_eq!(overall.previous_count, 3);
        assert_eq!(overall.direction, TrendDirection::Steady);
    }

    #[test]
    fn test_daily_counts_zero_filled() {
        let range = DateRange::new(day(2024, 5, 1), day(2024, 5, 4)).unwrap();
        let appts = vec![
            booking("1", day(2024, 5, 1), ServiceType::BasicBath),
            booking("2", day(2024, 5, 1), ServiceType::Teeth),
            booking("3", day(2024, 5, 3), ServiceType::BasicBath),
            booking("4", day(2024, 5, 9), ServiceType::BasicBath),
        ];
        let counts: Vec<usize> = daily_counts(&appts, range).iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![2, 0, 1, 0]);
    }

    #[test]
    fn test_smoothing_alpha_zero_returns_seed() {
        let smoothed = exponential_smoothing(&[3.0, 10.0, 0.0, 7.0], 0.0);
        assert_eq!(smoothed, vec![3.0; 4]);
    }

    #[test]
    fn test_smoothing_alpha_one_tracks_series() {
        let series = [3.0, 10.0, 0.0, 7.0];
        assert_eq!(exponential_smoothing(&series, 1.0), series.to_vec());
        assert_eq!(exponential_smoothing(&series, 7.5), series.to_vec());
    }

    #[test]
    fn test_smoothing_recurrence() {
        let smoothed = exponential_smoothing(&[2.0, 4.0, 4.0], 0.5);
        assert_eq!(smoothed, vec![2.0, 3.0, 3.5]);
        assert!(exponential_smoothing(&[], 0.5).is_empty());
    }

    #[test]
    fn test_forecast_is_flat_at_last_level() {
        let range = DateRange::new(day(2024, 5, 1), day(2024, 5, 3)).unwrap();
        let appts = vec![
            booking("1", day(2024, 5, 1), ServiceType::BasicBath),
            booking("2", day(2024, 5, 1), ServiceType::BasicBath),
            booking("3", day(2024, 5, 2), ServiceType::BasicBath),
            booking("4", day(2024, 5, 2), ServiceType::BasicBath),
            booking("5", day(2024, 5, 2), ServiceType::BasicBath),
            booking("6", day(2024, 5, 2), ServiceType::BasicBath),
        ];
        let forecast = forecast_bookings(&appts, range, 0.5, 2);
        // series 2, 4, 0 -> 2, 3, 1.5
        assert_eq!(forecast.smoothed, vec![2.0, 3.0, 1.5]);
        assert_eq!(forecast.level, 1.5);
        assert_eq!(forecast.forecast.len(), 2);
        assert_eq!(forecast.forecast[0].date, day(2024, 5, 4));
        assert_eq!(forecast.forecast[1].date, day(2024, 5, 5));
        assert!(forecast.forecast.iter().all(|f| f.expected == 1.5));
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let appts = vec![
            booking("a", day(2024, 3, 10), ServiceType::FullGroom),
            booking("b", day(1990, 1, 1), ServiceType::FullGroom),
        ];
        let options = TrendOptions {
            window_days: u32::MAX,
            ..TrendOptions::default()
        };
        let overall = overall_trend(&appts, at(day(2024, 3, 15)), &options);
        assert_eq!(overall.recent_count, 2);
        assert_eq!(overall.previous_count, 0);
    }

    #[test]
    fn test_forecast_stops_at_last_representable_day() {
        let last = NaiveDate::MAX.pred_opt().unwrap();
        let forecast = forecast_bookings(&[], DateRange::ending_at(last, 3), 0.5, 10);
        assert_eq!(forecast.history.len(), 3);
        assert_eq!(forecast.forecast.len(), 1);
        assert_eq!(forecast.forecast[0].date, NaiveDate::MAX);
    }
}
