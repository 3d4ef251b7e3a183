//! Dashboard counters and date-range report data.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, Months, NaiveDateTime};
use serde::Serialize;

use crate::layout::LayoutConfig;
use crate::models::{Appointment, AppointmentStatus, Campaign};
use crate::store::{repositories::campaigns::REPORT_CAMPAIGN_LIMIT, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub upcoming_appointments: usize,
    pub new_clients_this_month: usize,
    pub occupancy_rate: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DateRange {
    #[serde(rename = "1_week")]
    OneWeek,
    #[serde(rename = "2_weeks")]
    TwoWeeks,
    #[serde(rename = "1_month")]
    OneMonth,
    #[serde(rename = "2_months")]
    TwoMonths,
    #[default]
    #[serde(rename = "3_months")]
    ThreeMonths,
    #[serde(rename = "6_months")]
    SixMonths,
    #[serde(rename = "1_year")]
    OneYear,
    #[serde(rename = "2_years")]
    TwoYears,
}

impl FromStr for DateRange {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "1_week" => Ok(DateRange::OneWeek),
            "2_weeks" => Ok(DateRange::TwoWeeks),
            "1_month" => Ok(DateRange::OneMonth),
            "2_months" => Ok(DateRange::TwoMonths),
            "3_months" => Ok(DateRange::ThreeMonths),
            "6_months" => Ok(DateRange::SixMonths),
            "1_year" => Ok(DateRange::OneYear),
            "2_years" => Ok(DateRange::TwoYears),
            other => Err(anyhow!("unknown date range '{other}'")),
        }
    }
}

impl DateRange {
    /// Lenient parse: anything unrecognised falls back to three months.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn start_from(&self, now: NaiveDateTime) -> NaiveDateTime {
        let start = match self {
            DateRange::OneWeek => now.checked_sub_signed(Duration::days(7)),
            DateRange::TwoWeeks => now.checked_sub_signed(Duration::days(14)),
            DateRange::OneMonth => now.checked_sub_months(Months::new(1)),
            DateRange::TwoMonths => now.checked_sub_months(Months::new(2)),
            DateRange::ThreeMonths => now.checked_sub_months(Months::new(3)),
            DateRange::SixMonths => now.checked_sub_months(Months::new(6)),
            DateRange::OneYear => now.checked_sub_months(Months::new(12)),
            DateRange::TwoYears => now.checked_sub_months(Months::new(24)),
        };
        start.unwrap_or(NaiveDateTime::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub appointment_status: Vec<StatusCount>,
    pub marketing_campaigns: Vec<Campaign>,
    pub reminder_campaigns: Vec<Campaign>,
}

/// Share of today's work window covered by at least one live booking.
fn occupancy_rate(appointments: &[Appointment], now: NaiveDateTime, config: &LayoutConfig) -> u32 {
    let day = now.date();
    let Some(window_start) = day.and_hms_opt(config.work_day_start_hour, 0, 0) else {
        return 0;
    };
    let window_end = window_start + Duration::hours(i64::from(config.window_hours()));

    let mut spans: Vec<(NaiveDateTime, NaiveDateTime)> = appointments
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled && a.start.date() == day)
        .map(|a| (a.start.max(window_start), a.end.min(window_end)))
        .filter(|(start, end)| start < end)
        .collect();
    spans.sort();

    // Merge overlaps so concurrent bookings are not double counted.
    let mut busy = Duration::zero();
    let mut current: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for (start, end) in spans {
        current = match current {
            Some((open_start, open_end)) if start <= open_end => Some((open_start, open_end.max(end))),
            Some((open_start, open_end)) => {
                busy = busy + (open_end - open_start);
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((open_start, open_end)) = current {
        busy = busy + (open_end - open_start);
    }

    let window_minutes = (window_end - window_start).num_minutes();
    if window_minutes <= 0 {
        return 0;
    }
    ((busy.num_minutes() as f64 / window_minutes as f64) * 100.0).round() as u32
}

pub async fn dashboard_stats(
    store: &Store,
    now: NaiveDateTime,
    config: &LayoutConfig,
) -> Result<DashboardStats> {
    let config = *config;
    store
        .execute(move |tables| {
            let upcoming_appointments = tables
                .appointments
                .iter()
                .filter(|a| a.start > now)
                .count();
            let new_clients_this_month = tables
                .clients
                .iter()
                .filter(|c| c.created_at.year() == now.year() && c.created_at.month() == now.month())
                .count();

            Ok(DashboardStats {
                upcoming_appointments,
                new_clients_this_month,
                occupancy_rate: occupancy_rate(&tables.appointments, now, &config),
            })
        })
        .await
}

fn newest_capped(mut campaigns: Vec<Campaign>) -> Vec<Campaign> {
    campaigns.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    campaigns.truncate(REPORT_CAMPAIGN_LIMIT);
    campaigns
}

pub async fn report(store: &Store, range: DateRange, now: NaiveDateTime) -> Result<ReportData> {
    let since = range.start_from(now);
    store
        .execute(move |tables| {
            let in_range: Vec<&Appointment> = tables
                .appointments
                .iter()
                .filter(|a| a.start >= since && a.start <= now)
                .collect();

            let count = |pred: fn(&AppointmentStatus) -> bool| {
                in_range.iter().filter(|a| pred(&a.status)).count()
            };
            let appointment_status = [
                StatusCount {
                    name: "confirmed",
                    value: count(|s| *s == AppointmentStatus::Confirmed),
                },
                StatusCount {
                    name: "cancelled",
                    value: count(|s| *s == AppointmentStatus::Cancelled),
                },
                StatusCount {
                    name: "pending",
                    value: count(AppointmentStatus::is_pending),
                },
            ]
            .into_iter()
            .filter(|bucket| bucket.value > 0)
            .collect();

            let (reminder, marketing): (Vec<Campaign>, Vec<Campaign>) = tables
                .campaigns
                .iter()
                .filter(|c| c.sent_at >= since && c.sent_at <= now)
                .cloned()
                .partition(Campaign::is_reminder);

            Ok(ReportData {
                appointment_status,
                marketing_campaigns: newest_capped(marketing),
                reminder_campaigns: newest_capped(reminder),
            })
        })
        .await
}
