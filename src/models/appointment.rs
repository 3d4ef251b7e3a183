use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    PendingConfirmation,
    ConfirmationSent,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingConfirmation => "pending_confirmation",
            AppointmentStatus::ConfirmationSent => "confirmation_sent",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and sent-but-unanswered both count as "waiting on the client".
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::PendingConfirmation | AppointmentStatus::ConfirmationSent
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    pub service: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub estimated_duration_minutes: i64,
    pub status: AppointmentStatus,
    pub confirmation_token: Option<String>,
}

impl Appointment {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Input data for booking a new appointment. The end instant is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub client_id: String,
    pub client_name: String,
    pub service: String,
    pub start: NaiveDateTime,
    pub estimated_duration_minutes: i64,
}

/// `start + minutes`, or an error when the duration does not fit the calendar.
pub fn end_after(start: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime> {
    Duration::try_minutes(minutes)
        .and_then(|duration| start.checked_add_signed(duration))
        .ok_or_else(|| anyhow!("duration of {minutes} minutes from {start} is out of range"))
}

impl AppointmentInput {
    pub fn end(&self) -> Result<NaiveDateTime> {
        end_after(self.start, self.estimated_duration_minutes)
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub service: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub estimated_duration_minutes: Option<i64>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentPatch {
    pub fn apply(self, current: &Appointment) -> Result<Appointment> {
        let start = self.start.unwrap_or(current.start);
        let duration = self
            .estimated_duration_minutes
            .unwrap_or(current.estimated_duration_minutes);

        let end = end_after(start, duration)?;

        Ok(Appointment {
            id: current.id.clone(),
            client_id: self.client_id.unwrap_or_else(|| current.client_id.clone()),
            client_name: self
                .client_name
                .unwrap_or_else(|| current.client_name.clone()),
            service: self.service.unwrap_or_else(|| current.service.clone()),
            start,
            end,
            estimated_duration_minutes: duration,
            status: self.status.unwrap_or(current.status),
            confirmation_token: current.confirmation_token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn appointment(id: &str, start: NaiveDateTime, minutes: i64) -> Appointment {
        Appointment {
            id: id.into(),
            client_id: "1".into(),
            client_name: "Ana Garcia".into(),
            service: "Cut".into(),
            start,
            end: start + Duration::minutes(minutes),
            estimated_duration_minutes: minutes,
            status: AppointmentStatus::Confirmed,
            confirmation_token: None,
        }
    }

    #[test]
    fn touching_appointments_do_not_overlap() {
        let a = appointment("a", at(10, 0), 60);
        let b = appointment("b", at(11, 0), 60);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn patch_recomputes_end_from_new_duration() {
        let current = appointment("a", at(10, 0), 60);
        let patch = AppointmentPatch {
            estimated_duration_minutes: Some(90),
            ..Default::default()
        };

        let updated = patch.apply(&current).unwrap();
        assert_eq!(updated.start, at(10, 0));
        assert_eq!(updated.end, at(11, 30));
        assert_eq!(updated.id, "a");
    }

    #[test]
    fn patch_with_unrepresentable_duration_is_rejected() {
        let current = appointment("a", at(10, 0), 60);
        let patch = AppointmentPatch {
            estimated_duration_minutes: Some(i64::MAX),
            ..Default::default()
        };

        assert!(patch.apply(&current).is_err());
    }

    #[test]
    fn input_end_overflow_is_an_error() {
        let input = AppointmentInput {
            client_id: "1".into(),
            client_name: "Ana Garcia".into(),
            service: "Cut".into(),
            start: at(10, 0),
            estimated_duration_minutes: i64::MAX / 2,
        };
        assert!(input.end().is_err());

        let input = AppointmentInput {
            estimated_duration_minutes: 45,
            ..input
        };
        assert_eq!(input.end().unwrap(), at(10, 45));
    }

    #[test]
    fn status_serializes_in_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::PendingConfirmation).unwrap();
        assert_eq!(json, "\"pending_confirmation\"");
        assert_eq!(
            AppointmentStatus::ConfirmationSent.as_str(),
            "confirmation_sent"
        );
    }
}
