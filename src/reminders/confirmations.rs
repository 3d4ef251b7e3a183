use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDateTime};

use crate::models::{client, Appointment, AppointmentStatus, MessageKind, OutboundMessage};
use crate::reminders::config::ReminderConfig;
use crate::store::{helpers::confirmation_token, Store};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

fn confirmation_body(appointment: &Appointment, token: &str, config: &ReminderConfig) -> String {
    format!(
        "Hi {}, this is a reminder of your \"{}\" appointment on {} at {}. Please confirm here: {}{}",
        client::first_name(&appointment.client_name),
        appointment.service,
        appointment.start.format("%d/%m/%Y"),
        appointment.start.format("%H:%M"),
        config.confirmation_link_prefix,
        token
    )
}

/// Issues a confirmation token for every pending appointment starting in
/// `(now, now + window]` and marks it `confirmation_sent`.
pub async fn send_confirmation_requests(
    store: &Store,
    now: NaiveDateTime,
    config: &ReminderConfig,
) -> Result<Vec<OutboundMessage>> {
    config.validate()?;
    let horizon = Duration::try_hours(config.confirmation_window_hours)
        .and_then(|window| now.checked_add_signed(window))
        .ok_or_else(|| anyhow!("confirmation window from {now} is out of range"))?;
    let config_for_task = config.clone();

    let messages = store
        .execute(move |tables| {
            let mut messages = Vec::new();
            for appointment in tables.appointments.iter_mut() {
                let due = appointment.status == AppointmentStatus::PendingConfirmation
                    && appointment.start > now
                    && appointment.start <= horizon;
                if !due {
                    continue;
                }

                let token = confirmation_token(&appointment.id);
                appointment.status = AppointmentStatus::ConfirmationSent;
                appointment.confirmation_token = Some(token.clone());

                messages.push(OutboundMessage {
                    kind: MessageKind::ConfirmationRequest,
                    channel: config_for_task.channel,
                    recipient: appointment.client_name.clone(),
                    body: confirmation_body(appointment, &token, &config_for_task),
                });
            }
            Ok(messages)
        })
        .await?;

    for message in &messages {
        log_info!(
            "[{}] to {}: {}",
            message.channel.as_str(),
            message.recipient,
            message.body
        );
    }
    log_info!("{} confirmation requests prepared", messages.len());

    Ok(messages)
}

/// Marks the appointment holding `token` as confirmed. Confirming twice is
/// harmless and returns the already-confirmed appointment.
pub async fn confirm_by_token(store: &Store, token: &str) -> Result<Appointment> {
    let token = token.to_string();
    let result = store
        .execute(move |tables| {
            let appointment = tables
                .appointments
                .iter_mut()
                .find(|a| a.confirmation_token.as_deref() == Some(token.as_str()))
                .ok_or_else(|| anyhow!("invalid or expired confirmation token"))?;

            if appointment.status != AppointmentStatus::Confirmed {
                appointment.status = AppointmentStatus::Confirmed;
            }
            Ok(appointment.clone())
        })
        .await;

    match &result {
        Ok(appointment) => log_info!("Appointment {} confirmed by client", appointment.id),
        Err(err) => log_warn!("Confirmation failed: {err}"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Tables;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn appointment(id: &str, hours_from_now: i64, status: AppointmentStatus) -> Appointment {
        let start = now() + Duration::hours(hours_from_now);
        Appointment {
            id: id.into(),
            client_id: "2".into(),
            client_name: "Luis Rodriguez".into(),
            service: "Consultation".into(),
            start,
            end: start + Duration::minutes(30),
            estimated_duration_minutes: 30,
            status,
            confirmation_token: None,
        }
    }

    fn store_with(appointments: Vec<Appointment>) -> Store {
        Store::with_tables(Tables {
            appointments,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn only_pending_appointments_inside_window_are_asked() {
        let store = store_with(vec![
            appointment("soon", 27, AppointmentStatus::PendingConfirmation),
            appointment("edge", 48, AppointmentStatus::PendingConfirmation),
            appointment("far", 49, AppointmentStatus::PendingConfirmation),
            appointment("past", -1, AppointmentStatus::PendingConfirmation),
            appointment("done", 5, AppointmentStatus::Confirmed),
        ]);

        let messages = send_confirmation_requests(&store, now(), &ReminderConfig::default())
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].body.starts_with("Hi Luis,"));
        assert!(messages[0].body.contains("at 12:00"));
        assert!(messages[0].body.contains("#/confirm/soon-"));

        let snapshot = store.snapshot().await.unwrap();
        let status_of = |id: &str| {
            snapshot
                .appointments
                .iter()
                .find(|a| a.id == id)
                .map(|a| (a.status, a.confirmation_token.is_some()))
                .unwrap()
        };
        assert_eq!(status_of("soon"), (AppointmentStatus::ConfirmationSent, true));
        assert_eq!(status_of("edge"), (AppointmentStatus::ConfirmationSent, true));
        assert_eq!(status_of("far"), (AppointmentStatus::PendingConfirmation, false));
        assert_eq!(status_of("past"), (AppointmentStatus::PendingConfirmation, false));
        assert_eq!(status_of("done"), (AppointmentStatus::Confirmed, false));
    }

    #[tokio::test]
    async fn oversized_window_is_an_error_and_changes_nothing() {
        let store = store_with(vec![appointment("a", 3, AppointmentStatus::PendingConfirmation)]);
        let config = ReminderConfig {
            confirmation_window_hours: 10_000_000_000,
            ..Default::default()
        };

        assert!(send_confirmation_requests(&store, now(), &config).await.is_err());

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.appointments[0].status, AppointmentStatus::PendingConfirmation);
    }

    #[tokio::test]
    async fn horizon_past_the_calendar_end_is_an_error() {
        let store = store_with(vec![]);
        let now = NaiveDateTime::MAX - Duration::hours(1);
        assert!(send_confirmation_requests(&store, now, &ReminderConfig::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn second_sweep_does_not_resend() {
        let store = store_with(vec![appointment("a", 3, AppointmentStatus::PendingConfirmation)]);
        let config = ReminderConfig::default();

        assert_eq!(send_confirmation_requests(&store, now(), &config).await.unwrap().len(), 1);
        assert!(send_confirmation_requests(&store, now(), &config).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn token_confirms_appointment_once_and_stays_confirmed() {
        let store = store_with(vec![appointment("a", 3, AppointmentStatus::PendingConfirmation)]);
        send_confirmation_requests(&store, now(), &ReminderConfig::default())
            .await
            .unwrap();

        let token = store.snapshot().await.unwrap().appointments[0]
            .confirmation_token
            .clone()
            .unwrap();

        let confirmed = confirm_by_token(&store, &token).await.unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        let again = confirm_by_token(&store, &token).await.unwrap();
        assert_eq!(again, confirmed);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let store = store_with(vec![]);
        let err = confirm_by_token(&store, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid or expired confirmation token");
    }
}
