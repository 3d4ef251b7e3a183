use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::log_info;
use crate::models::{Appointment, AppointmentStatus, MessageKind, OutboundMessage};
use crate::reminders::config::ReminderConfig;
use crate::store::Store;

const ENABLE_LOGS: bool = true;

/// Most recent confirmed, already-started appointment for `service`.
fn last_visit<'a>(
    appointments: &[&'a Appointment],
    service: &str,
    now: NaiveDateTime,
) -> Option<&'a Appointment> {
    let service = service.to_lowercase();
    appointments
        .iter()
        .copied()
        .filter(|a| {
            a.status == AppointmentStatus::Confirmed
                && a.start < now
                && a.service.to_lowercase() == service
        })
        .max_by_key(|a| a.start)
}

/// Evaluates every reminder rule against every client and returns a message
/// for each client whose last visit for the rule's service is at least
/// `frequency_days` whole days old.
pub async fn send_service_reminders(
    store: &Store,
    now: NaiveDateTime,
    config: &ReminderConfig,
) -> Result<Vec<OutboundMessage>> {
    let channel = config.channel;

    let messages = store
        .execute(move |tables| {
            let mut by_client: HashMap<&str, Vec<&Appointment>> = HashMap::new();
            for appointment in &tables.appointments {
                by_client
                    .entry(appointment.client_id.as_str())
                    .or_default()
                    .push(appointment);
            }

            let mut messages = Vec::new();
            for client in &tables.clients {
                let history = by_client
                    .get(client.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                for rule in &tables.reminder_rules {
                    let Some(last) = last_visit(history, &rule.service_name, now) else {
                        continue;
                    };

                    let days_since = (now - last.start).num_days();
                    if days_since >= rule.frequency_days {
                        messages.push(OutboundMessage {
                            kind: MessageKind::ServiceReminder,
                            channel,
                            recipient: client.name.clone(),
                            body: rule.render(client.first_name()),
                        });
                    }
                }
            }
            Ok(messages)
        })
        .await?;

    for message in &messages {
        log_info!(
            "[{} service reminder] to {}: {}",
            message.channel.as_str(),
            message.recipient,
            message.body
        );
    }
    log_info!("{} service reminders prepared", messages.len());

    Ok(messages)
}
