use serde::{Deserialize, Serialize};

use super::campaign::Channel;

/// Re-booking rule: nudge clients whose last confirmed visit for
/// `service_name` is at least `frequency_days` old.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRule {
    pub id: String,
    pub service_name: String,
    pub frequency_days: i64,
    pub message_template: String,
}

impl ReminderRule {
    /// Fills `{clientName}` and `{serviceName}` (first occurrence of each).
    pub fn render(&self, client_first_name: &str) -> String {
        self.message_template
            .replacen("{clientName}", client_first_name, 1)
            .replacen("{serviceName}", &self.service_name, 1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRuleInput {
    pub service_name: String,
    pub frequency_days: i64,
    pub message_template: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    ConfirmationRequest,
    ServiceReminder,
}

/// A message that would be delivered to a client. Delivery is out of scope;
/// these are returned to the caller and logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub kind: MessageKind,
    pub channel: Channel,
    pub recipient: String,
    pub body: String,
}
