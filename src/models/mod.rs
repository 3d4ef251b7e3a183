pub mod appointment;
pub mod campaign;
pub mod client;
pub mod plan;
pub mod reminder;

pub use appointment::{Appointment, AppointmentInput, AppointmentPatch, AppointmentStatus};
pub use campaign::{Campaign, CampaignInput, CampaignPayload, CampaignStats, CampaignStatus, Channel};
pub use client::{Client, ClientInput};
pub use plan::{Plan, PlanLimits, PlanName};
pub use reminder::{MessageKind, OutboundMessage, ReminderRule, ReminderRuleInput};

use serde::Serialize;

/// One page of a filtered listing plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
}
