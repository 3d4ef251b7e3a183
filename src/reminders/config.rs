use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::Channel;

/// One year of look-ahead is the widest confirmation window accepted.
pub const MAX_CONFIRMATION_WINDOW_HOURS: i64 = 24 * 366;

/// Tunables for the reminder sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderConfig {
    /// Pending appointments starting within this many hours get a confirmation request
    pub confirmation_window_hours: i64,

    /// Prefix joined with the token to form the confirmation link
    pub confirmation_link_prefix: String,

    /// Channel used for both confirmation requests and service reminders
    pub channel: Channel,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            confirmation_window_hours: 48,
            confirmation_link_prefix: "#/confirm/".into(),
            channel: Channel::Sms,
        }
    }
}

impl ReminderConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_CONFIRMATION_WINDOW_HOURS).contains(&self.confirmation_window_hours) {
            bail!(
                "confirmation window of {} hours is outside 0..={}",
                self.confirmation_window_hours,
                MAX_CONFIRMATION_WINDOW_HOURS
            );
        }
        Ok(())
    }
}
