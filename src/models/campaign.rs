//! Marketing campaign records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Sent,
    Draft,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignStats {
    pub sent: u32,
    pub opened: u32,
    pub clicks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub target_segment: String,
    pub channel: Channel,
    pub message: String,
    pub sent_at: NaiveDateTime,
    pub status: CampaignStatus,
    pub stats: CampaignStats,
}

impl Campaign {
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.target_segment.to_lowercase().contains(&query)
    }

    /// Reminder blasts are filed separately from marketing in reports.
    pub fn is_reminder(&self) -> bool {
        self.name.to_lowercase().contains("reminder")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    pub name: String,
    pub target_segment: String,
    pub channel: Channel,
    pub message: String,
}

/// What would be handed to a delivery backend for a campaign send.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPayload<'a> {
    pub campaign_name: &'a str,
    pub delivery_channel: &'a str,
    pub audience_segment: &'a str,
    pub content: &'a str,
}

impl<'a> From<&'a CampaignInput> for CampaignPayload<'a> {
    fn from(input: &'a CampaignInput) -> Self {
        Self {
            campaign_name: &input.name,
            delivery_channel: input.channel.as_str(),
            audience_segment: &input.target_segment,
            content: &input.message,
        }
    }
}
