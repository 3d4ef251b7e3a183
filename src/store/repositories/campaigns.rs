use anyhow::Result;
use chrono::NaiveDateTime;

use crate::log_info;
use crate::models::{Campaign, CampaignInput, CampaignPayload, CampaignStats, CampaignStatus, Page};
use crate::store::{
    helpers::{new_id, paginate},
    Store,
};

const ENABLE_LOGS: bool = true;

/// How many campaigns the reports view shows at most.
pub const REPORT_CAMPAIGN_LIMIT: usize = 10;

fn newest_first(campaigns: &mut [Campaign]) {
    campaigns.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
}

impl Store {
    /// Matching campaigns, newest first, sliced to the requested page.
    pub async fn list_campaigns(
        &self,
        page: usize,
        limit: usize,
        search: &str,
    ) -> Result<Page<Campaign>> {
        let search = search.trim().to_string();
        self.execute(move |tables| {
            let mut matches: Vec<Campaign> = tables
                .campaigns
                .iter()
                .filter(|c| search.is_empty() || c.matches(&search))
                .cloned()
                .collect();
            // Sort before slicing so pages stay consistent.
            newest_first(&mut matches);
            Ok(paginate(matches, page, limit))
        })
        .await
    }

    pub async fn recent_campaigns(&self) -> Result<Vec<Campaign>> {
        self.execute(|tables| {
            let mut campaigns = tables.campaigns.clone();
            newest_first(&mut campaigns);
            campaigns.truncate(REPORT_CAMPAIGN_LIMIT);
            Ok(campaigns)
        })
        .await
    }

    /// Records a campaign as sent. Nothing is delivered; the payload a
    /// delivery backend would receive is logged instead.
    pub async fn send_campaign(&self, input: CampaignInput, now: NaiveDateTime) -> Result<Campaign> {
        let payload = serde_json::to_string(&CampaignPayload::from(&input))?;
        log_info!(
            "Prepared {} campaign '{}': {}",
            input.channel.as_str(),
            input.name,
            payload
        );

        let campaign = Campaign {
            id: new_id(),
            name: input.name,
            target_segment: input.target_segment,
            channel: input.channel,
            message: input.message,
            sent_at: now,
            status: CampaignStatus::Sent,
            stats: CampaignStats::default(),
        };

        self.execute(move |tables| {
            tables.campaigns.push(campaign.clone());
            Ok(campaign)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Channel;
    use crate::store::Tables;
    use chrono::NaiveDate;

    fn on(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn campaign(id: &str, name: &str, segment: &str, sent_at: NaiveDateTime) -> Campaign {
        Campaign {
            id: id.into(),
            name: name.into(),
            target_segment: segment.into(),
            channel: Channel::Email,
            message: "Hello".into(),
            sent_at,
            status: CampaignStatus::Sent,
            stats: CampaignStats::default(),
        }
    }

    #[tokio::test]
    async fn list_sorts_newest_first_before_paging() {
        let store = Store::with_tables(Tables {
            campaigns: vec![
                campaign("c1", "Summer Promo", "frequent", on(2024, 6, 15)),
                campaign("c2", "New Client Discount", "new", on(2024, 7, 1)),
                campaign("c3", "VIP July", "vip", on(2024, 7, 5)),
            ],
            ..Default::default()
        })
        .unwrap();

        let first = store.list_campaigns(1, 2, "").await.unwrap();
        let ids: Vec<&str> = first.data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c3", "c2"]);
        assert_eq!(first.total, 3);

        let by_segment = store.list_campaigns(1, 5, "VIP").await.unwrap();
        assert_eq!(by_segment.total, 1);
    }

    #[tokio::test]
    async fn recent_campaigns_caps_at_report_limit() {
        let campaigns = (1..=12)
            .map(|day| campaign(&format!("c{day}"), "Promo", "all", on(2024, 3, day)))
            .collect();
        let store = Store::with_tables(Tables {
            campaigns,
            ..Default::default()
        })
        .unwrap();

        let recent = store.recent_campaigns().await.unwrap();
        assert_eq!(recent.len(), REPORT_CAMPAIGN_LIMIT);
        assert_eq!(recent[0].id, "c12");
    }

    #[tokio::test]
    async fn send_records_sent_campaign_with_zero_stats() {
        let store = Store::new().unwrap();
        let sent = store
            .send_campaign(
                CampaignInput {
                    name: "Autumn Special".into(),
                    target_segment: "frequent".into(),
                    channel: Channel::Sms,
                    message: "Nourishing treatments".into(),
                },
                on(2024, 9, 20),
            )
            .await
            .unwrap();

        assert_eq!(sent.status, CampaignStatus::Sent);
        assert_eq!(sent.stats, CampaignStats::default());
        assert_eq!(sent.sent_at, on(2024, 9, 20));
        assert_eq!(store.snapshot().await.unwrap().campaigns.len(), 1);
    }
}
