use anyhow::Result;
use chrono::NaiveDateTime;

use crate::models::{ReminderRule, ReminderRuleInput};
use crate::store::Store;

impl Store {
    pub async fn list_reminder_rules(&self) -> Result<Vec<ReminderRule>> {
        self.execute(|tables| Ok(tables.reminder_rules.clone())).await
    }

    /// New rules are keyed `r{unix millis}` of the creation instant.
    pub async fn add_reminder_rule(
        &self,
        input: ReminderRuleInput,
        now: NaiveDateTime,
    ) -> Result<ReminderRule> {
        let rule = ReminderRule {
            id: format!("r{}", now.and_utc().timestamp_millis()),
            service_name: input.service_name,
            frequency_days: input.frequency_days,
            message_template: input.message_template,
        };

        self.execute(move |tables| {
            tables.reminder_rules.push(rule.clone());
            Ok(rule)
        })
        .await
    }

    /// Removing an unknown rule is not an error.
    pub async fn delete_reminder_rule(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.execute(move |tables| {
            tables.reminder_rules.retain(|r| r.id != id);
            Ok(())
        })
        .await
    }
}
