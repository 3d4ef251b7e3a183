use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanName {
    Free,
    Basic,
    Pro,
}

/// A usage cap; `None` means unlimited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub appointments: Option<u32>,
    pub clients: Option<u32>,
    pub emails: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub name: PlanName,
    pub monthly_price: u32,
    pub features: Vec<String>,
    pub limits: PlanLimits,
}

impl Plan {
    pub fn catalog() -> Vec<Plan> {
        vec![
            Plan {
                name: PlanName::Free,
                monthly_price: 0,
                features: vec![
                    "10 appointments/month".into(),
                    "25 clients".into(),
                    "Basic reminders".into(),
                ],
                limits: PlanLimits {
                    appointments: Some(10),
                    clients: Some(25),
                    emails: Some(50),
                },
            },
            Plan {
                name: PlanName::Basic,
                monthly_price: 29,
                features: vec![
                    "100 appointments/month".into(),
                    "500 clients".into(),
                    "Email marketing".into(),
                ],
                limits: PlanLimits {
                    appointments: Some(100),
                    clients: Some(500),
                    emails: Some(1000),
                },
            },
            Plan {
                name: PlanName::Pro,
                monthly_price: 79,
                features: vec![
                    "Unlimited appointments".into(),
                    "Unlimited clients".into(),
                    "Advanced marketing".into(),
                    "Detailed reports".into(),
                ],
                limits: PlanLimits {
                    appointments: None,
                    clients: None,
                    emails: None,
                },
            },
        ]
    }

    pub fn allows_clients(&self, count: u32) -> bool {
        self.limits.clients.map_or(true, |cap| count <= cap)
    }
}
