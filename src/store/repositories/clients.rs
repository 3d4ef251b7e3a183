use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Client, ClientInput, Page};
use crate::store::{
    helpers::{new_id, not_found, paginate},
    Store,
};

impl Store {
    /// Clients matching `search` (name, email or tag; empty matches all),
    /// sliced to the requested 1-based page.
    pub async fn list_clients(&self, page: usize, limit: usize, search: &str) -> Result<Page<Client>> {
        let search = search.trim().to_string();
        self.execute(move |tables| {
            let matches: Vec<Client> = tables
                .clients
                .iter()
                .filter(|client| search.is_empty() || client.matches(&search))
                .cloned()
                .collect();
            Ok(paginate(matches, page, limit))
        })
        .await
    }

    pub async fn get_client(&self, id: &str) -> Result<Option<Client>> {
        let id = id.to_string();
        self.execute(move |tables| Ok(tables.clients.iter().find(|c| c.id == id).cloned()))
            .await
    }

    pub async fn add_client(&self, input: ClientInput, today: NaiveDate) -> Result<Client> {
        let client = Client {
            id: new_id(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            created_at: today,
            tags: input.tags,
            notes: input.notes,
        };

        self.execute(move |tables| {
            tables.clients.push(client.clone());
            Ok(client)
        })
        .await
    }

    /// Replaces the editable fields; id and creation date are kept.
    pub async fn update_client(&self, id: &str, input: ClientInput) -> Result<Client> {
        let id = id.to_string();
        self.execute(move |tables| {
            let client = tables
                .clients
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found("client", &id))?;

            client.name = input.name;
            client.email = input.email;
            client.phone = input.phone;
            client.tags = input.tags;
            client.notes = input.notes;
            Ok(client.clone())
        })
        .await
    }

    pub async fn delete_client(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.execute(move |tables| {
            let before = tables.clients.len();
            tables.clients.retain(|c| c.id != id);
            if tables.clients.len() == before {
                return Err(not_found("client", &id));
            }
            Ok(())
        })
        .await
    }
}
