use anyhow::Result;

use crate::store::Store;

impl Store {
    /// Distinct segment names in alphabetical order.
    pub async fn list_segments(&self) -> Result<Vec<String>> {
        self.execute(|tables| {
            let mut segments = tables.segments.clone();
            segments.sort();
            segments.dedup();
            Ok(segments)
        })
        .await
    }

    /// Adds a segment under its lowercased, trimmed name and returns that
    /// name. Blank or already-known names change nothing.
    pub async fn add_segment(&self, name: &str) -> Result<String> {
        let normalized = name.trim().to_lowercase();
        self.execute(move |tables| {
            if !normalized.is_empty() && !tables.segments.contains(&normalized) {
                tables.segments.push(normalized.clone());
            }
            Ok(normalized)
        })
        .await
    }

    /// Removes the segment and strips it from every client's tags.
    pub async fn delete_segment(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.execute(move |tables| {
            tables.segments.retain(|s| *s != name);
            for client in &mut tables.clients {
                client.tags.retain(|tag| *tag != name);
            }
            Ok(())
        })
        .await
    }
}
