use serde::Serialize;

use crate::{
    config::StoreSettings,
    store::DocumentStore,
};

const MAX_COLLECTIONS: usize = 10;
const MAX_ERROR_CHARS: usize = 80;

// body of `GET /test`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// Best-effort health report: store faults are folded into `database`, never raised.
pub async fn status_report(
    store: Option<&dyn DocumentStore>,
    settings: &StoreSettings,
) -> StatusReport {
    let mut report = StatusReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: "❌ Not Set".to_string(),
        database_name: "❌ Not Set".to_string(),
        connection_status: "Not Connected".to_string(),
        collections: vec![],
    };
    let Some(store) = store else {
        report.database = "⚠️ Available but not initialized".to_string();
        return report;
    };
    // config flags are reported only alongside a live store
    report.database = "✅ Available".to_string();
    if settings.database_url.is_some() {
        report.database_url = "✅ Set".to_string();
    }
    if let Some(name) = &settings.database_name {
        report.database_name = name.clone();
    }
    report.connection_status = "Connected".to_string();
    match store.list_collection_names().await {
        Ok(mut names) => {
            names.truncate(MAX_COLLECTIONS);
            report.collections = names;
            report.database = "✅ Connected & Working".to_string();
        },

        Err(e) => {
            let msg: String = e.to_string()
                .chars()
                .take(MAX_ERROR_CHARS)
                .collect();
            report.database = format!("⚠️ Connected but Error: {msg}");
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn missing_store_is_reported_not_raised() {
        let settings = StoreSettings {
            database_url: Some("mongodb://localhost:27017".to_string()),
            database_name: Some("studio".to_string()),
        };
        let report = status_report(None, &settings).await;
        assert_eq!(report.backend, "✅ Running");
        assert_eq!(report.database, "⚠️ Available but not initialized");
        assert_eq!(report.database_url, "❌ Not Set");
        assert_eq!(report.database_name, "❌ Not Set");
        assert_eq!(report.connection_status, "Not Connected");
        assert!(report.collections.is_empty());
    }

    #[tokio::test]
    async fn collections_are_capped_at_ten() {
        let store = MemoryStore::new();
        for i in 0..12 {
            store.insert(&format!("c{i:02}"), doc! { "n": i }).await.unwrap();
        }
        let settings = StoreSettings {
            database_url: Some("mongodb://localhost:27017".to_string()),
            database_name: Some("studio".to_string()),
        };
        let report = status_report(Some(&store), &settings).await;
        assert_eq!(report.database, "✅ Connected & Working");
        assert_eq!(report.database_url, "✅ Set");
        assert_eq!(report.database_name, "studio");
        assert_eq!(report.connection_status, "Connected");
        assert_eq!(report.collections.len(), 10);
        assert_eq!(report.collections[0], "c00");
    }
}
