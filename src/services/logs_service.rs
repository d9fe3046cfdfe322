use futures_util::StreamExt;
use mongodb::{bson::doc, options::FindOptions, Database};

use crate::models::LogEntry;

pub const COLLECTION: &str = "logs";

pub async fn append(db: &Database, text: &str) -> Result<(), mongodb::error::Error> {
    let logs = db.collection::<LogEntry>(COLLECTION);
    logs.insert_one(LogEntry::now(text), None).await?;
    Ok(())
}

/// Writes an audit entry from a request handler; failures only reach tracing.
pub async fn record(db: &Database, text: &str) {
    if let Err(e) = append(db, text).await {
        tracing::warn!("could not write audit log entry {:?}: {}", text, e);
    }
}

/// Newest first.
pub async fn recent(db: &Database, limit: usize) -> Result<Vec<LogEntry>, mongodb::error::Error> {
    let logs = db.collection::<LogEntry>(COLLECTION);
    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .limit(limit as i64)
        .build();

    let mut cursor = logs.find(None, find_opts).await?;

    let mut items = Vec::with_capacity(limit);
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }
    Ok(items)
}
