use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    // unix millis
    pub created_at: i64,
    pub text: String,
}

impl LogEntry {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: Utc::now().timestamp_millis(),
            text: text.into(),
        }
    }

    /// `[YYYY-MM-DD HH:MM] text`, stamped in `tz`.
    pub fn render(&self, tz: &Tz) -> String {
        match Utc.timestamp_millis_opt(self.created_at).single() {
            Some(ts) => format!(
                "[{}] {}",
                ts.with_timezone(tz).format("%Y-%m-%d %H:%M"),
                self.text
            ),
            None => format!("[????-??-?? ??:??] {}", self.text),
        }
    }
}
