use serde::{Deserialize, Deserializer, Serialize};

/// Single-row destination for alert delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSettings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chat_id: String,
}

impl NotifierSettings {
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
