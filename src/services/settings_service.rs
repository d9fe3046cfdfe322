use mongodb::{
    bson::doc,
    options::UpdateOptions,
    Database,
};

use crate::models::NotifierSettings;

pub const COLLECTION: &str = "settings";
const SETTINGS_ID: &str = "notifier";

/// Missing row reads as blank settings.
pub async fn get_settings(db: &Database) -> Result<NotifierSettings, mongodb::error::Error> {
    let col = db.collection::<NotifierSettings>(COLLECTION);
    Ok(col
        .find_one(doc! { "_id": SETTINGS_ID }, None)
        .await?
        .unwrap_or_default())
}

pub async fn save_settings(
    db: &Database,
    settings: &NotifierSettings,
) -> Result<(), mongodb::error::Error> {
    let col = db.collection::<NotifierSettings>(COLLECTION);
    col.update_one(
        doc! { "_id": SETTINGS_ID },
        doc! { "$set": {
            "token": settings.token.trim(),
            "chat_id": settings.chat_id.trim(),
        } },
        UpdateOptions::builder().upsert(true).build(),
    )
    .await?;
    Ok(())
}
