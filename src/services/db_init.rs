use mongodb::{bson::doc, Database, IndexModel};

use crate::services::{instruments_service, logs_service};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // logs: newest-first reads
    {
        let col = db.collection::<mongodb::bson::Document>(logs_service::COLLECTION);
        let model = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .build();

        col.create_index(model, None).await?;
    }

    // instruments: scheduler scans active rows
    {
        let col = db.collection::<mongodb::bson::Document>(instruments_service::COLLECTION);
        let model = IndexModel::builder().keys(doc! { "active": 1 }).build();

        col.create_index(model, None).await?;
    }

    Ok(())
}
