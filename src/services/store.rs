use async_trait::async_trait;
use mongodb::Database;

use crate::{
    error::StoreError,
    models::{Direction, Instrument, NotifierSettings},
    services::{instruments_service, logs_service, settings_service},
};

/// Durable state the scheduler reads and writes during a pass.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    async fn notifier_settings(&self) -> Result<NotifierSettings, StoreError>;

    async fn instruments(&self) -> Result<Vec<Instrument>, StoreError>;

    /// Returns false when the instrument was reconfigured after it was read;
    /// the flag is then left alone.
    async fn mark_alert_sent(
        &self,
        instrument: &Instrument,
        direction: Direction,
    ) -> Result<bool, StoreError>;
}

/// Append-only operational trail shown to users.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, text: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InstrumentStore for MongoStore {
    async fn notifier_settings(&self) -> Result<NotifierSettings, StoreError> {
        Ok(settings_service::get_settings(&self.db).await?)
    }

    async fn instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        Ok(instruments_service::list_instruments(&self.db).await?)
    }

    async fn mark_alert_sent(
        &self,
        instrument: &Instrument,
        direction: Direction,
    ) -> Result<bool, StoreError> {
        Ok(instruments_service::mark_alert_sent(&self.db, instrument, direction.flag_field()).await?)
    }
}

#[async_trait]
impl AuditLog for MongoStore {
    async fn append(&self, text: &str) -> Result<(), StoreError> {
        Ok(logs_service::append(&self.db, text).await?)
    }
}
