pub mod db_init;
pub mod finnhub;
pub mod notifier;
pub mod store;

pub mod alert_engine;
pub mod scheduler;

pub mod instruments_service;
pub mod logs_service;
pub mod settings_service;
