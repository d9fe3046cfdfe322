#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use pricewatch::{
    error::{NotifyError, QuoteError, StoreError},
    models::{CheckTime, Direction, Instrument, NotifierSettings},
    services::{
        finnhub::QuoteSource,
        instruments_service::InstrumentPatch,
        notifier::{Delivery, Notifier},
        scheduler::{PassRunner, Scheduler},
        store::{AuditLog, InstrumentStore},
    },
};

pub const ZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
    ZONE.with_ymd_and_hms(y, mo, d, h, mi, s).single().unwrap()
}

pub fn instrument(symbol: &str, upper: f64, lower: f64, base: Option<f64>) -> Instrument {
    Instrument {
        symbol: symbol.to_string(),
        base_price: base,
        upper_threshold: upper,
        lower_threshold: lower,
        upper_note: String::new(),
        lower_note: String::new(),
        upper_alert_sent: false,
        lower_alert_sent: false,
        active: true,
        revision: 1,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub instruments: Mutex<Vec<Instrument>>,
    pub settings: Mutex<NotifierSettings>,
    pub audit: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub fail_listing: Mutex<bool>,
    pub fail_marking: Mutex<bool>,
}

impl MemoryStore {
    pub fn with(instruments: Vec<Instrument>) -> Arc<Self> {
        let store = Self::default();
        *store.instruments.lock().unwrap() = instruments;
        *store.settings.lock().unwrap() = NotifierSettings {
            token: "token".into(),
            chat_id: "42".into(),
        };
        Arc::new(store)
    }

    pub fn get(&self, symbol: &str) -> Instrument {
        self.instruments
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.symbol == symbol)
            .cloned()
            .unwrap()
    }

    pub fn apply(&self, patch: &InstrumentPatch) {
        let mut items = self.instruments.lock().unwrap();
        let item = items.iter_mut().find(|i| i.symbol == patch.symbol).unwrap();
        patch.apply_to(item);
    }

    pub fn audit_lines(&self) -> Vec<String> {
        self.audit.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstrumentStore for MemoryStore {
    async fn notifier_settings(&self) -> Result<NotifierSettings, StoreError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_listing.lock().unwrap() {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self.instruments.lock().unwrap().clone())
    }

    async fn mark_alert_sent(
        &self,
        instrument: &Instrument,
        direction: Direction,
    ) -> Result<bool, StoreError> {
        if *self.fail_marking.lock().unwrap() {
            return Err(StoreError::Unavailable("write failed".into()));
        }
        let mut items = self.instruments.lock().unwrap();
        match items
            .iter_mut()
            .find(|i| i.symbol == instrument.symbol && i.revision == instrument.revision)
        {
            Some(item) => {
                item.mark_alert_sent(direction);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn append(&self, text: &str) -> Result<(), StoreError> {
        self.audit.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Price table; symbols missing from it fail.
#[derive(Default)]
pub struct FixedQuotes {
    pub prices: Mutex<HashMap<String, f64>>,
    pub calls: Mutex<Vec<String>>,
    pub delay: Option<Duration>,
}

impl FixedQuotes {
    pub fn with(prices: &[(&str, f64)]) -> Arc<Self> {
        let q = Self::default();
        q.set(prices);
        Arc::new(q)
    }

    pub fn slow(delay: Duration, prices: &[(&str, f64)]) -> Arc<Self> {
        let q = Self {
            delay: Some(delay),
            ..Self::default()
        };
        q.set(prices);
        Arc::new(q)
    }

    pub fn set(&self, prices: &[(&str, f64)]) {
        let mut map = self.prices.lock().unwrap();
        for (s, p) in prices {
            map.insert(s.to_string(), *p);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteSource for FixedQuotes {
    async fn latest_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| QuoteError::Unavailable(format!("no quote for {symbol}")))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        destination: &NotifierSettings,
        message: &str,
    ) -> Result<Delivery, NotifyError> {
        self.sent.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(NotifyError::Unavailable("bot blocked".into()));
        }
        if !destination.is_configured() {
            return Ok(Delivery::Skipped);
        }
        Ok(Delivery::Sent)
    }
}

pub fn default_times() -> Vec<CheckTime> {
    vec![
        CheckTime::new(9, 0).unwrap(),
        CheckTime::new(13, 0).unwrap(),
        CheckTime::new(16, 0).unwrap(),
    ]
}

pub fn runner(
    store: &Arc<MemoryStore>,
    quotes: &Arc<FixedQuotes>,
    notifier: &Arc<RecordingNotifier>,
    timeout: Duration,
) -> PassRunner {
    PassRunner::new(
        store.clone(),
        store.clone(),
        quotes.clone(),
        notifier.clone(),
        timeout,
    )
}

pub fn scheduler(
    store: &Arc<MemoryStore>,
    quotes: &Arc<FixedQuotes>,
    notifier: &Arc<RecordingNotifier>,
) -> Scheduler {
    Scheduler::new(
        ZONE,
        default_times(),
        Duration::from_secs(30),
        runner(store, quotes, notifier, Duration::from_secs(2)),
    )
}
