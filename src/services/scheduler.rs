//! Wall-clock check slots and the evaluation pass they trigger.
//!
//! A background task wakes every `wake_interval`, converts "now" into the
//! configured zone and, on the first wake inside a configured minute that has
//! not been processed today, runs one pass over all instruments. Processed
//! slots are keyed by (date, hour, minute) and kept only in memory.

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    error::{NotifyError, QuoteError, StoreError},
    models::{CheckTime, Direction, Instrument, NotifierSettings, SlotKey},
    services::{
        alert_engine,
        finnhub::QuoteSource,
        notifier::{Delivery, Notifier},
        store::{AuditLog, InstrumentStore},
    },
};

/// Remembers which (date, time) slots have already run.
#[derive(Debug, Clone)]
pub struct SlotTracker {
    times: Vec<CheckTime>,
    consumed: HashSet<SlotKey>,
}

impl SlotTracker {
    pub fn new(times: Vec<CheckTime>) -> Self {
        Self {
            times,
            consumed: HashSet::new(),
        }
    }

    pub fn times(&self) -> &[CheckTime] {
        &self.times
    }

    /// The slot `now` falls in, if it is configured and not yet processed.
    pub fn due(&self, now: &DateTime<Tz>) -> Option<SlotKey> {
        let time = self.times.iter().find(|t| t.matches(now))?;
        let key = SlotKey {
            date: now.date_naive(),
            time: *time,
        };
        (!self.consumed.contains(&key)).then_some(key)
    }

    /// Records `key` as processed. Keys from other dates can never match
    /// again and are dropped.
    pub fn consume(&mut self, key: SlotKey) {
        self.consumed.retain(|k| k.date == key.date);
        self.consumed.insert(key);
    }
}

/// What happened to one instrument during a pass.
#[derive(Debug)]
pub enum InstrumentOutcome {
    Inactive,
    QuoteFailed(QuoteError),
    NoCrossing {
        price: f64,
    },
    Alerted {
        direction: Direction,
        delivery: Result<Delivery, NotifyError>,
    },
    /// Reconfigured while the pass was running; the flag was not written.
    Stale {
        direction: Direction,
    },
    PersistFailed {
        direction: Direction,
        error: StoreError,
    },
}

#[derive(Debug)]
pub struct PassReport {
    pub slot: SlotKey,
    pub outcomes: Vec<(String, InstrumentOutcome)>,
}

impl PassReport {
    pub fn outcome(&self, symbol: &str) -> Option<&InstrumentOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, o)| o)
    }

    pub fn alerts(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, InstrumentOutcome::Alerted { .. }))
            .count()
    }
}

#[derive(Debug, Error)]
pub enum PassError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("pass aborted: {0}")]
    Aborted(String),
}

/// Runs one evaluation pass against the external collaborators.
#[derive(Clone)]
pub struct PassRunner {
    store: Arc<dyn InstrumentStore>,
    audit: Arc<dyn AuditLog>,
    quotes: Arc<dyn QuoteSource>,
    notifier: Arc<dyn Notifier>,
    call_timeout: Duration,
}

impl PassRunner {
    pub fn new(
        store: Arc<dyn InstrumentStore>,
        audit: Arc<dyn AuditLog>,
        quotes: Arc<dyn QuoteSource>,
        notifier: Arc<dyn Notifier>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            audit,
            quotes,
            notifier,
            call_timeout,
        }
    }

    pub async fn run(&self, slot: SlotKey) -> Result<PassReport, StoreError> {
        let settings = self.store.notifier_settings().await?;
        let instruments = self.store.instruments().await?;

        self.audit(&format!("Scheduled check → {}", slot.time)).await;

        let mut outcomes = Vec::with_capacity(instruments.len());
        for instrument in instruments {
            let outcome = self.process(&settings, &instrument).await;
            outcomes.push((instrument.symbol, outcome));
        }

        Ok(PassReport { slot, outcomes })
    }

    async fn process(&self, settings: &NotifierSettings, instrument: &Instrument) -> InstrumentOutcome {
        if !instrument.active {
            return InstrumentOutcome::Inactive;
        }

        let symbol = instrument.symbol.as_str();

        let price = match self.fetch_price(symbol).await {
            Ok(p) => p,
            Err(e) => {
                warn!("price fetch for {} failed: {}", symbol, e);
                self.audit(&format!("Error fetching price for {symbol}: {e}")).await;
                return InstrumentOutcome::QuoteFailed(e);
            }
        };

        let Some(crossing) = alert_engine::evaluate(instrument, price) else {
            return InstrumentOutcome::NoCrossing { price };
        };
        let direction = crossing.state_update();

        let delivery = self.deliver(settings, &crossing.message).await;
        if let Err(e) = &delivery {
            warn!("notification for {} failed: {}", symbol, e);
            self.audit(&format!("Error sending notification for {symbol}: {e}")).await;
        }
        self.audit(&crossing.message).await;

        // attempted counts as seen, whatever the delivery result
        match self.store.mark_alert_sent(instrument, direction).await {
            Ok(true) => InstrumentOutcome::Alerted { direction, delivery },
            Ok(false) => {
                info!("{} was reconfigured during the pass; leaving its flags alone", symbol);
                InstrumentOutcome::Stale { direction }
            }
            Err(error) => {
                error!("could not persist {:?} alert flag for {}: {}", direction, symbol, error);
                InstrumentOutcome::PersistFailed { direction, error }
            }
        }
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        time::timeout(self.call_timeout, self.quotes.latest_price(symbol))
            .await
            .map_err(|_| QuoteError::Timeout(self.call_timeout))?
    }

    async fn deliver(&self, settings: &NotifierSettings, message: &str) -> Result<Delivery, NotifyError> {
        time::timeout(self.call_timeout, self.notifier.send(settings, message))
            .await
            .map_err(|_| NotifyError::Timeout(self.call_timeout))?
    }

    async fn audit(&self, text: &str) {
        if let Err(e) = self.audit.append(text).await {
            warn!("could not write audit log entry {:?}: {}", text, e);
        }
    }
}

pub struct Scheduler {
    tz: Tz,
    wake_interval: Duration,
    tracker: SlotTracker,
    runner: PassRunner,
}

impl Scheduler {
    pub fn new(tz: Tz, check_times: Vec<CheckTime>, wake_interval: Duration, runner: PassRunner) -> Self {
        Self {
            tz,
            wake_interval,
            tracker: SlotTracker::new(check_times),
            runner,
        }
    }

    /// Handles one wake-up at `now`. Returns `None` when no slot was due,
    /// otherwise the result of the pass that ran.
    pub async fn tick_at(&mut self, now: DateTime<Tz>) -> Option<Result<PassReport, PassError>> {
        let key = self.tracker.due(&now)?;
        info!("running scheduled check {}", key);

        // own task, so a panic inside the pass cannot take the loop down
        let runner = self.runner.clone();
        let joined = tokio::spawn(async move { runner.run(key).await }).await;
        self.tracker.consume(key);

        let result = match joined {
            Ok(Ok(report)) => {
                info!(
                    "check {} done: {} instruments, {} alerts",
                    key,
                    report.outcomes.len(),
                    report.alerts()
                );
                Ok(report)
            }
            Ok(Err(e)) => Err(PassError::Store(e)),
            Err(e) => Err(PassError::Aborted(e.to_string())),
        };

        if let Err(e) = &result {
            error!("scheduled check {} failed: {}", key, e);
            self.runner.audit(&format!("Error in scheduled check: {e}")).await;
        }

        Some(result)
    }

    /// Starts the background loop. The returned handle stops it.
    pub fn spawn(mut self) -> SchedulerHandle {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let task = tokio::spawn(async move {
            let times = self
                .tracker
                .times()
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            info!("scheduler started: checks at {} ({})", times, self.tz);
            self.runner.audit("Scheduler started").await;

            let mut interval = time::interval(self.wake_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        let now = Utc::now().with_timezone(&self.tz);
                        tokio::select! {
                            _ = task_token.cancelled() => break,
                            _ = self.tick_at(now) => {}
                        }
                    }
                }
            }

            info!("scheduler stopped");
        });

        SchedulerHandle { token, task }
    }
}

/// Owns the background scheduler task.
pub struct SchedulerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Requests a stop and waits for the loop to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            error!("scheduler task ended abnormally: {}", e);
        }
    }
}
