pub mod instrument;
pub mod log_entry;
pub mod notifier_settings;
pub mod schedule;

pub use instrument::{Direction, Instrument, InstrumentView};
pub use log_entry::LogEntry;
pub use notifier_settings::NotifierSettings;
pub use schedule::{CheckTime, SlotKey};
