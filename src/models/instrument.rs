use serde::{Deserialize, Serialize};

/// One watched symbol, as stored in the `instruments` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    // normalized symbol doubles as the primary key
    #[serde(rename = "_id")]
    pub symbol: String,

    #[serde(default)]
    pub base_price: Option<f64>,
    pub upper_threshold: f64,
    pub lower_threshold: f64,

    #[serde(default)]
    pub upper_note: String,
    #[serde(default)]
    pub lower_note: String,

    #[serde(default)]
    pub upper_alert_sent: bool,
    #[serde(default)]
    pub lower_alert_sent: bool,

    #[serde(default = "default_active")]
    pub active: bool,

    // bumped on every configuration write
    #[serde(default)]
    pub revision: i64,
}

fn default_active() -> bool {
    true
}

impl Instrument {
    /// Records that a crossing in `direction` has been reported.
    pub fn mark_alert_sent(&mut self, direction: Direction) {
        match direction {
            Direction::Upper => self.upper_alert_sent = true,
            Direction::Lower => self.lower_alert_sent = true,
        }
    }

    /// Ends the current crossing episode. Called on every configuration write.
    pub fn reset_alerts(&mut self) {
        self.upper_alert_sent = false;
        self.lower_alert_sent = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upper,
    Lower,
}

impl Direction {
    /// Name of the memory flag field in the store.
    pub fn flag_field(self) -> &'static str {
        match self {
            Direction::Upper => "upper_alert_sent",
            Direction::Lower => "lower_alert_sent",
        }
    }
}

/// Public shape of an instrument; crossing memory stays internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentView {
    pub base_price: Option<f64>,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub upper_note: String,
    pub lower_note: String,
    pub active: bool,
}

impl From<&Instrument> for InstrumentView {
    fn from(i: &Instrument) -> Self {
        Self {
            base_price: i.base_price,
            upper_threshold: i.upper_threshold,
            lower_threshold: i.lower_threshold,
            upper_note: i.upper_note.clone(),
            lower_note: i.lower_note.clone(),
            active: i.active,
        }
    }
}
