//! Threshold-crossing decisions.
//!
//! Pure logic with no I/O: given an instrument's stored state and a freshly
//! sampled price, decide whether this sample is a new, reportable crossing.

use crate::models::{Direction, Instrument};

/// A reportable crossing produced by [`evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub direction: Direction,
    pub threshold: f64,
    pub price: f64,
    pub message: String,
}

impl Crossing {
    /// The memory flag to persist once this crossing has been attempted.
    pub fn state_update(&self) -> Direction {
        self.direction
    }
}

/// Upper is checked first; within one evaluation at most one crossing fires.
pub fn evaluate(instrument: &Instrument, price: f64) -> Option<Crossing> {
    let direction = if price >= instrument.upper_threshold && !instrument.upper_alert_sent {
        Direction::Upper
    } else if price <= instrument.lower_threshold && !instrument.lower_alert_sent {
        Direction::Lower
    } else {
        return None;
    };

    let threshold = match direction {
        Direction::Upper => instrument.upper_threshold,
        Direction::Lower => instrument.lower_threshold,
    };

    Some(Crossing {
        direction,
        threshold,
        price,
        message: build_message(instrument, direction, threshold, price),
    })
}

/// Percentage change from `base` to `price`; `None` when base is zero.
pub fn percent_change(base: f64, price: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let pct = (price - base) / base * 100.0;
    pct.is_finite().then_some(pct)
}

fn build_message(instrument: &Instrument, direction: Direction, threshold: f64, price: f64) -> String {
    let (icon, label, note_label, note) = match direction {
        Direction::Upper => ("📈", "upper", "Upper note", instrument.upper_note.trim()),
        Direction::Lower => ("📉", "lower", "Lower note", instrument.lower_note.trim()),
    };

    let mut msg = format!(
        "{icon} {} crossed the {label} threshold of {threshold:.2} → {price:.2}",
        instrument.symbol
    );

    if let Some(base) = instrument.base_price {
        if let Some(pct) = percent_change(base, price) {
            msg.push_str(&format!("\nBase price: {base:.2} ({pct:+.2}%)"));
        }
    }

    if !note.is_empty() {
        msg.push_str(&format!("\n📝 {note_label}: {note}"));
    }

    msg
}
