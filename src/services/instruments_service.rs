use std::{collections::BTreeMap, sync::LazyLock};

use futures_util::StreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, UpdateOptions},
    Database,
};
use regex::Regex;
use serde_json::Value;

use crate::{
    error::AppError,
    models::{Instrument, InstrumentView},
};

pub const COLLECTION: &str = "instruments";

static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=^:_/]{0,31}$").expect("symbol regex")
});

/// Trims and uppercases a symbol, rejecting blanks and odd characters.
pub fn normalize_symbol(raw: Option<&str>) -> Result<String, AppError> {
    let sym = raw.unwrap_or_default().trim().to_uppercase();
    if sym.is_empty() {
        return Err(AppError::Validation("symbol is required".into()));
    }
    if !SYMBOL_RE.is_match(&sym) {
        return Err(AppError::Validation(format!("{sym:?} is not a valid symbol")));
    }
    Ok(sym)
}

/// Reads an optional numeric field that may arrive as a JSON number or a numeric string.
pub fn parse_number(field: &str, value: Option<&Value>) -> Result<Option<f64>, AppError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(x) if x.is_finite() => Ok(Some(x)),
        _ => Err(AppError::Validation(format!("{field} must be numeric"))),
    }
}

fn require_number(field: &str, value: Option<&Value>) -> Result<f64, AppError> {
    parse_number(field, value)?.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// A full, validated instrument configuration (upsert payload).
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub base_price: Option<f64>,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub upper_note: String,
    pub lower_note: String,
    pub active: bool,
}

impl InstrumentConfig {
    pub fn parse(
        symbol: Option<&str>,
        base_price: Option<&Value>,
        upper_threshold: Option<&Value>,
        lower_threshold: Option<&Value>,
        upper_note: Option<&str>,
        lower_note: Option<&str>,
        active: Option<bool>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            symbol: normalize_symbol(symbol)?,
            base_price: parse_number("base_price", base_price)?,
            upper_threshold: require_number("upper_threshold", upper_threshold)?,
            lower_threshold: require_number("lower_threshold", lower_threshold)?,
            upper_note: upper_note.unwrap_or_default().trim().to_string(),
            lower_note: lower_note.unwrap_or_default().trim().to_string(),
            active: active.unwrap_or(true),
        })
    }

    /// Mongo upsert: overwrite every editable field, clear crossing memory,
    /// `$inc` the revision (creating it on insert).
    pub fn update_doc(&self) -> Document {
        doc! {
            "$set": {
                "base_price": self.base_price,
                "upper_threshold": self.upper_threshold,
                "lower_threshold": self.lower_threshold,
                "upper_note": self.upper_note.as_str(),
                "lower_note": self.lower_note.as_str(),
                "active": self.active,
                "upper_alert_sent": false,
                "lower_alert_sent": false,
            },
            "$inc": { "revision": 1_i64 },
        }
    }
}

/// One editable field change in a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    BasePrice(f64),
    UpperThreshold(f64),
    LowerThreshold(f64),
    UpperNote(String),
    LowerNote(String),
    Active(bool),
}

impl FieldUpdate {
    fn write_into(&self, set: &mut Document) {
        match self {
            FieldUpdate::BasePrice(v) => set.insert("base_price", *v),
            FieldUpdate::UpperThreshold(v) => set.insert("upper_threshold", *v),
            FieldUpdate::LowerThreshold(v) => set.insert("lower_threshold", *v),
            FieldUpdate::UpperNote(v) => set.insert("upper_note", v.as_str()),
            FieldUpdate::LowerNote(v) => set.insert("lower_note", v.as_str()),
            FieldUpdate::Active(v) => set.insert("active", *v),
        };
    }

    fn apply_to(&self, i: &mut Instrument) {
        match self {
            FieldUpdate::BasePrice(v) => i.base_price = Some(*v),
            FieldUpdate::UpperThreshold(v) => i.upper_threshold = *v,
            FieldUpdate::LowerThreshold(v) => i.lower_threshold = *v,
            FieldUpdate::UpperNote(v) => i.upper_note = v.clone(),
            FieldUpdate::LowerNote(v) => i.lower_note = v.clone(),
            FieldUpdate::Active(v) => i.active = *v,
        }
    }
}

/// A validated partial update. Applying it always resets crossing memory,
/// even when `updates` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentPatch {
    pub symbol: String,
    pub updates: Vec<FieldUpdate>,
}

impl InstrumentPatch {
    pub fn parse(
        symbol: Option<&str>,
        base_price: Option<&Value>,
        upper_threshold: Option<&Value>,
        lower_threshold: Option<&Value>,
        upper_note: Option<&str>,
        lower_note: Option<&str>,
        active: Option<bool>,
    ) -> Result<Self, AppError> {
        let symbol = normalize_symbol(symbol)?;
        let mut updates = Vec::new();

        if let Some(v) = parse_number("base_price", base_price)? {
            updates.push(FieldUpdate::BasePrice(v));
        }
        if let Some(v) = parse_number("upper_threshold", upper_threshold)? {
            updates.push(FieldUpdate::UpperThreshold(v));
        }
        if let Some(v) = parse_number("lower_threshold", lower_threshold)? {
            updates.push(FieldUpdate::LowerThreshold(v));
        }
        if let Some(v) = upper_note {
            updates.push(FieldUpdate::UpperNote(v.trim().to_string()));
        }
        if let Some(v) = lower_note {
            updates.push(FieldUpdate::LowerNote(v.trim().to_string()));
        }
        if let Some(v) = active {
            updates.push(FieldUpdate::Active(v));
        }

        Ok(Self { symbol, updates })
    }

    /// Mongo update: `$set` the changed fields plus cleared flags, `$inc` the revision.
    pub fn update_doc(&self) -> Document {
        let mut set = doc! { "upper_alert_sent": false, "lower_alert_sent": false };
        for u in &self.updates {
            u.write_into(&mut set);
        }
        doc! { "$set": set, "$inc": { "revision": 1_i64 } }
    }

    pub fn apply_to(&self, instrument: &mut Instrument) {
        for u in &self.updates {
            u.apply_to(instrument);
        }
        instrument.reset_alerts();
        instrument.revision += 1;
    }
}

pub async fn list_instruments(db: &Database) -> Result<Vec<Instrument>, mongodb::error::Error> {
    let col = db.collection::<Instrument>(COLLECTION);
    let find_opts = FindOptions::builder().sort(doc! { "_id": 1 }).build();

    let mut cursor = col.find(None, find_opts).await?;

    let mut items = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }
    Ok(items)
}

/// Symbol-keyed public view, memory flags excluded.
pub async fn list_views(db: &Database) -> Result<BTreeMap<String, InstrumentView>, AppError> {
    let items = list_instruments(db).await?;
    Ok(items
        .iter()
        .map(|i| (i.symbol.clone(), InstrumentView::from(i)))
        .collect())
}

pub async fn upsert_instrument(db: &Database, cfg: &InstrumentConfig) -> Result<(), AppError> {
    let col = db.collection::<Instrument>(COLLECTION);

    col.update_one(
        doc! { "_id": cfg.symbol.as_str() },
        cfg.update_doc(),
        UpdateOptions::builder().upsert(true).build(),
    )
    .await?;

    Ok(())
}

pub async fn update_instrument(db: &Database, patch: &InstrumentPatch) -> Result<(), AppError> {
    let col = db.collection::<Instrument>(COLLECTION);

    let res = col
        .update_one(doc! { "_id": patch.symbol.as_str() }, patch.update_doc(), None)
        .await?;

    if res.matched_count == 0 {
        return Err(AppError::NotFound(format!("{} is not being watched", patch.symbol)));
    }
    Ok(())
}

/// Deleting an absent symbol is not an error.
pub async fn delete_instrument(db: &Database, symbol: &str) -> Result<(), AppError> {
    let col = db.collection::<Instrument>(COLLECTION);
    col.delete_one(doc! { "_id": symbol }, None).await?;
    Ok(())
}

/// Marks a crossing as seen, but only if the configuration has not been
/// edited since `instrument` was read.
pub async fn mark_alert_sent(
    db: &Database,
    instrument: &Instrument,
    field: &str,
) -> Result<bool, mongodb::error::Error> {
    let col = db.collection::<Instrument>(COLLECTION);

    let mut set = Document::new();
    set.insert(field, true);

    let res = col
        .update_one(
            doc! { "_id": instrument.symbol.as_str(), "revision": instrument.revision },
            doc! { "$set": set },
            None,
        )
        .await?;

    Ok(res.matched_count > 0)
}
