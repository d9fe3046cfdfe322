mod common;

use common::instrument;
use mongodb::bson::{doc, Bson};
use pricewatch::{
    error::AppError,
    models::InstrumentView,
    services::instruments_service::{
        normalize_symbol, parse_number, FieldUpdate, InstrumentConfig, InstrumentPatch,
    },
};
use serde_json::json;

#[test]
fn symbols_are_trimmed_and_uppercased() {
    assert_eq!(normalize_symbol(Some("  aapl ")).unwrap(), "AAPL");
    assert_eq!(normalize_symbol(Some("ggal.ba")).unwrap(), "GGAL.BA");
    assert_eq!(normalize_symbol(Some("^gspc")).unwrap(), "^GSPC");
}

#[test]
fn blank_or_odd_symbols_are_rejected() {
    for raw in [None, Some(""), Some("   "), Some("AB CD"), Some("<script>")] {
        assert!(matches!(normalize_symbol(raw), Err(AppError::Validation(_))), "{raw:?}");
    }
}

#[test]
fn numbers_may_be_json_numbers_or_numeric_strings() {
    assert_eq!(parse_number("x", Some(&json!(12.5))).unwrap(), Some(12.5));
    assert_eq!(parse_number("x", Some(&json!(" 7 "))).unwrap(), Some(7.0));
    assert_eq!(parse_number("x", Some(&json!(null))).unwrap(), None);
    assert_eq!(parse_number("x", None).unwrap(), None);

    for bad in [json!("abc"), json!(true), json!([1]), json!("NaN")] {
        let err = parse_number("up", Some(&bad)).unwrap_err();
        assert_eq!(err.to_string(), "up must be numeric");
    }
}

#[test]
fn config_requires_both_thresholds() {
    let err = InstrumentConfig::parse(Some("abc"), None, Some(&json!(100)), None, None, None, None)
        .unwrap_err();
    assert_eq!(err.to_string(), "lower_threshold is required");
}

#[test]
fn config_defaults_to_active_and_trims_notes() {
    let cfg = InstrumentConfig::parse(
        Some("abc"),
        None,
        Some(&json!(100)),
        Some(&json!("90")),
        Some(" sell "),
        None,
        None,
    )
    .unwrap();

    assert_eq!(cfg.symbol, "ABC");
    assert_eq!(cfg.base_price, None);
    assert_eq!(cfg.upper_note, "sell");
    assert!(cfg.active);
}

#[test]
fn upsert_doc_overwrites_config_and_clears_memory() {
    let cfg = InstrumentConfig::parse(
        Some("abc"),
        None,
        Some(&json!(100)),
        Some(&json!(90)),
        None,
        Some("buy more"),
        Some(false),
    )
    .unwrap();

    let update = cfg.update_doc();
    let set = update.get_document("$set").unwrap();

    assert_eq!(set.get("upper_alert_sent"), Some(&Bson::Boolean(false)));
    assert_eq!(set.get("lower_alert_sent"), Some(&Bson::Boolean(false)));
    assert_eq!(set.get("base_price"), Some(&Bson::Null));
    assert_eq!(set.get("upper_threshold"), Some(&Bson::Double(100.0)));
    assert_eq!(set.get("lower_threshold"), Some(&Bson::Double(90.0)));
    assert_eq!(set.get("upper_note"), Some(&Bson::String(String::new())));
    assert_eq!(set.get("lower_note"), Some(&Bson::String("buy more".into())));
    assert_eq!(set.get("active"), Some(&Bson::Boolean(false)));
    assert_eq!(update.get_document("$inc").unwrap(), &doc! { "revision": 1_i64 });
}

#[test]
fn upsert_doc_keeps_a_configured_base_price() {
    let cfg = InstrumentConfig::parse(
        Some("abc"),
        Some(&json!("95")),
        Some(&json!(100)),
        Some(&json!(90)),
        None,
        None,
        None,
    )
    .unwrap();

    let set = cfg.update_doc().get_document("$set").unwrap().clone();
    assert_eq!(set.get("base_price"), Some(&Bson::Double(95.0)));
    assert_eq!(set.get("active"), Some(&Bson::Boolean(true)));
}

#[test]
fn any_patch_resets_memory_even_for_unrelated_fields() {
    let patches = [
        vec![FieldUpdate::UpperNote("new note".into())],
        vec![FieldUpdate::Active(true)],
        vec![FieldUpdate::BasePrice(10.0)],
        vec![],
    ];

    for updates in patches {
        let mut abc = instrument("ABC", 100.0, 90.0, None);
        abc.upper_alert_sent = true;
        abc.lower_alert_sent = true;
        let before = abc.revision;

        let patch = InstrumentPatch { symbol: "ABC".into(), updates };
        patch.apply_to(&mut abc);

        assert!(!abc.upper_alert_sent);
        assert!(!abc.lower_alert_sent);
        assert_eq!(abc.revision, before + 1);
    }
}

#[test]
fn patch_update_doc_sets_fields_clears_flags_and_bumps_revision() {
    let patch = InstrumentPatch::parse(
        Some("abc"),
        None,
        None,
        Some(&json!(85)),
        None,
        Some(""),
        Some(false),
    )
    .unwrap();

    let update = patch.update_doc();
    let set = update.get_document("$set").unwrap();

    assert_eq!(set.get("lower_threshold"), Some(&Bson::Double(85.0)));
    assert_eq!(set.get("lower_note"), Some(&Bson::String(String::new())));
    assert_eq!(set.get("active"), Some(&Bson::Boolean(false)));
    assert_eq!(set.get("upper_alert_sent"), Some(&Bson::Boolean(false)));
    assert_eq!(set.get("lower_alert_sent"), Some(&Bson::Boolean(false)));
    assert!(set.get("upper_threshold").is_none());
    assert!(set.get("base_price").is_none());
    assert_eq!(update.get_document("$inc").unwrap(), &doc! { "revision": 1_i64 });
}

#[test]
fn public_view_hides_memory_flags() {
    let mut abc = instrument("ABC", 100.0, 90.0, Some(95.0));
    abc.upper_alert_sent = true;

    let view = serde_json::to_value(InstrumentView::from(&abc)).unwrap();
    let obj = view.as_object().unwrap();

    assert!(!obj.contains_key("upper_alert_sent"));
    assert!(!obj.contains_key("lower_alert_sent"));
    assert!(!obj.contains_key("revision"));
    assert_eq!(obj["base_price"], json!(95.0));
    assert_eq!(obj["active"], json!(true));
}
