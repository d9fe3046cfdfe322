use pricewatch::{models::NotifierSettings, services::finnhub::QuoteResponse};

#[test]
fn null_settings_fields_read_as_blank() {
    let s: NotifierSettings = serde_json::from_str(r#"{"token": null, "chat_id": "42"}"#).unwrap();
    assert_eq!(s.token, "");
    assert_eq!(s.chat_id, "42");
    assert!(!s.is_configured());

    let empty: NotifierSettings = serde_json::from_str(r#"{"chat_id": null}"#).unwrap();
    assert_eq!(empty, NotifierSettings::default());
}

#[test]
fn configured_settings_deserialize() {
    let s: NotifierSettings =
        serde_json::from_str(r#"{"token": "123:abc", "chat_id": "-100"}"#).unwrap();
    assert!(s.is_configured());
}

#[test]
fn quote_response_only_needs_current_price() {
    let full: QuoteResponse = serde_json::from_str(
        r#"{"c": 187.5, "d": 1.2, "dp": 0.64, "h": 188, "l": 185, "o": 186, "pc": 186.3, "t": 1760000000}"#,
    )
    .unwrap();
    assert_eq!(full.c, 187.5);

    // unknown symbols come back zeroed with nulls
    let unknown: QuoteResponse =
        serde_json::from_str(r#"{"c": 0, "d": null, "dp": null, "pc": 0, "t": 0}"#).unwrap();
    assert_eq!(unknown.c, 0.0);
}
