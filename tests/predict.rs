//! Output of the `predict` and `list` commands.

use serde_json::{json, Value};
use tls13_compat::suites::suite_list;
use tls13_compat::{Implementation, KexMode, Prediction};

#[test]
fn failed_negotiation_prints_none() {
    let prediction = Prediction::parse("gnutls", "ephemeral_all", "psk_all").unwrap();
    assert_eq!(prediction.to_string(), "none");

    let prediction = Prediction::parse("openssl", "ephemeral_all", "psk_all").unwrap();
    assert_eq!(prediction.to_string(), "psk_ephemeral");
}

#[test]
fn json_shape() {
    let prediction = Prediction::new(
        Implementation::GnuTls,
        KexMode::EPHEMERAL_ALL,
        KexMode::PSK_ALL,
    );
    let value: Value = serde_json::from_str(&prediction.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "implementation": "gnutls",
            "policy": "alternate_with_override",
            "local": "ephemeral_all",
            "peer": "psk_all",
            "expected": null,
        })
    );

    let prediction = Prediction::new(Implementation::MbedTls, KexMode::ALL, KexMode::PSK);
    let json = prediction.to_json().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["policy"], "generic");
    assert_eq!(value["expected"], "psk");
    assert_eq!(Prediction::from_json(&json).unwrap(), prediction);
}

#[test]
fn list_names_every_suite() {
    assert_eq!(suite_list(), "compat hrr psk");
}
