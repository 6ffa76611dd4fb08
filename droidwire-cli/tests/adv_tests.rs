use std::fs;
use tempfile::tempdir;

use droidwire_cli::commands::adv;
use droidwire_core::constants::{Affiliation, Personality};
use droidwire_core::AdvertisementFrame;

fn presence_and_bay_payload() -> String {
    let mut frame = AdvertisementFrame::new();
    frame
        .add_droid_presence(Affiliation::Resistance, Personality::BbSeries, true)
        .unwrap();
    frame.add_depot_bay(5, -90).unwrap();
    hex::encode(frame.serialize())
}

#[test]
fn test_adv_writes_json_output() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("records.json");

    adv::execute(&presence_and_bay_payload(), Some(out.to_str().unwrap())).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0]["subtype"], 0x03);
    assert_eq!(records[0]["label"], "droid presence");
    assert_eq!(records[0]["presence"]["paired"], true);
    assert_eq!(records[0]["presence"]["affiliation"], "Resistance");

    assert_eq!(records[1]["subtype"], 0xBD);
    assert_eq!(records[1]["label"], "depot bay");
    assert_eq!(records[1]["data"], "05a6");
}

#[test]
fn test_adv_empty_payload_succeeds() {
    // All-zero padding parses to no records
    adv::execute(&"00".repeat(23), None).unwrap();
}

#[test]
fn test_adv_rejects_bad_hex() {
    assert!(adv::execute("xyz", None).is_err());
}

#[test]
fn test_subtype_labels() {
    assert_eq!(adv::subtype_label(0x0A), "location beacon");
    assert_eq!(adv::subtype_label(0xBC), "depot activate");
    assert_eq!(adv::subtype_label(0x77), "unknown");
}
