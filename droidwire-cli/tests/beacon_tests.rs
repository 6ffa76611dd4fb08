use droidwire_cli::commands::beacon::{
    build, parse_gap_addr, AffiliationArg, BeaconKind, PersonalityArg,
};
use droidwire_core::advert::parse_advertisement;
use droidwire_core::constants::subtype;

#[test]
fn test_depot_bay_beacon_bytes() {
    let payload = build(&BeaconKind::DepotBay { bay: 5, rssi: -90 }, false).unwrap();
    assert_eq!(payload.len(), 23);
    assert_eq!(&payload[0..4], &[0xBD, 0x02, 0x05, 0xA6]);
}

#[test]
fn test_location_beacon_rejects_bad_selector() {
    let kind = BeaconKind::Location {
        location: 9,
        min_interval: 10,
        rssi: -80,
        accept: 1,
    };
    assert!(build(&kind, false).is_err());
}

#[test]
fn test_presence_beacon_round_trip() {
    let kind = BeaconKind::Presence {
        affiliation: AffiliationArg::FirstOrder,
        personality: PersonalityArg::Black,
        paired: true,
    };
    let payload = build(&kind, false).unwrap();

    let presence = parse_advertisement(&payload)
        .get(subtype::DROID_PRESENCE)
        .and_then(|r| r.presence.clone())
        .unwrap();
    assert!(presence.paired);
    assert_eq!(presence.affiliation_raw, 2);
    assert_eq!(presence.personality_raw, 8);
}

#[test]
fn test_depot_activate_beacon() {
    let kind = BeaconKind::DepotActivate {
        addr: "c4:3e:01:02:03:04".to_string(),
        pair: true,
        delay: 15,
    };
    let payload = build(&kind, false).unwrap();

    let records = parse_advertisement(&payload);
    let rec = records.get(subtype::DEPOT_ACTIVATE).unwrap();
    assert_eq!(&rec.data[0..6], &[0xC4, 0x3E, 0x01, 0x02, 0x03, 0x04]);
    assert_eq!(rec.data[6], 1);
    assert_eq!(rec.data[7], 15);
}

#[test]
fn test_wdw_flag_rewrites_interaction_id() {
    // The location payload carries no interaction id, so the flag must
    // leave it untouched
    let kind = BeaconKind::Location {
        location: 3,
        min_interval: 10,
        rssi: -80,
        accept: 1,
    };
    let dlr = build(&kind, false).unwrap();
    let wdw = build(&kind, true).unwrap();
    assert_eq!(dlr, wdw);
}

#[test]
fn test_parse_gap_addr() {
    assert_eq!(
        parse_gap_addr("c43e01020304").unwrap(),
        [0xC4, 0x3E, 0x01, 0x02, 0x03, 0x04]
    );
    assert!(parse_gap_addr("c43e").is_err());
}
