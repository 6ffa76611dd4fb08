//! Property-based tests using proptest

use droidwire_core::advert::parse_advertisement;
use droidwire_core::constants::MAX_ADV_DATA;
use droidwire_core::decoder::decode_script;
use droidwire_core::{AdvertisementFrame, CodecError, CommandBuffer, FieldValue};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_decode_script_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..128)
    ) {
        // Should never panic, even on random data
        let _ = decode_script(&data);
    }

    #[test]
    fn prop_parse_advertisement_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        let _ = parse_advertisement(&data);
    }

    #[test]
    fn prop_serialized_frame_is_always_23_bytes(
        records in prop::collection::vec(
            (1u8..=255u8, prop::collection::vec(any::<u8>(), 0..8)),
            0..4
        ),
        power in any::<i8>()
    ) {
        let mut frame = AdvertisementFrame::new();
        for (subtype, data) in &records {
            // Over-budget mutations are rejected without touching the frame
            let _ = frame.add_sub_record(*subtype, data);
        }
        frame.set_power(power);
        let payload = frame.serialize();
        prop_assert_eq!(payload.len(), 23);
        prop_assert_eq!(payload[22], power as u8);
    }

    #[test]
    fn prop_sub_record_round_trip(
        records in prop::collection::vec(
            // Distinct nonzero subtypes with nonzero-length data survive
            // the padding heuristic unambiguously
            (1u8..=255u8, prop::collection::vec(any::<u8>(), 1..6)),
            1..4
        )
    ) {
        let mut frame = AdvertisementFrame::new();
        let mut accepted = Vec::new();
        for (subtype, data) in &records {
            if frame.add_sub_record(*subtype, data).is_ok() {
                // A repeated subtype replaces the earlier data in place
                accepted.retain(|(s, _)| s != subtype);
                accepted.push((*subtype, data.clone()));
            }
        }

        let parsed = parse_advertisement(&frame.serialize());
        prop_assert_eq!(parsed.len(), frame.len());
        for (subtype, data) in &accepted {
            let rec = parsed.get(*subtype).unwrap();
            prop_assert_eq!(rec.data.as_ref(), &data[..]);
        }
    }

    #[test]
    fn prop_budget_never_exceeded(
        records in prop::collection::vec(
            (1u8..=255u8, prop::collection::vec(any::<u8>(), 0..24)),
            0..8
        )
    ) {
        let mut frame = AdvertisementFrame::new();
        for (subtype, data) in &records {
            match frame.add_sub_record(*subtype, data) {
                Ok(payload) => {
                    prop_assert_eq!(payload.len(), 23);
                }
                Err(CodecError::PayloadTooLarge { needed, max }) => {
                    prop_assert!(needed > MAX_ADV_DATA);
                    prop_assert_eq!(max, MAX_ADV_DATA);
                }
                Err(e) => return Err(TestCaseError::fail(format!("unexpected error {e:?}"))),
            }
        }
        // Invariant holds after any mutation sequence
        let total: usize = parse_advertisement(&frame.serialize())
            .iter()
            .map(|(_, r)| 2 + r.data.len())
            .sum();
        prop_assert!(total <= MAX_ADV_DATA);
    }

    #[test]
    fn prop_motor_encode_decode_round_trip(
        idx in 0u8..8,
        value in -255i16..=255,
        ramp_time in any::<u16>()
    ) {
        let mut buf = CommandBuffer::new();
        buf.set_script_mode(true);
        buf.motor(idx, value, ramp_time).unwrap();
        let transport = buf.drain();

        // Strip the transport prefix, wrap in an entry envelope
        let mut entry = vec![0x01, transport.len() as u8 - 1, 0x00, 0x01];
        entry.extend_from_slice(&transport[2..]);

        let decoded = decode_script(&entry).unwrap();
        prop_assert_eq!(decoded.commands.len(), 1);
        let motor = &decoded.commands[0];
        prop_assert_eq!(motor.get("id").and_then(FieldValue::as_u8), Some(idx));
        prop_assert_eq!(
            motor.get("value").and_then(FieldValue::as_u8),
            Some(value.unsigned_abs() as u8)
        );
        prop_assert_eq!(
            motor.get("reverse").and_then(FieldValue::as_bool),
            Some(value < 0)
        );
        prop_assert_eq!(
            motor.get("ramp_time").and_then(FieldValue::as_u16),
            Some(ramp_time)
        );
    }

    #[test]
    fn prop_truncated_entries_keep_decoded_prefix(
        cut in 4usize..14
    ) {
        // A known-good two-command entry, cut anywhere past the envelope
        let full = hex::decode("010b00110d4200640f4444001007").unwrap();
        let decoded = decode_script(&full[..cut]).unwrap();
        prop_assert!(decoded.commands.len() <= 2);
        for cmd in &decoded.commands {
            prop_assert!(cmd.name == "Delay" || cmd.name == "Serial Write");
        }
    }
}
