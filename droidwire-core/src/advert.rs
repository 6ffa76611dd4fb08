//! Advertisement frame codec and beacon builders
//!
//! An advertisement frame is an insertion-ordered set of
//! `[subtype][length][data]` sub-records serialized into a fixed 22-byte
//! region of the manufacturer data, followed by one signed power byte.
//! Mutations validate the budget before committing and hand the freshly
//! serialized payload back to the caller; publishing it to a transport is
//! the caller's explicit step, never a side effect here.

use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{
    subtype, Affiliation, DepotAction, Personality, ADV_PAYLOAD_LEN, DEFAULT_POWER,
    INTERACTION_ID_DLR, INTERACTION_ID_SUBTYPES, MAX_ADV_DATA,
};
use crate::cursor::ByteCursor;
use crate::error::CodecError;
use crate::types::{DroidPresence, OrderedMap, ParsedSubRecord};
use crate::Result;

#[cfg(feature = "logging")]
use tracing::debug;

/// Maximum data bytes in the arbitrary game-data sub-record
const MAX_ARBITRARY_DATA: usize = 7;

/// The broadcast payload under construction
#[derive(Debug, Clone)]
pub struct AdvertisementFrame {
    records: OrderedMap<Vec<u8>>,
    interaction_id: u16,
    power: i8,
}

impl Default for AdvertisementFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvertisementFrame {
    /// Create an empty frame with the default power level and the DLR
    /// interaction id
    pub fn new() -> Self {
        Self {
            records: OrderedMap::new(),
            interaction_id: INTERACTION_ID_DLR,
            power: DEFAULT_POWER,
        }
    }

    /// Number of sub-records currently held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the frame holds no sub-records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current advertised power level
    pub fn power(&self) -> i8 {
        self.power
    }

    /// Current interaction id
    pub fn interaction_id(&self) -> u16 {
        self.interaction_id
    }

    /// Total encoded sub-record bytes, per-record headers included
    fn encoded_len(&self) -> usize {
        self.records.iter().map(|(_, data)| 2 + data.len()).sum()
    }

    /// Insert or replace a sub-record and return the new serialized payload.
    ///
    /// Replacing keeps the record's wire position; a first insert appends.
    /// The mutation is rejected whole if the encoded total would exceed the
    /// 22-byte budget, leaving the frame unchanged.
    pub fn add_sub_record(&mut self, rec_subtype: u8, data: &[u8]) -> Result<Bytes> {
        let mut needed = self.encoded_len() + 2 + data.len();
        if let Some(existing) = self.records.get(rec_subtype) {
            needed -= 2 + existing.len();
        }
        if needed > MAX_ADV_DATA {
            return Err(CodecError::PayloadTooLarge {
                needed,
                max: MAX_ADV_DATA,
            });
        }
        self.records.insert(rec_subtype, data.to_vec());
        Ok(self.serialize())
    }

    /// Remove a sub-record. Returns the new serialized payload, or `None`
    /// if the subtype was absent.
    pub fn remove_sub_record(&mut self, rec_subtype: u8) -> Option<Bytes> {
        self.records.remove(rec_subtype)?;
        Some(self.serialize())
    }

    /// Drop every sub-record. Returns the new serialized payload, or
    /// `None` if the frame was already empty.
    pub fn clear(&mut self) -> Option<Bytes> {
        if self.records.is_empty() {
            return None;
        }
        self.records.clear();
        Some(self.serialize())
    }

    /// Update the trailing power byte. Returns the new serialized payload,
    /// or `None` if the value did not change.
    pub fn set_power(&mut self, power: i8) -> Option<Bytes> {
        if power == self.power {
            return None;
        }
        self.power = power;
        Some(self.serialize())
    }

    /// Rewrite the shared interaction id inside every id-bearing
    /// sub-record, leaving all other bytes untouched. Returns the new
    /// serialized payload when at least one record changed.
    pub fn set_interaction_id(&mut self, interaction_id: u16) -> Option<Bytes> {
        if interaction_id == self.interaction_id {
            return None;
        }
        self.interaction_id = interaction_id;
        let id_bytes = interaction_id.to_be_bytes();
        let mut dirty = false;
        for (key, data) in self.records.iter_mut() {
            if INTERACTION_ID_SUBTYPES.contains(&key) && data.len() >= 2 {
                data[0..2].copy_from_slice(&id_bytes);
                dirty = true;
            }
        }
        if dirty {
            Some(self.serialize())
        } else {
            None
        }
    }

    /// Serialize the frame: sub-records in insertion order, zero-padded to
    /// 22 bytes, then the power byte as its two's-complement raw value.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(ADV_PAYLOAD_LEN);
        for (key, data) in self.records.iter() {
            buf.put_u8(key);
            buf.put_u8(data.len() as u8);
            buf.put_slice(data);
        }
        buf.resize(MAX_ADV_DATA, 0);
        buf.put_u8(self.power as u8);
        buf.freeze()
    }

    // --- high-level beacon builders ---

    /// Droid presence beacon (short form).
    ///
    /// Sent by each droid. Receiving droids play a reaction sequence based
    /// on the sender's affiliation and their own installed personality
    /// chip; unpaired senders are ignored.
    pub fn add_droid_presence(
        &mut self,
        affiliation: Affiliation,
        personality: Personality,
        paired: bool,
    ) -> Result<Bytes> {
        let chip = personality.as_u16();
        let payload = [
            0x44,
            presence_status_byte(paired),
            presence_ident_byte(affiliation, chip),
            (chip & 0xFF) as u8,
        ];
        self.add_sub_record(subtype::DROID_PRESENCE, &payload)
    }

    /// Droid presence beacon (extended form).
    ///
    /// Sent by droids in test mode, or by unpaired droids that received a
    /// depot bay beacon. `bay` must fit in 4 bits.
    #[allow(clippy::too_many_arguments)]
    pub fn add_droid_presence_extended(
        &mut self,
        affiliation: Affiliation,
        personality: Personality,
        paired: bool,
        battery_low: bool,
        action78: bool,
        bay: u8,
        rssi: i8,
    ) -> Result<Bytes> {
        if bay > 0x0F {
            return Err(CodecError::ValueOutOfRange {
                field: "bay",
                value: i32::from(bay),
            });
        }
        let chip = personality.as_u16();
        let mut flags = bay;
        if battery_low {
            flags |= 0x80;
        }
        if action78 {
            flags |= 0x10;
        }
        let payload = [
            0x44,
            presence_status_byte(paired),
            presence_ident_byte(affiliation, chip),
            (chip & 0xFF) as u8,
            flags,
            rssi as u8,
        ];
        self.add_sub_record(subtype::DROID_PRESENCE, &payload)
    }

    /// Remove the droid presence beacon
    pub fn remove_droid_presence(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::DROID_PRESENCE)
    }

    /// Location beacon, sent by fixed locations within the park.
    ///
    /// `location` selects the interaction script (1-7). Droids wait at
    /// least a minute between location responses regardless of
    /// `min_interval`.
    pub fn add_location_beacon(
        &mut self,
        location: u8,
        min_interval: u8,
        expected_rssi: i8,
        accept: u8,
    ) -> Result<Bytes> {
        if location == 0 || location > 7 {
            return Err(CodecError::ValueOutOfRange {
                field: "location",
                value: i32::from(location),
            });
        }
        let payload = [location, min_interval, expected_rssi as u8, accept];
        self.add_sub_record(subtype::LOCATION, &payload)
    }

    /// Remove the location beacon
    pub fn remove_location_beacon(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::LOCATION)
    }

    /// Droid Depot robot bay beacon
    pub fn add_depot_bay(&mut self, bay: u8, expected_rssi: i8) -> Result<Bytes> {
        let payload = [bay, expected_rssi as u8];
        self.add_sub_record(subtype::DEPOT_BAY, &payload)
    }

    /// Remove the depot bay beacon
    pub fn remove_depot_bay(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::DEPOT_BAY)
    }

    /// Droid Depot activator beacon, addressed to one droid by its 6-byte
    /// Bluetooth address. `delay` seeds the in-memory default used by the
    /// script delay command (in 100ms units).
    pub fn add_depot_activate(
        &mut self,
        gap_addr: [u8; 6],
        action: DepotAction,
        delay: u8,
    ) -> Result<Bytes> {
        let mut payload = [0u8; 8];
        payload[0..6].copy_from_slice(&gap_addr);
        payload[6] = action.as_u8();
        payload[7] = delay;
        self.add_sub_record(subtype::DEPOT_ACTIVATE, &payload)
    }

    /// Remove the depot activator beacon
    pub fn remove_depot_activate(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::DEPOT_ACTIVATE)
    }

    /// Show control state record. Carries the shared interaction id in its
    /// first two payload bytes; `status` uses the 4-bit codes in
    /// [`crate::constants::show_control`].
    pub fn add_show_control(
        &mut self,
        down: bool,
        in_use: bool,
        status: u8,
        guest_id: [u8; 8],
    ) -> Result<Bytes> {
        let state = (u8::from(down) << 7) | (u8::from(in_use) << 6) | ((status & 0x0F) << 2);
        let mut payload = [0u8; 11];
        payload[0..2].copy_from_slice(&self.interaction_id.to_be_bytes());
        payload[2] = state;
        payload[3..11].copy_from_slice(&guest_id);
        self.add_sub_record(subtype::SHOW_CONTROL, &payload)
    }

    /// Remove the show control record
    pub fn remove_show_control(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::SHOW_CONTROL)
    }

    /// Advanced game waypoint record. Carries the shared interaction id.
    pub fn add_game_advanced(&mut self, waypoint_id: u8, expected_rssi: i8) -> Result<Bytes> {
        let id = self.interaction_id.to_be_bytes();
        let payload = [id[0], id[1], waypoint_id, expected_rssi as u8];
        self.add_sub_record(subtype::GAME_ADVANCED, &payload)
    }

    /// Remove the advanced game waypoint record
    pub fn remove_game_advanced(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::GAME_ADVANCED)
    }

    /// Arbitrary game data record, at most 7 data bytes. Receivers left-pad
    /// the data with zeros to 7 bytes. Carries the shared interaction id.
    pub fn add_arbitrary(&mut self, data: &[u8]) -> Result<Bytes> {
        if data.len() > MAX_ARBITRARY_DATA {
            return Err(CodecError::ValueOutOfRange {
                field: "arbitrary data length",
                value: data.len() as i32,
            });
        }
        let mut payload = Vec::with_capacity(2 + data.len());
        payload.extend_from_slice(&self.interaction_id.to_be_bytes());
        payload.extend_from_slice(data);
        self.add_sub_record(subtype::ARBITRARY, &payload)
    }

    /// Territory-war game state packed into the arbitrary record.
    /// Influence values are fractions in `0.0..=1.0`, scaled to a byte.
    #[allow(clippy::too_many_arguments)]
    pub fn add_arbitrary_territory(
        &mut self,
        game_in_progress: bool,
        skimmer_active: bool,
        game_sequence: u8,
        influence_this: (f32, f32),
        influence_global: (f32, f32),
        hack_count: u8,
    ) -> Result<Bytes> {
        let state = (u8::from(game_in_progress) << 7)
            | (u8::from(skimmer_active) << 6)
            | (game_sequence & 0x3F);
        let data = [
            0x00,
            state,
            scale_unit(influence_this.0),
            scale_unit(influence_this.1),
            scale_unit(influence_global.0),
            scale_unit(influence_global.1),
            hack_count,
        ];
        self.add_arbitrary(&data)
    }

    /// Audio sync state packed into the arbitrary record
    pub fn add_arbitrary_audio(&mut self, sequence_id: u8, elapsed_time: u8) -> Result<Bytes> {
        let data = [0x00, elapsed_time, sequence_id, 0x00, 0x00, 0x00, 0x00];
        self.add_arbitrary(&data)
    }

    /// Remove the arbitrary game data record
    pub fn remove_arbitrary(&mut self) -> Option<Bytes> {
        self.remove_sub_record(subtype::ARBITRARY)
    }
}

const fn presence_status_byte(paired: bool) -> u8 {
    if paired {
        0x81
    } else {
        0x01
    }
}

const fn presence_ident_byte(affiliation: Affiliation, chip: u16) -> u8 {
    (4 << 5) | (affiliation.as_u8() << 2) | (((chip >> 8) & 1) as u8)
}

/// Scale a unit-interval fraction to a rounded byte
fn scale_unit(x: f32) -> u8 {
    let v = x * 255.0 + 0.5;
    if v <= 0.0 {
        0
    } else if v >= 255.0 {
        255
    } else {
        v as u8
    }
}

/// Parse a received manufacturer-data payload into its sub-records.
///
/// Walks `[subtype][length][data]` headers until fewer than two bytes
/// remain, a `(0, 0)` padding header appears, or a declared length exceeds
/// the remaining bytes. Damage at the tail silently drops the trailing
/// record; everything already parsed is returned.
pub fn parse_advertisement(raw: &[u8]) -> OrderedMap<ParsedSubRecord> {
    let mut records = OrderedMap::new();
    let mut cursor = ByteCursor::new(raw);

    while cursor.remaining() >= 2 {
        // Both reads are guarded by the loop condition
        let rec_subtype = match cursor.u8() {
            Ok(v) => v,
            Err(_) => break,
        };
        let length = match cursor.u8() {
            Ok(v) => v as usize,
            Err(_) => break,
        };
        if rec_subtype == 0 && length == 0 {
            // Zero padding after the last record
            break;
        }
        if length > cursor.remaining() {
            #[cfg(feature = "logging")]
            debug!(
                rec_subtype,
                declared = length,
                available = cursor.remaining(),
                "dropping truncated trailing sub-record"
            );
            break;
        }
        let data = match cursor.take(length) {
            Ok(d) => d,
            Err(_) => break,
        };
        let presence = if rec_subtype == subtype::DROID_PRESENCE {
            parse_presence(data)
        } else {
            None
        };
        records.insert(
            rec_subtype,
            ParsedSubRecord {
                subtype: rec_subtype,
                data: Bytes::copy_from_slice(data),
                presence,
            },
        );
    }

    records
}

/// Decode presence fields from a subtype 0x03 payload.
///
/// Droids send 4, 5, or 6 byte forms; shorter payloads yield `None` and
/// the optional fields degrade gracefully.
fn parse_presence(data: &[u8]) -> Option<DroidPresence> {
    if data.len() < 4 {
        return None;
    }
    let ident = data[2];
    let personality_raw = u16::from(data[3]) | (u16::from(ident & 1) << 8);
    let affiliation_raw = (ident >> 2) & 0x07;

    let mut presence = DroidPresence {
        droid_id: data[0],
        affiliation_raw,
        affiliation: Affiliation::from_raw(affiliation_raw),
        personality_raw,
        personality: Personality::from_raw(personality_raw),
        paired: (data[1] & 0x80) != 0,
        bay: None,
        action78: None,
        battery_low: None,
        rssi: None,
    };
    if data.len() >= 5 {
        let flags = data[4];
        presence.bay = Some(flags & 0x0F);
        presence.action78 = Some((flags & 0x10) != 0);
        presence.battery_low = Some((flags & 0x80) != 0);
    }
    if data.len() >= 6 {
        presence.rssi = Some(data[5] as i8);
    }
    Some(presence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::subtype;

    #[test]
    fn test_power_byte_encoding() {
        let mut frame = AdvertisementFrame::new();
        // Default -59 dBm
        let payload = frame.serialize();
        assert_eq!(payload.len(), ADV_PAYLOAD_LEN);
        assert_eq!(payload[22], 0xC5);

        let payload = frame.set_power(-90).unwrap();
        assert_eq!(payload[22], 0xA6);
        assert!(frame.set_power(-90).is_none());
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let mut frame = AdvertisementFrame::new();
        frame.add_depot_bay(5, -90).unwrap();
        assert_eq!(frame.serialize(), frame.serialize());
    }

    #[test]
    fn test_depot_bay_layout() {
        let mut frame = AdvertisementFrame::new();
        let payload = frame.add_depot_bay(5, -90).unwrap();
        assert_eq!(&payload[0..4], &[0xBD, 0x02, 0x05, 0xA6]);
        assert_eq!(&payload[4..22], &[0u8; 18][..]);
    }

    #[test]
    fn test_budget_boundary() {
        let mut frame = AdvertisementFrame::new();
        frame.add_sub_record(0x01, &[0u8; 9]).unwrap();
        // Exactly 22 bytes of encoded records is allowed
        frame.add_sub_record(0x02, &[0u8; 9]).unwrap();
        let before = frame.serialize();

        let err = frame.add_sub_record(0x03, &[]).unwrap_err();
        assert_eq!(
            err,
            CodecError::PayloadTooLarge {
                needed: 24,
                max: MAX_ADV_DATA
            }
        );
        // Rejected mutation left the frame untouched
        assert_eq!(frame.serialize(), before);
    }

    #[test]
    fn test_replace_keeps_wire_position() {
        let mut frame = AdvertisementFrame::new();
        frame.add_sub_record(0x10, &[1, 2]).unwrap();
        frame.add_sub_record(0x03, &[3]).unwrap();
        frame.add_sub_record(0xBD, &[4]).unwrap();
        let payload = frame.add_sub_record(0x03, &[9]).unwrap();

        let parsed = parse_advertisement(&payload);
        let order: alloc::vec::Vec<u8> = parsed.iter().map(|(k, _)| k).collect();
        assert_eq!(order, [0x10, 0x03, 0xBD]);
        assert_eq!(parsed.get(0x03).unwrap().data.as_ref(), &[9]);
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let mut frame = AdvertisementFrame::new();
        frame.add_depot_bay(3, -70).unwrap();
        frame
            .add_droid_presence(Affiliation::Resistance, Personality::RSeries, true)
            .unwrap();
        let payload = frame.serialize();

        let parsed = parse_advertisement(&payload);
        assert_eq!(parsed.len(), 2);
        let order: alloc::vec::Vec<u8> = parsed.iter().map(|(k, _)| k).collect();
        assert_eq!(order, [subtype::DEPOT_BAY, subtype::DROID_PRESENCE]);
    }

    #[test]
    fn test_presence_extended_round_trip() {
        let mut frame = AdvertisementFrame::new();
        let payload = frame
            .add_droid_presence_extended(
                Affiliation::FirstOrder,
                Personality::Black,
                true,
                true,
                false,
                7,
                -42,
            )
            .unwrap();

        let parsed = parse_advertisement(&payload);
        let presence = parsed
            .get(subtype::DROID_PRESENCE)
            .and_then(|r| r.presence.clone())
            .unwrap();
        assert_eq!(presence.droid_id, 0x44);
        assert_eq!(presence.affiliation, Some(Affiliation::FirstOrder));
        assert_eq!(presence.personality, Some(Personality::Black));
        assert!(presence.paired);
        assert_eq!(presence.bay, Some(7));
        assert_eq!(presence.battery_low, Some(true));
        assert_eq!(presence.action78, Some(false));
        assert_eq!(presence.rssi, Some(-42));
    }

    #[test]
    fn test_presence_graceful_degradation() {
        // 4-byte form: no bay/flags/rssi
        let short = parse_presence(&[0x44, 0x81, 0x80 | (1 << 2), 0x02]).unwrap();
        assert_eq!(short.affiliation, Some(Affiliation::Resistance));
        assert_eq!(short.personality, Some(Personality::BbSeries));
        assert!(short.bay.is_none());
        assert!(short.rssi.is_none());

        // RSSI byte is the signed reinterpretation of the raw value
        let full = parse_presence(&[0x44, 0x01, 0x80, 0x01, 0x05, 0xB0]).unwrap();
        assert!(!full.paired);
        assert_eq!(full.rssi, Some(-80));

        assert!(parse_presence(&[0x44, 0x81, 0x80]).is_none());
    }

    #[test]
    fn test_truncated_trailing_record_dropped() {
        // Second record declares 9 bytes but only 2 follow
        let raw = [0xBD, 0x02, 0x05, 0xA6, 0x0A, 0x09, 0x01, 0x02];
        let parsed = parse_advertisement(&raw);
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains_key(0xBD));
    }

    #[test]
    fn test_interaction_id_rewrite_in_place() {
        let mut frame = AdvertisementFrame::new();
        frame.add_depot_bay(1, -60).unwrap();
        frame.add_game_advanced(9, -70).unwrap();
        frame.add_arbitrary(&[1, 2, 3]).unwrap();
        let before = frame.serialize();

        let after = frame
            .set_interaction_id(crate::constants::INTERACTION_ID_WDW)
            .unwrap();

        let parsed = parse_advertisement(&after);
        assert_eq!(parsed.get(0x10).unwrap().data[0..2], [0x00, 0x03]);
        assert_eq!(parsed.get(0x06).unwrap().data[0..2], [0x00, 0x03]);
        // Untagged record and all non-id bytes are untouched
        assert_eq!(parsed.get(0xBD).unwrap().data.as_ref(), &[0x01, 0xC4]);
        assert_eq!(after[0..6], before[0..6]);
        assert_eq!(after[8..12], before[8..12]);
        assert_eq!(after[14..], before[14..]);

        // Same id again is a no-op
        assert!(frame
            .set_interaction_id(crate::constants::INTERACTION_ID_WDW)
            .is_none());
    }

    #[test]
    fn test_arbitrary_data_limit() {
        let mut frame = AdvertisementFrame::new();
        assert!(frame.add_arbitrary(&[0u8; 7]).is_ok());
        assert!(matches!(
            frame.add_arbitrary(&[0u8; 8]),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut frame = AdvertisementFrame::new();
        assert!(frame.clear().is_none());
        frame.add_depot_bay(1, -60).unwrap();
        let payload = frame.clear().unwrap();
        assert_eq!(&payload[0..22], &[0u8; 22][..]);
        assert!(frame.is_empty());
    }
}
