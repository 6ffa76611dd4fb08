//! Core types shared by the advertisement and command codecs

use alloc::vec::Vec;
use bytes::Bytes;
use core::fmt;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::constants::{Affiliation, Personality};
use crate::error::CodecError;

/// An insertion-ordered `subtype -> value` map with in-place replace.
///
/// Wire order of advertisement sub-records is insertion order, not key
/// order, and replacing an existing key must not move it. Entries live in
/// a vector; a key -> position index keeps lookups cheap.
#[derive(Debug, Clone, Default)]
pub struct OrderedMap<V> {
    entries: Vec<(u8, V)>,
    index: HashMap<u8, usize>,
}

impl<V> OrderedMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is present
    pub fn contains_key(&self, key: u8) -> bool {
        self.index.contains_key(&key)
    }

    /// Look up a value by key
    pub fn get(&self, key: u8) -> Option<&V> {
        self.index.get(&key).map(|&pos| &self.entries[pos].1)
    }

    /// Insert or replace. A replace keeps the entry's position; a first
    /// insert appends. Returns the previous value when replacing.
    pub fn insert(&mut self, key: u8, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&pos) => Some(core::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove an entry, shifting later entries forward
    pub fn remove(&mut self, key: u8) -> Option<V> {
        let pos = self.index.remove(&key)?;
        let (_, value) = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Iterate entries mutably in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u8, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (*k, v))
    }
}

/// Presence beacon fields decoded from a subtype 0x03 sub-record.
///
/// Droids broadcast 4-, 5-, or 6-byte presence payloads; the optional
/// fields are `None` when the shorter forms are received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroidPresence {
    /// Device id of the sending droid
    pub droid_id: u8,
    /// Raw 3-bit affiliation field
    pub affiliation_raw: u8,
    /// Decoded affiliation, when the raw value is a known one
    pub affiliation: Option<Affiliation>,
    /// Raw 9-bit personality chip field
    pub personality_raw: u16,
    /// Decoded personality chip, when the raw value is a known one
    pub personality: Option<Personality>,
    /// True once the droid finished its pairing sequence
    pub paired: bool,
    /// Depot bay number, extended form only
    pub bay: Option<u8>,
    /// Action-78 flag, extended form only
    pub action78: Option<bool>,
    /// Low battery flag, extended form only
    pub battery_low: Option<bool>,
    /// Observed signal strength, extended form only
    pub rssi: Option<i8>,
}

/// One sub-record recovered from an advertisement payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubRecord {
    /// Sub-record subtype
    pub subtype: u8,
    /// Raw sub-record data, header stripped
    pub data: Bytes,
    /// Decoded presence fields for subtype 0x03
    pub presence: Option<DroidPresence>,
}

/// A value decoded from one command field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Unsigned byte
    U8(u8),
    /// Big-endian 16-bit value
    U16(u16),
    /// Signed byte
    I8(i8),
    /// Flag derived by a fixup
    Bool(bool),
    /// Undecoded bytes attached verbatim
    Bytes(Bytes),
    /// Sentinel for the firmware-default drive speed
    Default,
}

impl FieldValue {
    /// The contained u8, if that is the variant
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            FieldValue::U8(v) => Some(*v),
            _ => None,
        }
    }

    /// The contained u16, widening a u8 if needed
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            FieldValue::U16(v) => Some(*v),
            FieldValue::U8(v) => Some(u16::from(*v)),
            _ => None,
        }
    }

    /// The contained bool, if that is the variant
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::U8(v) => write!(f, "{}", v),
            FieldValue::U16(v) => write!(f, "{}", v),
            FieldValue::I8(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Bytes(b) => {
                for byte in b.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            FieldValue::Default => f.write_str("default"),
        }
    }
}

/// One structured command produced by the script decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCommand {
    /// Human-readable command name, `"Unknown"` for unrecognized ids
    pub name: &'static str,
    /// The command id (or nested discriminant) this record decoded under
    pub id: u8,
    /// Named fields in decode order; fixups may derive or remove entries
    pub fields: Vec<(&'static str, FieldValue)>,
    /// Raw payload bytes for records the active table does not describe
    pub raw: Option<Bytes>,
}

impl DecodedCommand {
    /// Build a record with no fields
    pub fn new(name: &'static str, id: u8) -> Self {
        Self {
            name,
            id,
            fields: Vec::new(),
            raw: None,
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Replace a field in place, or append it when absent
    pub fn set(&mut self, name: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Remove a field by name
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| *n == name)?;
        Some(self.fields.remove(pos).1)
    }
}

/// A fully decoded command script entry
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEntry {
    /// Entry identifier from the envelope
    pub entry_id: u8,
    /// Declared entry length from the envelope
    pub entry_len: u8,
    /// Checksum byte from the envelope, carried opaquely
    pub checksum: u8,
    /// Commands decoded before termination or truncation
    pub commands: Vec<DecodedCommand>,
    /// Set when decoding aborted on a truncated record; the commands
    /// decoded up to that point are retained above
    pub truncation: Option<CodecError>,
}
