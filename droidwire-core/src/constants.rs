//! Constants and limits for the droid proximity-beacon wire format

use serde::{Deserialize, Serialize};

/// BLE manufacturer id the advertisement payload is published under
pub const MFG_ID: u16 = 0x0183;

/// Maximum total encoded sub-record bytes (headers included) per advertisement
pub const MAX_ADV_DATA: usize = 22;

/// Serialized advertisement width: padded sub-records plus the power byte
pub const ADV_PAYLOAD_LEN: usize = MAX_ADV_DATA + 1;

/// Default advertised power level in dBm
pub const DEFAULT_POWER: i8 = -59;

/// Maximum command data bytes per command record
pub const MAX_CMD_DATA: usize = 0x1F;

/// Flag OR-ed into the leading command length byte
pub const CMD_LEN_FLAG: u8 = 0x20;

/// Sub-command byte marking a record as part of a stored command script
pub const SUB_CMD_SCRIPT: u8 = 0x42;

/// Sub-command byte for an immediate command
pub const SUB_CMD_IMMEDIATE: u8 = 0x00;

/// Bit of the per-record length byte that marks payload presence.
/// A record with this bit clear terminates script decoding.
pub const CMD_DATA_PRESENT: u8 = 0x40;

/// Entry type expected in the script entry envelope
pub const SCRIPT_ENTRY_TYPE: u8 = 0x01;

/// Script entry envelope width: entry type, length, checksum, entry id
pub const SCRIPT_ENVELOPE_LEN: usize = 4;

/// Interaction id broadcast in Disneyland Resort parks
pub const INTERACTION_ID_DLR: u16 = 0x0002;

/// Interaction id broadcast in Walt Disney World parks
pub const INTERACTION_ID_WDW: u16 = 0x0003;

/// Advertisement sub-record subtypes
pub mod subtype {
    /// Droid presence beacon, sent by each droid
    pub const DROID_PRESENCE: u8 = 0x03;
    /// Show control state (carries the interaction id)
    pub const SHOW_CONTROL: u8 = 0x05;
    /// Arbitrary game data (carries the interaction id)
    pub const ARBITRARY: u8 = 0x06;
    /// Location beacon, sent by fixed park locations
    pub const LOCATION: u8 = 0x0A;
    /// Advanced game waypoint (carries the interaction id)
    pub const GAME_ADVANCED: u8 = 0x10;
    /// Droid Depot activator beacon
    pub const DEPOT_ACTIVATE: u8 = 0xBC;
    /// Droid Depot robot bay beacon
    pub const DEPOT_BAY: u8 = 0xBD;
}

/// Subtypes whose payload starts with the shared 16-bit interaction id
pub const INTERACTION_ID_SUBTYPES: &[u8] = &[
    subtype::SHOW_CONTROL,
    subtype::ARBITRARY,
    subtype::GAME_ADVANCED,
];

/// Device id used by the R2/BB8 droids for custom commands
pub const R2_CUSTOM_ID: u8 = 0x44;

/// Droid affiliation advertised in the presence beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Affiliation {
    /// Scoundrel-built droids
    Scoundrel = 0,
    /// Resistance droids
    Resistance = 1,
    /// First Order droids
    FirstOrder = 2,
}

impl Affiliation {
    /// Decode a raw 3-bit affiliation field
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Affiliation::Scoundrel),
            1 => Some(Affiliation::Resistance),
            2 => Some(Affiliation::FirstOrder),
            _ => None,
        }
    }

    /// Raw wire value
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Human-readable name
    pub const fn label(&self) -> &'static str {
        match self {
            Affiliation::Scoundrel => "Scoundrel",
            Affiliation::Resistance => "Resistance",
            Affiliation::FirstOrder => "First Order",
        }
    }
}

/// Personality chip families installed in a droid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum Personality {
    /// R-series astromech
    RSeries = 1,
    /// BB-series astromech
    BbSeries = 2,
    /// Blue chip
    Blue = 3,
    /// Gray chip
    Gray = 4,
    /// Red chip
    Red = 5,
    /// Orange chip
    Orange = 6,
    /// Purple chip
    Purple = 7,
    /// Black chip
    Black = 8,
}

impl Personality {
    /// Decode a raw 9-bit personality chip field
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(Personality::RSeries),
            2 => Some(Personality::BbSeries),
            3 => Some(Personality::Blue),
            4 => Some(Personality::Gray),
            5 => Some(Personality::Red),
            6 => Some(Personality::Orange),
            7 => Some(Personality::Purple),
            8 => Some(Personality::Black),
            _ => None,
        }
    }

    /// Raw wire value
    pub const fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Human-readable name
    pub const fn label(&self) -> &'static str {
        match self {
            Personality::RSeries => "R-Series",
            Personality::BbSeries => "BB-Series",
            Personality::Blue => "Blue",
            Personality::Gray => "Gray",
            Personality::Red => "Red",
            Personality::Orange => "Orange",
            Personality::Purple => "Purple",
            Personality::Black => "Black",
        }
    }
}

/// Activation action carried by the Droid Depot activator beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DepotAction {
    /// Start the pairing sequence with the addressed droid
    Pair = 1,
    /// Trigger the addressed droid's activation script
    Go = 2,
}

impl DepotAction {
    /// Raw wire value
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Show control status codes
pub mod show_control {
    /// Controller is ready for a request
    pub const READY_FOR_REQUEST: u8 = 1;
    /// Request succeeded
    pub const SUCCESS: u8 = 2;
    /// Show is running
    pub const RUNNING: u8 = 3;
    /// Controller is resetting
    pub const RESETTING: u8 = 4;
    /// Controller requests one data record
    pub const REQUEST_DATA_ONE: u8 = 5;
    /// Controller requests all data records
    pub const REQUEST_DATA_ALL: u8 = 6;
    /// Request was denied
    pub const REQUEST_DENIED: u8 = 7;
    /// Request is pending
    pub const REQUEST_PENDING: u8 = 8;
    /// Controller is ready to trigger
    pub const READY_TO_TRIGGER: u8 = 9;
    /// Devices should prepare to connect
    pub const PREPARE_FOR_CONNECT: u8 = 16;
    /// Controller timed out
    pub const TIMEOUT: u8 = 17;
    /// Show needs more players
    pub const NEEDS_PLAYERS: u8 = 18;
}
