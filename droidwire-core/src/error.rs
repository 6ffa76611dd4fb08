//! Error types for Droidwire codec operations

/// Errors that can occur while encoding or decoding protocol buffers
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Advertisement payload would exceed the 22-byte sub-record budget
    #[cfg_attr(
        feature = "std",
        error("Advertisement payload {needed} bytes exceeds maximum {max}")
    )]
    PayloadTooLarge {
        /// Total encoded sub-record bytes the mutation would have produced.
        needed: usize,
        /// The sub-record budget (22 bytes).
        max: usize,
    },

    /// Command data exceeds the per-command payload limit
    #[cfg_attr(
        feature = "std",
        error("Command data {len} bytes exceeds maximum {max}")
    )]
    CommandTooLarge {
        /// Length of the rejected command data.
        len: usize,
        /// The per-command limit (31 bytes).
        max: usize,
    },

    /// Script entry envelope carries an unexpected entry type
    #[cfg_attr(
        feature = "std",
        error("Malformed script entry: unexpected entry type {entry_type:#04x}")
    )]
    MalformedEntry {
        /// The entry type byte found in the envelope.
        entry_type: u8,
    },

    /// Declared command length exceeds the bytes actually available
    #[cfg_attr(
        feature = "std",
        error("Truncated command: expected {expected} bytes, got {actual}")
    )]
    TruncatedCommand {
        /// The number of bytes the record declared or the layout requires.
        expected: usize,
        /// The number of bytes actually available.
        actual: usize,
    },

    /// A builder parameter falls outside its wire-encodable range
    #[cfg_attr(
        feature = "std",
        error("Value {value} out of range for field `{field}`")
    )]
    ValueOutOfRange {
        /// Name of the offending builder field.
        field: &'static str,
        /// The rejected value.
        value: i32,
    },
}
