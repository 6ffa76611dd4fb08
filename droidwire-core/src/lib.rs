//! # Droidwire Core
//!
//! Bidirectional codec for the short-range droid proximity-beacon and
//! command-script protocol carried over BLE manufacturer data.
//!
//! ## Modules
//!
//! - `constants`: Wire format constants, subtype ids, and domain enums
//! - `cursor`: Bounds-checked byte reader with explicit per-field endianness
//! - `types`: Core types (OrderedMap, DecodedCommand, DroidPresence, ...)
//! - `advert`: Advertisement frame codec and beacon builders
//! - `command`: Command buffer encoder and generic robot command builders
//! - `droid`: R2/BB8 specific custom-command builders
//! - `shapes`: Declarative command shape tables
//! - `decoder`: Table-driven recursive script-entry decoder

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod advert;
pub mod command;
pub mod constants;
pub mod cursor;
pub mod decoder;
pub mod droid;
pub mod error;
pub mod shapes;
pub mod types;

// Re-export commonly used types
pub use advert::AdvertisementFrame;
pub use command::CommandBuffer;
pub use error::CodecError;
pub use types::{DecodedCommand, FieldValue, ScriptEntry};

/// Result type alias for Droidwire operations
pub type Result<T> = core::result::Result<T, CodecError>;
