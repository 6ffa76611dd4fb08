//! Table-driven recursive script-entry decoder
//!
//! A script entry is a 4-byte envelope followed by a flat sequence of
//! `[cmd_id][len_flag]` + payload records. Each record decodes against the
//! active [`CommandTable`]; dispatch fixups re-enter [`decode_command`]
//! with a sub-table keyed by an already-decoded discriminant, so nesting
//! works to arbitrary depth (the known protocol uses two levels).

use alloc::vec::Vec;
use bytes::Bytes;

use crate::constants::{CMD_DATA_PRESENT, SCRIPT_ENTRY_TYPE, SCRIPT_ENVELOPE_LEN};
use crate::cursor::ByteCursor;
use crate::error::CodecError;
use crate::shapes::{
    custom_table, CommandShape, CommandTable, FieldKind, Fixup, CYCLE_LED_COMMANDS, DROID_COMMANDS,
};
use crate::types::{DecodedCommand, FieldValue, ScriptEntry};
use crate::Result;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Decode a complete script entry.
///
/// Returns `Err` when the envelope itself is unusable (short buffer or a
/// wrong entry type). A truncated record inside the body is recorded on
/// the returned entry instead, with every command decoded before it
/// retained.
pub fn decode_script(raw: &[u8]) -> Result<ScriptEntry> {
    if raw.len() < SCRIPT_ENVELOPE_LEN {
        return Err(CodecError::MalformedEntry {
            entry_type: raw.first().copied().unwrap_or(0),
        });
    }
    let mut cursor = ByteCursor::new(raw);
    let entry_type = cursor.u8()?;
    let entry_len = cursor.u8()?;
    let checksum = cursor.u8()?;
    let entry_id = cursor.u8()?;
    if entry_type != SCRIPT_ENTRY_TYPE {
        return Err(CodecError::MalformedEntry { entry_type });
    }

    #[cfg(feature = "logging")]
    debug!(entry_id, entry_len, "decoding script entry");

    let mut commands = Vec::new();
    let mut truncation = None;

    while cursor.remaining() >= 2 {
        // Both header reads are guarded by the loop condition
        let cmd_id = cursor.u8()?;
        let len_flag = cursor.u8()?;
        if len_flag & CMD_DATA_PRESENT == 0 {
            // End-of-script sentinel, not an error
            break;
        }
        let length = usize::from(len_flag & 0x1F);
        let payload = match cursor.take(length) {
            Ok(p) => p,
            Err(e) => {
                truncation = Some(e);
                break;
            }
        };
        match decode_command(&DROID_COMMANDS, cmd_id, payload) {
            Ok(cmd) => commands.push(cmd),
            Err(e) => {
                truncation = Some(e);
                break;
            }
        }
    }

    #[cfg(feature = "logging")]
    debug!(
        entry_id,
        commands = commands.len(),
        truncated = truncation.is_some(),
        "script entry decoded"
    );

    Ok(ScriptEntry {
        entry_id,
        entry_len,
        checksum,
        commands,
        truncation,
    })
}

/// Decode one command payload against a table.
///
/// An id the table does not describe yields a raw passthrough record; a
/// payload shorter than the shape's fixed layout is a
/// [`CodecError::TruncatedCommand`].
pub fn decode_command(table: &CommandTable, cmd_id: u8, payload: &[u8]) -> Result<DecodedCommand> {
    let Some(shape) = table.lookup(cmd_id) else {
        #[cfg(feature = "logging")]
        debug!(cmd_id, len = payload.len(), "unknown command id, passing through raw");
        let mut cmd = DecodedCommand::new("Unknown", cmd_id);
        cmd.raw = Some(Bytes::copy_from_slice(payload));
        return Ok(cmd);
    };

    match *shape {
        CommandShape::Empty { name } => Ok(DecodedCommand::new(name, cmd_id)),
        CommandShape::Fixed {
            name,
            fields,
            fixup,
        } => {
            let mut cursor = ByteCursor::new(payload);
            let mut cmd = DecodedCommand::new(name, cmd_id);
            for &(field_name, kind) in fields {
                let value = match kind {
                    FieldKind::U8 => FieldValue::U8(cursor.u8()?),
                    FieldKind::U16Be => FieldValue::U16(cursor.u16_be()?),
                };
                cmd.fields.push((field_name, value));
            }
            let remainder = cursor.rest();
            if let Some(fixup) = fixup {
                apply_fixup(fixup, &mut cmd, remainder)?;
            }
            Ok(cmd)
        }
    }
}

fn apply_fixup(fixup: Fixup, cmd: &mut DecodedCommand, remainder: &[u8]) -> Result<()> {
    match fixup {
        Fixup::MotorSignBit => {
            if let Some(id) = cmd.get("id").and_then(FieldValue::as_u8) {
                cmd.set("id", FieldValue::U8(id & !0x80));
                cmd.set("reverse", FieldValue::Bool((id & 0x80) != 0));
            }
        }
        Fixup::RotateHead => {
            take_reverse_flag(cmd);
        }
        Fixup::RotateHeadFixedSpeed => {
            cmd.set("value", FieldValue::U8(255));
            cmd.set("ramp_time", FieldValue::U16(0));
            take_reverse_flag(cmd);
        }
        Fixup::DriveFwdRev => {
            if let Some(flags) = take_reverse_flag(cmd) {
                if (flags & 0x01) == 0 {
                    cmd.set("value", FieldValue::Default);
                }
            }
        }
        Fixup::CycleLedDispatch => {
            if let Some(disc) = cmd.get("cmd").and_then(FieldValue::as_u8) {
                *cmd = decode_command(&CYCLE_LED_COMMANDS, disc, remainder)?;
            }
        }
        Fixup::CustomDispatch => {
            let custom_id = cmd.get("custom_id").and_then(FieldValue::as_u8);
            let disc = cmd.get("cmd").and_then(FieldValue::as_u8);
            if let (Some(custom_id), Some(disc)) = (custom_id, disc) {
                match custom_table(custom_id) {
                    Some(table) => *cmd = decode_command(table, disc, remainder)?,
                    None => {
                        // Unknown device: keep the discriminants, attach
                        // the undecoded remainder
                        #[cfg(feature = "logging")]
                        warn!(custom_id, "no command table for custom device id");
                        cmd.raw = Some(Bytes::copy_from_slice(remainder));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Pop the `flags` field and derive `reverse` from its high bit
fn take_reverse_flag(cmd: &mut DecodedCommand) -> Option<u8> {
    let flags = cmd.remove_field("flags")?.as_u8()?;
    cmd.set("reverse", FieldValue::Bool((flags & 0x80) != 0));
    Some(flags)
}
