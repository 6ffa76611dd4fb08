//! Declarative command shape tables
//!
//! Each command id maps to a [`CommandShape`] describing how its payload
//! decodes: a fixed big-endian field layout, optionally followed by a
//! [`Fixup`]. Several ids are polymorphic — their true shape depends on a
//! discriminant inside their own payload — and use a dispatch fixup that
//! re-enters the decoder with a sub-table, so every command's decode logic
//! stays local to one table row instead of hand-written nested branching.

/// Width and interpretation of one fixed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned byte
    U8,
    /// Big-endian 16-bit value
    U16Be,
}

impl FieldKind {
    /// Encoded width in bytes
    pub const fn width(&self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U16Be => 2,
        }
    }
}

/// A named fixed field
pub type FieldDef = (&'static str, FieldKind);

/// Post-decode adjustment applied to a fixed layout.
///
/// Kept as a closed enum so the dispatch structure of the protocol stays
/// statically inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixup {
    /// Split the reverse bit (0x80) out of the motor `id` field
    MotorSignBit,
    /// Derive `reverse` from the flags byte, then drop `flags`
    RotateHead,
    /// As [`Fixup::RotateHead`], with implied full speed and zero ramp
    RotateHeadFixedSpeed,
    /// Drive flags: 0x80 reverse, 0x01 clear means firmware-default speed
    DriveFwdRev,
    /// Re-dispatch the remaining payload through the cycle-LED table,
    /// keyed by the decoded `cmd` field
    CycleLedDispatch,
    /// Select a device table by the decoded `custom_id`, then dispatch the
    /// remaining payload by the decoded `cmd` field
    CustomDispatch,
}

/// How one command id's payload decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandShape {
    /// The command carries no decoded payload
    Empty {
        /// Human-readable command name
        name: &'static str,
    },
    /// A fixed field layout, optionally adjusted by a fixup
    Fixed {
        /// Human-readable command name
        name: &'static str,
        /// Named fields consumed from the payload prefix, in order
        fields: &'static [FieldDef],
        /// Optional post-decode adjustment
        fixup: Option<Fixup>,
    },
}

impl CommandShape {
    /// The shape's command name
    pub const fn name(&self) -> &'static str {
        match *self {
            CommandShape::Empty { name } => name,
            CommandShape::Fixed { name, .. } => name,
        }
    }
}

/// A table of command shapes keyed by command id
#[derive(Debug)]
pub struct CommandTable {
    /// `(id, shape)` rows; ids are unique
    pub entries: &'static [(u8, CommandShape)],
}

impl CommandTable {
    /// Look up the shape for a command id
    pub fn lookup(&self, id: u8) -> Option<&CommandShape> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, shape)| shape)
    }
}

/// Top-level droid command table
pub static DROID_COMMANDS: CommandTable = CommandTable {
    entries: &[
        (0x01, CommandShape::Empty { name: "ID" }),
        (
            0x02,
            CommandShape::Fixed {
                name: "Mono LED",
                fields: &[("id", FieldKind::U8), ("brightness", FieldKind::U8)],
                fixup: None,
            },
        ),
        (
            0x03,
            CommandShape::Fixed {
                name: "RGB LED",
                fields: &[
                    ("id", FieldKind::U8),
                    ("r", FieldKind::U8),
                    ("g", FieldKind::U8),
                    ("b", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
        (
            0x04,
            CommandShape::Fixed {
                name: "Cycle LED",
                fields: &[("cmd", FieldKind::U8)],
                fixup: Some(Fixup::CycleLedDispatch),
            },
        ),
        (
            0x05,
            CommandShape::Fixed {
                name: "Motor",
                fields: &[
                    ("id", FieldKind::U8),
                    ("value", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                ],
                fixup: Some(Fixup::MotorSignBit),
            },
        ),
        (0x06, CommandShape::Empty { name: "No action" }),
        (
            0x0C,
            CommandShape::Fixed {
                name: "Script",
                fields: &[("entry", FieldKind::U8), ("action", FieldKind::U8)],
                fixup: None,
            },
        ),
        (
            0x0D,
            CommandShape::Fixed {
                name: "Delay",
                fields: &[("delay", FieldKind::U16Be)],
                fixup: None,
            },
        ),
        (
            0x0F,
            CommandShape::Fixed {
                name: "Custom",
                fields: &[("custom_id", FieldKind::U8), ("cmd", FieldKind::U8)],
                fixup: Some(Fixup::CustomDispatch),
            },
        ),
    ],
};

/// Sub-table for the cycle-LED command family (dispatched by `cmd`)
pub static CYCLE_LED_COMMANDS: CommandTable = CommandTable {
    entries: &[
        (
            0x01,
            CommandShape::Fixed {
                name: "LED Mono Ramp",
                fields: &[
                    ("id", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("end_value", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
        (
            0x02,
            CommandShape::Fixed {
                name: "LED Mono Flash",
                fields: &[
                    ("id", FieldKind::U8),
                    ("high_period", FieldKind::U16Be),
                    ("low_period", FieldKind::U16Be),
                    ("flashes", FieldKind::U8),
                    ("high_value", FieldKind::U8),
                    ("low_value", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
        (
            0x03,
            CommandShape::Fixed {
                name: "LED Mono Pulse",
                fields: &[
                    ("id", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("cycles", FieldKind::U8),
                    ("high_value", FieldKind::U8),
                    ("low_value", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
        (
            0x04,
            CommandShape::Fixed {
                name: "LED RGB Ramp",
                fields: &[
                    ("id", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("r", FieldKind::U8),
                    ("g", FieldKind::U8),
                    ("b", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
        (
            0x05,
            CommandShape::Fixed {
                name: "LED RGB Flash",
                fields: &[
                    ("id", FieldKind::U8),
                    ("high_period", FieldKind::U16Be),
                    ("low_period", FieldKind::U16Be),
                    ("flashes", FieldKind::U8),
                    ("sr", FieldKind::U8),
                    ("sg", FieldKind::U8),
                    ("sb", FieldKind::U8),
                    ("er", FieldKind::U8),
                    ("eg", FieldKind::U8),
                    ("eb", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
        (
            0x06,
            CommandShape::Fixed {
                name: "LED RGB Pulse",
                fields: &[
                    ("id", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("cycles", FieldKind::U8),
                    ("vr", FieldKind::U8),
                    ("vg", FieldKind::U8),
                    ("vb", FieldKind::U8),
                    ("dr", FieldKind::U8),
                    ("dg", FieldKind::U8),
                    ("db", FieldKind::U8),
                ],
                fixup: None,
            },
        ),
    ],
};

/// Sub-table for R2/BB8 custom commands (device id 0x44, dispatched by
/// `cmd`)
pub static R2_CUSTOM_COMMANDS: CommandTable = CommandTable {
    entries: &[
        (
            0x00,
            CommandShape::Fixed {
                name: "Serial Write",
                fields: &[("reg", FieldKind::U8), ("value", FieldKind::U8)],
                fixup: None,
            },
        ),
        (
            0x01,
            CommandShape::Fixed {
                name: "Center R2 Head",
                fields: &[("value", FieldKind::U8), ("start_timer", FieldKind::U8)],
                fixup: None,
            },
        ),
        (
            0x02,
            CommandShape::Fixed {
                name: "Rotate R2 Head",
                fields: &[
                    ("flags", FieldKind::U8),
                    ("value", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("delay", FieldKind::U16Be),
                ],
                fixup: Some(Fixup::RotateHead),
            },
        ),
        (
            0x03,
            CommandShape::Fixed {
                name: "Rotate R2 Head Simple",
                fields: &[("flags", FieldKind::U8), ("delay", FieldKind::U8)],
                fixup: Some(Fixup::RotateHeadFixedSpeed),
            },
        ),
        (
            0x04,
            CommandShape::Fixed {
                name: "BB8 Rotate",
                fields: &[
                    ("flags", FieldKind::U8),
                    ("value", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("delay", FieldKind::U16Be),
                ],
                fixup: Some(Fixup::RotateHead),
            },
        ),
        (
            0x05,
            CommandShape::Fixed {
                name: "Drive Fwd/Rev",
                fields: &[
                    ("flags", FieldKind::U8),
                    ("value", FieldKind::U8),
                    ("ramp_time", FieldKind::U16Be),
                    ("delay", FieldKind::U16Be),
                ],
                fixup: Some(Fixup::DriveFwdRev),
            },
        ),
    ],
};

/// Device-specific custom command tables keyed by `custom_id`
pub fn custom_table(custom_id: u8) -> Option<&'static CommandTable> {
    match custom_id {
        crate::constants::R2_CUSTOM_ID => Some(&R2_CUSTOM_COMMANDS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(DROID_COMMANDS.lookup(0x05).unwrap().name(), "Motor");
        assert!(DROID_COMMANDS.lookup(0x07).is_none());
        assert_eq!(
            CYCLE_LED_COMMANDS.lookup(0x06).unwrap().name(),
            "LED RGB Pulse"
        );
    }

    #[test]
    fn test_custom_table_selection() {
        assert!(custom_table(0x44).is_some());
        assert!(custom_table(0x45).is_none());
    }

    #[test]
    fn test_ids_unique() {
        for table in [&DROID_COMMANDS, &CYCLE_LED_COMMANDS, &R2_CUSTOM_COMMANDS] {
            for (i, (id, _)) in table.entries.iter().enumerate() {
                assert!(
                    !table.entries[i + 1..].iter().any(|(other, _)| other == id),
                    "duplicate id {id:#04x}"
                );
            }
        }
    }
}
