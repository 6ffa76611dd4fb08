use anyhow::{Context, Result};
use colored::*;
use droidwire_core::decoder::decode_script;
use droidwire_core::types::{DecodedCommand, FieldValue, ScriptEntry};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use tracing::{info, warn};

/// JSON-friendly form of one decoded command
#[derive(Serialize)]
pub struct CommandJson {
    /// Command name from the shape table, `"Unknown"` otherwise
    pub name: String,
    /// Command id the record decoded under
    pub id: u8,
    /// Decoded fields in wire order
    pub fields: Map<String, Value>,
    /// Hex of any undecoded payload bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// JSON-friendly form of a decoded script entry
#[derive(Serialize)]
pub struct EntryJson {
    /// Entry id from the envelope
    pub entry_id: u8,
    /// Declared entry length from the envelope
    pub entry_len: u8,
    /// Checksum byte from the envelope
    pub checksum: u8,
    /// True when decoding stopped on a truncated record
    pub truncated: bool,
    /// Commands decoded before termination or truncation
    pub commands: Vec<CommandJson>,
}

/// Convert a decoded entry into its JSON-friendly form
pub fn entry_to_json(entry: &ScriptEntry) -> EntryJson {
    EntryJson {
        entry_id: entry.entry_id,
        entry_len: entry.entry_len,
        checksum: entry.checksum,
        truncated: entry.truncation.is_some(),
        commands: entry.commands.iter().map(command_to_json).collect(),
    }
}

fn command_to_json(cmd: &DecodedCommand) -> CommandJson {
    let mut fields = Map::new();
    for (name, value) in &cmd.fields {
        fields.insert((*name).to_string(), field_to_json(value));
    }
    CommandJson {
        name: cmd.name.to_string(),
        id: cmd.id,
        fields,
        raw: cmd.raw.as_ref().map(hex::encode),
    }
}

fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::U8(v) => Value::from(*v),
        FieldValue::U16(v) => Value::from(*v),
        FieldValue::I8(v) => Value::from(*v),
        FieldValue::Bool(v) => Value::from(*v),
        FieldValue::Bytes(b) => Value::from(hex::encode(b)),
        FieldValue::Default => Value::from("default"),
    }
}

pub fn execute(hex_arg: &str, output: Option<&str>) -> Result<()> {
    let data = super::read_hex_arg(hex_arg)?;
    info!("Decoding {} byte script entry", data.len());

    let entry = decode_script(&data).context("Failed to decode script entry")?;

    println!("\n=== Script Entry ===");
    println!("Entry id:   {:#04x}", entry.entry_id);
    println!("Entry len:  {}", entry.entry_len);
    println!("Checksum:   {:#04x}", entry.checksum);
    println!("Commands:   {}", entry.commands.len());
    println!();

    for cmd in &entry.commands {
        let fields: Vec<String> = cmd
            .fields
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("{} ({:#04x}) {}", cmd.name.green(), cmd.id, fields.join(", "));
        if let Some(raw) = &cmd.raw {
            println!("  raw: {}", hex::encode(raw));
        }
    }

    if let Some(truncation) = &entry.truncation {
        warn!("Entry truncated: {}", truncation);
        println!("{} entry truncated: {}", "!".yellow(), truncation);
    }

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&entry_to_json(&entry))
            .context("Failed to serialize decoded entry")?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;
        info!("Decoded entry written to: {}", output_path);
    }

    Ok(())
}
