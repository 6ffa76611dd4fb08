use anyhow::{Context, Result};
use colored::*;
use droidwire_core::advert::parse_advertisement;
use droidwire_core::constants::subtype;
use droidwire_core::types::{DroidPresence, ParsedSubRecord};
use serde::Serialize;
use std::fs;
use tracing::info;

/// JSON-friendly form of one parsed sub-record
#[derive(Serialize)]
pub struct RecordJson {
    /// Sub-record subtype byte
    pub subtype: u8,
    /// Subtype name, when known
    pub label: &'static str,
    /// Hex of the raw sub-record data
    pub data: String,
    /// Decoded presence fields for droid presence records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<DroidPresence>,
}

/// Human-readable name for a sub-record subtype
pub fn subtype_label(rec_subtype: u8) -> &'static str {
    match rec_subtype {
        subtype::DROID_PRESENCE => "droid presence",
        subtype::SHOW_CONTROL => "show control",
        subtype::ARBITRARY => "arbitrary game data",
        subtype::LOCATION => "location beacon",
        subtype::GAME_ADVANCED => "game waypoint",
        subtype::DEPOT_ACTIVATE => "depot activate",
        subtype::DEPOT_BAY => "depot bay",
        _ => "unknown",
    }
}

/// Convert a parsed sub-record into its JSON-friendly form
pub fn record_to_json(record: &ParsedSubRecord) -> RecordJson {
    RecordJson {
        subtype: record.subtype,
        label: subtype_label(record.subtype),
        data: hex::encode(&record.data),
        presence: record.presence.clone(),
    }
}

pub fn execute(hex_arg: &str, output: Option<&str>) -> Result<()> {
    let data = super::read_hex_arg(hex_arg)?;
    info!("Parsing {} byte advertisement payload", data.len());

    let records = parse_advertisement(&data);

    println!("\n=== Advertisement Records ===");
    if records.is_empty() {
        println!("{} No sub-records found", "✗".red());
        return Ok(());
    }

    for (rec_subtype, record) in records.iter() {
        println!(
            "{:#04x} {} ({} bytes): {}",
            rec_subtype,
            subtype_label(rec_subtype).green(),
            record.data.len(),
            hex::encode(&record.data)
        );
        if let Some(presence) = &record.presence {
            let affiliation = presence
                .affiliation
                .map(|a| a.label())
                .unwrap_or("unknown");
            let personality = presence
                .personality
                .map(|p| p.label())
                .unwrap_or("unknown");
            println!(
                "  droid {:#04x}: {} / {}, paired: {}",
                presence.droid_id, affiliation, personality, presence.paired
            );
            if let Some(bay) = presence.bay {
                println!("  bay {}, rssi {:?}", bay, presence.rssi);
            }
        }
    }

    if let Some(output_path) = output {
        let json_records: Vec<RecordJson> =
            records.iter().map(|(_, r)| record_to_json(r)).collect();
        let json = serde_json::to_string_pretty(&json_records)
            .context("Failed to serialize parsed records")?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;
        info!("Parsed records written to: {}", output_path);
    }

    Ok(())
}
