//! CLI subcommand implementations

pub mod adv;
pub mod beacon;
pub mod decode;

use anyhow::{Context, Result};
use std::io::Read;

/// Read a hex argument. `-` reads stdin; whitespace and `:` separators
/// are tolerated.
pub fn read_hex_arg(arg: &str) -> Result<Vec<u8>> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        arg.to_string()
    };
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).context("Invalid hex input")
}
