mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "droidwire")]
#[command(about = "Droidwire - droid proximity-beacon and command-script codec", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a stored command-script entry dump
    Decode {
        /// Hex-encoded entry bytes (use - to read from stdin)
        hex: String,

        /// Output JSON file for the decoded entry
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Parse advertisement manufacturer data into sub-records
    Adv {
        /// Hex-encoded manufacturer data payload (use - to read from stdin)
        hex: String,

        /// Output JSON file for the parsed records
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build beacon manufacturer data and print it as hex
    Beacon {
        /// Target the Walt Disney World interaction id instead of DLR
        #[arg(long)]
        wdw: bool,

        #[command(subcommand)]
        kind: commands::beacon::BeaconKind,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Decode { hex, output } => commands::decode::execute(&hex, output.as_deref()),

        Commands::Adv { hex, output } => commands::adv::execute(&hex, output.as_deref()),

        Commands::Beacon { wdw, kind } => commands::beacon::execute(&kind, wdw),
    }
}
