use anyhow::Result;
use bytes::Bytes;
use clap::{Subcommand, ValueEnum};
use droidwire_core::constants::{Affiliation, DepotAction, Personality, INTERACTION_ID_WDW, MFG_ID};
use droidwire_core::AdvertisementFrame;
use tracing::info;

/// The beacon to build
#[derive(Subcommand)]
pub enum BeaconKind {
    /// Location beacon sent by fixed park locations
    Location {
        /// Interaction script selector (1-7)
        #[arg(long)]
        location: u8,

        /// Minimum seconds between droid responses
        #[arg(long, default_value = "10")]
        min_interval: u8,

        /// Expected signal strength at the reaction boundary
        #[arg(long, default_value = "-80", allow_hyphen_values = true)]
        rssi: i8,

        /// Acceptance selector byte
        #[arg(long, default_value = "1")]
        accept: u8,
    },

    /// Droid Depot robot bay beacon
    DepotBay {
        /// Bay number
        #[arg(long)]
        bay: u8,

        /// Expected signal strength at the bay boundary
        #[arg(long, default_value = "-90", allow_hyphen_values = true)]
        rssi: i8,
    },

    /// Droid Depot activator beacon addressed to one droid
    DepotActivate {
        /// The droid's Bluetooth address, colon-separated hex
        #[arg(long)]
        addr: String,

        /// Start the pairing sequence instead of the activation script
        #[arg(long)]
        pair: bool,

        /// Default script delay seed, in 100ms units
        #[arg(long, default_value = "10")]
        delay: u8,
    },

    /// Droid presence beacon
    Presence {
        /// The droid's affiliation
        #[arg(long, value_enum)]
        affiliation: AffiliationArg,

        /// The installed personality chip
        #[arg(long, value_enum)]
        personality: PersonalityArg,

        /// Advertise as paired
        #[arg(long)]
        paired: bool,
    },
}

/// Affiliation choices for the presence beacon
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum AffiliationArg {
    /// Scoundrel-built droids
    Scoundrel,
    /// Resistance droids
    Resistance,
    /// First Order droids
    FirstOrder,
}

impl From<AffiliationArg> for Affiliation {
    fn from(arg: AffiliationArg) -> Self {
        match arg {
            AffiliationArg::Scoundrel => Affiliation::Scoundrel,
            AffiliationArg::Resistance => Affiliation::Resistance,
            AffiliationArg::FirstOrder => Affiliation::FirstOrder,
        }
    }
}

/// Personality chip choices for the presence beacon
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PersonalityArg {
    /// R-series astromech
    RSeries,
    /// BB-series astromech
    BbSeries,
    /// Blue chip
    Blue,
    /// Gray chip
    Gray,
    /// Red chip
    Red,
    /// Orange chip
    Orange,
    /// Purple chip
    Purple,
    /// Black chip
    Black,
}

impl From<PersonalityArg> for Personality {
    fn from(arg: PersonalityArg) -> Self {
        match arg {
            PersonalityArg::RSeries => Personality::RSeries,
            PersonalityArg::BbSeries => Personality::BbSeries,
            PersonalityArg::Blue => Personality::Blue,
            PersonalityArg::Gray => Personality::Gray,
            PersonalityArg::Red => Personality::Red,
            PersonalityArg::Orange => Personality::Orange,
            PersonalityArg::Purple => Personality::Purple,
            PersonalityArg::Black => Personality::Black,
        }
    }
}

/// Build the serialized manufacturer data payload for a beacon
pub fn build(kind: &BeaconKind, wdw: bool) -> Result<Bytes> {
    let mut frame = AdvertisementFrame::new();
    match kind {
        BeaconKind::Location {
            location,
            min_interval,
            rssi,
            accept,
        } => {
            frame.add_location_beacon(*location, *min_interval, *rssi, *accept)?;
        }
        BeaconKind::DepotBay { bay, rssi } => {
            frame.add_depot_bay(*bay, *rssi)?;
        }
        BeaconKind::DepotActivate { addr, pair, delay } => {
            let action = if *pair {
                DepotAction::Pair
            } else {
                DepotAction::Go
            };
            frame.add_depot_activate(parse_gap_addr(addr)?, action, *delay)?;
        }
        BeaconKind::Presence {
            affiliation,
            personality,
            paired,
        } => {
            frame.add_droid_presence((*affiliation).into(), (*personality).into(), *paired)?;
        }
    }
    if wdw {
        frame.set_interaction_id(INTERACTION_ID_WDW);
    }
    Ok(frame.serialize())
}

/// Parse a 6-byte Bluetooth address from colon-separated hex
pub fn parse_gap_addr(addr: &str) -> Result<[u8; 6]> {
    let bytes = super::read_hex_arg(addr)?;
    let parsed: [u8; 6] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("Bluetooth address must be exactly 6 bytes"))?;
    Ok(parsed)
}

pub fn execute(kind: &BeaconKind, wdw: bool) -> Result<()> {
    let payload = build(kind, wdw)?;
    info!("Built {} byte beacon payload", payload.len());

    println!("\n=== Beacon Payload ===");
    println!("Manufacturer id:   {:#06x}", MFG_ID);
    println!("Manufacturer data: {}", hex::encode(&payload));

    Ok(())
}
