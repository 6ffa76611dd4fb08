//! Basic beacon-building example

use droidwire_core::advert::parse_advertisement;
use droidwire_core::constants::{Affiliation, Personality, INTERACTION_ID_WDW};
use droidwire_core::AdvertisementFrame;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Droidwire Beacon Building Example\n");

    // Build a park-style beacon: a location record plus a game waypoint
    let mut frame = AdvertisementFrame::new();
    frame.add_location_beacon(3, 10, -80, 1)?;
    frame.add_game_advanced(7, -70)?;

    let payload = frame.serialize();
    println!("Manufacturer data ({} bytes): {}", payload.len(), hex_string(&payload));

    // Retarget the beacon to the WDW park; only the id-bearing records change
    let payload = frame
        .set_interaction_id(INTERACTION_ID_WDW)
        .expect("id changed");
    println!("Retargeted to WDW:           {}", hex_string(&payload));

    // A droid announcing itself
    let mut droid = AdvertisementFrame::new();
    let announce = droid.add_droid_presence(Affiliation::Resistance, Personality::RSeries, true)?;
    println!("\nDroid presence beacon:       {}", hex_string(&announce));

    // Parse it back the way a scanner would
    for (subtype, record) in parse_advertisement(&announce).iter() {
        println!("  subtype {:#04x}: {} data bytes", subtype, record.data.len());
        if let Some(presence) = &record.presence {
            println!(
                "    droid {:#04x}, affiliation {:?}, personality {:?}, paired: {}",
                presence.droid_id, presence.affiliation, presence.personality, presence.paired
            );
        }
    }

    // Record a short command script: blink an LED after a delay
    let mut commands = droidwire_core::CommandBuffer::new();
    commands.script_open(20)?;
    let open = commands.drain();
    commands.set_script_mode(true);
    commands.delay(500)?;
    commands.led_rgb(1, (0x00, 0x40, 0xFF))?;
    let body = commands.drain();
    commands.set_script_mode(false);
    commands.script_finish()?;
    let finish = commands.drain();

    println!("\nScript 20 open:              {}", hex_string(&open));
    println!("Script 20 body:              {}", hex_string(&body));
    println!("Script 20 store:             {}", hex_string(&finish));

    Ok(())
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
