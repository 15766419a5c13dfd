//! LAN discovery example.
//!
//! Listens for radio advertisement broadcasts for a few seconds and
//! prints every radio and station that shows up in the registry.
//!
//! # Requirements
//!
//! - A radio on the same LAN broadcasting advertisements on UDP port 4992
//! - UDP port 4992 accessible (not blocked by a firewall)
//!
//! # Usage
//!
//! ```sh
//! cargo run -p sdrlink --example discover
//! ```

use std::sync::Arc;
use std::time::Duration;

use sdrlink::discovery::{DiscoveryRegistry, LanFeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Listening for radio advertisements (5 seconds)...\n");

    let registry = Arc::new(DiscoveryRegistry::new());
    let feed = LanFeed::start(Arc::clone(&registry)).await?;

    tokio::time::sleep(Duration::from_secs(5)).await;
    feed.stop();

    let targets = registry.targets();
    if targets.is_empty() {
        println!("No radios found on the network.");
        println!("\nTroubleshooting:");
        println!("  - Verify the radio is powered on and connected to the LAN");
        println!("  - Check that UDP port 4992 is not blocked by a firewall");
        println!("  - Ensure your computer is on the same subnet as the radio");
        return Ok(());
    }

    println!("Found {} target(s):\n", targets.len());
    for target in &targets {
        match &target.station {
            Some(station) => {
                println!("  [station] {} on {} ({})", station, target.serial, target.model);
            }
            None => {
                println!("  [radio]   {} (S/N: {})", target.name, target.serial);
                println!("            Address: {}", target.address);
                println!("            Firmware: {}", target.version);
                for client in &target.gui_clients {
                    println!(
                        "            Attached: {} / {} ({})",
                        client.program, client.station, client.handle
                    );
                }
            }
        }
        println!();
    }

    Ok(())
}
