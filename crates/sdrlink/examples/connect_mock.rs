//! Full connect cycle against the mock transport.
//!
//! Demonstrates the orchestration flow end to end without a radio: a
//! target is planted in the registry, the scripted prompt picks it, the
//! state machine negotiates and connects, remote RX audio comes up, a few
//! messages are classified, and the session is torn down again.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p sdrlink --example connect_mock
//! ```

use std::sync::Arc;

use sdrlink::discovery::DiscoveryRegistry;
use sdrlink::messages::{Direction, MessagesModel};
use sdrlink::session::SessionController;
use sdrlink::{
    AppSettings, DiscoveredTarget, MessageFilter, RadioTransport, SelectionPrompt, SessionEvent,
    TargetSource,
};
use sdrlink_test_harness::{MockPrompt, MockTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(DiscoveryRegistry::new());
    registry.upsert(DiscoveredTarget {
        id: "1234-5678".to_string(),
        name: "Bench Radio".to_string(),
        source: TargetSource::Local,
        address: "192.168.1.100:4992".to_string(),
        version: "3.5.1.0".to_string(),
        model: "FLEX-6600".to_string(),
        serial: "1234-5678".to_string(),
        station: None,
        gui_clients: Vec::new(),
    });

    let prompt = Arc::new(MockPrompt::new());
    prompt.push_pick(Some("1234-5678"));

    let mut settings = AppSettings::default();
    settings.remote_rx_audio_enabled = true;

    let controller = SessionController::new(
        Arc::new(MockTransport::new()) as Arc<dyn RadioTransport>,
        registry,
        Arc::new(MessagesModel::new()),
        Arc::clone(&prompt) as Arc<dyn SelectionPrompt>,
        settings,
    );

    let mut events = controller.subscribe();

    println!("Connecting...\n");
    controller.connect().await;
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::StateChanged(state) => println!("  state -> {state}"),
            other => println!("  event -> {other:?}"),
        }
    }

    let session = controller.session().expect("session should be active");
    println!("\nConnected to {} as {}", session.target.name, session.handle);
    for stream in controller.active_streams().await {
        println!("Auxiliary stream: {} ({})", stream.kind, stream.id);
    }

    // Feed a few protocol lines through the classifier.
    let messages = controller.messages();
    messages.record(Direction::Received, "S0|radio slices=4 panadapters=4");
    messages.record(Direction::Received, "SA1B2C3D4|slice 0 RF_frequency=14.250000");
    messages.record(Direction::Received, "R1|0|"); // dropped: ack-only reply
    controller.send_command("sub slice all").await?;

    messages.re_filter(MessageFilter::Status, "");
    println!("\nStatus messages ({} retained):", messages.filtered().len());
    for message in messages.filtered() {
        println!("  * {:.6} {}", message.interval, message.text);
    }

    println!("\nDisconnecting...");
    controller.disconnect().await;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::StateChanged(state) = event {
            println!("  state -> {state}");
        }
    }

    Ok(())
}
