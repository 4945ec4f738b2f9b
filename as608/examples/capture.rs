//! Capture one fingerprint and save it as PNG
//!
//! ```sh
//! AS608_PORT=/dev/ttyUSB0 cargo run --example capture -- print.png
//! ```

use anyhow::Context;
use as608::{Sensor, SensorConfig, SensorEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output = std::env::args().nth(1).unwrap_or_else(|| "fingerprint.png".to_string());

    let mut config = match std::env::var("AS608_CONFIG") {
        Ok(path) => SensorConfig::load(std::path::Path::new(&path)).context("loading sensor config")?,
        Err(_) => SensorConfig::default(),
    };
    if let Ok(port) = std::env::var("AS608_PORT") {
        config.port_name = port;
    }

    println!("Connecting to {}...", config.port_name);
    let mut sensor = Sensor::serial(config);
    let mut events = sensor.subscribe();

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SensorEvent::FingerRequested => println!("Place your finger on the sensor"),
                SensorEvent::Progress { received, total } => {
                    print!("\rDownloading {:>5}/{} bytes", received, total);
                }
                SensorEvent::Completed(command) => println!("\n✓ {}", command),
                SensorEvent::Failed(reason) => println!("\n✗ {}", reason),
                SensorEvent::StatusChanged(_) => {}
            }
        }
    });

    sensor.connect().await?;
    println!("✓ Sensor ready");

    let image = sensor.capture_image().await?;
    image
        .save(&output)
        .with_context(|| format!("saving {}", output))?;
    println!("✓ Saved {}x{} image to {}", image.width(), image.height(), output);

    sensor.close().await?;
    Ok(())
}
