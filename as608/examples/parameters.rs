//! Print the sensor parameter block

use as608::{Sensor, SensorConfig};

#[tokio::main]
async fn main() -> as608::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut config = SensorConfig::default();
    if let Ok(port) = std::env::var("AS608_PORT") {
        config.port_name = port;
    }

    let mut sensor = Sensor::serial(config);
    sensor.connect().await?;

    let params = sensor.read_device_parameters().await?;
    println!("--- Device parameters ---");
    for line in &params.lines {
        print!("{}", line);
    }
    println!("-------------------------");
    println!("{}", params);

    sensor.close().await?;
    Ok(())
}
