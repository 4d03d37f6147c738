//! Single verification attempt against the sensor's library

use anyhow::Context;
use fpterm::{DEFAULT_BAUD_RATE, Pacing, Sensor, workflow};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let port = std::env::var("FPTERM_PORT").unwrap_or_else(|_| "/dev/ttyS0".to_string());
    let baud: u32 = match std::env::var("FPTERM_BAUD") {
        Ok(baud) => baud.parse().context("FPTERM_BAUD must be a number")?,
        Err(_) => DEFAULT_BAUD_RATE,
    };

    println!("Connecting to {} at {} baud...", port, baud);

    let mut sensor = Sensor::serial(port, baud);
    sensor
        .connect()
        .await
        .context("sensor rejected the password or did not answer")?;

    match workflow::verify(&mut sensor, &Pacing::default()).await {
        Ok(found) => println!("Match: {}", found),
        Err(e) => println!("No match: {}", e),
    }

    sensor.disconnect().await?;
    Ok(())
}
