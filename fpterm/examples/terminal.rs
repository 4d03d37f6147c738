//! Attendance terminal driven from the keyboard
//!
//! `e` + Enter requests enrollment, `p` puts a finger on the touch pad,
//! `r` releases it. Ctrl-D exits once the current workflow finishes.

use std::io::BufRead;

use anyhow::Context;
use fpterm::{
    Config, Controller, DEFAULT_BAUD_RATE, LogDisplay, LogTelemetry, Sensor, SignalHandle,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn read_signals(signals: SignalHandle) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        match line.trim() {
            "e" => {
                signals.request_enroll();
            }
            "p" => signals.set_presence(true),
            "r" => signals.set_presence(false),
            "" => {}
            other => println!("unknown input {:?}, use e, p or r", other),
        }
    }
}

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

    let config = Config::default();
    let mut sensor = Sensor::serial(port.clone(), baud).with_config(config.sensor.clone());
    if let Err(e) = sensor.connect().await {
        error!("Sensor on {} failed to initialize: {}", port, e);
        return Err(e.into());
    }
    info!("Sensor ready on {}", port);

    let (mut controller, signals) =
        Controller::new(sensor, LogDisplay::new(), LogTelemetry, config);

    let input = tokio::task::spawn_blocking(move || read_signals(signals));
    controller.run().await;
    input.await?;

    controller.sensor_mut().disconnect().await?;
    Ok(())
}
