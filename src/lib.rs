// Public modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod hub;
pub mod messages;
pub mod output;
pub mod registry;
pub mod scheduler;
pub mod sensors;

// Re-export commonly used types
pub use config::{load_bus_config, load_output_config, load_sensor_config, SensorConfig};
pub use errors::{SensorError, SensorResult, TransportError};
pub use hub::SampleHub;
pub use registry::init_all;
pub use scheduler::spawn_sensor_tasks;
pub use sensors::{decode, Mpu6050, PhysicalSample, RawSample};

use crate::output::{open_sink, spawn_output_tasks};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

/// Run the sampling hub with the given configuration path until Ctrl-C
pub async fn run_sensor_hub(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("[mpu6050_hub] starting up...");

    // Load configuration
    let sensor_config = load_sensor_config(&format!("{}/sensors.toml", config_path))?;
    let bus_config = load_bus_config(&format!("{}/buses.toml", config_path))?;
    let output_config = load_output_config(&format!("{}/outputs.toml", config_path))?;
    info!(
        "[config] loaded {} sensor(s), {} bus(es), {} output(s)",
        sensor_config.sensors.len(),
        bus_config.buses.len(),
        output_config.outputs.len()
    );

    // Sinks subscribe before any sample is produced
    let hub = SampleHub::new();
    let sinks = output_config
        .outputs
        .iter()
        .map(open_sink)
        .collect::<Result<Vec<_>, _>>()?;
    let output_tasks = spawn_output_tasks(&hub, sinks);

    // Initialize sensors and buses; any failure here stops startup
    let (sensors, buses) = init_all(&sensor_config, &bus_config).await?;
    info!("[registry] sensors and buses initialized");

    let sensor_tasks = spawn_sensor_tasks(sensors, &buses, &hub, &sensor_config)?;
    info!("[main] {} sensor task(s) launched", sensor_tasks.len());

    tokio::signal::ctrl_c().await?;
    info!("[main] shutting down");

    for task in &sensor_tasks {
        task.abort();
    }
    for task in sensor_tasks {
        let _ = task.await;
    }
    for status in hub.status().await {
        info!(
            "[main] {}: {} sample(s) published, {} cycle(s) skipped, last error: {}",
            status.sensor_id,
            status.samples_published,
            status.cycles_skipped,
            status.last_error.as_deref().unwrap_or("none")
        );
    }

    // Closing the hub lets sinks drain and exit
    drop(hub);
    for task in output_tasks {
        let _ = task.await;
    }

    Ok(())
}
