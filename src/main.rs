use mpu6050_hub::config::get_config_path;
use mpu6050_hub::{init_tracing, run_sensor_hub};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with RUST_LOG environment variable support
    init_tracing();

    let config_path = get_config_path();
    tracing::info!("[main] Configuration path: {}", config_path);

    run_sensor_hub(&config_path).await
}
