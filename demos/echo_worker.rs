//! Echo Worker - configuration, logging and processing wired together.
//!
//! This example demonstrates:
//! - Layering `appsettings.json` and environment variables
//! - Installing the log subscriber from configuration
//! - Resolving the worker and agent channel endpoints
//! - Running a task through the echo processor
//!
//! # Running
//!
//! ```text
//! ComputePlane__WorkerChannel__SocketType=tcp \
//! ComputePlane__WorkerChannel__Address=0.0.0.0:10667 \
//! Logging__Format=text \
//!     cargo run --example echo_worker -- payload.bin
//! ```
//!
//! Without an argument a built-in payload is processed.

use std::path::Path;

use armonik_worker::{logging, Configuration, MemorySink, Task, TaskProcessor};

const SETTINGS_FILE: &str = "appsettings.json";
const SAMPLE_PAYLOAD: &[u8] = b"00000004echo0000000bhello world";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Configuration::new();
    if Path::new(SETTINGS_FILE).exists() {
        config.add_json_configuration(SETTINGS_FILE)?;
    }
    config.add_env_configuration();

    logging::init(&config.log_config()?)?;

    let plane = config.compute_plane();
    tracing::info!("Worker channel: {}", plane.worker.uri());
    tracing::info!("Agent channel: {}", plane.agent.uri());

    let processor = TaskProcessor::echo(config.processor_config()?);

    let payload = match std::env::args().nth(1) {
        Some(path) => std::fs::read(path)?,
        None => SAMPLE_PAYLOAD.to_vec(),
    };
    let task = Task::new(payload, vec!["result-0".to_string()]).with_task_id("echo-demo");

    let sink = MemorySink::new();
    let status = processor.process(&task, &sink).await;
    if let Some(message) = status.error_message() {
        return Err(message.into());
    }

    for (result_id, data) in sink.results().await {
        tracing::info!("Result {}: {} bytes", result_id, data.len());
    }

    Ok(())
}
