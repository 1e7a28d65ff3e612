//! Helios FHIR Server (HFS)
//!
//! Serves the Media, MedicationAdministration and MessageDefinition profiles
//! from an in-memory store.

use clap::Parser;
use helios_profiles::{ServerConfig, create_app_with_config, in_memory_profiles, init_logging};
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let profiles = in_memory_profiles(&config)
        .map_err(|e| anyhow::anyhow!("Invalid profile configuration: {}", e))?;

    info!(
        port = config.port,
        host = %config.host,
        profiles = %config.profiles,
        fhir_versions = %config.fhir_versions,
        resource_server = ?config.resource_server,
        "Starting Helios FHIR Server"
    );

    let app = create_app_with_config(profiles, config.clone());
    serve(app, &config).await
}
