use actix_web::{web, HttpServer};
use std::sync::Arc;

use pf_api::app::create_app;
use pf_api::routes::functions::AppState;
use pf_api::telemetry::init_tracing;
use pf_core::services::verification::{VerificationService, VerificationServiceConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = pf_infra::load_config();
    init_tracing(&config.logging)?;

    tracing::info!(environment = %config.environment, "Starting Pawfile API server");

    let services = pf_infra::initialize(&config).await?;
    let verification_service = Arc::new(VerificationService::new(
        services.users.clone(),
        VerificationServiceConfig::from(&config.verification),
    ));
    let app_state = web::Data::new(AppState::new(verification_service));

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, workers = config.server.workers, "Binding HTTP server");

    let cors = config.cors.clone();
    let max_payload_size = config.server.max_payload_size;
    let mut server =
        HttpServer::new(move || create_app(app_state.clone(), &cors, max_payload_size));
    // Zero keeps actix's default of one worker per physical core
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    services.database.close().await;
    tracing::info!("Server stopped");
    Ok(())
}
