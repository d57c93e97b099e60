use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use petclinic_rest::{
    api,
    config::AppConfig,
    migrator,
    security::{self, Authenticator, ADMIN, OWNER_ADMIN, VET_ADMIN},
    service::{SeaOrmClinicService, SharedClinicService},
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    petclinic_rest::telemetry::init_telemetry("petclinic-rest")?;

    let config = AppConfig::from_env()?;

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    migrator::Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;

    if let Some(admin) = &config.admin {
        security::ensure_user(
            &db,
            &admin.username,
            &admin.password,
            &[OWNER_ADMIN, VET_ADMIN, ADMIN],
        )
        .await
        .context("failed to provision admin account")?;
    }

    if let Err(e) = petclinic_rest::metrics::init_metrics(&db).await {
        tracing::warn!(error = %e, "could not seed metrics from the store");
    }
    let clinic: SharedClinicService = Arc::new(SeaOrmClinicService::new(db.clone()));

    let authenticator = if config.security_enabled {
        Some(Authenticator::new(db))
    } else {
        tracing::warn!("security disabled, pet endpoints are open");
        None
    };

    let app = api::app(
        clinic,
        authenticator,
        api::cors_layer(config.cors_allowed_origin.as_ref()),
    )
    .layer(prometheus_layer)
    .route("/metrics", get(|| async move { metric_handle.render() }));

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
