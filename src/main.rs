use std::sync::Arc;

use anyhow::Context;
use booking_app::modules::{self, bookings::store::MongoBookingStore};
use booking_kernel::settings::Settings;
use booking_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load booking settings")?;

    booking_telemetry::init(&settings.telemetry).context("failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        port = settings.server.port,
        "booking-app bootstrap starting"
    );

    // Without its store the service is useless: any failure here ends the process.
    let connection = match booking_db::connect(&settings.database).await {
        Ok(connection) => connection,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "MongoDB connection error");
            return Err(err.context("failed to connect to MongoDB"));
        }
    };

    let store = Arc::new(MongoBookingStore::new(connection.database()));

    let mut registry = ModuleRegistry::new();
    registry.register_core(booking_db::create_module(connection));
    modules::register_all(&mut registry, store, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_core_modules(&ctx).await?;
    registry.init_custom_modules(&ctx).await?;
    registry.start_core_modules(&ctx).await?;
    registry.start_custom_modules(&ctx).await?;

    tracing::info!("booking-app bootstrap complete");

    let served = booking_http::start_server(&registry, &settings).await;

    registry.stop_custom_modules().await?;
    registry.stop_core_modules().await?;

    served
}
