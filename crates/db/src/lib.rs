//! MongoDB connection bootstrap.
//!
//! The service holds exactly one [`mongodb::Client`] for its whole lifetime.
//! [`connect`] is called once during startup and any failure is fatal; the
//! returned [`Connection`] is then owned by the `db` core module, which shuts
//! the client down when the registry stops.

use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use booking_kernel::settings::DatabaseSettings;
use booking_kernel::{InitCtx, Module};
use mongodb::bson::doc;
use mongodb::{Client, Database};

/// An established client together with the database the service works in.
#[derive(Clone, Debug)]
pub struct Connection {
    client: Client,
    database: Database,
}

impl Connection {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// Connect to MongoDB and verify the server answers a `ping`.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Connection> {
    let Some(uri) = settings.uri.as_deref().filter(|uri| !uri.trim().is_empty()) else {
        bail!("MONGO_URI is not set");
    };

    tracing::debug!(target: "booking-db", "setting up mongo client");

    let client = Client::with_uri_str(uri)
        .await
        .context("invalid MongoDB connection string")?;
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(&settings.name));

    database
        .run_command(doc! { "ping": 1 }, None)
        .await
        .context("MongoDB did not answer ping")?;

    tracing::info!(
        target: "booking-db",
        database = database.name(),
        "connected to MongoDB"
    );

    Ok(Connection { client, database })
}

/// Core module owning the process-wide MongoDB client.
pub struct DatabaseModule {
    connection: Connection,
}

impl DatabaseModule {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            database = self.connection.database().name(),
            "database module initialized"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.connection.client().clone().shutdown().await;
        tracing::info!(module = self.name(), "mongo client shut down");
        Ok(())
    }
}

/// Create the `db` core module for an established connection
pub fn create_module(connection: Connection) -> Arc<dyn Module> {
    Arc::new(DatabaseModule::new(connection))
}
