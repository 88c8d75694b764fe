pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use booking_kernel::settings::BookingSettings;
use booking_kernel::{InitCtx, Module};
use serde_json::json;

use store::SharedStore;

/// State shared by every bookings handler.
#[derive(Clone)]
pub struct BookingsState {
    pub store: SharedStore,
    pub max_party_size: u32,
}

/// Reservations: list, create and delete bookings.
pub struct BookingsModule {
    state: BookingsState,
}

impl BookingsModule {
    pub fn new(store: SharedStore, settings: &BookingSettings) -> Self {
        Self {
            state: BookingsState {
                store,
                max_party_size: settings.max_party_size,
            },
        }
    }
}

#[async_trait]
impl Module for BookingsModule {
    fn name(&self) -> &'static str {
        "bookings"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.state
            .store
            .setup()
            .await
            .context("failed to prepare bookings collection")?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            max_party_size = self.state.max_party_size,
            "bookings module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List bookings",
                        "tags": ["Bookings"],
                        "responses": {
                            "200": {
                                "description": "Every stored booking",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookingList" }
                                    }
                                }
                            },
                            "500": error_response("Failed to fetch bookings")
                        }
                    },
                    "post": {
                        "summary": "Create a booking",
                        "tags": ["Bookings"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateBooking" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Booking stored",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookingCreated" }
                                    }
                                }
                            },
                            "400": error_response("Missing field, invalid party size or slot already booked"),
                            "500": error_response("Failed to create booking")
                        }
                    }
                },
                "/{id}": {
                    "delete": {
                        "summary": "Delete a booking",
                        "tags": ["Bookings"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "Booking deleted",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Message" }
                                    }
                                }
                            },
                            "404": error_response("Booking not found"),
                            "500": error_response("Malformed id or store failure")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Booking": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Unique identifier for the booking" },
                            "date": { "type": "string", "description": "Date of the reservation" },
                            "time": { "type": "string", "description": "Time slot, e.g. 19:00" },
                            "guests": { "type": "integer", "minimum": 1, "description": "Party size" },
                            "name": { "type": "string", "description": "Name of the reserving party" },
                            "contact": { "type": "string", "description": "Phone number or e-mail" },
                            "created_at": { "type": "string", "format": "date-time", "description": "When the booking was stored" }
                        },
                        "required": ["id", "date", "time", "guests", "name", "contact", "created_at"]
                    },
                    "CreateBooking": {
                        "type": "object",
                        "properties": {
                            "date": { "type": "string" },
                            "time": { "type": "string" },
                            "guests": { "type": "integer", "minimum": 1, "maximum": self.state.max_party_size },
                            "name": { "type": "string" },
                            "contact": { "type": "string" }
                        },
                        "required": ["date", "time", "guests", "name", "contact"]
                    },
                    "BookingList": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "bookings": { "type": "array", "items": { "$ref": "#/components/schemas/Booking" } }
                        },
                        "required": ["success", "bookings"]
                    },
                    "BookingCreated": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "booking": { "$ref": "#/components/schemas/Booking" }
                        },
                        "required": ["success", "booking"]
                    },
                    "Message": {
                        "type": "object",
                        "properties": {
                            "success": { "type": "boolean" },
                            "message": { "type": "string" }
                        },
                        "required": ["success", "message"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookings module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookings module stopped");
        Ok(())
    }
}

/// Create a new instance of the bookings module
pub fn create_module(store: SharedStore, settings: &BookingSettings) -> Arc<dyn Module> {
    Arc::new(BookingsModule::new(store, settings))
}
