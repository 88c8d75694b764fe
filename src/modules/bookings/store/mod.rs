//! Persistence for bookings.
//!
//! Handlers only see [`BookingStore`]; the process wires in
//! [`MongoBookingStore`] while tests run against [`InMemoryBookingStore`].

mod memory;
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Booking, NewBooking};

pub use memory::InMemoryBookingStore;
pub use mongo::MongoBookingStore;

pub type SharedStore = Arc<dyn BookingStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Another booking already holds the `(date, time)` slot.
    #[error("slot {date} {time} is already booked")]
    SlotTaken { date: String, time: String },

    #[error("invalid booking id '{0}'")]
    InvalidId(String),

    #[error("database error")]
    Database(#[from] mongodb::error::Error),
}

/// Typed access to the booking collection.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Prepare the backing collection (indexes) before requests are served.
    async fn setup(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError>;

    /// The booking holding exactly this slot, if any.
    async fn find_one(&self, date: &str, time: &str) -> Result<Option<Booking>, StoreError>;

    /// Persist a booking with a fresh id. Fails with
    /// [`StoreError::SlotTaken`] if the slot is held.
    async fn insert(&self, booking: NewBooking) -> Result<Booking, StoreError>;

    /// Returns whether a booking was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;
}

fn parse_id(id: &str) -> Result<mongodb::bson::oid::ObjectId, StoreError> {
    mongodb::bson::oid::ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}
