use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::{parse_id, BookingStore, StoreError};
use crate::modules::bookings::models::{Booking, NewBooking};

const COLLECTION: &str = "bookings";
const SLOT_INDEX: &str = "date_time_unique";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookingDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    date: String,
    time: String,
    guests: i64,
    name: String,
    contact: String,
    created_at: bson::DateTime,
}

impl From<BookingDocument> for Booking {
    fn from(doc: BookingDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            date: doc.date,
            time: doc.time,
            guests: doc.guests,
            name: doc.name,
            contact: doc.contact,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

/// Bookings stored in the `bookings` collection.
pub struct MongoBookingStore {
    collection: Collection<BookingDocument>,
}

impl MongoBookingStore {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

fn slot_filter(date: &str, time: &str) -> bson::Document {
    doc! { "date": date, "time": time }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            is_duplicate_key_code(write_error.code)
        }
        _ => false,
    }
}

fn is_duplicate_key_code(code: i32) -> bool {
    code == DUPLICATE_KEY
}

#[async_trait]
impl BookingStore for MongoBookingStore {
    async fn setup(&self) -> Result<(), StoreError> {
        // The unique index is what actually guarantees one booking per slot;
        // the lookup in the create handler only saves a round trip.
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "date": 1, "time": 1 })
                    .options(Some(
                        IndexOptions::builder()
                            .name(Some(SLOT_INDEX.to_string()))
                            .unique(Some(true))
                            .build(),
                    ))
                    .build(),
                None,
            )
            .await?;

        tracing::debug!(collection = COLLECTION, index = SLOT_INDEX, "slot index ready");
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError> {
        let documents: Vec<BookingDocument> =
            self.collection.find(None, None).await?.try_collect().await?;

        Ok(documents.into_iter().map(Booking::from).collect())
    }

    async fn find_one(&self, date: &str, time: &str) -> Result<Option<Booking>, StoreError> {
        let document = self
            .collection
            .find_one(slot_filter(date, time), None)
            .await?;

        Ok(document.map(Booking::from))
    }

    async fn insert(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let document = BookingDocument {
            id: ObjectId::new(),
            date: booking.date,
            time: booking.time,
            guests: booking.guests,
            name: booking.name,
            contact: booking.contact,
            created_at: bson::DateTime::now(),
        };

        match self.collection.insert_one(&document, None).await {
            Ok(_) => Ok(document.into()),
            Err(err) if is_duplicate_key(&err) => Err(StoreError::SlotTaken {
                date: document.date,
                time: document.time,
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let id = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;

        Ok(result.deleted_count == 1)
    }
}
