use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{parse_id, BookingStore, StoreError};
use crate::modules::bookings::models::{Booking, NewBooking};

/// Process-local store keeping bookings in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<Vec<Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_all(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.bookings.read().await.clone())
    }

    async fn find_one(&self, date: &str, time: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.date == date && b.time == time)
            .cloned())
    }

    async fn insert(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        // Check and push under one write lock, like a unique index would.
        let mut bookings = self.bookings.write().await;
        if bookings
            .iter()
            .any(|b| b.date == booking.date && b.time == booking.time)
        {
            return Err(StoreError::SlotTaken {
                date: booking.date,
                time: booking.time,
            });
        }

        let stored = Booking {
            id: ObjectId::new().to_hex(),
            date: booking.date,
            time: booking.time,
            guests: booking.guests,
            name: booking.name,
            contact: booking.contact,
            created_at: Utc::now(),
        };
        bookings.push(stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let id = parse_id(id)?.to_hex();
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        Ok(bookings.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_booking(date: &str, time: &str) -> NewBooking {
        NewBooking {
            date: date.to_string(),
            time: time.to_string(),
            guests: 4,
            name: "Bob".to_string(),
            contact: "+44 20 7946 0000".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_object_id() {
        let store = InMemoryBookingStore::new();
        let booking = store.insert(new_booking("2024-05-01", "19:00")).await.unwrap();

        assert!(ObjectId::parse_str(&booking.id).is_ok());
        assert_eq!(store.find_all().await.unwrap(), vec![booking]);
    }

    #[tokio::test]
    async fn duplicate_slot_is_refused() {
        let store = InMemoryBookingStore::new();
        store.insert(new_booking("2024-05-01", "19:00")).await.unwrap();

        let err = store
            .insert(new_booking("2024-05-01", "19:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SlotTaken { .. }));
        assert_eq!(store.len().await, 1);

        store.insert(new_booking("2024-05-01", "20:00")).await.unwrap();
        store.insert(new_booking("2024-05-02", "19:00")).await.unwrap();
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn find_one_matches_both_fields() {
        let store = InMemoryBookingStore::new();
        let booking = store.insert(new_booking("2024-05-01", "19:00")).await.unwrap();

        assert_eq!(
            store.find_one("2024-05-01", "19:00").await.unwrap(),
            Some(booking)
        );
        assert_eq!(store.find_one("2024-05-01", "19:30").await.unwrap(), None);
        assert_eq!(store.find_one("2024-05-02", "19:00").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let store = InMemoryBookingStore::new();
        let booking = store.insert(new_booking("2024-05-01", "19:00")).await.unwrap();

        assert!(store.delete_by_id(&booking.id).await.unwrap());
        assert!(!store.delete_by_id(&booking.id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_rejects_malformed_id() {
        let store = InMemoryBookingStore::new();
        let err = store.delete_by_id("42").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }
}
