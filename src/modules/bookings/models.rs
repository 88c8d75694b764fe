use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;
use thiserror::Error;

use booking_http::error::AppError;

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier assigned by the store (24-hex ObjectId)
    pub id: String,
    /// Calendar date of the reservation
    pub date: String,
    /// Time-of-day slot, e.g. `19:00`
    pub time: String,
    /// Party size
    pub guests: i64,
    /// Name of the reserving party
    pub name: String,
    /// Phone number or e-mail address
    pub contact: String,
    /// When the booking was stored
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/bookings`.
///
/// Every field is optional at the wire level so that an absent, `null` or
/// empty value is reported as a missing field instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(default, deserialize_with = "guests_from_number_or_text")]
    pub guests: Option<i64>,
    pub name: Option<String>,
    pub contact: Option<String>,
}

/// A validated booking that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub date: String,
    pub time: String,
    pub guests: i64,
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingValidationError {
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("guests must be positive, got {0}")]
    NonPositiveGuests(i64),
    #[error("party of {guests} exceeds the maximum of {max}")]
    PartyTooLarge { guests: i64, max: u32 },
}

impl From<BookingValidationError> for AppError {
    fn from(err: BookingValidationError) -> Self {
        match err {
            BookingValidationError::MissingFields(fields) => AppError::validation(
                fields
                    .into_iter()
                    .map(|field| json!({ "field": field, "error": "required" }))
                    .collect(),
                "All fields are required.",
            ),
            BookingValidationError::NonPositiveGuests(_) => AppError::validation(
                vec![json!({ "field": "guests", "error": "must be positive" })],
                "Guests must be a positive number.",
            ),
            BookingValidationError::PartyTooLarge { max, .. } => AppError::validation(
                vec![json!({ "field": "guests", "error": "too large" })],
                format!("Party size cannot exceed {max} guests."),
            ),
        }
    }
}

/// Form posts send the party size as text, so `"2"` reads as `2` and a
/// blank string as absent.
fn guests_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Guests {
        Number(i64),
        Text(String),
    }

    match Option::<Guests>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Guests::Number(guests)) => Ok(Some(guests)),
        Some(Guests::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("guests: '{text}' is not a whole number")))
        }
    }
}

impl CreateBookingRequest {
    /// Check presence of all five fields, then the party size bounds.
    pub fn validate(self, max_party_size: u32) -> Result<NewBooking, BookingValidationError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        let date = present(self.date);
        let time = present(self.time);
        let guests = self.guests.filter(|&g| g != 0);
        let name = present(self.name);
        let contact = present(self.contact);

        let mut missing = Vec::new();
        if date.is_none() {
            missing.push("date");
        }
        if time.is_none() {
            missing.push("time");
        }
        if guests.is_none() {
            missing.push("guests");
        }
        if name.is_none() {
            missing.push("name");
        }
        if contact.is_none() {
            missing.push("contact");
        }

        let (Some(date), Some(time), Some(guests), Some(name), Some(contact)) =
            (date, time, guests, name, contact)
        else {
            return Err(BookingValidationError::MissingFields(missing));
        };

        if guests < 0 {
            return Err(BookingValidationError::NonPositiveGuests(guests));
        }
        if guests > i64::from(max_party_size) {
            return Err(BookingValidationError::PartyTooLarge {
                guests,
                max: max_party_size,
            });
        }

        Ok(NewBooking {
            date,
            time,
            guests,
            name,
            contact,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub success: bool,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub booking: Booking,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
