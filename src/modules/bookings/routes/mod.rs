//! HTTP handlers for `/api/bookings`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    routing::{delete, get},
    Json, Router,
};

use booking_http::error::AppError;

use super::models::{
    BookingListResponse, BookingResponse, CreateBookingRequest, MessageResponse,
};
use super::store::StoreError;
use super::BookingsState;

const FETCH_FAILED: &str = "Failed to fetch bookings";
const CREATE_FAILED: &str = "Failed to create booking";
const DELETE_FAILED: &str = "Failed to delete booking";

/// Routes mounted under `/api/bookings`
pub fn router(state: BookingsState) -> Router {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/{id}", delete(delete_booking))
        .with_state(state)
}

fn slot_taken() -> AppError {
    AppError::conflict(Vec::new(), "Slot already booked.")
}

async fn list_bookings(
    State(state): State<BookingsState>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = state
        .store
        .find_all()
        .await
        .map_err(|err| AppError::internal(FETCH_FAILED, err))?;

    Ok(Json(BookingListResponse {
        success: true,
        bookings,
    }))
}

async fn create_booking(
    State(state): State<BookingsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BookingResponse>, AppError> {
    let request = parse_create_request(&headers, &body)?;
    let booking = request.validate(state.max_party_size)?;

    let existing = state
        .store
        .find_one(&booking.date, &booking.time)
        .await
        .map_err(|err| AppError::internal(CREATE_FAILED, err))?;
    if existing.is_some() {
        return Err(slot_taken());
    }

    match state.store.insert(booking).await {
        Ok(booking) => {
            tracing::info!(
                booking_id = %booking.id,
                date = %booking.date,
                time = %booking.time,
                guests = booking.guests,
                "booking created"
            );
            Ok(Json(BookingResponse {
                success: true,
                booking,
            }))
        }
        // Lost a race with a concurrent insert for the same slot.
        Err(StoreError::SlotTaken { date, time }) => {
            tracing::info!(%date, %time, "slot taken by a concurrent booking");
            Err(slot_taken())
        }
        Err(err) => Err(AppError::internal(CREATE_FAILED, err)),
    }
}

/// An empty body, or one not sent as JSON, reads as `{}` so that every
/// field is reported missing.
fn parse_create_request(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<CreateBookingRequest, AppError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateBookingRequest::default());
    }

    Json::<CreateBookingRequest>::from_bytes(body)
        .map(|Json(request)| request)
        .map_err(|rejection| {
            AppError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
        })
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

async fn delete_booking(
    State(state): State<BookingsState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state
        .store
        .delete_by_id(&id)
        .await
        .map_err(|err| AppError::internal(DELETE_FAILED, err))?;

    if !removed {
        return Err(AppError::not_found("Booking not found."));
    }

    tracing::info!(booking_id = %id, "booking deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: "Booking deleted successfully.".to_string(),
    }))
}
