use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use booking_app::modules::{self, bookings::store::InMemoryBookingStore};
use booking_kernel::settings::Settings;
use booking_kernel::{InitCtx, ModuleRegistry};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> (Router, Arc<InMemoryBookingStore>) {
    let settings = Settings::default();
    let store = Arc::new(InMemoryBookingStore::new());

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store.clone(), &settings);
    registry
        .init_custom_modules(&InitCtx {
            settings: &settings,
        })
        .await
        .unwrap();

    (booking_http::build_router(&registry, &settings), store)
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn booking_lifecycle() {
    let (router, store) = app().await;

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/bookings",
        Some(json!({
            "date": "2024-05-01",
            "time": "19:00",
            "guests": 2,
            "name": "Alice",
            "contact": "a@x.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let id = body["booking"]["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);

    // Same slot, different party.
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/bookings",
        Some(json!({
            "date": "2024-05-01",
            "time": "19:00",
            "guests": 4,
            "name": "Carol",
            "contact": "c@x.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Slot already booked."));

    let (_, first) = call(&router, Method::GET, "/api/bookings", None).await;
    let (_, second) = call(&router, Method::GET, "/api/bookings", None).await;
    assert_eq!(first, second);
    assert_eq!(first["bookings"].as_array().unwrap().len(), 1);

    let (status, body) = call(&router, Method::DELETE, &format!("/api/bookings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Booking deleted successfully."));
    assert!(store.is_empty().await);

    let (status, body) = call(&router, Method::DELETE, &format!("/api/bookings/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({
        "success": false,
        "message": "Booking not found.",
        "trace_id": body["trace_id"].clone()
    }));
}

#[tokio::test]
async fn incomplete_booking_is_not_persisted() {
    let (router, store) = app().await;

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/bookings",
        Some(json!({ "date": "2024-05-01", "time": "19:00", "guests": 2, "name": "Alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("All fields are required."));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn root_and_request_id() {
    let (router, _) = app().await;

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Hello World");
}

#[tokio::test]
async fn openapi_lists_booking_routes() {
    let (router, _) = app().await;

    let (status, spec) = call(&router, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/bookings"]["post"].is_object());
    assert!(spec["paths"]["/api/bookings/{id}"]["delete"].is_object());
    assert!(spec["components"]["schemas"]["Booking"].is_object());
}
