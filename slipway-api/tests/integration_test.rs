use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use slipway_api::state::{AdminCredentials, AuthConfig, PaymentsPublicConfig};
use slipway_api::{app, AppState};
use slipway_booking::schedule::ScheduleRules;
use slipway_booking::{
    BookingCoordinator, DispatchConfig, MemoryStore, MockPaymentGateway, NotificationDispatcher,
};
use slipway_core::notify::{EmailMessage, MailError, Mailer};

struct NullMailer;

#[async_trait::async_trait]
impl Mailer for NullMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
        Ok(())
    }
}

fn test_state() -> AppState {
    let store = Arc::new(MemoryStore::with_default_catalog());
    let mailer: Arc<dyn Mailer> = Arc::new(NullMailer);
    let dispatcher = Arc::new(NotificationDispatcher::new(
        mailer,
        DispatchConfig {
            admin_address: Some("admin@example.com".to_string()),
            retry_delay: Duration::ZERO,
            ..DispatchConfig::default()
        },
    ));
    let coordinator = Arc::new(BookingCoordinator::new(
        store.clone(),
        store.clone(),
        Arc::new(MockPaymentGateway),
        dispatcher.clone(),
    ));

    AppState {
        coordinator,
        bookings: store.clone(),
        units: store,
        dispatcher,
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
        admin: AdminCredentials {
            email: Some("admin@example.com".to_string()),
            password: Some("water-horse".to_string()),
        },
        payments: PaymentsPublicConfig {
            public_key: "pk_test_123".to_string(),
            currency: "ZAR".to_string(),
        },
        schedule: ScheduleRules::default(),
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn booking_payload() -> Value {
    json!({
        "unit_id": "60-1",
        "starts_at": "2024-06-01T09:00:00Z",
        "full_name": "Thandi Mokoena",
        "email": "thandi@example.com",
        "phone": "+27 82 000 0000"
    })
}

#[tokio::test]
async fn test_health() {
    let app = app(test_state());

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn test_booking_payment_webhook_flow() {
    let app = app(test_state());

    // Create the booking.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookings", booking_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["amount_cents"], 260_000);
    let id = created["id"].as_str().unwrap().to_string();

    // Initiate payment.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/bookings/{}/payment", id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let initiated = body_json(response).await;
    assert_eq!(initiated["status"], "AWAITING_PAYMENT");
    let reference = initiated["payment_ref"].as_str().unwrap().to_string();
    assert!(initiated["redirect_url"].as_str().unwrap().contains(&reference));

    // Gateway callback confirms the booking.
    let webhook = json!({
        "id": "evt-1",
        "type": "checkout.payment",
        "payload": { "reference": reference, "status": "succeeded" }
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/payments/webhook", webhook.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "CONFIRMED");

    // Redelivered event: absorbed, state unchanged.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/payments/webhook", webhook))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "CONFIRMED");

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/bookings/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "CONFIRMED");

    // A confirmed booking cannot be cancelled.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/bookings/{}/cancel", id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_booking_rejects_bad_email() {
    let app = app(test_state());

    let mut payload = booking_payload();
    payload["email"] = json!("not-an-email");

    let response = app
        .oneshot(json_request("POST", "/api/bookings", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlapping_booking_conflicts() {
    let app = app(test_state());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookings", booking_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut overlapping = booking_payload();
    overlapping["starts_at"] = json!("2024-06-01T09:30:00Z");
    let response = app
        .oneshot(json_request("POST", "/api/bookings", overlapping))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_webhook_with_unknown_reference_is_not_found() {
    let app = app(test_state());

    let webhook = json!({
        "id": "evt-404",
        "type": "checkout.payment",
        "payload": { "reference": "co_missing", "status": "succeeded" }
    });
    let response = app
        .oneshot(json_request("POST", "/api/payments/webhook", webhook))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_timeslots_exclude_booked_range() {
    let app = app(test_state());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookings", booking_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get_request("/api/timeslots?unit_id=60-1&date=2024-06-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let times: Vec<&str> = body["times"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();

    // The 09:00-10:00 booking plus its buffer blocks every hour-long ride
    // that would touch 08:50-10:10; the first free start is 10:15.
    assert!(!times.contains(&"09:00"));
    assert!(!times.contains(&"08:00"));
    assert_eq!(times.first(), Some(&"10:15"));
    assert_eq!(times.last(), Some(&"16:00"));
}

#[tokio::test]
async fn test_quote_prices_addons() {
    let app = app(test_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/payments/quote",
            json!({ "unit_id": "60-1", "addons": { "wetsuit": true } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["amount_cents"], 260_000 + 15_000);
    assert_eq!(body["currency"], "ZAR");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = app(test_state());

    let response = app
        .oneshot(get_request("/api/admin/bookings"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_login_and_listing() {
    let app = app(test_state());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/bookings", booking_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Wrong password is rejected.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/login",
            json!({ "email": "admin@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/login",
            json!({ "email": "admin@example.com", "password": "water-horse" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/admin/bookings")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bookings = body_json(response).await;
    assert_eq!(bookings.as_array().unwrap().len(), 1);
    assert_eq!(bookings[0]["status"], "PENDING");
}
