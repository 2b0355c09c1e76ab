//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::events::SharedEventBus;
use crate::application::services::{BookingService, StationService};
use crate::domain::payment::PaymentTotals;
use crate::domain::station::{Charger, ChargerType, ConnectorType, GeoLocation};
use crate::domain::{RepositoryProvider, RequestKind, RequestStatus, Slot, SlotStatus};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::SeaOrmRepositoryProvider;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{
    admin_middleware, auth_middleware, optional_auth_middleware, AuthState,
};
use crate::interfaces::ws::{ws_notifications_handler, NotificationState};
use crate::shared::ShutdownSignal;

use super::modules::{
    health, metrics, payments, request_id::request_id_middleware, requests, stations, users,
};

/// Everything the handlers need. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub stations: Arc<StationService>,
    pub bookings: Arc<BookingService>,
    pub events: SharedEventBus,
    pub auth: AuthState,
    pub metrics: Option<PrometheusHandle>,
    pub shutdown: ShutdownSignal,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(
        db: DatabaseConnection,
        jwt_config: JwtConfig,
        events: SharedEventBus,
        shutdown: ShutdownSignal,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        Self {
            stations: Arc::new(StationService::new(repos.clone(), events.clone())),
            bookings: Arc::new(BookingService::new(repos.clone(), events.clone())),
            db,
            repos,
            events,
            auth: AuthState { jwt_config },
            metrics,
            shutdown,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            events: s.events.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<ApiState> for metrics::MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        metrics::MetricsState {
            handle: s.metrics.clone(),
        }
    }
}

impl FromRef<ApiState> for stations::StationHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        stations::StationHandlerState {
            stations: Arc::clone(&s.stations),
        }
    }
}

impl FromRef<ApiState> for requests::RequestHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        requests::RequestHandlerState {
            bookings: Arc::clone(&s.bookings),
        }
    }
}

impl FromRef<ApiState> for users::UserHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        users::UserHandlerState {
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<ApiState> for payments::PaymentHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        payments::PaymentHandlerState {
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<ApiState> for NotificationState {
    fn from_ref(s: &ApiState) -> Self {
        NotificationState {
            event_bus: s.events.clone(),
            jwt_config: s.auth.jwt_config.clone(),
            shutdown: s.shutdown.clone(),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 token with a `role` claim (`user` or `admin`)"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Stations
        stations::list_stations,
        stations::get_station,
        stations::create_station,
        stations::update_station,
        stations::delete_station,
        stations::add_slot,
        stations::remove_slot,
        stations::set_slot_status,
        // Requests
        requests::submit_booking,
        requests::submit_emergency,
        requests::my_requests,
        requests::list_requests,
        requests::pending_count,
        requests::get_request,
        requests::approve_request,
        requests::reject_request,
        // Users
        users::get_my_profile,
        users::upsert_my_profile,
        users::list_users,
        // Payments
        payments::list_payments,
        payments::record_payment,
        payments::payment_summary,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Stations
            stations::StationDto,
            stations::SlotInput,
            stations::CreateStationRequest,
            stations::UpdateStationRequest,
            stations::SetSlotStatusRequest,
            Slot,
            SlotStatus,
            Charger,
            ChargerType,
            ConnectorType,
            GeoLocation,
            // Requests
            requests::RequestDto,
            requests::CreateBookingRequest,
            requests::CreateEmergencyRequest,
            requests::PendingCountDto,
            RequestKind,
            RequestStatus,
            // Users
            users::ProfileDto,
            users::UpdateProfileRequest,
            // Payments
            payments::PaymentDto,
            payments::RecordPaymentRequest,
            PaymentTotals,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Stations", description = "Charging station browsing and admin management"),
        (name = "Slots", description = "Per-station charging slots"),
        (name = "Requests", description = "Booking and emergency requests, and the admin decision queue"),
        (name = "Users", description = "User profiles"),
        (name = "Payments", description = "Payment records and totals (admin)"),
        (name = "WebSocket Notifications", description = "Real-time admin notifications via WebSocket"),
    ),
    info(
        title = "ChargeHub API",
        version = "1.0.0",
        description = "EV charging station locator and slot booking API",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: ApiState) -> Router {
    let auth_state = state.auth.clone();

    let authenticated = || middleware::from_fn_with_state(auth_state.clone(), auth_middleware);
    let admin_only = || middleware::from_fn(admin_middleware);

    // Stations: browsing is public, every mutation is admin-only
    let station_public = Router::new()
        .route("/", get(stations::list_stations))
        .route("/{id}", get(stations::get_station));

    let station_admin = Router::new()
        .route("/", post(stations::create_station))
        .route(
            "/{id}",
            put(stations::update_station).delete(stations::delete_station),
        )
        .route("/{id}/slots", post(stations::add_slot))
        .route(
            "/{id}/slots/{slot_id}",
            axum::routing::delete(stations::remove_slot),
        )
        .route("/{id}/slots/{slot_id}/status", put(stations::set_slot_status))
        .layer(admin_only())
        .layer(authenticated());

    // Requests: guests may submit, signed-in users see their own, admins decide
    let request_submit = Router::new()
        .route("/booking", post(requests::submit_booking))
        .route("/emergency", post(requests::submit_emergency))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            optional_auth_middleware,
        ));

    let request_user = Router::new()
        .route("/mine", get(requests::my_requests))
        .layer(authenticated());

    let request_admin = Router::new()
        .route("/", get(requests::list_requests))
        .route("/pending/count", get(requests::pending_count))
        .route("/{id}", get(requests::get_request))
        .route("/{id}/approve", post(requests::approve_request))
        .route("/{id}/reject", post(requests::reject_request))
        .layer(admin_only())
        .layer(authenticated());

    // Users
    let user_self = Router::new()
        .route(
            "/me",
            get(users::get_my_profile).put(users::upsert_my_profile),
        )
        .layer(authenticated());

    let user_admin = Router::new()
        .route("/", get(users::list_users))
        .layer(admin_only())
        .layer(authenticated());

    // Payments (admin)
    let payment_routes = Router::new()
        .route(
            "/",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/summary", get(payments::payment_summary))
        .layer(admin_only())
        .layer(authenticated());

    // Notification WebSocket (token is checked by the handler)
    let notification_routes = Router::new().route("/ws", get(ws_notifications_handler));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    Router::new()
        // Health & metrics
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        // Stations
        .nest("/api/v1/stations", station_public.merge(station_admin))
        // Requests
        .nest(
            "/api/v1/requests",
            request_submit.merge(request_user).merge(request_admin),
        )
        // Users
        .nest("/api/v1/users", user_self.merge(user_admin))
        // Payments
        .nest("/api/v1/payments", payment_routes)
        // Notifications WebSocket
        .nest("/api/v1/notifications", notification_routes)
        .with_state(state)
        // Swagger UI
        .merge(swagger_routes)
        // Per-route metrics need the matched path, so they run after routing
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::application::events::create_event_bus;
    use crate::application::services::seed_demo_data;
    use crate::domain::UserRole;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::database::test_database;

    struct TestApp {
        router: Router,
        jwt: JwtConfig,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = test_database().await;
            let jwt = JwtConfig::default();
            let state = ApiState::new(
                db,
                jwt.clone(),
                create_event_bus(),
                ShutdownSignal::new(),
                None,
            );
            seed_demo_data(state.repos.as_ref()).await.unwrap();
            Self {
                router: create_api_router(state),
                jwt,
            }
        }

        fn token(&self, user_id: &str, role: UserRole) -> String {
            create_token(user_id, Some("Test Person"), role, &self.jwt).unwrap()
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }
    }

    fn booking_body(slot_id: &str) -> Value {
        json!({
            "station_id": "station-1",
            "slot_id": slot_id,
            "vehicle_number": "KA-01-1234",
            "phone_number": "5551234567",
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "ok");
    }

    #[tokio::test]
    async fn stations_are_listed_without_a_token() {
        let app = TestApp::new().await;
        let (status, body) = app.send(Method::GET, "/api/v1/stations", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn station_mutations_require_admin() {
        let app = TestApp::new().await;
        let body = json!({ "status": "unavailable" });
        let uri = "/api/v1/stations/station-1/slots/slot-1/status";

        let (status, _) = app.send(Method::PUT, uri, None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let user = app.token("user-1", UserRole::User);
        let (status, _) = app.send(Method::PUT, uri, Some(&user), Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = app.token("admin-1", UserRole::Admin);
        let (status, _) = app.send(Method::PUT, uri, Some(&admin), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(Method::GET, "/api/v1/requests/mine", Some("not-a-jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn guest_booking_is_approved_once() {
        let app = TestApp::new().await;
        let admin = app.token("admin-1", UserRole::Admin);

        let (status, body) = app
            .send(Method::POST, "/api/v1/requests/booking", None, Some(booking_body("slot-1")))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["user_name"], "Guest");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, count) = app
            .send(Method::GET, "/api/v1/requests/pending/count", Some(&admin), None)
            .await;
        assert_eq!(count["data"]["pending"], 1);

        let approve = format!("/api/v1/requests/{id}/approve");
        let (status, body) = app.send(Method::POST, &approve, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "approved");

        let (status, body) = app.send(Method::POST, &approve, Some(&admin), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "This request has already been processed.");

        let (_, station) = app
            .send(Method::GET, "/api/v1/stations/station-1", None, None)
            .await;
        let slot = station["data"]["slots"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["id"] == "slot-1")
            .cloned()
            .unwrap();
        assert_eq!(slot["status"], "occupied");
    }

    #[tokio::test]
    async fn booking_an_occupied_slot_conflicts() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(Method::POST, "/api/v1/requests/booking", None, Some(booking_body("slot-2")))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn signed_in_user_sees_own_requests() {
        let app = TestApp::new().await;
        let user = app.token("user-7", UserRole::User);

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/requests/booking",
                Some(&user),
                Some(booking_body("slot-3")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["user_id"], "user-7");

        let (status, body) = app
            .send(Method::GET, "/api/v1/requests/mine", Some(&user), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["slot_id"], "slot-3");
    }

    #[tokio::test]
    async fn admin_queue_is_forbidden_for_users() {
        let app = TestApp::new().await;
        let user = app.token("user-1", UserRole::User);
        let (status, _) = app.send(Method::GET, "/api/v1/requests", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.send(Method::GET, "/api/v1/payments", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_booking_body_is_unprocessable() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/requests/booking",
                None,
                Some(json!({ "station_id": "station-1", "slot_id": "slot-1", "vehicle_number": "K" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn admin_queue_filters_by_kind_or_type() {
        let app = TestApp::new().await;
        let admin = app.token("admin-1", UserRole::Admin);

        app.send(Method::POST, "/api/v1/requests/booking", None, Some(booking_body("slot-1")))
            .await;
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/requests/emergency",
                None,
                Some(json!({
                    "location": "Highway 101 exit 12, northbound",
                    "vehicle_type": "Tesla Model 3",
                    "phone_number": "5559876543",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, all) = app.send(Method::GET, "/api/v1/requests", Some(&admin), None).await;
        assert_eq!(all["data"]["total"], 2);

        for uri in ["/api/v1/requests?kind=emergency", "/api/v1/requests?type=emergency"] {
            let (status, body) = app.send(Method::GET, uri, Some(&admin), None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["data"]["total"], 1, "{uri}");
            assert_eq!(body["data"]["items"][0]["type"], "emergency", "{uri}");
        }
    }

    #[tokio::test]
    async fn profile_is_missing_until_saved() {
        let app = TestApp::new().await;
        let user = app.token("user-9", UserRole::User);

        let (status, body) = app.send(Method::GET, "/api/v1/users/me", Some(&user), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, body) = app
            .send(
                Method::PUT,
                "/api/v1/users/me",
                Some(&user),
                Some(json!({ "name": "Dana Scott", "email": "dana@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], "user-9");

        let (status, body) = app.send(Method::GET, "/api/v1/users/me", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Dana Scott");
        assert_eq!(body["data"]["email"], "dana@example.com");
    }

    #[tokio::test]
    async fn payment_amounts_are_checked_before_saving() {
        let app = TestApp::new().await;
        let admin = app.token("admin-1", UserRole::Admin);
        let payment = |amount: &str| {
            json!({ "user_id": "user-5", "user_name": "Eve Adams", "amount": amount })
        };

        let (status, body) = app
            .send(Method::POST, "/api/v1/payments", Some(&admin), Some(payment("-5.00")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Amount must not be negative.");

        let (status, body) = app
            .send(Method::POST, "/api/v1/payments", Some(&admin), Some(payment("10.005")))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "amount: Amount must have at most two decimal places.");

        let (_, list) = app.send(Method::GET, "/api/v1/payments", Some(&admin), None).await;
        assert_eq!(list["data"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn payment_summary_counts_recorded_payments() {
        let app = TestApp::new().await;
        let admin = app.token("admin-1", UserRole::Admin);

        let (status, body) = app
            .send(Method::GET, "/api/v1/payments/summary", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["revenue"], "59.45");
        assert_eq!(body["data"]["succeeded"], 3);
        assert_eq!(body["data"]["failed"], 1);
        assert_eq!(body["data"]["pending"], 0);

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/payments",
                Some(&admin),
                Some(json!({ "user_id": "user-5", "user_name": "Eve Adams", "amount": "12.50" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = app
            .send(Method::GET, "/api/v1/payments/summary", Some(&admin), None)
            .await;
        assert_eq!(body["data"]["revenue"], "71.95");
        assert_eq!(body["data"]["succeeded"], 4);
    }
}
