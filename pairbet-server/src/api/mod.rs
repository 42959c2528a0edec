use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use pairbet_core::RoomService;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::ipfs::MessageStore;
use crate::rpc::TransactionBroadcaster;

mod handlers;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomService>,
    pub broadcaster: Arc<dyn TransactionBroadcaster>,
    pub messages: Arc<dyn MessageStore>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        rooms: Arc<RoomService>,
        broadcaster: Arc<dyn TransactionBroadcaster>,
        messages: Arc<dyn MessageStore>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            rooms,
            broadcaster,
            messages,
            admin_token: admin_token.map(Arc::from),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(handlers::ADMIN_TOKEN_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/room/join", post(handlers::join))
        .route("/room/secrets", post(handlers::secrets))
        .route("/room/status", post(handlers::room_status))
        .route("/room/release", post(handlers::release_room))
        .route("/funding/submit", post(handlers::submit_funding))
        .route("/funding/summary", post(handlers::funding_summary))
        .route("/funding/sign", post(handlers::sign_transaction))
        .route("/number/announce", post(handlers::announce_number))
        .route("/number/reveal", post(handlers::reveal_numbers))
        .route("/tx/broadcast", post(handlers::broadcast))
        .route("/message/store", post(handlers::store_message))
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(req).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http.request"
    );
    response
}
