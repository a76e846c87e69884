//! HTTP routes for the relay
//!
//! Three surfaces: a status document at `/`, the runtime target setter at
//! `/set-ip`, and the forwarder under `/proxy`. Error bodies are fixed JSON
//! shapes so the web client can show them verbatim.

use crate::ProxyState;
use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get, post},
    Router,
};
use giza_shared::{COMMAND_PATH, PROXY_PREFIX, STATUS_PATH};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Largest request body the relay will carry upstream
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the relay router with permissive CORS on every response
pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/set-ip", post(set_ip))
        .route(PROXY_PREFIX, any(forward_bare))
        .route(&format!("{}/*rest", PROXY_PREFIX), any(forward))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / - liveness document listing the forwarded endpoints
async fn home(State(state): State<ProxyState>) -> Json<Value> {
    Json(json!({
        "status": "Proxy server running",
        "targetIp": state.target().await,
        "endpoints": {
            "status": format!("{}{}", PROXY_PREFIX, STATUS_PATH),
            "command": format!("{}{}", PROXY_PREFIX, COMMAND_PATH),
        }
    }))
}

/// POST /set-ip - store the device address for forwarding
async fn set_ip(State(state): State<ProxyState>, Json(body): Json<Value>) -> Response {
    let ip = body
        .get("ip")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if ip.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "IP address required" })),
        )
            .into_response();
    }

    state.set_target(ip.to_string()).await;
    info!("Set target IP to: {}", ip);
    Json(json!({ "success": true, "ip": ip })).into_response()
}

async fn forward(
    State(state): State<ProxyState>,
    Path(rest): Path<String>,
    request: Request,
) -> Response {
    do_forward(state, rest, request).await
}

/// A bare `/proxy` maps to the device root
async fn forward_bare(State(state): State<ProxyState>, request: Request) -> Response {
    do_forward(state, String::new(), request).await
}

/// Relay one request to `http://<target>/<rest>`, prefix stripped, query
/// and body preserved, upstream status and content type carried back.
async fn do_forward(state: ProxyState, rest: String, request: Request) -> Response {
    let Some(target) = state.target().await else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Target IP not set. Call /set-ip first." })),
        )
            .into_response();
    };

    let method = request.method().clone();
    let query = request
        .uri()
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Unreadable request body", "message": err.to_string() })),
            )
                .into_response();
        }
    };

    let url = format!("http://{}/{}{}", target, rest, query);
    info!("Proxying {}: {}", method, url);

    let upstream_method =
        reqwest::Method::from_bytes(method.as_str().as_bytes()).unwrap_or(reqwest::Method::GET);
    let mut upstream = state
        .client()
        .request(upstream_method, url.as_str())
        .body(body.to_vec());
    if let Some(ct) = content_type {
        upstream = upstream.header(reqwest::header::CONTENT_TYPE, ct);
    }

    match upstream.send().await {
        Ok(response) => relay_response(response).await,
        Err(err) => proxy_error(err),
    }
}

/// Carry the upstream status, content type, and body back to the caller
async fn relay_response(response: reqwest::Response) -> Response {
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => return proxy_error(err),
    };

    let mut builder = Response::builder().status(status);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

fn proxy_error(err: reqwest::Error) -> Response {
    warn!("Proxy error: {}", err);
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": "Proxy error", "message": err.to_string() })),
    )
        .into_response()
}
