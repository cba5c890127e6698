//! Per-request upstream sessions.
//!
//! Every protected route must carry `X-Upstream-Credentials:
//! <access key>:<secret key>`. The middleware opens an upstream session with
//! those credentials and hands it to the handler as a request extension.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    adapters::inbound::http::{dto::ErrorResponseDto, router::AppState},
    domain::value_objects::Credentials,
    ports::storage::UpstreamStore,
};

pub const CREDENTIALS_HEADER: &str = "x-upstream-credentials";

/// Upstream connection opened for the caller of the current request
#[derive(Clone)]
pub struct UpstreamSession {
    store: Arc<dyn UpstreamStore>,
    credentials: Credentials,
}

impl UpstreamSession {
    pub fn new(store: Arc<dyn UpstreamStore>, credentials: Credentials) -> Self {
        Self { store, credentials }
    }

    pub fn store(&self) -> Arc<dyn UpstreamStore> {
        self.store.clone()
    }

    /// Key pair the session was opened with, for admin-ops calls
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

pub async fn require_credentials(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(CREDENTIALS_HEADER) {
        Some(header) => header,
        None => return unauthorized("Missing X-Upstream-Credentials header"),
    };

    let credentials = match header.to_str().map(Credentials::parse) {
        Ok(Ok(credentials)) => credentials,
        Ok(Err(e)) => {
            warn!(error = %e, "Rejected upstream credentials");
            return unauthorized("Malformed X-Upstream-Credentials header");
        }
        Err(_) => return unauthorized("Malformed X-Upstream-Credentials header"),
    };

    debug!(access_key = %credentials.access_key(), "Opening upstream session");
    let store = state.connector.connect(&credentials);
    request
        .extensions_mut()
        .insert(UpstreamSession::new(store, credentials));

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponseDto::unauthorized(message)),
    )
        .into_response()
}
