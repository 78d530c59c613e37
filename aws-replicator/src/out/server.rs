use crate::backend::BackendLocator;
use crate::envelope;
use crate::error::ReplicationError;
use crate::registry::Registry;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// What the receiving endpoint dispatches into.
pub struct InjectionState {
    pub registry: Arc<Registry>,
    pub backends: Arc<dyn BackendLocator>,
}

impl InjectionState {
    pub fn new(registry: Arc<Registry>, backends: Arc<dyn BackendLocator>) -> Self {
        Self { registry, backends }
    }
}

async fn replicate_state_handler(
    State(state): State<Arc<InjectionState>>,
    body: Bytes,
) -> Result<Json<Value>, ReplicationError> {
    let descriptor = envelope::decode(&body)?;
    let pair = state.registry.resolve(&descriptor.type_name)?;
    pair.injector.inject(&descriptor, state.backends.as_ref()).await?;
    info!(resource = %descriptor.label(), "injected replicated state");
    Ok(Json(json!({})))
}

/// Router with the single receiving endpoint at `handler_path`. Envelopes up
/// to `max_body_bytes` are accepted; axum's 2MB default is far too small for
/// a bucket's worth of base64 bodies.
pub fn build_router(state: Arc<InjectionState>, handler_path: &str, max_body_bytes: usize) -> Router {
    Router::new()
        .route(handler_path, post(replicate_state_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

impl IntoResponse for ReplicationError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReplicationError::MalformedEnvelope(_) | ReplicationError::UnsupportedResourceKind(_) => {
                StatusCode::BAD_REQUEST
            }
            ReplicationError::TargetResourceMissing { .. } => StatusCode::NOT_FOUND,
            ReplicationError::Injection { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = status.as_u16(), error = %self, "rejected replication request");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
