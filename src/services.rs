//! Service registry — fire-and-forget service calls keyed by domain and name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// A callable service. Handlers validate their own data.
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    async fn call(&self, data: serde_json::Value) -> Result<(), ServiceError>;
}

/// Registry of services, keyed by `(domain, service)`.
pub struct ServiceRegistry {
    services: RwLock<HashMap<(String, String), Arc<dyn ServiceHandler>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, domain: &str, service: &str, handler: Arc<dyn ServiceHandler>) {
        self.services
            .write()
            .await
            .insert((domain.to_string(), service.to_string()), handler);
        tracing::debug!("Registered service: {}.{}", domain, service);
    }

    pub async fn has(&self, domain: &str, service: &str) -> bool {
        self.services
            .read()
            .await
            .contains_key(&(domain.to_string(), service.to_string()))
    }

    /// Call a service and wait for it to finish.
    pub async fn call(
        &self,
        domain: &str,
        service: &str,
        data: serde_json::Value,
    ) -> Result<(), ServiceError> {
        let handler = self
            .services
            .read()
            .await
            .get(&(domain.to_string(), service.to_string()))
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                domain: domain.to_string(),
                service: service.to_string(),
            })?;
        handler.call(data).await
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize service data into `T`, mapping failures to `InvalidData`.
pub fn parse_service_data<T: serde::de::DeserializeOwned>(
    domain: &str,
    service: &str,
    data: serde_json::Value,
) -> Result<T, ServiceError> {
    serde_json::from_value(data).map_err(|e| ServiceError::InvalidData {
        domain: domain.to_string(),
        service: service.to_string(),
        reason: e.to_string(),
    })
}

// ── REST ────────────────────────────────────────────────────────────────

/// POST /api/services/{domain}/{service}
async fn call_service(
    State(services): State<Arc<ServiceRegistry>>,
    Path((domain, service)): Path<(String, String)>,
    body: Bytes,
) -> impl IntoResponse {
    let data = if body.is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(data) => data,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"message": format!("Data should be valid JSON: {e}")})),
                );
            }
        }
    };

    match services.call(&domain, &service, data).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!([]))),
        Err(e @ ServiceError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"message": e.to_string()})),
        ),
        Err(e @ ServiceError::InvalidData { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"message": e.to_string()})),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Service call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"message": e.to_string()})),
            )
        }
    }
}

/// Build the service-call REST routes.
pub fn service_routes(services: Arc<ServiceRegistry>) -> Router {
    Router::new()
        .route("/api/services/{domain}/{service}", post(call_service))
        .with_state(services)
}
