use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    response::Json,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::logic::{AccessError, PizzaOperations};
use crate::model::{FieldViolation, Id, NewPizza, Pizza, PizzaPatch};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            errors: Vec::new(),
        }
    }
}

/// Not-found maps to 404; validation and store failures both map to 400.
pub fn error_response(err: AccessError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        AccessError::NotFound(message) => (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message))),
        AccessError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: errors.to_string(),
                errors: errors.violations,
            }),
        ),
        AccessError::Store(e) => {
            log::error!("Store error: {:#}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("The request could not be completed")),
            )
        }
    }
}

/// JSON request body whose parse failures are answered with an
/// `ErrorResponse` instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection_response(rejection)),
        }
    }
}

/// A body that is not the expected shape is a validation failure (400).
/// Only a missing JSON content type keeps its own status.
pub fn rejection_response(rejection: JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
    let status = match rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    log::debug!("Rejected request body: {}", rejection.body_text());
    (status, Json(ErrorResponse::new(&rejection.body_text())))
}

pub async fn list_pizzas<S: Store>(State(store): State<AppState<S>>) -> ApiResult<Vec<Pizza>> {
    PizzaOperations::new(store)
        .list_all()
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_pizza<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Pizza> {
    PizzaOperations::new(store)
        .get_by_id(&id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_pizza<S: Store>(
    State(store): State<AppState<S>>,
    JsonBody(input): JsonBody<NewPizza>,
) -> ApiResult<Pizza> {
    PizzaOperations::new(store)
        .create(input)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_pizza<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
    JsonBody(patch): JsonBody<PizzaPatch>,
) -> ApiResult<Pizza> {
    PizzaOperations::new(store)
        .update(&id, patch)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_pizza<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Pizza> {
    PizzaOperations::new(store)
        .delete(&id)
        .await
        .map(Json)
        .map_err(error_response)
}
