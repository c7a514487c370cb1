//! The JSON API for listing, creating, reading, updating and deleting the
//! transactions of the logged-in user.
//!
//! The routes are expected to sit behind [crate::auth::api_auth_guard], which
//! provides the [Session] of the caller.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    app_state::lock_connection,
    auth::Session,
    transaction::{
        core::{
            TransactionState, create_transaction, delete_transaction, get_transaction,
            list_transactions, update_transaction,
        },
        models::{StoreError, Transaction, TransactionId, TransactionInput},
    },
};

/// The ways an API request can fail, each answered with `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or one of its fields is invalid.
    #[error("{0}")]
    BadRequest(String),

    /// The transaction does not exist or belongs to another user.
    #[error("Transaction not found")]
    NotFound,

    /// Something went wrong on the server side.
    #[error(transparent)]
    Internal(#[from] Error),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Internal(error) => ApiError::Internal(error),
            error => ApiError::BadRequest(error.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected transaction path: {}", rejection.body_text());
        ApiError::NotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => (StatusCode::NOT_FOUND, StoreError::NotFound.to_string()),
            ApiError::Internal(error) => {
                tracing::error!("An unexpected error occurred in the API: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Lists every transaction of the caller, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(session.user_id, None, &connection)?;

    Ok(Json(transactions))
}

/// Creates a transaction for the caller and answers `201` with its ID.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let new_transaction = input.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(session.user_id, &new_transaction, &connection)?;
    tracing::debug!(
        "User {} created transaction {} through the API",
        session.user_id,
        transaction.id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": transaction.id })),
    ))
}

/// Returns a single transaction of the caller.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<Transaction>, ApiError> {
    let Path(transaction_id) = path?;

    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, session.user_id, &connection)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Replaces every field of a transaction of the caller.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionInput>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(transaction_id) = path?;
    let Json(input) = payload?;
    let new_transaction = input.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    update_transaction(
        transaction_id,
        session.user_id,
        &new_transaction,
        &connection,
    )?;

    Ok(Json(json!({ "success": true })))
}

/// Deletes a transaction of the caller.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(transaction_id) = path?;

    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, session.user_id, &connection)?;

    Ok(Json(json!({ "success": true })))
}
