/// Axum HTTP handlers for Esplora API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::chain::{AppState, MockChain, MockError};
use crate::types::*;

/// Custom error type for handlers
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, message).into_response()
    }
}

impl From<MockError> for ApiError {
    fn from(err: MockError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

fn read(state: &AppState) -> Result<std::sync::RwLockReadGuard<'_, MockChain>, ApiError> {
    state
        .read()
        .map_err(|_| ApiError::Internal("chain state poisoned".to_string()))
}

/// GET /address/{address}
/// Returns confirmed and mempool stats for an address
pub async fn get_address(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AddressResponse>, ApiError> {
    let chain_stats = read(&state)?.address_stats(&address);
    Ok(Json(AddressResponse {
        address,
        chain_stats,
        mempool_stats: AddressStats::default(),
    }))
}

/// GET /address/{address}/utxo
/// Returns all UTXOs for an address
pub async fn get_address_utxos(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<UtxoResponse>>, ApiError> {
    let utxos = read(&state)?.utxos(&address);
    Ok(Json(utxos))
}

/// GET /tx/{txid}/hex
/// Returns raw transaction hex as plain text
pub async fn get_transaction_hex(
    State(state): State<AppState>,
    Path(txid): Path<String>,
) -> Result<String, ApiError> {
    let hex = read(&state)?.raw_transaction(&txid);
    hex.ok_or_else(|| ApiError::NotFound(format!("Transaction not found: {}", txid)))
}

/// POST /tx
/// Broadcasts a raw transaction (hex string in body)
/// Returns the txid as plain text
pub async fn broadcast_transaction(
    State(state): State<AppState>,
    body: String,
) -> Result<String, ApiError> {
    let mut chain = state
        .write()
        .map_err(|_| ApiError::Internal("chain state poisoned".to_string()))?;
    let txid = chain.broadcast(&body)?;
    Ok(txid.to_string())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
