//! Quotes and breathing exercise content

use axum::{Json, extract::Path};
use duckie_api::ApiError;
use duckie_api::responses::{BreathingResponse, QuoteListResponse, QuoteResponse};
use duckie_core::wellness;

pub async fn list_quotes() -> Json<QuoteListResponse> {
    Json(QuoteListResponse::all())
}

pub async fn get_quote(Path(id): Path<u32>) -> Result<Json<QuoteResponse>, ApiError> {
    wellness::quote(id)
        .map(|q| Json(QuoteResponse::from(q)))
        .ok_or_else(|| ApiError::not_found("quote", id.to_string()))
}

pub async fn next_quote(Path(id): Path<u32>) -> Result<Json<QuoteResponse>, ApiError> {
    wellness::next_quote(id)
        .map(|q| Json(QuoteResponse::from(q)))
        .ok_or_else(|| ApiError::not_found("quote", id.to_string()))
}

pub async fn breathing() -> Json<BreathingResponse> {
    Json(BreathingResponse::standard())
}
