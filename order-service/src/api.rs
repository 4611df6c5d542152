use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use shared::{BookingError, OrderDetail, OrderId, OrderRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::lifecycle::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmOrderRequest {
    pub room_number: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: BookingError) -> ApiError {
    match &e {
        BookingError::Storage(_) => tracing::error!("Order request failed: {}", e),
        BookingError::Busy(_) => tracing::warn!("Order request timed out on a lock: {}", e),
        _ => {}
    }
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            kind: e.kind(),
        }),
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:order_id", get(get_order))
        .route("/orders/:order_id/pay", post(pay_order))
        .route("/orders/:order_id/confirm", post(confirm_order))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderDetail>), ApiError> {
    let order = state.orders.create_order(request).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(order.detail())))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    state
        .orders
        .get_order_detail(OrderId::from_uuid(order_id))
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn pay_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state
        .orders
        .pay_order(OrderId::from_uuid(order_id))
        .await
        .map_err(error_response)?;
    Ok(Json(order.detail()))
}

pub async fn confirm_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<ConfirmOrderRequest>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state
        .orders
        .confirm_order(OrderId::from_uuid(order_id), &request.room_number)
        .await
        .map_err(error_response)?;
    Ok(Json(order.detail()))
}

pub async fn health_check() -> &'static str {
    "OK"
}
