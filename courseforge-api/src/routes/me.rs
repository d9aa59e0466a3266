/// Endpoints for the authenticated user's own data
///
/// # Endpoints
///
/// - `GET /v1/me/enrollments` - The caller's enrollments, newest first
/// - `GET /v1/me/orders` - The caller's purchase history, newest first

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use courseforge_shared::{
    auth::context::AuthContext,
    models::{enrollment::Enrollment, order::Order},
};
use serde::Serialize;

/// Enrollment list response
#[derive(Debug, Serialize)]
pub struct EnrollmentsResponse {
    pub enrollments: Vec<Enrollment>,
}

/// Order list response
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// List the caller's enrollments
pub async fn list_enrollments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<EnrollmentsResponse>> {
    let enrollments = Enrollment::list_by_user(&state.db, auth.user.id).await?;

    Ok(Json(EnrollmentsResponse { enrollments }))
}

/// List the caller's orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<OrdersResponse>> {
    let orders = Order::list_by_user(&state.db, auth.user.id).await?;

    Ok(Json(OrdersResponse { orders }))
}
