use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;

use crate::models::pricing::{PricingRequest, PricingResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/pricing/calculate", post(calculate_price))
}

async fn calculate_price(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PricingRequest>,
) -> Json<PricingResult> {
    Json(state.pricing.calculate_delivery_price(&payload).await)
}
