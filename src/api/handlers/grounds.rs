use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::SlotView,
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct SlotListResponse {
    pub ground_id: Uuid,
    pub date: String,
    pub slots: Vec<SlotView>,
}

pub async fn list_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SlotQuery>,
) -> Result<Json<SlotListResponse>> {
    let slots = state
        .service_context
        .reservation_service
        .list_slots(id, &params.date)
        .await?;

    Ok(Json(SlotListResponse {
        ground_id: id,
        date: params.date,
        slots,
    }))
}
