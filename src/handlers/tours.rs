// src/handlers/tours.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::query::FindQuery,
    models::tour::Projection,
    services::tour_schema::TourInput,
};

// ---
// Parâmetros de leitura
// ---
#[derive(Debug, Default, Deserialize)]
pub struct ReadParams {
    // Ex: ?select=+createdAt
    pub select: Option<String>,
}

impl ReadParams {
    fn projection(&self) -> Projection {
        Projection::from_select(self.select.as_deref())
    }
}

// ---
// Handler: get_all_tours
// ---
pub async fn get_all_tours(
    State(app_state): State<AppState>,
    Query(params): Query<ReadParams>,
) -> Result<impl IntoResponse, AppError> {
    let tours = app_state.tour_service.find_tours(FindQuery::find()).await?;

    let projection = params.projection();
    let views: Vec<_> = tours.iter().map(|t| t.view(projection)).collect();

    Ok(Json(json!({
        "status": "success",
        "results": views.len(),
        "data": { "tours": views },
    })))
}

// ---
// Handler: get_tour
// ---
pub async fn get_tour(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ReadParams>,
) -> Result<impl IntoResponse, AppError> {
    let tour = app_state.tour_service.get_tour(id).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "tour": tour.view(params.projection()) },
    })))
}

// ---
// Handler: create_tour
// ---
pub async fn create_tour(
    State(app_state): State<AppState>,
    Json(payload): Json<TourInput>,
) -> Result<impl IntoResponse, AppError> {
    // A validação acontece no hook de pre-save dentro do serviço
    let tour = app_state.tour_service.create_tour(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "tour": tour.view(Projection::Default) },
        })),
    ))
}

// ---
// Handler: update_tour
// ---
pub async fn update_tour(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TourInput>,
) -> Result<impl IntoResponse, AppError> {
    let tour = app_state.tour_service.update_tour(id, patch).await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "tour": tour.view(Projection::Default) },
    })))
}

// ---
// Handler: delete_tour
// ---
pub async fn delete_tour(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.tour_service.delete_tour(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Handler: get_tour_stats (agregação)
// ---
pub async fn get_tour_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.tour_service.tour_stats().await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "stats": stats },
    })))
}
