//! Asset routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use tresora_core::asset::LOCATION_IN_STOCK;
use tresora_db::entities::sea_orm_active_enums::AssetStatus;
use tresora_db::repositories::asset::{
    AssetError, AssetRepository, CreateAssetInput, UpdateAssetInput,
};

/// Creates the asset routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets))
        .route("/assets", post(create_asset))
        .route("/assets/{id}", get(get_asset))
        .route("/assets/{id}", put(update_asset))
        .route("/assets/{id}", delete(delete_asset))
}

/// Request body for registering an asset.
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    /// Display name.
    pub name: String,
    /// Manufacturer serial number.
    pub serial_number: Option<String>,
    /// Initial service status (default: new).
    pub status: Option<AssetStatus>,
    /// Initial location (default: in_stock).
    pub location: Option<String>,
    /// Account carrying the acquisition cost.
    pub account_id: Option<Uuid>,
    /// Acquisition cost.
    pub acquisition_cost: Option<Decimal>,
    /// Acquisition date.
    pub acquisition_date: Option<NaiveDate>,
}

/// Request body for updating an asset.
#[derive(Debug, Deserialize)]
pub struct UpdateAssetRequest {
    /// Display name.
    pub name: Option<String>,
    /// Manufacturer serial number.
    pub serial_number: Option<String>,
    /// Service status.
    pub status: Option<AssetStatus>,
    /// Location.
    pub location: Option<String>,
    /// Cost account.
    pub account_id: Option<Uuid>,
    /// Acquisition cost.
    pub acquisition_cost: Option<Decimal>,
    /// Acquisition date.
    pub acquisition_date: Option<NaiveDate>,
}

fn error_response(err: &AssetError) -> axum::response::Response {
    match err {
        AssetError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Asset not found: {id}")
            })),
        )
            .into_response(),
        AssetError::CurrentlyLoaned => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "currently_loaned",
                "message": "Asset is currently loaned out and cannot be deleted"
            })),
        )
            .into_response(),
        AssetError::Database(e) => {
            error!(error = %e, "Asset operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/assets` - List assets.
async fn list_assets(State(state): State<AppState>) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    match repo.list_assets().await {
        Ok(assets) => (StatusCode::OK, Json(json!({ "assets": assets }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/assets` - Register an asset.
async fn create_asset(
    State(state): State<AppState>,
    Json(payload): Json<CreateAssetRequest>,
) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    let input = CreateAssetInput {
        name: payload.name,
        serial_number: payload.serial_number,
        status: payload.status.unwrap_or(AssetStatus::New),
        location: payload
            .location
            .unwrap_or_else(|| LOCATION_IN_STOCK.to_string()),
        account_id: payload.account_id,
        acquisition_cost: payload.acquisition_cost,
        acquisition_date: payload.acquisition_date,
    };

    match repo.create_asset(input).await {
        Ok(asset) => {
            info!(asset_id = %asset.id, "Asset registered");
            (StatusCode::CREATED, Json(asset)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/assets/{id}` - Get one asset.
async fn get_asset(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    match repo.get_asset(id).await {
        Ok(asset) => (StatusCode::OK, Json(asset)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/assets/{id}` - Update asset metadata.
async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssetRequest>,
) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    let input = UpdateAssetInput {
        name: payload.name,
        serial_number: payload.serial_number.map(Some),
        status: payload.status,
        location: payload.location,
        account_id: payload.account_id.map(Some),
        acquisition_cost: payload.acquisition_cost.map(Some),
        acquisition_date: payload.acquisition_date.map(Some),
    };

    match repo.update_asset(id, input).await {
        Ok(asset) => {
            info!(asset_id = %id, "Asset updated");
            (StatusCode::OK, Json(asset)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/assets/{id}` - Delete an asset that is not out on loan.
async fn delete_asset(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    match repo.delete_asset(id).await {
        Ok(()) => {
            info!(asset_id = %id, "Asset deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}
