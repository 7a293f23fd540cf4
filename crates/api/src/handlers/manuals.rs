//! Handlers for the manual catalog.
//!
//! Create and update accept `multipart/form-data` (text fields plus an
//! optional `thumbnail` file part); all orchestration and lifecycle
//! guarantees live in [`CatalogManager`], these handlers only translate
//! between the wire and the domain.
//!
//! [`CatalogManager`]: manuals_catalog::CatalogManager

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use manuals_assets::AssetStore;
use manuals_catalog::Upload;
use manuals_core::manual::{ManualInput, RawManualInput};
use manuals_core::types::DbId;
use manuals_db::models::manual::Manual;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// Wire shape of a manual record.
///
/// `thumbnailPath` is the public serving path (`/uploads/{key}`) or null;
/// the internal storage key never leaves the server unprefixed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualResponse {
    pub id: DbId,
    pub video_link: String,
    pub title: String,
    pub description: String,
    pub order: i64,
    pub thumbnail_path: Option<String>,
}

impl From<Manual> for ManualResponse {
    fn from(m: Manual) -> Self {
        Self {
            id: m.id,
            video_link: m.video_link,
            title: m.title,
            description: m.description,
            order: m.display_order,
            thumbnail_path: m.thumbnail_key.as_deref().map(AssetStore::public_path),
        }
    }
}

// ---------------------------------------------------------------------------
// Multipart parsing
// ---------------------------------------------------------------------------

/// Read the multipart form shared by create and update: text fields plus
/// an optional `thumbnail` file part. Validation happens afterwards in
/// `manuals_core`; this loop only collects.
async fn read_form(mut multipart: Multipart) -> AppResult<(RawManualInput, Option<Upload>)> {
    let mut raw = RawManualInput::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "videoLink" => raw.video_link = Some(text(field).await?),
            "title" => raw.title = Some(text(field).await?),
            "description" => raw.description = Some(text(field).await?),
            "order" => raw.order = Some(text(field).await?),
            "thumbnail" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // Browsers send an empty part for an untouched file input.
                if !bytes.is_empty() {
                    upload = Some(Upload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((raw, upload))
}

async fn text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /oe_manuals
pub async fn create_manual(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (raw, upload) = read_form(multipart).await?;
    let input = ManualInput::validate(raw)?;

    let manual = state.catalog.create(input, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ManualResponse::from(manual),
        }),
    ))
}

/// GET /oe_manuals
///
/// Insertion order, not display order; clients sort by `order` themselves.
pub async fn list_manuals(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let manuals = state.catalog.list().await?;
    let data: Vec<ManualResponse> = manuals.into_iter().map(ManualResponse::from).collect();

    Ok(Json(DataResponse { data }))
}

/// GET /oe_manuals/{id}
pub async fn get_manual(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let manual = state.catalog.get(id).await?;

    Ok(Json(DataResponse {
        data: ManualResponse::from(manual),
    }))
}

/// PUT /oe_manuals/{id}
pub async fn update_manual(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (raw, upload) = read_form(multipart).await?;
    let input = ManualInput::validate(raw)?;

    let outcome = state.catalog.update(id, input, upload).await?;

    Ok(Json(DataResponse {
        data: ManualResponse::from(outcome.manual),
    }))
}

/// DELETE /oe_manuals/{id}
pub async fn delete_manual(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.catalog.delete(id).await?;

    Ok(Json(DataResponse {
        data: ManualResponse::from(outcome.manual),
    }))
}
