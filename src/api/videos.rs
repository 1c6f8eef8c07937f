use axum::extract::State;
use axum::Json;
use snafu::ResultExt as _;
use tracing::instrument;

use super::{App, ReadDataSnafu, Result, SaveDataSnafu};
use crate::model::{Health, RemoteDocument, ReplaceRequest, ReplaceResponse};

#[instrument(skip_all)]
pub async fn list(State(app): State<App>) -> Result<Json<RemoteDocument>> {
    let document = app.read().await.context(ReadDataSnafu)?;
    Ok(Json(document))
}

#[instrument(skip_all)]
pub async fn replace(
    State(app): State<App>, Json(request): Json<ReplaceRequest>,
) -> Result<Json<ReplaceResponse>> {
    let count = request.videos.len();
    let last_updated = app
        .replace(request.videos, request.version)
        .await
        .context(SaveDataSnafu)?;

    tracing::info!(count, "saved videos");
    Ok(Json(ReplaceResponse {
        success: true,
        message: "Data saved successfully".to_string(),
        last_updated,
    }))
}

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}
