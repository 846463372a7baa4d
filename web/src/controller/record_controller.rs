use crate::{AppState, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use domain::data as DataApi;

/// POST a `{name, age}` record for broadcast to every connected client.
///
/// The body is decoded regardless of its declared content type. A body that is
/// not a JSON object of string fields is rejected with 400 and never queued.
/// Success carries no body.
pub async fn create(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let data = DataApi::decode(&body)?;
    DataApi::submit(app_state.relay_manager.data_ingress(), data)?;

    Ok(StatusCode::OK)
}
