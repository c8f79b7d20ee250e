use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use commit_types::session::Claims;

use crate::auth::AppState;
use crate::blocking;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    /// Where the button lived; explore pages send "explore" so the redirect
    /// lands back there.
    #[serde(default)]
    pub back: String,
}

/// Toggle the signed-in user's subscription to a commitment. Owners cannot
/// subscribe to their own commitments.
pub async fn toggle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(commitment_id): Path<Uuid>,
    Form(form): Form<ToggleForm>,
) -> Result<Response, AppError> {
    let db_state = state.clone();
    let cid = commitment_id.to_string();
    let commitment = blocking(move || db_state.db.get_commitment(&cid))
        .await?
        .ok_or(AppError::NotFound)?;

    if commitment.owner_user_id == claims.sub.to_string() {
        return Err(AppError::Forbidden);
    }

    let db_state = state.clone();
    let row = (
        Uuid::new_v4().to_string(),
        claims.sub.to_string(),
        commitment_id.to_string(),
    );
    let added = blocking(move || db_state.db.toggle_subscription(&row.0, &row.1, &row.2)).await?;

    debug!(
        "User {} {} commitment {}",
        claims.sub,
        if added { "subscribed to" } else { "unsubscribed from" },
        commitment_id
    );

    let target = if form.back == "explore" {
        "/explore".to_string()
    } else {
        format!("/commitments/{}", commitment_id)
    };
    Ok(Redirect::to(&target).into_response())
}
