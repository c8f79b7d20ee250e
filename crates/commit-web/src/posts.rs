use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use uuid::Uuid;

use commit_types::forms::NewPostForm;
use commit_types::models::PostKind;
use commit_types::session::Claims;

use crate::auth::AppState;
use crate::blocking;
use crate::commitments::render_detail;
use crate::error::AppError;

/// Create a check-in or comment. Check-ins are owner-only; every new post
/// fans out notifications to the commitment's subscribers.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(commitment_id): Path<Uuid>,
    Form(form): Form<NewPostForm>,
) -> Result<Response, AppError> {
    let db_state = state.clone();
    let cid = commitment_id.to_string();
    let commitment = blocking(move || db_state.db.get_commitment(&cid))
        .await?
        .ok_or(AppError::NotFound)?;

    let Some(kind) = PostKind::parse(&form.type_name) else {
        let errors = vec!["Please choose a post type.".to_string()];
        return Ok(render_detail(&state, &claims, commitment_id, &errors)
            .await?
            .into_response());
    };

    let is_owner = commitment.owner_user_id == claims.sub.to_string();
    if kind == PostKind::CheckIn && !is_owner {
        return Err(AppError::Forbidden);
    }

    let body_text = form.body_text.trim().to_string();
    let image_url = form.image_url.trim().to_string();

    let mut errors = Vec::new();
    match kind {
        PostKind::CheckIn if body_text.is_empty() && image_url.is_empty() => {
            errors.push("Please write an update or attach an image.".to_string());
        }
        PostKind::Comment if body_text.is_empty() => {
            errors.push("Please write a comment.".to_string());
        }
        _ => {}
    }
    if !errors.is_empty() {
        return Ok(render_detail(&state, &claims, commitment_id, &errors)
            .await?
            .into_response());
    }

    let db_state = state.clone();
    let post_id = Uuid::new_v4().to_string();
    let row = (
        post_id.clone(),
        commitment_id.to_string(),
        claims.sub.to_string(),
        commitment.owner_user_id.clone(),
    );
    let notified = blocking(move || {
        db_state
            .db
            .insert_post(&row.0, &row.1, &row.2, kind.as_str(), &body_text, &image_url)?;
        db_state.db.notify_subscribers(&row.1, &row.0, &row.2, &row.3)
    })
    .await?;

    debug!(
        "Post {} on commitment {} notified {} subscriber(s)",
        post_id, commitment_id, notified
    );

    Ok(Redirect::to(&format!("/commitments/{}", commitment_id)).into_response())
}
