use axum::{
    Extension,
    extract::{Path, State},
    response::{Html, Redirect},
};
use tracing::debug;
use uuid::Uuid;

use commit_types::models::PostKind;
use commit_types::session::Claims;

use crate::auth::AppState;
use crate::blocking;
use crate::error::AppError;
use crate::render::{self, escape};

pub async fn list_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Html<String>, AppError> {
    let db_state = state.clone();
    let uid = claims.sub.to_string();
    let (rows, unread) = blocking(move || {
        let rows = db_state.db.notifications_for_user(&uid)?;
        let unread = db_state.db.unread_notification_count(&uid)?;
        Ok((rows, unread))
    })
    .await?;

    let nav = render::Nav {
        email: claims.email.clone(),
        unread,
    };

    let mut body = String::new();
    if rows.is_empty() {
        body.push_str(
            "<section class=\"surface\">\
             <p class=\"hint\">Nothing here yet. Subscribe to a commitment to get updates.</p>\
             </section>",
        );
    } else {
        let mut items = String::new();
        for row in &rows {
            let kind_label = PostKind::parse(&row.post_type)
                .map(|k| k.label().to_lowercase())
                .unwrap_or_else(|| "post".to_string());
            let unread_class = if row.read_at.is_none() { " unread" } else { "" };
            let mark_read = if row.read_at.is_none() {
                format!(
                    "<form method=\"post\" action=\"/notifications/{}/read\">\
                     <button type=\"submit\" class=\"quiet\">Mark read</button></form>",
                    escape(&row.id)
                )
            } else {
                String::new()
            };
            items.push_str(&format!(
                "<div class=\"post{unread_class}\">\
                 <p>{} added a {} on \
                 <a href=\"/commitments/{}\">{}</a></p>\
                 <p class=\"meta\">{}</p>\
                 {mark_read}\
                 </div>",
                escape(&row.post_author_name),
                kind_label,
                escape(&row.commitment_id),
                escape(&row.commitment_title),
                escape(&row.created_at)
            ));
        }
        body.push_str(&format!(
            "<section class=\"surface\"><h2>Notifications</h2>{items}</section>"
        ));
    }

    Ok(Html(render::layout(
        "Notifications",
        "Your notifications",
        "New posts on commitments you follow.",
        Some(&nav),
        &body,
    )))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let db_state = state.clone();
    let row = (notification_id.to_string(), claims.sub.to_string());
    let changed = blocking(move || db_state.db.mark_notification_read(&row.0, &row.1)).await?;

    if !changed {
        debug!(
            "Notification {} not marked for user {} (wrong recipient or already read)",
            notification_id, claims.sub
        );
    }

    Ok(Redirect::to("/notifications"))
}
