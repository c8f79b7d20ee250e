use axum::{
    Extension,
    extract::{Path, State},
    response::Html,
};
use uuid::Uuid;

use commit_db::models::CommitmentRow;
use commit_types::session::Claims;

use crate::auth::AppState;
use crate::error::AppError;
use crate::render::{self, escape};
use crate::{blocking, nav_for};

pub async fn person_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let nav = nav_for(&state, &claims).await?;

    let db_state = state.clone();
    let uid = user_id.to_string();
    let data = blocking(move || {
        let Some(user) = db_state.db.get_user_by_id(&uid)? else {
            return Ok(None);
        };
        let commitments = db_state.db.commitments_by_owner(&uid)?;
        Ok(Some((user, commitments)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let (user, commitments) = data;

    let mut body = String::new();
    if commitments.is_empty() {
        body.push_str(&format!(
            "<section class=\"surface\"><h2>Commitments</h2>\
             <p class=\"hint\">{} has no commitments yet.</p></section>",
            escape(&user.first_name)
        ));
    } else {
        body.push_str(&format!(
            "<section class=\"surface\"><h2>Commitments</h2>{}</section>",
            commitment_list(&commitments)
        ));
    }
    body.push_str(&format!(
        "<section class=\"surface\">\
         <p class=\"meta\">Member since {}</p>\
         </section>",
        escape(&user.created_at)
    ));

    Ok(Html(render::layout(
        &user.display_name(),
        &user.display_name(),
        &user.email,
        Some(&nav),
        &body,
    )))
}

pub async fn explore_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Html<String>, AppError> {
    let nav = nav_for(&state, &claims).await?;

    let db_state = state.clone();
    let uid = claims.sub.to_string();
    let rows = blocking(move || db_state.db.explore_commitments(&uid)).await?;

    let mut body = String::new();
    if rows.is_empty() {
        body.push_str(
            "<section class=\"surface\">\
             <p class=\"hint\">No commitments from other people yet.</p></section>",
        );
    } else {
        let mut items = String::new();
        for (commitment, subscribed) in &rows {
            let label = if *subscribed { "Unsubscribe" } else { "Subscribe" };
            let category = if commitment.category.is_empty() {
                String::new()
            } else {
                format!(" &middot; {}", escape(&commitment.category))
            };
            items.push_str(&format!(
                "<div class=\"post\">\
                 <p><a href=\"/commitments/{id}\">{title}</a>{category}</p>\
                 <p class=\"meta\">by <a href=\"/people/{owner_id}\">{owner}</a> \
                 &middot; {starts} to {ends}</p>\
                 <form method=\"post\" action=\"/commitments/{id}/subscription\">\
                 <input type=\"hidden\" name=\"back\" value=\"explore\">\
                 <button type=\"submit\" class=\"quiet\">{label}</button>\
                 </form>\
                 </div>",
                id = escape(&commitment.id),
                title = escape(&commitment.title),
                owner_id = escape(&commitment.owner_user_id),
                owner = escape(&commitment.owner_name),
                starts = escape(&commitment.starts_on),
                ends = escape(&commitment.ends_on),
            ));
        }
        body.push_str(&format!(
            "<section class=\"surface\"><h2>All commitments</h2>{items}</section>"
        ));
    }

    Ok(Html(render::layout(
        "Explore",
        "Explore commitments",
        "Follow other people's goals and cheer them on.",
        Some(&nav),
        &body,
    )))
}

fn commitment_list(commitments: &[CommitmentRow]) -> String {
    let mut items = String::new();
    for commitment in commitments {
        let category = if commitment.category.is_empty() {
            String::new()
        } else {
            format!(" &middot; {}", escape(&commitment.category))
        };
        items.push_str(&format!(
            "<div class=\"post\">\
             <p><a href=\"/commitments/{}\">{}</a>{category}</p>\
             <p class=\"meta\">{} to {}</p>\
             </div>",
            escape(&commitment.id),
            escape(&commitment.title),
            escape(&commitment.starts_on),
            escape(&commitment.ends_on)
        ));
    }
    items
}
