use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use commit_db::models::{CommitmentRow, PostRow, RequirementRow};
use commit_status::StatusReport;
use commit_types::forms::{NewCommitmentForm, NewRequirementForm};
use commit_types::models::{Post, PostKind, Requirement};
use commit_types::requirement::RequirementKind;
use commit_types::session::Claims;

use crate::auth::AppState;
use crate::error::AppError;
use crate::render::{self, escape};
use crate::{blocking, nav_for};

#[derive(Debug, Deserialize)]
pub struct CommitmentsQuery {
    #[serde(default)]
    pub welcome: Option<String>,
}

// -- My commitments --

pub async fn list_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CommitmentsQuery>,
) -> Result<Html<String>, AppError> {
    let notice = query.welcome.map(|_| "Welcome back! You are now signed in.");
    list_page_html(&state, &claims, &[], &NO_VALUES, notice).await
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<NewCommitmentForm>,
) -> Result<Response, AppError> {
    let (errors, dates) = validate_new_commitment(&form);
    if let Some((starts_on, ends_on)) = dates {
        let id = Uuid::new_v4().to_string();
        let db_state = state.clone();
        let row = (
            id.clone(),
            claims.sub.to_string(),
            form.title.trim().to_string(),
            form.description.trim().to_string(),
            form.category.trim().to_string(),
            starts_on.to_string(),
            ends_on.to_string(),
        );
        let created = blocking(move || {
            db_state
                .db
                .insert_commitment(&row.0, &row.1, &row.2, &row.3, &row.4, &row.5, &row.6)
        })
        .await;

        match created {
            Ok(()) => return Ok(Redirect::to(&format!("/commitments/{}", id)).into_response()),
            Err(e) => {
                warn!("Commitment insert failed: {}", e);
                let errors = vec!["Unable to create commitment. Please try again.".to_string()];
                return Ok(list_page_html(&state, &claims, &errors, &form, None)
                    .await?
                    .into_response());
            }
        }
    }

    Ok(list_page_html(&state, &claims, &errors, &form, None)
        .await?
        .into_response())
}

fn validate_new_commitment(
    form: &NewCommitmentForm,
) -> (Vec<String>, Option<(NaiveDate, NaiveDate)>) {
    let mut errors = Vec::new();

    if form.title.trim().is_empty() {
        errors.push("Please provide a title.".to_string());
    }
    if form.description.trim().is_empty() {
        errors.push("Please provide a description.".to_string());
    }

    let starts_on = parse_date(&form.starts_on);
    let ends_on = parse_date(&form.ends_on);
    match (&starts_on, &ends_on) {
        (None, _) => errors.push("Please provide a start date (YYYY-MM-DD).".to_string()),
        (_, None) => errors.push("Please provide an end date (YYYY-MM-DD).".to_string()),
        (Some(start), Some(end)) if end < start => {
            errors.push("End date must be on or after the start date.".to_string());
        }
        _ => {}
    }

    if errors.is_empty() {
        (errors, starts_on.zip(ends_on))
    } else {
        (errors, None)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// -- Detail page --

pub async fn detail_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(commitment_id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    render_detail(&state, &claims, commitment_id, &[]).await
}

pub async fn add_requirement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(commitment_id): Path<Uuid>,
    Form(form): Form<NewRequirementForm>,
) -> Result<Response, AppError> {
    let db_state = state.clone();
    let cid = commitment_id.to_string();
    let commitment = blocking(move || db_state.db.get_commitment(&cid))
        .await?
        .ok_or(AppError::NotFound)?;

    if commitment.owner_user_id != claims.sub.to_string() {
        return Err(AppError::Forbidden);
    }

    match parse_requirement_form(&form.type_name, &form.count) {
        Ok(kind) => {
            let db_state = state.clone();
            let row = (
                Uuid::new_v4().to_string(),
                commitment_id.to_string(),
                kind.type_str(),
                kind.params_json(),
            );
            blocking(move || {
                db_state
                    .db
                    .insert_requirement(&row.0, &row.1, row.2, &row.3)
            })
            .await?;
            Ok(Redirect::to(&format!("/commitments/{}", commitment_id)).into_response())
        }
        Err(errors) => Ok(render_detail(&state, &claims, commitment_id, &errors)
            .await?
            .into_response()),
    }
}

fn parse_requirement_form(type_name: &str, count: &str) -> Result<RequirementKind, Vec<String>> {
    match type_name {
        "post_frequency" => {
            let raw = count.trim();
            let count = if raw.is_empty() {
                Some(1)
            } else {
                raw.parse::<u32>().ok().filter(|n| *n >= 1)
            };
            match count {
                Some(count) => Ok(RequirementKind::PostFrequency { count }),
                None => Err(vec!["Check-in count must be at least 1.".to_string()]),
            }
        }
        "text_update" => Ok(RequirementKind::TextUpdate),
        "image_required" => Ok(RequirementKind::ImageRequired),
        _ => Err(vec!["Please choose a requirement type.".to_string()]),
    }
}

struct DetailData {
    commitment: CommitmentRow,
    requirements: Vec<RequirementRow>,
    posts: Vec<PostRow>,
    subscribed: bool,
    subscribers: i64,
    unread: i64,
}

pub(crate) async fn render_detail(
    state: &AppState,
    claims: &Claims,
    commitment_id: Uuid,
    errors: &[String],
) -> Result<Html<String>, AppError> {
    let db_state = state.clone();
    let cid = commitment_id.to_string();
    let uid = claims.sub.to_string();

    let data = blocking(move || {
        let Some(commitment) = db_state.db.get_commitment(&cid)? else {
            return Ok(None);
        };
        let requirements = db_state.db.requirements_for_commitment(&cid)?;
        let posts = db_state.db.posts_for_commitment(&cid)?;
        let subscribed = db_state.db.is_subscribed(&uid, &cid)?;
        let subscribers = db_state.db.subscriber_count(&cid)?;
        let unread = db_state.db.unread_notification_count(&uid)?;
        Ok(Some(DetailData {
            commitment,
            requirements,
            posts,
            subscribed,
            subscribers,
            unread,
        }))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let owner_id = parse_id(&data.commitment.owner_user_id, "commitment owner");
    let requirements: Vec<Requirement> = data.requirements.iter().map(typed_requirement).collect();
    let posts: Vec<Post> = data.posts.iter().map(typed_post).collect();
    let report = commit_status::evaluate(owner_id, &requirements, &posts, Utc::now().date_naive());

    let is_owner = claims.sub == owner_id;
    let nav = render::Nav {
        email: claims.email.clone(),
        unread: data.unread,
    };

    let mut body = String::new();
    body.push_str(&render::alert_errors(errors));
    body.push_str(&status_section(&report));
    body.push_str(&about_section(&data.commitment, data.subscribers));
    if is_owner {
        body.push_str(&requirement_form(commitment_id));
        body.push_str(&post_form(commitment_id, PostKind::CheckIn));
    } else {
        body.push_str(&subscribe_section(commitment_id, data.subscribed));
        body.push_str(&post_form(commitment_id, PostKind::Comment));
    }
    body.push_str(&posts_section(&data.posts));

    Ok(Html(render::layout(
        &data.commitment.title,
        &data.commitment.title,
        &data.commitment.description,
        Some(&nav),
        &body,
    )))
}

// -- Row conversions --

fn parse_id(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", context, raw, e);
        Uuid::default()
    })
}

pub(crate) fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}

fn typed_requirement(row: &RequirementRow) -> Requirement {
    Requirement {
        id: parse_id(&row.id, "requirement"),
        type_name: row.type_name.clone(),
        kind: RequirementKind::parse(&row.type_name, &row.params),
    }
}

fn typed_post(row: &PostRow) -> Post {
    let kind = PostKind::parse(&row.type_name).unwrap_or_else(|| {
        warn!("Unknown post type '{}' on post '{}'", row.type_name, row.id);
        PostKind::Comment
    });
    Post {
        id: parse_id(&row.id, "post"),
        author_user_id: parse_id(&row.author_user_id, "post author"),
        kind,
        body_text: row.body_text.clone(),
        image_url: row.image_url.clone(),
        created_at: parse_timestamp(&row.created_at, "post"),
    }
}

// -- Page bodies --

fn status_section(report: &StatusReport) -> String {
    let mut outcomes = String::new();
    for outcome in &report.outcomes {
        let (class, mark) = if outcome.passed {
            ("pass", "&#10003;")
        } else {
            ("fail", "&#10007;")
        };
        outcomes.push_str(&format!(
            "<div class=\"outcome {class}\"><span class=\"mark\">{mark}</span>\
             <span>{}</span><span class=\"meta\">{}</span></div>",
            escape(&outcome.label),
            escape(&outcome.note)
        ));
    }

    format!(
        "<section class=\"surface\">\
         <h2>Today&#39;s status</h2>\
         <p><span class=\"status-pill\">{}</span></p>\
         {outcomes}\
         </section>",
        escape(report.status.label())
    )
}

fn about_section(commitment: &CommitmentRow, subscribers: i64) -> String {
    let category = if commitment.category.is_empty() {
        String::new()
    } else {
        format!("<p><strong>Category:</strong> {}</p>", escape(&commitment.category))
    };

    format!(
        "<section class=\"surface\">\
         <h2>About this commitment</h2>\
         <p>{}</p>\
         {category}\
         <p><strong>Runs:</strong> {} to {}</p>\
         <p><strong>Owner:</strong> <a href=\"/people/{}\">{}</a></p>\
         <p class=\"meta\">{} subscriber(s)</p>\
         </section>",
        escape(&commitment.description),
        escape(&commitment.starts_on),
        escape(&commitment.ends_on),
        escape(&commitment.owner_user_id),
        escape(&commitment.owner_name),
        subscribers
    )
}

fn requirement_form(commitment_id: Uuid) -> String {
    format!(
        "<section class=\"surface\">\
         <h2>Add a requirement</h2>\
         <form method=\"post\" action=\"/commitments/{commitment_id}/requirements\">\
         <div class=\"field\"><label for=\"requirement-type\">Type</label>\
         <select id=\"requirement-type\" name=\"type\">\
         <option value=\"post_frequency\">Daily check-ins</option>\
         <option value=\"text_update\">Written update</option>\
         <option value=\"image_required\">Photo attached</option>\
         </select></div>\
         <div class=\"field\"><label for=\"requirement-count\">Check-ins per day (for daily check-ins)</label>\
         <input type=\"number\" id=\"requirement-count\" name=\"count\" min=\"1\" value=\"1\"></div>\
         <button type=\"submit\">Add requirement</button>\
         </form>\
         </section>"
    )
}

fn subscribe_section(commitment_id: Uuid, subscribed: bool) -> String {
    let (label, hint) = if subscribed {
        ("Unsubscribe", "You get a notification when something is posted here.")
    } else {
        ("Subscribe", "Subscribe to get notified about new posts.")
    };
    format!(
        "<section class=\"surface\">\
         <p class=\"hint\">{hint}</p>\
         <form method=\"post\" action=\"/commitments/{commitment_id}/subscription\">\
         <button type=\"submit\" class=\"quiet\">{label}</button>\
         </form>\
         </section>"
    )
}

fn post_form(commitment_id: Uuid, kind: PostKind) -> String {
    match kind {
        PostKind::CheckIn => format!(
            "<section class=\"surface\">\
             <h2>Post a check-in</h2>\
             <form method=\"post\" action=\"/commitments/{commitment_id}/posts\">\
             <input type=\"hidden\" name=\"type\" value=\"check_in\">\
             <div class=\"field\"><label for=\"check-in-body\">Update</label>\
             <textarea id=\"check-in-body\" name=\"body_text\" rows=\"3\"></textarea></div>\
             <div class=\"field\"><label for=\"check-in-image\">Image URL</label>\
             <input type=\"url\" id=\"check-in-image\" name=\"image_url\"></div>\
             <button type=\"submit\">Post check-in</button>\
             </form>\
             </section>"
        ),
        PostKind::Comment => format!(
            "<section class=\"surface\">\
             <h2>Leave a comment</h2>\
             <form method=\"post\" action=\"/commitments/{commitment_id}/posts\">\
             <input type=\"hidden\" name=\"type\" value=\"comment\">\
             <div class=\"field\"><label for=\"comment-body\">Comment</label>\
             <textarea id=\"comment-body\" name=\"body_text\" rows=\"3\"></textarea></div>\
             <button type=\"submit\">Post comment</button>\
             </form>\
             </section>"
        ),
    }
}

fn posts_section(posts: &[PostRow]) -> String {
    if posts.is_empty() {
        return "<section class=\"surface\"><h2>Posts</h2>\
                <p class=\"hint\">Nothing posted yet.</p></section>"
            .to_string();
    }

    let mut items = String::new();
    for post in posts {
        let kind_label = PostKind::parse(&post.type_name)
            .map(|k| k.label())
            .unwrap_or("Post");
        let image = if post.image_url.trim().is_empty() {
            String::new()
        } else {
            format!("<img src=\"{}\" alt=\"attached image\">", escape(&post.image_url))
        };
        let body = if post.body_text.trim().is_empty() {
            String::new()
        } else {
            format!("<p>{}</p>", escape(&post.body_text))
        };
        items.push_str(&format!(
            "<div class=\"post\">\
             <p class=\"meta\">{kind_label} by <a href=\"/people/{}\">{}</a> at {}</p>\
             {body}{image}\
             </div>",
            escape(&post.author_user_id),
            escape(&post.author_name),
            escape(&post.created_at)
        ));
    }

    format!("<section class=\"surface\"><h2>Posts</h2>{items}</section>")
}

const NO_VALUES: NewCommitmentForm = NewCommitmentForm {
    title: String::new(),
    description: String::new(),
    category: String::new(),
    starts_on: String::new(),
    ends_on: String::new(),
};

async fn list_page_html(
    state: &AppState,
    claims: &Claims,
    errors: &[String],
    values: &NewCommitmentForm,
    notice: Option<&str>,
) -> Result<Html<String>, AppError> {
    let nav = nav_for(state, claims).await?;
    let db_state = state.clone();
    let uid = claims.sub.to_string();
    let commitments = blocking(move || db_state.db.commitments_by_owner(&uid)).await?;

    let mut body = String::new();
    if let Some(notice) = notice {
        body.push_str(&render::alert_success(notice));
    }
    body.push_str(&render::alert_errors(errors));

    if commitments.is_empty() {
        body.push_str(
            "<section class=\"surface\"><h2>Your commitments</h2>\
             <p class=\"hint\">You have no commitments yet. Create one below.</p></section>",
        );
    } else {
        let mut items = String::new();
        for commitment in &commitments {
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
        body.push_str(&format!(
            "<section class=\"surface\"><h2>Your commitments</h2>{items}</section>"
        ));
    }

    body.push_str(&format!(
        "<section class=\"surface\">\
         <h2>Start a new commitment</h2>\
         <form method=\"post\" action=\"/commitments\">\
         <div class=\"field\"><label for=\"commitment-title\">Title</label>\
         <input type=\"text\" id=\"commitment-title\" name=\"title\" value=\"{}\" required></div>\
         <div class=\"field\"><label for=\"commitment-description\">Description</label>\
         <textarea id=\"commitment-description\" name=\"description\" rows=\"3\" required>{}</textarea></div>\
         <div class=\"field\"><label for=\"commitment-category\">Category</label>\
         <input type=\"text\" id=\"commitment-category\" name=\"category\" value=\"{}\"></div>\
         <div class=\"field\"><label for=\"commitment-starts\">Start date</label>\
         <input type=\"date\" id=\"commitment-starts\" name=\"starts_on\" value=\"{}\" required></div>\
         <div class=\"field\"><label for=\"commitment-ends\">End date</label>\
         <input type=\"date\" id=\"commitment-ends\" name=\"ends_on\" value=\"{}\" required></div>\
         <button type=\"submit\">Create commitment</button>\
         </form>\
         </section>",
        escape(&values.title),
        escape(&values.description),
        escape(&values.category),
        escape(&values.starts_on),
        escape(&values.ends_on)
    ));

    Ok(Html(render::layout(
        "My commitments",
        "Your commitments",
        "Track your goals and keep the streaks alive.",
        Some(&nav),
        &body,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, starts: &str, ends: &str) -> NewCommitmentForm {
        NewCommitmentForm {
            title: title.to_string(),
            description: "desc".to_string(),
            category: String::new(),
            starts_on: starts.to_string(),
            ends_on: ends.to_string(),
        }
    }

    #[test]
    fn test_validate_new_commitment_happy_path() {
        let (errors, dates) = validate_new_commitment(&form("Run", "2026-01-01", "2026-01-30"));
        assert!(errors.is_empty());
        let (start, end) = dates.unwrap();
        assert_eq!(start.to_string(), "2026-01-01");
        assert_eq!(end.to_string(), "2026-01-30");
    }

    #[test]
    fn test_validate_new_commitment_rejects_bad_input() {
        let (errors, dates) = validate_new_commitment(&form("", "nope", "2026-01-30"));
        assert!(dates.is_none());
        assert!(errors.contains(&"Please provide a title.".to_string()));
        assert!(errors.contains(&"Please provide a start date (YYYY-MM-DD).".to_string()));

        let (errors, dates) = validate_new_commitment(&form("Run", "2026-02-01", "2026-01-01"));
        assert!(dates.is_none());
        assert_eq!(
            errors,
            vec!["End date must be on or after the start date.".to_string()]
        );
    }

    #[test]
    fn test_parse_requirement_form() {
        assert_eq!(
            parse_requirement_form("post_frequency", "3"),
            Ok(RequirementKind::PostFrequency { count: 3 })
        );
        assert_eq!(
            parse_requirement_form("post_frequency", ""),
            Ok(RequirementKind::PostFrequency { count: 1 })
        );
        assert_eq!(
            parse_requirement_form("post_frequency", "0"),
            Err(vec!["Check-in count must be at least 1.".to_string()])
        );
        assert_eq!(
            parse_requirement_form("text_update", ""),
            Ok(RequirementKind::TextUpdate)
        );
        assert_eq!(
            parse_requirement_form("step_count", ""),
            Err(vec!["Please choose a requirement type.".to_string()])
        );
    }

    #[test]
    fn test_parse_timestamp_handles_sqlite_format() {
        let ts = parse_timestamp("2026-03-14 09:30:00", "post");
        assert_eq!(ts.date_naive().to_string(), "2026-03-14");

        let ts = parse_timestamp("2026-03-14T09:30:00Z", "post");
        assert_eq!(ts.date_naive().to_string(), "2026-03-14");
    }
}
