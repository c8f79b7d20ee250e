use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use commit_db::Database;
use commit_db::models::UserRow;
use commit_types::forms::{LoginForm, RegisterForm};
use commit_types::session::Claims;

use crate::error::AppError;
use crate::middleware::SESSION_COOKIE;
use crate::{blocking, render};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
}

// -- Pages --

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default)]
    pub registered: Option<String>,
    #[serde(default)]
    pub signed_out: Option<String>,
}

pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let mut notices = Vec::new();
    if query.registered.is_some() {
        notices.push("Account created! You can now log in.");
    }
    if query.signed_out.is_some() {
        notices.push("You have been signed out.");
    }
    login_page_html("", &[], &notices)
}

pub async fn register_page() -> Html<String> {
    register_page_html("", "", "", &[])
}

// -- Form handlers --

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();

    let errors = validate_login(&email, &form.password);
    if !errors.is_empty() {
        return Ok(login_page_html(&email, &errors, &[]).into_response());
    }

    let db_state = state.clone();
    let lookup_email = email.clone();
    let user = blocking(move || db_state.db.get_user_by_email(&lookup_email)).await?;

    let Some(user) = user else {
        let errors = vec!["Invalid email or password.".to_string()];
        return Ok(login_page_html(&email, &errors, &[]).into_response());
    };

    if !verify_password(&form.password, &user.password_hash) {
        let errors = vec!["Invalid email or password.".to_string()];
        return Ok(login_page_html(&email, &errors, &[]).into_response());
    }

    let token = create_session_token(&state.session_secret, &user)?;
    let cookie = Cookie::build((SESSION_COOKIE, token)).path("/").http_only(true);

    Ok((jar.add(cookie), Redirect::to("/commitments?welcome=1")).into_response())
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_string();
    let first_name = form.first_name.trim().to_string();
    let last_name = form.last_name.trim().to_string();

    let mut errors = validate_registration(&email, &first_name, &last_name, &form.password);

    if errors.is_empty() {
        let db_state = state.clone();
        let lookup_email = email.clone();
        let existing = blocking(move || db_state.db.get_user_by_email(&lookup_email)).await?;
        if existing.is_some() {
            errors.push("An account with that email already exists.".to_string());
        }
    }

    if errors.is_empty() {
        let password_hash = hash_password(&form.password)?;
        let db_state = state.clone();
        let row = (
            Uuid::new_v4().to_string(),
            email.clone(),
            first_name.clone(),
            last_name.clone(),
        );
        let created = blocking(move || {
            db_state
                .db
                .create_user(&row.0, &row.1, &row.2, &row.3, &password_hash)
        })
        .await;

        match created {
            Ok(()) => return Ok(Redirect::to("/?registered=1").into_response()),
            Err(e) => {
                warn!("Registration insert failed for {}: {}", email, e);
                errors.push("Unable to create account. Please try again.".to_string());
            }
        }
    }

    Ok(register_page_html(&email, &first_name, &last_name, &errors).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Redirect::to("/?signed_out=1"))
}

// -- Validation --

fn validate_login(email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if email.is_empty() || !is_valid_email(email) {
        errors.push("Please provide a valid email address.".to_string());
    }
    if password.is_empty() {
        errors.push("Please enter your password.".to_string());
    }
    errors
}

fn validate_registration(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Vec<String> {
    let mut errors = Vec::new();
    if email.is_empty() || !is_valid_email(email) {
        errors.push("Please provide a valid email address.".to_string());
    }
    if first_name.is_empty() {
        errors.push("Please provide your first name.".to_string());
    }
    if last_name.is_empty() {
        errors.push("Please provide your last name.".to_string());
    }
    if password.len() < 8 {
        errors.push("Password must be at least 8 characters.".to_string());
    }
    errors
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// -- Passwords and sessions --

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn create_session_token(secret: &str, user: &UserRow) -> anyhow::Result<String> {
    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("Corrupt user id '{}': {}", user.id, e))?;

    let claims = Claims {
        sub: user_id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

// -- Page bodies --

fn login_page_html(email: &str, errors: &[String], notices: &[&str]) -> Html<String> {
    let mut body = String::new();
    for notice in notices {
        body.push_str(&render::alert_success(notice));
    }
    body.push_str(&render::alert_errors(errors));
    body.push_str(&format!(
        "<section class=\"surface\">\
         <h2>Log in</h2>\
         <p class=\"hint\">Sign in to keep your commitments on track.</p>\
         <form method=\"post\" action=\"/login\">\
         <div class=\"field\"><label for=\"login-email\">Email</label>\
         <input type=\"email\" id=\"login-email\" name=\"email\" value=\"{}\" required></div>\
         <div class=\"field\"><label for=\"login-password\">Password</label>\
         <input type=\"password\" id=\"login-password\" name=\"password\" required></div>\
         <button type=\"submit\">Log in</button>\
         </form>\
         <div class=\"divider\"></div>\
         <p class=\"hint\">New here? <a href=\"/register\">Create an account</a>.</p>\
         </section>",
        render::escape(email)
    ));

    Html(render::layout(
        "Login",
        "Welcome back",
        "Sign in to see your commitments.",
        None,
        &body,
    ))
}

fn register_page_html(
    email: &str,
    first_name: &str,
    last_name: &str,
    errors: &[String],
) -> Html<String> {
    let mut body = String::new();
    body.push_str(&render::alert_errors(errors));
    body.push_str(&format!(
        "<section class=\"surface\">\
         <h2>Register</h2>\
         <p class=\"hint\">Create your account to get started.</p>\
         <form method=\"post\" action=\"/register\">\
         <div class=\"field\"><label for=\"register-email\">Email</label>\
         <input type=\"email\" id=\"register-email\" name=\"email\" value=\"{}\" required></div>\
         <div class=\"field\"><label for=\"register-first-name\">First name</label>\
         <input type=\"text\" id=\"register-first-name\" name=\"first_name\" value=\"{}\" required></div>\
         <div class=\"field\"><label for=\"register-last-name\">Last name</label>\
         <input type=\"text\" id=\"register-last-name\" name=\"last_name\" value=\"{}\" required></div>\
         <div class=\"field\"><label for=\"register-password\">Password</label>\
         <input type=\"password\" id=\"register-password\" name=\"password\" minlength=\"8\" required></div>\
         <button type=\"submit\">Create account</button>\
         </form>\
         <div class=\"divider\"></div>\
         <p class=\"hint\">Already have an account? <a href=\"/\">Log in here</a>.</p>\
         </section>",
        render::escape(email),
        render::escape(first_name),
        render::escape(last_name)
    ));

    Html(render::layout(
        "Register",
        "Create your account",
        "Join with a new email and password.",
        None,
        &body,
    ))
}
