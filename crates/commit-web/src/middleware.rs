use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};

use commit_types::session::Claims;

use crate::auth::AppState;

pub const SESSION_COOKIE: &str = "commit_session";

/// Validate the session cookie and stash the signed-in user on the request.
/// Browser flows get a redirect to the login page rather than a bare 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Redirect> {
    let jar = CookieJar::from_headers(req.headers());

    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_session_token(&state.session_secret, cookie.value()))
        .ok_or_else(|| Redirect::to("/"))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn decode_session_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(decode_session_token("test-secret", &token).is_none());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(decode_session_token("test-secret", "not-a-token").is_none());
    }
}
