pub mod auth;
pub mod commitments;
pub mod error;
pub mod middleware;
pub mod notifications;
pub mod people;
pub mod posts;
pub mod render;
pub mod subscriptions;

use commit_types::session::Claims;
use tracing::error;

use crate::auth::AppState;
use crate::error::AppError;

/// Run blocking DB work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            Err(AppError::Internal(anyhow::anyhow!("background task failed")))
        }
    }
}

/// Signed-in page chrome: who is signed in plus the unread badge count.
pub(crate) async fn nav_for(state: &AppState, claims: &Claims) -> Result<render::Nav, AppError> {
    let db_state = state.clone();
    let user_id = claims.sub.to_string();
    let unread = blocking(move || db_state.db.unread_notification_count(&user_id)).await?;
    Ok(render::Nav {
        email: claims.email.clone(),
        unread,
    })
}
