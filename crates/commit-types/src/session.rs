use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried in the signed session cookie. Canonical definition lives
/// here so the web handlers and the middleware share one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub exp: usize,
}

impl Claims {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
