/// Database row types — these map directly to SQLite rows.
/// Display names are JOINed in so pages render without follow-up lookups.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserRow {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub struct CommitmentRow {
    pub id: String,
    pub owner_user_id: String,
    pub owner_name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub starts_on: String,
    pub ends_on: String,
    pub created_at: String,
}

pub struct RequirementRow {
    pub id: String,
    pub commitment_id: String,
    pub type_name: String,
    pub params: String,
    pub created_at: String,
}

pub struct PostRow {
    pub id: String,
    pub commitment_id: String,
    pub author_user_id: String,
    pub author_name: String,
    pub type_name: String,
    pub body_text: String,
    pub image_url: String,
    pub created_at: String,
}

pub struct NotificationRow {
    pub id: String,
    pub commitment_id: String,
    pub commitment_title: String,
    pub post_author_name: String,
    pub post_type: String,
    pub created_at: String,
    pub read_at: Option<String>,
}
