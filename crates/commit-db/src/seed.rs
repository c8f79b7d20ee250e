use anyhow::Result;
use chrono::{Days, Utc};
use tracing::info;
use uuid::Uuid;

use crate::Database;

pub const DEMO_OWNER_EMAIL: &str = "demo_owner@commit.local";
pub const DEMO_SUPPORTER_EMAIL: &str = "demo_supporter@commit.local";

/// First-run demo data: two demo accounts plus a sample commitment so a fresh
/// install has something on screen. No-op once real rows exist.
pub fn ensure_demo_data(db: &Database, demo_password_hash: &str) -> Result<()> {
    if db.count_users()? == 0 {
        db.create_user(
            &Uuid::new_v4().to_string(),
            DEMO_OWNER_EMAIL,
            "Demo",
            "Owner",
            demo_password_hash,
        )?;
        db.create_user(
            &Uuid::new_v4().to_string(),
            DEMO_SUPPORTER_EMAIL,
            "Demo",
            "Supporter",
            demo_password_hash,
        )?;
        info!("Seeded demo users");
    }

    if db.count_commitments()? == 0 {
        let Some(owner) = db.get_user_by_email(DEMO_OWNER_EMAIL)? else {
            return Ok(());
        };

        let starts_on = Utc::now().date_naive();
        let ends_on = starts_on + Days::new(29);

        let commitment_id = Uuid::new_v4().to_string();
        db.insert_commitment(
            &commitment_id,
            &owner.id,
            "30-Day Writing Streak",
            "Post at least one daily check-in with a short update about writing progress.",
            "Writing",
            &starts_on.to_string(),
            &ends_on.to_string(),
        )?;

        let requirements = [
            ("post_frequency", r#"{"count":1}"#),
            ("text_update", "{}"),
            ("image_required", "{}"),
        ];
        for (type_name, params) in requirements {
            db.insert_requirement(&Uuid::new_v4().to_string(), &commitment_id, type_name, params)?;
        }

        db.insert_post(
            &Uuid::new_v4().to_string(),
            &commitment_id,
            &owner.id,
            "check_in",
            "Day one: drafted 500 words.",
            "https://placehold.co/600x400",
        )?;

        info!("Seeded demo commitment");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        ensure_demo_data(&db, "hash").unwrap();
        assert_eq!(db.count_users().unwrap(), 2);
        assert_eq!(db.count_commitments().unwrap(), 1);

        ensure_demo_data(&db, "hash").unwrap();
        assert_eq!(db.count_users().unwrap(), 2);
        assert_eq!(db.count_commitments().unwrap(), 1);

        let owner = db.get_user_by_email(DEMO_OWNER_EMAIL).unwrap().unwrap();
        let commitments = db.commitments_by_owner(&owner.id).unwrap();
        assert_eq!(commitments.len(), 1);

        let requirements = db
            .requirements_for_commitment(&commitments[0].id)
            .unwrap();
        assert_eq!(requirements.len(), 3);

        let posts = db.posts_for_commitment(&commitments[0].id).unwrap();
        assert_eq!(posts.len(), 1);
    }
}
