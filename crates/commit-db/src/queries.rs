use crate::Database;
use crate::models::{CommitmentRow, NotificationRow, PostRow, RequirementRow, UserRow};
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, first_name, last_name, password_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, email, first_name, last_name, password_hash],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, first_name, last_name, password_hash, created_at
                     FROM users WHERE email = ?1",
                    [email],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, first_name, last_name, password_hash, created_at
                     FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(n)
        })
    }

    // -- Commitments --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_commitment(
        &self,
        id: &str,
        owner_user_id: &str,
        title: &str,
        description: &str,
        category: &str,
        starts_on: &str,
        ends_on: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO commitments (id, owner_user_id, title, description, category, starts_on, ends_on)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, owner_user_id, title, description, category, starts_on, ends_on],
            )?;
            Ok(())
        })
    }

    pub fn get_commitment(&self, id: &str) -> Result<Option<CommitmentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("{COMMITMENT_SELECT} WHERE c.id = ?1"),
                    [id],
                    commitment_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn commitments_by_owner(&self, owner_user_id: &str) -> Result<Vec<CommitmentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMITMENT_SELECT} WHERE c.owner_user_id = ?1 ORDER BY c.created_at DESC"
            ))?;
            let rows = stmt
                .query_map([owner_user_id], commitment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Everyone else's commitments, with a flag for whether the viewer is
    /// already subscribed.
    pub fn explore_commitments(&self, viewer_user_id: &str) -> Result<Vec<(CommitmentRow, bool)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.owner_user_id,
                        COALESCE(u.first_name || ' ' || u.last_name, 'unknown') AS owner_name,
                        c.title, c.description, c.category, c.starts_on, c.ends_on, c.created_at,
                        s.id IS NOT NULL AS subscribed
                 FROM commitments c
                 LEFT JOIN users u ON c.owner_user_id = u.id
                 LEFT JOIN subscriptions s
                        ON s.commitment_id = c.id AND s.user_id = ?1
                 WHERE c.owner_user_id <> ?1
                 ORDER BY c.created_at DESC",
            )?;
            let rows = stmt
                .query_map([viewer_user_id], |row| {
                    Ok((commitment_from_row(row)?, row.get::<_, bool>(9)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_commitments(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM commitments", [], |row| row.get(0))?;
            Ok(n)
        })
    }

    // -- Requirements --

    pub fn insert_requirement(
        &self,
        id: &str,
        commitment_id: &str,
        type_name: &str,
        params_json: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO requirements (id, commitment_id, type, params) VALUES (?1, ?2, ?3, ?4)",
                params![id, commitment_id, type_name, params_json],
            )?;
            Ok(())
        })
    }

    pub fn requirements_for_commitment(&self, commitment_id: &str) -> Result<Vec<RequirementRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, commitment_id, type, params, created_at
                 FROM requirements WHERE commitment_id = ?1
                 ORDER BY created_at, id",
            )?;
            let rows = stmt
                .query_map([commitment_id], |row| {
                    Ok(RequirementRow {
                        id: row.get(0)?,
                        commitment_id: row.get(1)?,
                        type_name: row.get(2)?,
                        params: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Posts --

    pub fn insert_post(
        &self,
        id: &str,
        commitment_id: &str,
        author_user_id: &str,
        type_name: &str,
        body_text: &str,
        image_url: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, commitment_id, author_user_id, type, body_text, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, commitment_id, author_user_id, type_name, body_text, image_url],
            )?;
            Ok(())
        })
    }

    pub fn posts_for_commitment(&self, commitment_id: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            // JOIN users so pages render author names without follow-up lookups
            let mut stmt = conn.prepare(
                "SELECT p.id, p.commitment_id, p.author_user_id,
                        COALESCE(u.first_name || ' ' || u.last_name, 'unknown') AS author_name,
                        p.type, p.body_text, p.image_url, p.created_at
                 FROM posts p
                 LEFT JOIN users u ON p.author_user_id = u.id
                 WHERE p.commitment_id = ?1
                 ORDER BY p.created_at DESC, p.id",
            )?;
            let rows = stmt
                .query_map([commitment_id], |row| {
                    Ok(PostRow {
                        id: row.get(0)?,
                        commitment_id: row.get(1)?,
                        author_user_id: row.get(2)?,
                        author_name: row.get(3)?,
                        type_name: row.get(4)?,
                        body_text: row.get(5)?,
                        image_url: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Subscriptions --

    /// Toggle a subscription: removes if it exists, inserts if not.
    /// Returns true when the subscription was added.
    pub fn toggle_subscription(&self, id: &str, user_id: &str, commitment_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM subscriptions WHERE user_id = ?1 AND commitment_id = ?2",
                    params![user_id, commitment_id],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute("DELETE FROM subscriptions WHERE id = ?1", [&existing_id])?;
                Ok(false)
            } else {
                conn.execute(
                    "INSERT INTO subscriptions (id, user_id, commitment_id) VALUES (?1, ?2, ?3)",
                    params![id, user_id, commitment_id],
                )?;
                Ok(true)
            }
        })
    }

    pub fn is_subscribed(&self, user_id: &str, commitment_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE user_id = ?1 AND commitment_id = ?2",
                params![user_id, commitment_id],
                |row| row.get(0),
            )?;
            Ok(n > 0)
        })
    }

    pub fn subscriber_count(&self, commitment_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE commitment_id = ?1",
                [commitment_id],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }

    // -- Notifications --

    /// Fan a new post out to the commitment's subscribers, excluding the
    /// post's author and the commitment owner. Returns how many were created.
    pub fn notify_subscribers(
        &self,
        commitment_id: &str,
        post_id: &str,
        author_user_id: &str,
        owner_user_id: &str,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM subscriptions
                 WHERE commitment_id = ?1 AND user_id <> ?2 AND user_id <> ?3",
            )?;
            let recipients = stmt
                .query_map(params![commitment_id, author_user_id, owner_user_id], |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for recipient in &recipients {
                conn.execute(
                    "INSERT INTO notifications (id, recipient_user_id, commitment_id, post_id)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![Uuid::new_v4().to_string(), recipient, commitment_id, post_id],
                )?;
            }

            Ok(recipients.len())
        })
    }

    pub fn notifications_for_user(&self, user_id: &str) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT n.id, n.commitment_id,
                        COALESCE(c.title, 'unknown') AS commitment_title,
                        COALESCE(u.first_name || ' ' || u.last_name, 'unknown') AS post_author_name,
                        COALESCE(p.type, 'check_in') AS post_type,
                        n.created_at, n.read_at
                 FROM notifications n
                 LEFT JOIN commitments c ON n.commitment_id = c.id
                 LEFT JOIN posts p ON n.post_id = p.id
                 LEFT JOIN users u ON p.author_user_id = u.id
                 WHERE n.recipient_user_id = ?1
                 ORDER BY (n.read_at IS NULL) DESC, n.created_at DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(NotificationRow {
                        id: row.get(0)?,
                        commitment_id: row.get(1)?,
                        commitment_title: row.get(2)?,
                        post_author_name: row.get(3)?,
                        post_type: row.get(4)?,
                        created_at: row.get(5)?,
                        read_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mark a notification read. Only the recipient can do it; returns false
    /// when nothing matched (wrong recipient or already read).
    pub fn mark_notification_read(&self, id: &str, recipient_user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET read_at = datetime('now')
                 WHERE id = ?1 AND recipient_user_id = ?2 AND read_at IS NULL",
                params![id, recipient_user_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn unread_notification_count(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE recipient_user_id = ?1 AND read_at IS NULL",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }
}

const COMMITMENT_SELECT: &str = "SELECT c.id, c.owner_user_id,
        COALESCE(u.first_name || ' ' || u.last_name, 'unknown') AS owner_name,
        c.title, c.description, c.category, c.starts_on, c.ends_on, c.created_at
 FROM commitments c
 LEFT JOIN users u ON c.owner_user_id = u.id";

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn commitment_from_row(row: &Row) -> rusqlite::Result<CommitmentRow> {
    Ok(CommitmentRow {
        id: row.get(0)?,
        owner_user_id: row.get(1)?,
        owner_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        starts_on: row.get(6)?,
        ends_on: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_user(db: &Database, email: &str, first: &str, last: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_user(&id, email, first, last, "hash").unwrap();
        id
    }

    fn add_commitment(db: &Database, owner: &str, title: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.insert_commitment(&id, owner, title, "desc", "Writing", "2026-01-01", "2026-01-30")
            .unwrap();
        id
    }

    #[test]
    fn test_user_round_trip() {
        let db = test_db();
        let id = add_user(&db, "ada@example.com", "Ada", "Lovelace");

        let by_email = db.get_user_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, id);
        assert_eq!(by_email.display_name(), "Ada Lovelace");

        let by_id = db.get_user_by_id(&id).unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");

        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = test_db();
        add_user(&db, "ada@example.com", "Ada", "Lovelace");
        let result = db.create_user(
            &Uuid::new_v4().to_string(),
            "ada@example.com",
            "Ada",
            "Again",
            "hash",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_commitment_join_carries_owner_name() {
        let db = test_db();
        let owner = add_user(&db, "ada@example.com", "Ada", "Lovelace");
        let cid = add_commitment(&db, &owner, "Read daily");

        let row = db.get_commitment(&cid).unwrap().unwrap();
        assert_eq!(row.owner_name, "Ada Lovelace");
        assert_eq!(row.title, "Read daily");

        let owned = db.commitments_by_owner(&owner).unwrap();
        assert_eq!(owned.len(), 1);
    }

    #[test]
    fn test_explore_excludes_own_and_flags_subscriptions() {
        let db = test_db();
        let ada = add_user(&db, "ada@example.com", "Ada", "Lovelace");
        let grace = add_user(&db, "grace@example.com", "Grace", "Hopper");
        let mine = add_commitment(&db, &ada, "Mine");
        let theirs = add_commitment(&db, &grace, "Theirs");

        db.toggle_subscription(&Uuid::new_v4().to_string(), &ada, &theirs)
            .unwrap();

        let explore = db.explore_commitments(&ada).unwrap();
        assert_eq!(explore.len(), 1);
        let (row, subscribed) = &explore[0];
        assert_eq!(row.id, theirs);
        assert!(*subscribed);
        assert!(!explore.iter().any(|(row, _)| row.id == mine));
    }

    #[test]
    fn test_subscription_toggle() {
        let db = test_db();
        let ada = add_user(&db, "ada@example.com", "Ada", "Lovelace");
        let grace = add_user(&db, "grace@example.com", "Grace", "Hopper");
        let cid = add_commitment(&db, &grace, "Theirs");

        let added = db
            .toggle_subscription(&Uuid::new_v4().to_string(), &ada, &cid)
            .unwrap();
        assert!(added);
        assert!(db.is_subscribed(&ada, &cid).unwrap());
        assert_eq!(db.subscriber_count(&cid).unwrap(), 1);

        let added = db
            .toggle_subscription(&Uuid::new_v4().to_string(), &ada, &cid)
            .unwrap();
        assert!(!added);
        assert!(!db.is_subscribed(&ada, &cid).unwrap());
        assert_eq!(db.subscriber_count(&cid).unwrap(), 0);
    }

    #[test]
    fn test_notification_fan_out_excludes_author_and_owner() {
        let db = test_db();
        let owner = add_user(&db, "owner@example.com", "Olive", "Owner");
        let commenter = add_user(&db, "commenter@example.com", "Cass", "Commenter");
        let watcher = add_user(&db, "watcher@example.com", "Wes", "Watcher");
        let cid = add_commitment(&db, &owner, "Run daily");

        // Everyone is subscribed, including (hypothetically) the owner.
        for user in [&owner, &commenter, &watcher] {
            db.toggle_subscription(&Uuid::new_v4().to_string(), user, &cid)
                .unwrap();
        }

        let post_id = Uuid::new_v4().to_string();
        db.insert_post(&post_id, &cid, &commenter, "comment", "keep going", "")
            .unwrap();
        let created = db.notify_subscribers(&cid, &post_id, &commenter, &owner).unwrap();
        assert_eq!(created, 1);

        assert_eq!(db.unread_notification_count(&watcher).unwrap(), 1);
        assert_eq!(db.unread_notification_count(&commenter).unwrap(), 0);
        assert_eq!(db.unread_notification_count(&owner).unwrap(), 0);

        let rows = db.notifications_for_user(&watcher).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].commitment_title, "Run daily");
        assert_eq!(rows[0].post_author_name, "Cass Commenter");
        assert_eq!(rows[0].post_type, "comment");
    }

    #[test]
    fn test_mark_read_only_for_recipient() {
        let db = test_db();
        let owner = add_user(&db, "owner@example.com", "Olive", "Owner");
        let author = add_user(&db, "author@example.com", "Aria", "Author");
        let watcher = add_user(&db, "watcher@example.com", "Wes", "Watcher");
        let cid = add_commitment(&db, &owner, "Run daily");
        db.toggle_subscription(&Uuid::new_v4().to_string(), &watcher, &cid)
            .unwrap();

        let post_id = Uuid::new_v4().to_string();
        db.insert_post(&post_id, &cid, &author, "comment", "hi", "").unwrap();
        db.notify_subscribers(&cid, &post_id, &author, &owner).unwrap();

        let note_id = db.notifications_for_user(&watcher).unwrap()[0].id.clone();

        assert!(!db.mark_notification_read(&note_id, &author).unwrap());
        assert_eq!(db.unread_notification_count(&watcher).unwrap(), 1);

        assert!(db.mark_notification_read(&note_id, &watcher).unwrap());
        assert_eq!(db.unread_notification_count(&watcher).unwrap(), 0);

        // Second mark is a no-op.
        assert!(!db.mark_notification_read(&note_id, &watcher).unwrap());
    }

    #[test]
    fn test_posts_join_author_name() {
        let db = test_db();
        let owner = add_user(&db, "owner@example.com", "Olive", "Owner");
        let cid = add_commitment(&db, &owner, "Run daily");
        db.insert_post(
            &Uuid::new_v4().to_string(),
            &cid,
            &owner,
            "check_in",
            "ran 5k",
            "",
        )
        .unwrap();

        let posts = db.posts_for_commitment(&cid).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author_name, "Olive Owner");
        assert_eq!(posts[0].type_name, "check_in");
    }
}
