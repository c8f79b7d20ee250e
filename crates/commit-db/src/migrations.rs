use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            email           TEXT NOT NULL UNIQUE,
            first_name      TEXT NOT NULL,
            last_name       TEXT NOT NULL,
            password_hash   TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS commitments (
            id              TEXT PRIMARY KEY,
            owner_user_id   TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            category        TEXT NOT NULL DEFAULT '',
            starts_on       TEXT NOT NULL,
            ends_on         TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_commitments_owner
            ON commitments(owner_user_id, created_at);

        CREATE TABLE IF NOT EXISTS requirements (
            id              TEXT PRIMARY KEY,
            commitment_id   TEXT NOT NULL REFERENCES commitments(id),
            type            TEXT NOT NULL,
            params          TEXT NOT NULL DEFAULT '{}',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_requirements_commitment
            ON requirements(commitment_id);

        CREATE TABLE IF NOT EXISTS posts (
            id              TEXT PRIMARY KEY,
            commitment_id   TEXT NOT NULL REFERENCES commitments(id),
            author_user_id  TEXT NOT NULL REFERENCES users(id),
            type            TEXT NOT NULL,
            body_text       TEXT NOT NULL DEFAULT '',
            image_url       TEXT NOT NULL DEFAULT '',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_commitment
            ON posts(commitment_id, created_at);

        CREATE TABLE IF NOT EXISTS subscriptions (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id),
            commitment_id   TEXT NOT NULL REFERENCES commitments(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, commitment_id)
        );

        CREATE INDEX IF NOT EXISTS idx_subscriptions_commitment
            ON subscriptions(commitment_id);

        CREATE TABLE IF NOT EXISTS notifications (
            id                  TEXT PRIMARY KEY,
            recipient_user_id   TEXT NOT NULL REFERENCES users(id),
            commitment_id       TEXT NOT NULL REFERENCES commitments(id),
            post_id             TEXT NOT NULL REFERENCES posts(id),
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            read_at             TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_recipient
            ON notifications(recipient_user_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
