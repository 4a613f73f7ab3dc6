use anyhow::Result;
use sqlx::Executor;
use tracing::debug;

use crate::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fee_settings (
    club_id         INTEGER PRIMARY KEY,
    monthly_amount  REAL NOT NULL,
    currency        TEXT NOT NULL,
    active_months   TEXT NOT NULL,
    is_active       BOOLEAN NOT NULL
);

CREATE TABLE IF NOT EXISTS charges (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    club_id     INTEGER NOT NULL,
    kind        TEXT NOT NULL,
    description TEXT NOT NULL,
    amount      REAL NOT NULL,
    currency    TEXT NOT NULL,
    due_date    DATE NOT NULL,
    period      TEXT,
    created_by  INTEGER NOT NULL,
    created_at  DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS charge_targets (
    charge_id   INTEGER NOT NULL REFERENCES charges(id),
    club_id     INTEGER NOT NULL,
    user_id     INTEGER NOT NULL,
    period      TEXT
);

-- The idempotency guard for fee generation: at most one
-- recurring charge per member and period.
CREATE UNIQUE INDEX IF NOT EXISTS charge_targets_period_idx
    ON charge_targets (club_id, user_id, period)
    WHERE period IS NOT NULL;

CREATE TABLE IF NOT EXISTS payments (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL,
    charge_id INTEGER REFERENCES charges(id),
    amount    REAL NOT NULL,
    paid_at   DATE NOT NULL
);
"#;

/// Install the database schema.
pub async fn install(conn: &Connection) -> Result<()> {
    let mut conn = conn.lock().await;
    (*conn).execute(SCHEMA).await?;
    debug!("installed database schema");
    Ok(())
}
