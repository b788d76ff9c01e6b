use std::path::Path;
use std::sync::Mutex;

use chatrelay_common::{Error, Result, Role, Turn};
use rusqlite::Connection;
use rusqlite::params;
use tracing::{info, warn};

/// Append-only log of conversation turns, grouped by session.
///
/// Turns are immutable once written: there is no update or delete
/// operation. A conversation exists implicitly from its first turn.
pub trait TranscriptStore: Send + Sync {
    /// Write a new turn with a store-assigned id and timestamp. The write
    /// is durable before this returns.
    fn append(&self, session_id: &str, role: Role, content: &str) -> Result<()>;

    /// Up to `limit` most recent turns for the session, in chronological
    /// (oldest-first) order. Empty for a session with no history.
    fn recent_window(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>>;
}

/// Persistent transcript storage backed by SQLite.
pub struct SqliteTranscriptStore {
    conn: Mutex<Connection>,
}

impl SqliteTranscriptStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("opening transcript store at {}", db_path.display());
        let conn = Connection::open(db_path)
            .map_err(|e| Error::Database(format!("failed to open database: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| Error::Database(format!("failed to set pragmas: {e}")))?;

        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("failed to open in-memory database: {e}")))?;

        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS turns (
                id         TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                timestamp  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_turns_session
                ON turns(session_id, timestamp);",
        )
        .map_err(|e| Error::Database(format!("migration failed: {e}")))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("transcript store lock poisoned".to_string()))
    }
}

impl TranscriptStore for SqliteTranscriptStore {
    fn append(&self, session_id: &str, role: Role, content: &str) -> Result<()> {
        let turn = Turn::new(session_id, role, content);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO turns (id, session_id, role, content, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                turn.id,
                turn.session_id,
                turn.role.as_str(),
                turn.content,
                turn.timestamp.to_rfc3339()
            ],
        )
        .map_err(|e| Error::Database(format!("failed to append turn: {e}")))?;
        Ok(())
    }

    fn recent_window(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, session_id, role, content, timestamp
                 FROM turns
                 WHERE session_id = ?1
                 ORDER BY timestamp DESC, rowid DESC
                 LIMIT ?2",
            )
            .map_err(|e| Error::Database(format!("failed to prepare window query: {e}")))?;

        let rows = stmt
            .query_map(params![session_id, limit as i64], |row| {
                let role_raw: String = row.get(2)?;
                let timestamp_raw: String = row.get(4)?;
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    role_raw,
                    row.get::<_, String>(3)?,
                    timestamp_raw,
                ))
            })
            .map_err(|e| Error::Database(format!("failed to load turns: {e}")))?;

        let mut turns = Vec::new();
        for row in rows {
            let (id, session_id, role_raw, content, timestamp_raw) =
                row.map_err(|e| Error::Database(format!("failed to read turn row: {e}")))?;
            let role = Role::parse(&role_raw)
                .ok_or_else(|| Error::Database(format!("unknown role '{role_raw}' in turns table")))?;
            turns.push(Turn {
                id,
                session_id,
                role,
                content,
                timestamp: parse_timestamp(&timestamp_raw),
            });
        }

        // Query is DESC for efficient tail fetch; return in chronological order.
        turns.reverse();
        Ok(turns)
    }
}

fn parse_timestamp(value: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .unwrap_or_else(|e| {
            warn!(
                "failed to parse timestamp '{}': {e}, falling back to now",
                value
            );
            chrono::Utc::now()
        })
}

#[cfg(test)]
mod tests {
    use super::{SqliteTranscriptStore, TranscriptStore};
    use chatrelay_common::Role;

    #[test]
    fn append_and_recent_window_round_trip() {
        let store = SqliteTranscriptStore::in_memory().expect("in-memory store should open");
        let session_id = "session-1";

        store
            .append(session_id, Role::User, "hello")
            .expect("user turn append should succeed");
        store
            .append(session_id, Role::Assistant, "hi there")
            .expect("assistant turn append should succeed");

        let turns = store
            .recent_window(session_id, 10)
            .expect("window read should succeed");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "hi there");
    }

    #[test]
    fn recent_window_unknown_session_is_empty() {
        let store = SqliteTranscriptStore::in_memory().expect("in-memory store should open");
        let turns = store
            .recent_window("nonexistent", 6)
            .expect("window read should succeed");
        assert!(turns.is_empty());
    }

    #[test]
    fn recent_window_honors_limit_and_drops_oldest() {
        let store = SqliteTranscriptStore::in_memory().expect("in-memory store should open");

        for i in 0..7 {
            store
                .append("s1", Role::User, &format!("msg-{i}"))
                .expect("append should succeed");
        }

        let turns = store.recent_window("s1", 6).expect("window read should succeed");
        assert_eq!(turns.len(), 6);
        // The earliest turn falls out of the window; the rest come back
        // oldest-first.
        assert_eq!(turns[0].content, "msg-1");
        assert_eq!(turns[5].content, "msg-6");
    }

    #[test]
    fn recent_window_is_chronological() {
        let store = SqliteTranscriptStore::in_memory().expect("in-memory store should open");

        for i in 0..5 {
            store
                .append("s1", Role::User, &format!("msg-{i}"))
                .expect("append should succeed");
        }

        let turns = store.recent_window("s1", 10).expect("window read should succeed");
        for pair in turns.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn repeated_reads_are_identical_without_intervening_appends() {
        let store = SqliteTranscriptStore::in_memory().expect("in-memory store should open");

        store.append("s1", Role::User, "one").expect("append should succeed");
        store
            .append("s1", Role::Assistant, "two")
            .expect("append should succeed");

        let first = store.recent_window("s1", 6).expect("window read should succeed");
        let second = store.recent_window("s1", 6).expect("window read should succeed");

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.content, b.content);
            assert_eq!(a.timestamp, b.timestamp);
        }
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SqliteTranscriptStore::in_memory().expect("in-memory store should open");

        store.append("s1", Role::User, "for s1").expect("append should succeed");
        store.append("s2", Role::User, "for s2").expect("append should succeed");

        let turns = store.recent_window("s1", 6).expect("window read should succeed");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "for s1");
    }

    #[test]
    fn open_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let db_path = dir.path().join("transcripts.db");

        {
            let store = SqliteTranscriptStore::open(&db_path).expect("store should open");
            store
                .append("s1", Role::User, "durable")
                .expect("append should succeed");
        }

        let store = SqliteTranscriptStore::open(&db_path).expect("store should reopen");
        let turns = store.recent_window("s1", 6).expect("window read should succeed");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "durable");
    }
}
