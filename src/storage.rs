use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::StorageBackend;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::summary::SessionSummary;
use crate::timer::Lap;

/// Where archived sessions live between runs. Saves replace the stored
/// collection wholesale.
pub trait SessionRepository {
    fn load_sessions(&self) -> Result<Vec<Session>>;
    fn save_sessions(&self, sessions: &[Session]) -> Result<()>;
}

/// Pretty-printed JSON array on disk. A missing file is an empty archive.
#[derive(Debug, Clone)]
pub struct JsonSessionRepository {
    path: PathBuf,
}

impl JsonSessionRepository {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionRepository for JsonSessionRepository {
    fn load_sessions(&self) -> Result<Vec<Session>> {
        match fs::read(&self.path).map_err(Error::from) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.is_not_found() => Ok(vec![]),
            Err(e) => Err(e),
        }
    }

    fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(sessions)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// SQLite-backed archive: one row per session plus one row per lap.
#[derive(Debug)]
pub struct SqliteSessionRepository {
    conn: Connection,
}

impl SqliteSessionRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                avg_ms REAL NOT NULL,
                best_ms INTEGER NOT NULL,
                worst_ms INTEGER NOT NULL,
                on_target_pct REAL NOT NULL,
                consistency_ms REAL NOT NULL,
                lap_count INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS laps (
                session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                lap_no INTEGER NOT NULL,
                lap_time_ms INTEGER NOT NULL,
                delta_ms INTEGER NOT NULL,
                PRIMARY KEY (session_id, lap_no)
            );
            "#,
        )?;

        Ok(Self { conn })
    }

    fn load_laps(&self, session_id: i64) -> Result<Vec<Lap>> {
        let mut stmt = self.conn.prepare(
            "SELECT lap_time_ms, delta_ms FROM laps WHERE session_id = ?1 ORDER BY lap_no",
        )?;
        let laps = stmt
            .query_map([session_id], |row| {
                Ok(Lap {
                    lap_time: row.get(0)?,
                    delta: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Lap>>>()?;
        Ok(laps)
    }
}

impl SessionRepository for SqliteSessionRepository {
    fn load_sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, date, avg_ms, best_ms, worst_ms, on_target_pct, consistency_ms, lap_count
            FROM sessions
            ORDER BY position
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let session = Session {
                    name: row.get(1)?,
                    date: row.get(2)?,
                    laps: vec![],
                    summary: SessionSummary {
                        avg: row.get(3)?,
                        best: row.get(4)?,
                        worst: row.get(5)?,
                        on_target_pct: row.get(6)?,
                        consistency: row.get(7)?,
                        laps: row.get(8)?,
                    },
                };
                Ok((id, session))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut sessions = Vec::with_capacity(rows.len());
        for (id, mut session) in rows {
            session.laps = self.load_laps(id)?;
            if session.summary.laps != 0 && session.summary.laps != session.laps.len() {
                return Err(Error::InvalidSession(format!(
                    "session {} expects {} laps, found {}",
                    id,
                    session.summary.laps,
                    session.laps.len()
                )));
            }
            sessions.push(session);
        }

        Ok(sessions)
    }

    fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM laps", [])?;
        tx.execute("DELETE FROM sessions", [])?;

        for (position, session) in sessions.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO sessions
                (position, name, date, avg_ms, best_ms, worst_ms, on_target_pct, consistency_ms, lap_count)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    position,
                    session.name,
                    session.date,
                    session.summary.avg,
                    session.summary.best,
                    session.summary.worst,
                    session.summary.on_target_pct,
                    session.summary.consistency,
                    session.summary.laps,
                ],
            )?;
            let session_id = tx.last_insert_rowid();

            for (lap_no, lap) in session.laps.iter().enumerate() {
                tx.execute(
                    "INSERT INTO laps (session_id, lap_no, lap_time_ms, delta_ms) VALUES (?1, ?2, ?3, ?4)",
                    params![session_id, lap_no, lap.lap_time, lap.delta],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

/// Keeps sessions in memory; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionRepository {
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl MemorySessionRepository {
    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }

    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn load_sessions(&self) -> Result<Vec<Session>> {
        Ok(self.snapshot())
    }

    fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        if let Ok(mut stored) = self.sessions.lock() {
            *stored = sessions.to_vec();
        }
        Ok(())
    }
}

/// Opens the archive for `backend` at `path`
pub fn open_repository<P: AsRef<Path>>(
    backend: StorageBackend,
    path: P,
) -> Result<Box<dyn SessionRepository>> {
    Ok(match backend {
        StorageBackend::Json => Box::new(JsonSessionRepository::with_path(path)),
        StorageBackend::Sqlite => Box::new(SqliteSessionRepository::open(path)?),
    })
}
