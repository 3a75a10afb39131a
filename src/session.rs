use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::SessionRepository;
use crate::summary::SessionSummary;
use crate::timer::Lap;

pub const DEFAULT_SESSION_NAME: &str = "Track Intervals";
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A saved set of laps. Laps are copied in at save time and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub date: String,
    pub laps: Vec<Lap>,
    pub summary: SessionSummary,
}

impl Session {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed Session"
        } else {
            &self.name
        }
    }
}

/// Append-ordered archive of sessions. Every mutation is written through to
/// the repository; a failed write is logged and the in-memory change kept.
pub struct SessionStore {
    sessions: Vec<Session>,
    repository: Box<dyn SessionRepository>,
}

impl SessionStore {
    pub fn load(repository: Box<dyn SessionRepository>) -> Self {
        let sessions = match repository.load_sessions() {
            Ok(sessions) => {
                info!("loaded {} saved sessions", sessions.len());
                sessions
            }
            Err(e) => {
                warn!("failed to load sessions, starting empty: {}", e);
                vec![]
            }
        };

        Self {
            sessions,
            repository,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Archives `laps` under `name`. Nothing happens for an empty lap list.
    pub fn save(&mut self, name: &str, laps: &[Lap], summary: SessionSummary) -> Option<&Session> {
        if laps.is_empty() {
            return None;
        }

        let session = Session {
            name: name.to_string(),
            date: Local::now().format(DATE_FORMAT).to_string(),
            laps: laps.to_vec(),
            summary,
        };
        info!(
            name = session.display_name(),
            laps = session.laps.len(),
            "session saved"
        );
        self.sessions.push(session);
        self.persist();

        self.sessions.last()
    }

    /// Removes the session at `index`; out-of-range indices are ignored.
    pub fn delete(&mut self, index: usize) -> Option<Session> {
        if index >= self.sessions.len() {
            return None;
        }

        let removed = self.sessions.remove(index);
        info!(name = removed.display_name(), index, "session deleted");
        self.persist();

        Some(removed)
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save_sessions(&self.sessions) {
            warn!("failed to persist sessions: {}", e);
        }
    }
}
