//! In-memory session store
//!
//! Each successful login opens a workspace holding the user's scanner slot
//! and scan history. Nothing is persisted: closing the session, or stopping
//! the process, drops everything it held, including any running timeline.
//! Sessions also expire with their token; expired workspaces are dropped on
//! the next store access and by the periodic sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::logic::{AuthenticatedUser, ScanDriver, ScanError, ScanTimings};
use crate::models::{HistoryItem, ScanResult};

struct HistoryEntry {
    item: HistoryItem,
    result: Arc<ScanResult>,
}

pub struct Workspace {
    pub session_id: Uuid,
    pub user: AuthenticatedUser,
    pub scanner: ScanDriver,
    history: RwLock<Vec<HistoryEntry>>,
}

impl Workspace {
    pub fn new(session_id: Uuid, user: AuthenticatedUser, point_total: usize, timings: ScanTimings) -> Self {
        Self {
            session_id,
            user,
            scanner: ScanDriver::new(point_total, timings),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Confirm the completed scan and append it to history
    pub fn confirm_scan(&self) -> Result<(HistoryItem, Arc<ScanResult>), ScanError> {
        let result = Arc::new(self.scanner.confirm()?);
        let item = HistoryItem::from_result(&result);

        tracing::info!(
            "Scan {} confirmed for {}: {} ({} threats)",
            item.id,
            self.user.email,
            item.status,
            item.threats
        );

        self.history.write().push(HistoryEntry {
            item: item.clone(),
            result: result.clone(),
        });

        Ok((item, result))
    }

    /// History rows, newest first
    pub fn history(&self) -> Vec<HistoryItem> {
        self.history
            .read()
            .iter()
            .rev()
            .map(|entry| entry.item.clone())
            .collect()
    }

    pub fn find_result(&self, id: &str) -> Option<Arc<ScanResult>> {
        self.history
            .read()
            .iter()
            .find(|entry| entry.item.id == id)
            .map(|entry| entry.result.clone())
    }

    pub fn latest_result(&self) -> Option<Arc<ScanResult>> {
        self.history.read().last().map(|entry| entry.result.clone())
    }
}

/// How often [`spawn_sweeper`] looks for expired sessions
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

struct SessionEntry {
    workspace: Arc<Workspace>,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    point_total: usize,
    timings: ScanTimings,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl` should match the lifetime of the tokens issued for the sessions.
    pub fn new(point_total: usize, timings: ScanTimings, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            point_total,
            timings,
            ttl: ttl.min(MAX_SESSION_TTL),
        }
    }

    pub fn open(&self, user: AuthenticatedUser) -> Arc<Workspace> {
        let session_id = Uuid::new_v4();
        let workspace = Arc::new(Workspace::new(
            session_id,
            user,
            self.point_total,
            self.timings.clone(),
        ));

        let now = Instant::now();
        let mut sessions = self.sessions.write();
        sessions.retain(|_, entry| !entry.is_expired(now));
        sessions.insert(session_id, SessionEntry {
            workspace: workspace.clone(),
            expires_at: now + self.ttl,
        });
        workspace
    }

    /// Live workspace of a session. An expired session is dropped and reported as closed.
    pub fn get(&self, session_id: Uuid) -> Option<Arc<Workspace>> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(&session_id) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.workspace.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        tracing::debug!("Session {} expired", session_id);
        self.sessions.write().remove(&session_id);
        None
    }

    /// Drop a session. Returns false when it was already gone.
    pub fn close(&self, session_id: Uuid) -> bool {
        self.sessions.write().remove(&session_id).is_some()
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// Spawn the periodic sweep of expired sessions. Must run inside a tokio runtime.
pub fn spawn_sweeper(sessions: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let removed = sessions.purge_expired();
            if removed > 0 {
                tracing::info!("Swept {} expired sessions ({} active)", removed, sessions.len());
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanSource, ScanStatus};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            email: "analyst@company.io".to_string(),
            display_name: "analyst".to_string(),
            role: "Security Analyst".to_string(),
        }
    }

    #[test]
    fn test_open_and_close() {
        let store = SessionStore::new(40, ScanTimings::default(), Duration::from_secs(3600));
        assert!(store.is_empty());

        let ws = store.open(user());
        assert_eq!(store.len(), 1);
        assert!(store.get(ws.session_id).is_some());

        assert!(store.close(ws.session_id));
        assert!(!store.close(ws.session_id));
        assert!(store.get(ws.session_id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_appends_history() {
        let store = SessionStore::new(40, ScanTimings::default(), Duration::from_secs(3600));
        let ws = store.open(user());
        let mut rng = StdRng::seed_from_u64(31);

        assert!(ws.confirm_scan().is_err());

        for name in ["first.csv", "second.json"] {
            let source = ScanSource::Upload { file_name: name.to_string(), content: None };
            ws.scanner.start(source, &mut rng).unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            assert_eq!(ws.scanner.status(), ScanStatus::Completed);
            ws.confirm_scan().unwrap();
        }

        let history = ws.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].dataset, "second.json");
        assert_eq!(history[1].dataset, "first.csv");

        let latest = ws.latest_result().unwrap();
        assert_eq!(latest.file_name, "second.json");
        assert!(ws.find_result(&history[1].id).is_some());
        assert!(ws.find_result("missing").is_none());
    }

    #[test]
    fn test_zero_ttl_sessions_are_reclaimed() {
        let store = SessionStore::new(40, ScanTimings::default(), Duration::ZERO);

        let mut last = None;
        for _ in 0..1000 {
            last = Some(store.open(user()).session_id);
        }
        assert!(store.len() <= 1, "sessions held: {}", store.len());

        let last = last.unwrap();
        assert!(store.get(last).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_expires_with_ttl() {
        let store = SessionStore::new(40, ScanTimings::default(), Duration::from_secs(3600));
        let ws = store.open(user());

        tokio::time::sleep(Duration::from_secs(59 * 60)).await;
        assert!(store.get(ws.session_id).is_some());

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert!(store.get(ws.session_id).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_drops_idle_sessions() {
        let store = Arc::new(SessionStore::new(40, ScanTimings::default(), Duration::from_secs(10)));
        for _ in 0..3 {
            store.open(user());
        }

        let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.len(), 3);

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(store.len(), 0);
        sweeper.abort();
    }
}
