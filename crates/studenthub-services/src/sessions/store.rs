use super::error::SessionError;
use super::lease::DownloadLease;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use studenthub_core::{ArtifactSession, Clock, SessionId, SessionTicket};
use studenthub_storage::FileRemover;
use tokio::sync::Mutex;

const DEFAULT_RELEASE_GRACE: Duration = Duration::from_secs(1);
const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(300);

/// Timings for the download half of the session lifecycle
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    /// Delay before a dropped, unreleased lease is released
    pub release_grace: Duration,
    /// Age after which the sweeper reclaims a lease that was never released
    pub lease_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            release_grace: DEFAULT_RELEASE_GRACE,
            lease_timeout: DEFAULT_LEASE_TIMEOUT,
        }
    }
}

/// Outcome of one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_sessions: usize,
    pub stale_leases: usize,
    pub files_deleted: usize,
    pub deletion_failures: usize,
}

impl SweepReport {
    pub fn evicted(&self) -> usize {
        self.expired_sessions + self.stale_leases
    }
}

/// A consumed session whose files are still being streamed
#[derive(Debug)]
struct Lease {
    session: ArtifactSession,
    leased_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, ArtifactSession>,
    leases: HashMap<SessionId, Lease>,
}

impl Inner {
    fn path_in_use(&self, path: &Path) -> bool {
        self.sessions.values().any(|s| s.references(path))
            || self.leases.values().any(|l| l.session.references(path))
    }
}

/// Ephemeral artifact session store.
///
/// Records live behind one mutex. Evictions take the record out under the lock
/// and delete its files after the lock is dropped, so whoever removes the
/// record is the only one that deletes its files.
pub struct SessionStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    remover: Arc<dyn FileRemover>,
    settings: StoreSettings,
}

impl SessionStore {
    pub fn new(
        clock: Arc<dyn Clock>,
        remover: Arc<dyn FileRemover>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock,
            remover,
            settings,
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register an uploaded input and start its TTL.
    #[tracing::instrument(skip(self, input_path), fields(input_path = %input_path.display()))]
    pub async fn create(
        &self,
        input_path: PathBuf,
        ttl: Duration,
    ) -> Result<SessionTicket, SessionError> {
        if ttl.is_zero() {
            return Err(SessionError::InvalidTtl);
        }
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| SessionError::InvalidTtl)?;

        let now = self.clock.now();
        let expires_at = now.checked_add_signed(ttl).ok_or(SessionError::InvalidTtl)?;

        let mut inner = self.inner.lock().await;
        if inner.path_in_use(&input_path) {
            return Err(SessionError::PathInUse(input_path));
        }

        let mut id = SessionId::generate();
        while inner.sessions.contains_key(&id) || inner.leases.contains_key(&id) {
            id = SessionId::generate();
        }

        inner
            .sessions
            .insert(id, ArtifactSession::new(id, input_path, now, expires_at));
        drop(inner);

        tracing::debug!(session_id = %id, expires_at = %expires_at, "Session created");

        Ok(SessionTicket { id, expires_at })
    }

    /// Attach the produced artifact to a pending session.
    ///
    /// The store owns `output_path` only when this returns `Ok`; on error the
    /// caller is responsible for discarding the file.
    #[tracing::instrument(skip(self, id, output_path), fields(session_id = %id, output_path = %output_path.display()))]
    pub async fn attach_output(
        &self,
        id: &SessionId,
        output_path: PathBuf,
    ) -> Result<(), SessionError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;

        let expired = match inner.sessions.get(id) {
            None => return Err(SessionError::NotFound(*id)),
            Some(session) => session.is_expired_at(now),
        };
        if expired {
            let evicted = inner.sessions.remove(id);
            drop(inner);
            if let Some(session) = evicted {
                self.delete_files(&session).await;
            }
            return Err(SessionError::Expired(*id));
        }

        let owned_elsewhere = inner
            .sessions
            .values()
            .any(|s| s.id != *id && s.references(&output_path))
            || inner
                .leases
                .values()
                .any(|l| l.session.references(&output_path));
        if owned_elsewhere {
            return Err(SessionError::PathInUse(output_path));
        }

        let session = inner
            .sessions
            .get_mut(id)
            .ok_or(SessionError::NotFound(*id))?;
        if session.input_path == output_path {
            return Err(SessionError::PathInUse(output_path));
        }
        let replaced = session
            .output_path
            .replace(output_path)
            .filter(|previous| Some(previous) != session.output_path.as_ref());
        session.failure = None;
        drop(inner);

        if let Some(previous) = replaced {
            self.remove_path(id, &previous).await;
        }

        tracing::debug!("Output attached");
        Ok(())
    }

    /// Record that the transformation for a pending session failed.
    ///
    /// Nothing is deleted here; the input stays until release or expiry.
    #[tracing::instrument(skip(self, id), fields(session_id = %id))]
    pub async fn fail(&self, id: &SessionId, reason: String) -> Result<(), SessionError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;

        let expired = match inner.sessions.get(id) {
            None => return Err(SessionError::NotFound(*id)),
            Some(session) => session.is_expired_at(now),
        };
        if expired {
            let evicted = inner.sessions.remove(id);
            drop(inner);
            if let Some(session) = evicted {
                self.delete_files(&session).await;
            }
            return Err(SessionError::Expired(*id));
        }

        if let Some(session) = inner.sessions.get_mut(id) {
            session.failure = Some(reason);
        }
        Ok(())
    }

    /// Look a session up, evicting it if its TTL has elapsed.
    pub async fn get(&self, id: &SessionId) -> Result<ArtifactSession, SessionError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;

        let expired = match inner.sessions.get(id) {
            None => return Err(SessionError::NotFound(*id)),
            Some(session) => session.is_expired_at(now),
        };
        if !expired {
            return inner
                .sessions
                .get(id)
                .cloned()
                .ok_or(SessionError::NotFound(*id));
        }

        let evicted = inner.sessions.remove(id);
        drop(inner);
        if let Some(session) = evicted {
            tracing::debug!(session_id = %id, "Session expired on lookup");
            self.delete_files(&session).await;
        }
        Err(SessionError::Expired(*id))
    }

    /// First half of the download protocol.
    ///
    /// On success the session stops being addressable and its files stay on
    /// disk until the returned lease is released.
    #[tracing::instrument(skip(self, id), fields(session_id = %id))]
    pub async fn consume(self: &Arc<Self>, id: &SessionId) -> Result<DownloadLease, SessionError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().await;

        let session = match inner.sessions.get(id) {
            None => return Err(SessionError::NotFound(*id)),
            Some(session) => session,
        };

        if session.is_expired_at(now) {
            let evicted = inner.sessions.remove(id);
            drop(inner);
            if let Some(session) = evicted {
                self.delete_files(&session).await;
            }
            return Err(SessionError::Expired(*id));
        }
        if let Some(reason) = &session.failure {
            return Err(SessionError::Failed {
                id: *id,
                reason: reason.clone(),
            });
        }
        let output_path = match &session.output_path {
            Some(path) => path.clone(),
            None => return Err(SessionError::NoOutput(*id)),
        };

        let session = inner
            .sessions
            .remove(id)
            .ok_or(SessionError::NotFound(*id))?;
        let input_path = session.input_path.clone();
        inner.leases.insert(
            *id,
            Lease {
                session,
                leased_at: now,
            },
        );
        drop(inner);

        tracing::debug!("Session leased for download");

        Ok(DownloadLease::new(
            *id,
            input_path,
            output_path,
            Arc::clone(self),
        ))
    }

    /// Second half of the download protocol: forget the session and delete
    /// its files.
    ///
    /// Works on a leased or a plain session. Returns `false` when the id is
    /// unknown, which is not an error.
    #[tracing::instrument(skip(self, id), fields(session_id = %id))]
    pub async fn release(&self, id: &SessionId) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = match inner.leases.remove(id) {
            Some(lease) => Some(lease.session),
            None => inner.sessions.remove(id),
        };
        drop(inner);

        match removed {
            Some(session) => {
                self.delete_files(&session).await;
                tracing::debug!("Session released");
                true
            }
            None => false,
        }
    }

    /// Evict every expired session and every lease older than the lease
    /// timeout.
    pub async fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let lease_timeout =
            chrono::Duration::from_std(self.settings.lease_timeout).unwrap_or(chrono::Duration::MAX);

        let mut inner = self.inner.lock().await;

        let expired_ids: Vec<SessionId> = inner
            .sessions
            .iter()
            .filter(|(_, s)| s.is_expired_at(now))
            .map(|(id, _)| *id)
            .collect();
        let expired: Vec<ArtifactSession> = expired_ids
            .iter()
            .filter_map(|id| inner.sessions.remove(id))
            .collect();

        let stale_ids: Vec<SessionId> = inner
            .leases
            .iter()
            .filter(|(_, l)| {
                l.leased_at
                    .checked_add_signed(lease_timeout)
                    .map_or(false, |deadline| now >= deadline)
            })
            .map(|(id, _)| *id)
            .collect();
        let stale: Vec<ArtifactSession> = stale_ids
            .iter()
            .filter_map(|id| inner.leases.remove(id).map(|l| l.session))
            .collect();
        drop(inner);

        let mut report = SweepReport {
            expired_sessions: expired.len(),
            stale_leases: stale.len(),
            ..SweepReport::default()
        };

        for session in stale.iter() {
            tracing::warn!(session_id = %session.id, "Reclaiming download lease that was never released");
        }

        for session in expired.iter().chain(stale.iter()) {
            let (deleted, failed) = self.delete_files(session).await;
            report.files_deleted += deleted;
            report.deletion_failures += failed;
        }

        report
    }

    /// Number of addressable sessions
    pub async fn active_sessions(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    /// Number of sessions currently being downloaded
    pub async fn active_leases(&self) -> usize {
        self.inner.lock().await.leases.len()
    }

    /// Delete every file owned by an already-removed session.
    ///
    /// Failures are logged and counted, never returned.
    async fn delete_files(&self, session: &ArtifactSession) -> (usize, usize) {
        let mut deleted = 0;
        let mut failed = 0;

        for path in session.owned_paths() {
            if self.remove_path(&session.id, &path).await {
                deleted += 1;
            } else {
                failed += 1;
            }
        }

        (deleted, failed)
    }

    async fn remove_path(&self, id: &SessionId, path: &Path) -> bool {
        match self.remover.remove(path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    session_id = %id,
                    path = %path.display(),
                    error = %e,
                    "Failed to delete session file"
                );
                false
            }
        }
    }
}
