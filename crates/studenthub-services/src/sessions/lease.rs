use super::store::SessionStore;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studenthub_core::SessionId;

/// Exclusive right to stream a consumed session's output.
///
/// Call [`DownloadLease::release`] once the transfer is done. A lease dropped
/// without release schedules one after the store's release grace, and the
/// sweeper reclaims any lease that outlives the lease timeout.
pub struct DownloadLease {
    id: SessionId,
    input_path: PathBuf,
    output_path: PathBuf,
    store: Arc<SessionStore>,
    released: bool,
}

impl DownloadLease {
    pub(super) fn new(
        id: SessionId,
        input_path: PathBuf,
        output_path: PathBuf,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            id,
            input_path,
            output_path,
            store,
            released: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Release the session now, deleting its files.
    ///
    /// If this future is dropped before it completes, the grace-delay
    /// fallback still runs.
    pub async fn release(mut self) {
        self.store.release(&self.id).await;
        self.released = true;
    }
}

impl fmt::Debug for DownloadLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadLease")
            .field("id", &self.id)
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for DownloadLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let store = Arc::clone(&self.store);
        let id = self.id;
        let grace = store.settings().release_grace;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(grace).await;
                    if store.release(&id).await {
                        tracing::debug!(session_id = %id, "Released dropped download lease");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %id,
                    "Download lease dropped outside a runtime; leaving it to the sweeper"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::tests::store_with;
    use super::super::store::StoreSettings;
    use super::*;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(240);

    #[tokio::test(start_paused = true)]
    async fn test_dropped_lease_releases_after_grace() {
        let (store, _, remover) = store_with(StoreSettings {
            release_grace: Duration::from_secs(1),
            lease_timeout: Duration::from_secs(300),
        });
        let ticket = store.create(PathBuf::from("/tmp/in.png"), TTL).await.unwrap();
        store
            .attach_output(&ticket.id, PathBuf::from("/tmp/out.png"))
            .await
            .unwrap();

        let lease = store.consume(&ticket.id).await.unwrap();
        drop(lease);

        // Nothing happens before the grace delay elapses
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(store.active_leases().await, 1);
        assert!(remover.removed().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.active_leases().await, 0);
        assert_eq!(remover.removal_count("/tmp/in.png"), 1);
        assert_eq!(remover.removal_count("/tmp/out.png"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_release_does_not_schedule_second_release() {
        let (store, _, remover) = store_with(StoreSettings::default());
        let ticket = store.create(PathBuf::from("/tmp/in.png"), TTL).await.unwrap();
        store
            .attach_output(&ticket.id, PathBuf::from("/tmp/out.png"))
            .await
            .unwrap();

        let lease = store.consume(&ticket.id).await.unwrap();
        assert_eq!(lease.id(), &ticket.id);
        lease.release().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(remover.removed().len(), 2);
    }
}
