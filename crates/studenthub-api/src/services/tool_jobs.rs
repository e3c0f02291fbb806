//! Background execution of file tools against artifact sessions
//!
//! A submission stores the input, opens a session and returns its ticket right
//! away. The transformation then runs on the blocking pool and its result is
//! either attached to the session or recorded as a failure.

use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use studenthub_core::{AppError, SessionId, SessionTicket};
use studenthub_processing::{ToolJob, ToolOutput};
use studenthub_services::{ArtifactStorage, SessionStore};
use studenthub_storage::keys;

#[derive(Clone)]
pub struct ToolJobRunner {
    store: Arc<SessionStore>,
    storage: Arc<dyn ArtifactStorage>,
    ttl: Duration,
}

impl ToolJobRunner {
    pub fn new(store: Arc<SessionStore>, storage: Arc<dyn ArtifactStorage>, ttl: Duration) -> Self {
        Self {
            store,
            storage,
            ttl,
        }
    }

    /// Persist `input`, open a session for it and start `job` in the background
    #[tracing::instrument(
        skip(self, input, job),
        fields(job = job.name(), input_size = input.len(), session_id = tracing::field::Empty)
    )]
    pub async fn submit(
        &self,
        input: Bytes,
        extension: &str,
        job: ToolJob,
    ) -> Result<SessionTicket, AppError> {
        let input_path = self
            .storage
            .write(&keys::upload_key(extension), input)
            .await?;

        let ticket = match self.store.create(input_path.clone(), self.ttl).await {
            Ok(ticket) => ticket,
            Err(e) => {
                self.discard(&input_path).await;
                return Err(e.into());
            }
        };

        tracing::Span::current().record("session_id", tracing::field::display(ticket.id));
        tracing::info!(expires_at = %ticket.expires_at, "Tool job accepted");

        let runner = self.clone();
        tokio::spawn(async move {
            runner.execute(ticket.id, input_path, job).await;
        });

        Ok(ticket)
    }

    #[tracing::instrument(skip(self, input_path, job), fields(session_id = %id, job = job.name()))]
    async fn execute(&self, id: SessionId, input_path: PathBuf, job: ToolJob) {
        let start = Instant::now();

        let input = match self.storage.read(&input_path).await {
            Ok(input) => input,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read tool input");
                self.record_failure(&id, "The uploaded file could not be read".to_string())
                    .await;
                return;
            }
        };

        let result = tokio::task::spawn_blocking(move || job.run(&input)).await;

        match result {
            Ok(Ok(output)) => {
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                match self.store_output(&id, output).await {
                    Ok(()) => tracing::info!(duration_ms, "Tool job completed"),
                    Err(e) => tracing::warn!(error = %e, "Tool output was not attached"),
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Tool job failed");
                self.record_failure(&id, e.user_message()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Tool job panicked");
                self.record_failure(&id, "Processing crashed".to_string()).await;
            }
        }
    }

    /// Write the output and hand it to the session. The file is removed again
    /// if the session is gone by now, since nothing else would own it.
    async fn store_output(&self, id: &SessionId, output: ToolOutput) -> Result<(), AppError> {
        let output_path = self
            .storage
            .write(&keys::output_key(output.extension), output.data)
            .await?;

        if let Err(e) = self.store.attach_output(id, output_path.clone()).await {
            self.discard(&output_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn record_failure(&self, id: &SessionId, reason: String) {
        if let Err(e) = self.store.fail(id, reason).await {
            tracing::debug!(error = %e, "Could not record tool failure");
        }
    }

    async fn discard(&self, path: &std::path::Path) {
        if let Err(e) = self.storage.remove(path).await {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove unowned file");
        }
    }
}
