// ── Conversion export flow ──
//
// Idle -> Requesting -> Completed | Failed -> (after a window) Idle.
// A request while one is outstanding is ignored. The reset timer is
// stamped so a newer export is never reset by an older timer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use docbot_api::AdminClient;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::FeedbackWindows;
use crate::error::CoreError;

/// `conversions-export-2024-06-15.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("conversions-export-{}.csv", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    Requesting,
    Completed { path: PathBuf, bytes: u64 },
    Failed { message: String },
}

impl ExportStatus {
    pub fn is_requesting(&self) -> bool {
        matches!(self, Self::Requesting)
    }
}

/// A file written by a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Export trigger shared between UI handlers. Cheaply cloneable.
#[derive(Clone)]
pub struct ExportFlow {
    inner: Arc<ExportInner>,
}

struct ExportInner {
    client: AdminClient,
    dir: PathBuf,
    windows: FeedbackWindows,
    status: watch::Sender<ExportStatus>,
    /// Bumped by every started export; reset timers carry the value they
    /// were scheduled under.
    generation: AtomicU64,
}

impl ExportFlow {
    pub fn new(client: AdminClient, dir: impl Into<PathBuf>, windows: FeedbackWindows) -> Self {
        let (status, _) = watch::channel(ExportStatus::Idle);
        Self {
            inner: Arc::new(ExportInner {
                client,
                dir: dir.into(),
                windows,
                status,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn status(&self) -> ExportStatus {
        self.inner.status.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ExportStatus> {
        self.inner.status.subscribe()
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Download the conversion log and save it as today's export file.
    ///
    /// Returns `Ok(None)` without issuing a request when an export is
    /// already outstanding. The export runs on its own task, so dropping
    /// this future does not abandon the status in `Requesting`.
    pub async fn run(&self) -> Result<Option<ExportArtifact>, CoreError> {
        let started = self.inner.status.send_if_modified(|status| {
            if status.is_requesting() {
                false
            } else {
                *status = ExportStatus::Requesting;
                true
            }
        });
        if !started {
            debug!("export already in progress; ignoring");
            return Ok(None);
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let flow = self.clone();
        let task = tokio::spawn(async move {
            let result = flow.download().await;
            flow.finish(generation, result)
        });
        match task.await {
            Ok(result) => result.map(Some),
            Err(join) => {
                let err = CoreError::Io {
                    message: format!("export task failed: {join}"),
                };
                self.finish(generation, Err(err)).map(Some)
            }
        }
    }

    /// Publish the outcome of export `generation` and schedule the reset.
    fn finish(
        &self,
        generation: u64,
        result: Result<ExportArtifact, CoreError>,
    ) -> Result<ExportArtifact, CoreError> {
        match result {
            Ok(artifact) => {
                info!(path = %artifact.path.display(), bytes = artifact.bytes, "export written");
                self.inner.status.send_replace(ExportStatus::Completed {
                    path: artifact.path.clone(),
                    bytes: artifact.bytes,
                });
                self.schedule_reset(generation, self.inner.windows.success);
                Ok(artifact)
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.inner.status.send_replace(ExportStatus::Failed {
                    message: err.to_string(),
                });
                self.schedule_reset(generation, self.inner.windows.failure);
                Err(err)
            }
        }
    }

    async fn download(&self) -> Result<ExportArtifact, CoreError> {
        let body = self.inner.client.export_conversions().await?;
        tokio::fs::create_dir_all(&self.inner.dir).await?;
        let path = self
            .inner
            .dir
            .join(export_file_name(Local::now().date_naive()));
        tokio::fs::write(&path, &body).await?;
        Ok(ExportArtifact {
            path,
            bytes: u64::try_from(body.len()).unwrap_or(u64::MAX),
        })
    }

    fn schedule_reset(&self, generation: u64, window: Duration) {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(reset_after(inner, generation, window));
    }
}

async fn reset_after(inner: Weak<ExportInner>, generation: u64, window: Duration) {
    tokio::time::sleep(window).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if inner.generation.load(Ordering::SeqCst) != generation {
        return;
    }
    inner.status.send_if_modified(|status| {
        if status.is_requesting() || *status == ExportStatus::Idle {
            false
        } else {
            *status = ExportStatus::Idle;
            true
        }
    });
}
