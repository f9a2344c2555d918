//! Upload orchestrator for concurrent multi-file `put`.
//!
//! Every source file gets its own task holding its own reader, session
//! state and progress counter. The orchestrator waits for all of them and
//! reports a result per file.

use std::path::PathBuf;
use std::sync::Arc;

use cloudput_protocol::{CommitInfo, FileMetadata};
use cloudput_transfer::{
    CHUNK_SIZE, ChunkReader, ProgressCallback, ProgressReader, TransferProgress,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::UploadError;
use crate::remote::StorageClient;
use crate::session::ChunkedSession;
use crate::target::open_target;
use crate::types::{FileOutcome, UploadEvent, UploadMethod, UploadReport};

/// Orchestrates uploads of one or more files in parallel.
pub struct Uploader {
    client: Arc<dyn StorageClient>,
    chunk_size: i64,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
}

impl Uploader {
    /// Creates an uploader sending every call through `client`.
    pub fn new(client: Arc<dyn StorageClient>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            client,
            chunk_size: CHUNK_SIZE,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_chunk_size(mut self, chunk_size: i64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Started, Completed and Failed are always delivered once the receiver
    /// is taken. Progress updates are sent without waiting and are dropped
    /// while the channel is full. Until the receiver is taken no events
    /// are sent.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Uploads every file in `sources`, optionally into `destination`.
    ///
    /// Files run concurrently and independently: one failure never stops
    /// the others. Fails only when `sources` is empty.
    pub async fn put(
        &self,
        sources: Vec<PathBuf>,
        destination: Option<String>,
    ) -> Result<UploadReport, UploadError> {
        if sources.is_empty() {
            return Err(UploadError::NoOperands);
        }

        let events_tx = self.events_rx.is_none().then(|| self.events_tx.clone());
        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let job = FileUpload {
                client: Arc::clone(&self.client),
                chunk_size: self.chunk_size,
                events_tx: events_tx.clone(),
                source: source.clone(),
                destination: destination.clone(),
            };
            handles.push((source, tokio::spawn(job.run())));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (source, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(source = %source.display(), error = %e, "upload task failed");
                    Err(UploadError::TaskFailed(e.to_string()))
                }
            };
            outcomes.push(FileOutcome { source, result });
        }
        Ok(UploadReport { outcomes })
    }
}

/// Context owned by one file's task.
struct FileUpload {
    client: Arc<dyn StorageClient>,
    chunk_size: i64,
    /// Present only when someone holds the receiver.
    events_tx: Option<mpsc::Sender<UploadEvent>>,
    source: PathBuf,
    destination: Option<String>,
}

impl FileUpload {
    async fn run(self) -> Result<FileMetadata, UploadError> {
        let result = self.upload().await;
        match &result {
            Ok(metadata) => {
                info!(
                    source = %self.source.display(),
                    path = %metadata.display_path(),
                    size = metadata.size,
                    "upload completed"
                );
                self.emit(UploadEvent::Completed {
                    source: self.source.clone(),
                    metadata: metadata.clone(),
                })
                .await;
            }
            Err(e) => {
                error!(source = %self.source.display(), error = %e, "upload failed");
                self.emit(UploadEvent::Failed {
                    source: self.source.clone(),
                    error: e.to_string(),
                })
                .await;
            }
        }
        result
    }

    async fn upload(&self) -> Result<FileMetadata, UploadError> {
        let (target, file) = open_target(&self.source, self.destination.as_deref()).await?;
        let method = UploadMethod::for_size(target.size_bytes, self.chunk_size);
        debug!(
            source = %self.source.display(),
            destination = %target.destination,
            size = target.size_bytes,
            ?method,
            calls = method.call_count(),
            "upload starting"
        );
        self.emit(UploadEvent::Started {
            source: self.source.clone(),
            destination: target.destination.clone(),
            size: target.size_bytes,
            method,
        })
        .await;

        let commit = CommitInfo::overwrite(target.destination, target.last_modified);
        let progress = ProgressReader::new(file, target.size_bytes, self.progress_callback());
        let mut reader = ChunkReader::new(progress, target.size_bytes);

        let metadata = match method {
            UploadMethod::Session { .. } => {
                ChunkedSession::new(self.client.as_ref(), self.chunk_size)
                    .upload(&mut reader, commit)
                    .await?
            }
            UploadMethod::SingleShot => {
                let data = reader.read_remaining().await?;
                self.client
                    .upload(commit, data)
                    .await
                    .map_err(UploadError::SingleShotUpload)?
            }
        };

        verify_content_hash(reader.into_content_hash(), &metadata)?;
        Ok(metadata)
    }

    fn progress_callback(&self) -> ProgressCallback {
        let events_tx = self.events_tx.clone();
        let source = self.source.clone();
        Arc::new(move |p: TransferProgress| {
            if let Some(tx) = &events_tx {
                let _ = tx.try_send(UploadEvent::Progress {
                    source: source.clone(),
                    transferred: p.transferred,
                    total: p.total,
                });
            }
        })
    }

    /// Delivers a lifecycle event, waiting for channel capacity.
    async fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events_tx {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(event).await;
        }
    }
}

/// Compares the local digest with the one the server reported, if any.
fn verify_content_hash(local: String, metadata: &FileMetadata) -> Result<(), UploadError> {
    match &metadata.content_hash {
        Some(remote) if !remote.eq_ignore_ascii_case(&local) => {
            Err(UploadError::ContentHashMismatch {
                local,
                remote: remote.clone(),
            })
        }
        _ => Ok(()),
    }
}
