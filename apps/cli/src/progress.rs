//! Per-file progress bars on stderr.

use std::collections::HashMap;
use std::path::PathBuf;

use cloudput_upload::UploadEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;

const BAR_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:30.cyan/blue}] \
     {binary_bytes}/{binary_total_bytes} ({binary_bytes_per_sec}, {eta})";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Maps upload events onto one bar per source file.
///
/// Failures only mark the bar; the error text is reported once by the caller
/// from the upload report.
pub struct ProgressRenderer {
    multi: MultiProgress,
    bars: HashMap<PathBuf, ProgressBar>,
    style: ProgressStyle,
}

impl ProgressRenderer {
    pub fn new(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: HashMap::new(),
            style: bar_style(),
        }
    }

    pub fn handle(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::Started { source, size, .. } => {
                let bar = self.multi.add(ProgressBar::new(*size as u64));
                bar.set_style(self.style.clone());
                bar.set_message(source.display().to_string());
                self.bars.insert(source.clone(), bar);
            }
            UploadEvent::Progress {
                source,
                transferred,
                ..
            } => {
                if let Some(bar) = self.bars.get(source) {
                    bar.set_position(*transferred as u64);
                }
            }
            UploadEvent::Completed { source, metadata } => {
                if let Some(bar) = self.bars.get(source) {
                    bar.set_position(metadata.size as u64);
                    bar.finish_with_message(format!(
                        "{} -> {}",
                        source.display(),
                        metadata.display_path()
                    ));
                }
            }
            UploadEvent::Failed { source, .. } => {
                if let Some(bar) = self.bars.get(source) {
                    bar.abandon_with_message(format!("{} failed", source.display()));
                }
            }
        }
    }

    #[cfg(test)]
    fn bar(&self, source: &str) -> Option<&ProgressBar> {
        self.bars.get(&PathBuf::from(source))
    }
}

/// Draws events to stderr until every sender is gone.
pub async fn render(mut events: mpsc::Receiver<UploadEvent>) {
    let mut renderer = ProgressRenderer::new(ProgressDrawTarget::stderr());
    while let Some(event) = events.recv().await {
        renderer.handle(&event);
    }
}
