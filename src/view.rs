//! Progress UI (per-file bars) for download runs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use mediafetch_core::{ProgressSample, ProgressSink};

/// Renders one progress bar per task and interleaves status lines above
/// them.
///
/// Bars are created lazily on the first update for a task, so tasks that
/// settle during admission never flash an empty bar.
pub struct ConsoleSink {
    multi: MultiProgress,
    bars: Mutex<HashMap<usize, ProgressBar>>,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn bar_for(&self, task_id: usize) -> ProgressBar {
        let mut bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        bars.entry(task_id)
            .or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new(100));
                bar.set_style(
                    ProgressStyle::with_template("{msg:40!} [{bar:40}] {pos:>3}%")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar
            })
            .clone()
    }
}

#[async_trait]
impl ProgressSink for ConsoleSink {
    async fn progress(&self, task_id: usize, file_name: &str, sample: ProgressSample) {
        let bar = self.bar_for(task_id);
        bar.set_message(file_name.to_string());
        if let Some(percent) = sample.percent {
            bar.set_position(u64::from(percent));
            if percent == 100 {
                bar.finish();
            }
        }
    }

    async fn status(&self, task_id: usize, message: &str) {
        // Status lines print above the bars without tearing them.
        let _ = self.multi.println(format!("[{}] {message}", task_id + 1));
    }
}
