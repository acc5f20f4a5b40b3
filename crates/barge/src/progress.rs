//! Per-file progress bars for transfer runs.

use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

use barge_transfer::{TransferObserver, TransferOutcome, TransferTask};

const PB_STYLE: &str =
    "{msg:30!} {spinner:.blue} {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .ok()
        .map(|style| style.progress_chars(PB_CHARS))
});

/// Renders one indicatif bar per in-flight transfer task.
pub struct ConsoleProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }
}

impl TransferObserver for ConsoleProgress {
    fn task_started(&self, task: &TransferTask) {
        let pb = self.multi.add(ProgressBar::no_length());
        if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        pb.set_message(task.destination_key.clone());
        self.bars
            .lock()
            .unwrap()
            .insert(task.destination_key.clone(), pb);
    }

    fn bytes_transferred(&self, key: &str, cumulative: u64, total: Option<u64>) {
        let bars = self.bars.lock().unwrap();
        if let Some(pb) = bars.get(key) {
            if let Some(total) = total
                && pb.length().is_none()
            {
                pb.set_length(total);
            }
            pb.set_position(cumulative);
        }
    }

    fn task_finished(&self, task: &TransferTask, outcome: &TransferOutcome) {
        if let Some(pb) = self.bars.lock().unwrap().remove(&task.destination_key) {
            if outcome.is_success() {
                pb.finish_and_clear();
            } else {
                pb.abandon_with_message(format!("{} failed", task.destination_key));
            }
        }
    }
}
