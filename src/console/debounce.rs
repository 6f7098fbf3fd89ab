//! Debounced duplicate-key checking.
//!
//! # Responsibilities
//! - Fire the advisory duplicate check ~500 ms after the last keystroke
//! - Check immediately when the field loses focus
//! - Cancel the pending timer on new input
//! - Drop stale completions via a monotonically increasing sequence number
//!
//! # Design Decisions
//! - Verdicts are published on a watch channel; the view renders the latest
//! - The check is advisory: any transport error reads as "no duplicate",
//!   the authoritative check happens server-side on submission

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::console::api::ConsoleApi;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Outcome of a duplicate check for a specific business-key value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckVerdict {
    pub dni_ruc: String,
    pub exists: bool,
}

pub struct DuplicateChecker {
    api: Arc<ConsoleApi>,
    delay: Duration,
    seq: Arc<AtomicU64>,
    pending: Mutex<Option<AbortHandle>>,
    tx: watch::Sender<Option<CheckVerdict>>,
}

impl DuplicateChecker {
    pub fn new(
        api: Arc<ConsoleApi>,
        delay: Duration,
    ) -> (Self, watch::Receiver<Option<CheckVerdict>>) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                api,
                delay,
                seq: Arc::new(AtomicU64::new(0)),
                pending: Mutex::new(None),
                tx,
            },
            rx,
        )
    }

    /// The business-key input changed: reschedule the check.
    pub fn input_changed(&self, dni_ruc: &str, exclude_id: Option<i64>) {
        self.schedule(dni_ruc, exclude_id, self.delay);
    }

    /// The input lost focus: check without waiting.
    pub fn focus_lost(&self, dni_ruc: &str, exclude_id: Option<i64>) {
        self.schedule(dni_ruc, exclude_id, Duration::ZERO);
    }

    fn schedule(&self, dni_ruc: &str, exclude_id: Option<i64>, delay: Duration) {
        // Every schedule invalidates whatever was in flight, even for an
        // empty value that fires no check of its own.
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.pending.lock().unwrap().take();
        if let Some(previous) = previous {
            previous.abort();
        }

        let value = dni_ruc.trim().to_string();
        if value.is_empty() {
            return;
        }

        let api = self.api.clone();
        let seq_counter = self.seq.clone();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let exists = api.check_duplicate(&value, exclude_id).await;
            // A newer schedule may have raced past the abort.
            if seq_counter.load(Ordering::SeqCst) == seq {
                let _ = tx.send(Some(CheckVerdict {
                    dni_ruc: value,
                    exists,
                }));
            }
        });
        *self.pending.lock().unwrap() = Some(task.abort_handle());
    }
}
