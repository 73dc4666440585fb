//! Debounced autosave.
//!
//! [`Autosave`] holds the latest unsaved value of one editable field and
//! persists it through an [`AutosaveSink`] once edits have been quiet for a
//! configured delay. It is independent of the widget that produced the value.
//!
//! ```text
//! Clean ──edit──▶ Pending ──timer──▶ Saving ──ok──▶ Clean
//!                   ▲  │                │
//!                   └──┘ edit           └──err──▶ Failed ──edit/flush──▶ …
//! ```
//!
//! At most one save runs at a time. An edit that lands while a save is in
//! flight re-arms the timer; if it fires before the running save returns, the
//! newer value is saved straight after it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::workbook::WidgetKind;

/// Destination of autosaved values.
#[async_trait]
pub trait AutosaveSink: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;
    type Error: fmt::Display + Send + 'static;

    async fn save(&self, value: &Self::Value) -> Result<(), Self::Error>;
}

/// Observable state of an [`Autosave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    /// Nothing unsaved.
    Clean,
    /// A value is waiting for the debounce timer.
    Pending,
    /// A save is in flight.
    Saving,
    /// The last save failed; the value is kept for the next attempt.
    Failed,
}

struct Shared<V> {
    latest: Option<V>,
    /// Bumped on every edit and flush so stale timers can tell they lost.
    generation: u64,
    timer: Option<JoinHandle<()>>,
    in_flight: bool,
    save_after: bool,
    last_error: Option<String>,
}

impl<V> Shared<V> {
    fn state(&self) -> AutosaveState {
        if self.in_flight {
            AutosaveState::Saving
        } else if self.timer.is_some() {
            AutosaveState::Pending
        } else if self.last_error.is_some() {
            AutosaveState::Failed
        } else if self.latest.is_some() {
            AutosaveState::Pending
        } else {
            AutosaveState::Clean
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Inner<S: AutosaveSink> {
    sink: S,
    delay: Duration,
    shared: Mutex<Shared<S::Value>>,
    idle: Notify,
}

impl<S: AutosaveSink> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, Shared<S::Value>> {
        // The guarded data is plain bookkeeping; a panic elsewhere cannot
        // leave it half-written.
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Called when a debounce timer elapses.
    async fn fire(self: Arc<Self>, generation: u64) {
        {
            let mut shared = self.lock();
            if shared.generation != generation {
                return;
            }
            // Detach the handle so later edits cannot abort a running save.
            shared.timer = None;
        }
        self.save_pending().await;
    }

    /// Save the latest value, then any value that arrived meanwhile.
    async fn save_pending(&self) -> AutosaveState {
        loop {
            let value = {
                let mut shared = self.lock();
                if shared.in_flight {
                    shared.save_after = true;
                    return shared.state();
                }
                let Some(value) = shared.latest.take() else {
                    return shared.state();
                };
                shared.in_flight = true;
                value
            };

            let result = self.sink.save(&value).await;

            let mut shared = self.lock();
            shared.in_flight = false;
            match result {
                Ok(()) => {
                    shared.last_error = None;
                    if std::mem::take(&mut shared.save_after) {
                        continue;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Autosave failed");
                    if shared.latest.is_none() {
                        shared.latest = Some(value);
                    }
                    shared.last_error = Some(e.to_string());
                    shared.save_after = false;
                }
            }
            self.idle.notify_waiters();
            return shared.state();
        }
    }
}

/// Debounced saver for one field.
///
/// Must be used inside a Tokio runtime: the debounce timer is a spawned task.
/// Dropping the `Autosave` does not cancel an armed timer, so the last edit
/// is still persisted.
pub struct Autosave<S: AutosaveSink> {
    inner: Arc<Inner<S>>,
}

impl<S: AutosaveSink> Autosave<S> {
    pub fn new(sink: S, delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                delay,
                shared: Mutex::new(Shared {
                    latest: None,
                    generation: 0,
                    timer: None,
                    in_flight: false,
                    save_after: false,
                    last_error: None,
                }),
                idle: Notify::new(),
            }),
        }
    }

    /// Autosave using the debounce delay of `kind`.
    pub fn for_widget(sink: S, kind: WidgetKind) -> Self {
        Self::new(sink, kind.debounce_delay())
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    pub fn state(&self) -> AutosaveState {
        self.inner.lock().state()
    }

    /// Error text of the last failed save, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Record a new value and restart the debounce timer.
    pub fn edit(&self, value: S::Value) {
        let mut shared = self.inner.lock();
        shared.latest = Some(value);
        shared.generation += 1;
        shared.cancel_timer();

        let generation = shared.generation;
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.delay;
        shared.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fire(generation).await;
        }));
    }

    /// Cancel the timer and save immediately, waiting for any in-flight save
    /// to finish first. Returns the resulting state.
    pub async fn flush(&self) -> AutosaveState {
        {
            let mut shared = self.inner.lock();
            shared.generation += 1;
            shared.cancel_timer();
        }

        loop {
            let idle = self.inner.idle.notified();
            if !self.inner.lock().in_flight {
                break;
            }
            idle.await;
        }

        self.inner.save_pending().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use tokio::sync::Semaphore;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        saved: Mutex<Vec<String>>,
        fail: AtomicBool,
        running: AtomicUsize,
        max_running: AtomicUsize,
        gate: Option<Semaphore>,
    }

    #[derive(Clone)]
    struct RecordingSink(Arc<Recorder>);

    #[async_trait]
    impl AutosaveSink for RecordingSink {
        type Value = String;
        type Error = String;

        async fn save(&self, value: &String) -> Result<(), String> {
            let running = self.0.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.0.max_running.fetch_max(running, Ordering::SeqCst);
            if let Some(gate) = &self.0.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.0.running.fetch_sub(1, Ordering::SeqCst);
            if self.0.fail.load(Ordering::SeqCst) {
                return Err("database unavailable".into());
            }
            self.0.saved.lock().unwrap().push(value.clone());
            Ok(())
        }
    }

    fn recorder() -> Arc<Recorder> {
        Arc::new(Recorder::default())
    }

    fn saved(rec: &Recorder) -> Vec<String> {
        rec.saved.lock().unwrap().clone()
    }

    const DELAY: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_one_save() {
        let rec = recorder();
        let autosave = Autosave::new(RecordingSink(rec.clone()), DELAY);

        autosave.edit("a".into());
        tokio::time::sleep(Duration::from_millis(500)).await;
        autosave.edit("ab".into());
        tokio::time::sleep(Duration::from_millis(500)).await;
        autosave.edit("abc".into());
        assert_eq!(autosave.state(), AutosaveState::Pending);
        assert!(saved(&rec).is_empty());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(saved(&rec), vec!["abc"]);
        assert_eq!(autosave.state(), AutosaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_saves_now_and_cancels_the_timer() {
        let rec = recorder();
        let autosave = Autosave::for_widget(RecordingSink(rec.clone()), WidgetKind::Slider);
        assert_eq!(autosave.delay(), Duration::from_millis(800));

        autosave.edit("7".into());
        assert_eq!(autosave.flush().await, AutosaveState::Clean);
        assert_eq!(saved(&rec), vec!["7"]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(saved(&rec), vec!["7"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_keeps_value_for_retry() {
        let rec = recorder();
        rec.fail.store(true, Ordering::SeqCst);
        let autosave = Autosave::new(RecordingSink(rec.clone()), DELAY);

        autosave.edit("draft".into());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(autosave.state(), AutosaveState::Failed);
        assert_eq!(autosave.last_error().as_deref(), Some("database unavailable"));

        rec.fail.store(false, Ordering::SeqCst);
        assert_eq!(autosave.flush().await, AutosaveState::Clean);
        assert_eq!(saved(&rec), vec!["draft"]);
        assert_eq!(autosave.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_during_save_is_saved_afterwards() {
        let rec = Arc::new(Recorder {
            gate: Some(Semaphore::new(0)),
            ..Recorder::default()
        });
        let autosave = Autosave::new(RecordingSink(rec.clone()), DELAY);

        autosave.edit("first".into());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(autosave.state(), AutosaveState::Saving);

        autosave.edit("second".into());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(autosave.state(), AutosaveState::Saving);

        rec.gate.as_ref().unwrap().add_permits(2);
        assert_eq!(autosave.flush().await, AutosaveState::Clean);

        assert_eq!(saved(&rec), vec!["first", "second"]);
        assert_eq!(rec.max_running.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_without_edits_is_clean() {
        let autosave = Autosave::new(RecordingSink(recorder()), DELAY);
        assert_eq!(autosave.flush().await, AutosaveState::Clean);
    }
}
