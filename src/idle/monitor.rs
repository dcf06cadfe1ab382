//! Idle detection driven by an activity source and an owned tokio timer.
//!
//! One background task per monitor owns the inactivity deadline. Activity
//! signals move the deadline forward (debounced), `reset` rearms it, and the
//! first expiry with no newer activity fires the `on_idle` callback once.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::cell::Cell;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::IdleTimer;
use super::MonitorConfig;
use crate::activity::ActivityEvent;
use crate::activity::ActivitySource;
use crate::debounce::ActivityDebounce;
use crate::debounce::DebounceDecision;

thread_local! {
    /// Set while this thread runs an `on_idle` callback.
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running `on_idle` until dropped.
struct CallbackScope;

impl CallbackScope {
    fn enter() -> Self {
        IN_CALLBACK.with(|flag| flag.set(true));
        Self
    }
}

impl Drop for CallbackScope {
    fn drop(&mut self) {
        IN_CALLBACK.with(|flag| flag.set(false));
    }
}

/// Mutable monitor state, guarded by one lock so that `reset` and the
/// timeout transition never interleave.
#[derive(Debug)]
struct MonitorState {
    /// Whether the user is idle.
    idle: bool,

    /// Most recent activity or reset.
    last_active: Instant,

    /// Deadline the timer task is currently sleeping towards.
    deadline: Instant,

    /// Bumped by every reset.
    generation: u64,

    debounce: ActivityDebounce,
}

/// State shared between the handle and the timer task.
struct Shared {
    state: Mutex<MonitorState>,

    /// Published idle flag.
    idle_tx: watch::Sender<bool>,

    /// Wakes the timer task after a reset.
    rearmed: Notify,

    /// Cleared when the activity source fails.
    enabled: AtomicBool,

    /// Held while `on_idle` runs; `shutdown` waits on it.
    callback: Mutex<()>,

    idle_time: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an activity signal.
    fn record_activity(&self, event: ActivityEvent) {
        let mut state = self.lock();

        if event.at > state.last_active {
            state.last_active = event.at;
        }

        // Only an explicit reset leaves the idle state
        if state.idle {
            trace!("Activity ({}) while idle, waiting for reset", event.kind.as_str());
            return;
        }

        if state.debounce.observe(event.at) == DebounceDecision::Rearm {
            state.deadline = event.at + self.idle_time;
            trace!(
                "Rearmed on {}: idle in {:?}",
                event.kind.as_str(),
                self.idle_time
            );
        }
    }

    /// Called when the armed deadline expires.
    ///
    /// Returns the generation to confirm against once `on_idle` has run, or
    /// `None` if activity moved the real deadline and the timer was rearmed.
    fn begin_idle(&self) -> Option<u64> {
        let mut state = self.lock();
        if state.idle {
            return None;
        }

        let due = state.last_active + self.idle_time;
        if Instant::now() < due {
            trace!("Coalesced activity moved the deadline, sleeping until {:?}", due);
            state.deadline = due;
            return None;
        }

        Some(state.generation)
    }

    /// Set the idle flag unless a reset happened after `begin_idle`.
    fn finish_idle(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!("Reset raced with the idle notification, staying active");
            return;
        }
        state.idle = true;
        self.idle_tx.send_replace(true);
    }

    /// Stop detecting new idle episodes.
    ///
    /// An episode already in progress keeps the flag set until `reset`, so the
    /// published flag, `is_idle` and a visible prompt stay consistent.
    fn disable(&self) {
        let state = self.lock();
        warn!("Disabling idle detection");
        self.enabled.store(false, Ordering::Relaxed);
        self.idle_tx.send_replace(state.idle);
    }
}

/// Idle monitor backed by a tokio timer task.
///
/// Monitoring starts at [`IdleMonitor::spawn`] and stops when the monitor is
/// shut down or dropped.
pub struct IdleMonitor {
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl IdleMonitor {
    /// Start monitoring `source`, calling `on_idle` once per idle episode.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, F>(config: MonitorConfig, source: S, on_idle: F) -> Self
    where
        S: ActivitySource + 'static,
        F: FnMut() + Send + 'static,
    {
        let now = Instant::now();
        let (idle_tx, _) = watch::channel(false);

        let shared = Arc::new(Shared {
            state: Mutex::new(MonitorState {
                idle: false,
                last_active: now,
                deadline: now + config.idle_time(),
                generation: 0,
                debounce: ActivityDebounce::new(config.debounce()),
            }),
            idle_tx,
            rearmed: Notify::new(),
            enabled: AtomicBool::new(true),
            callback: Mutex::new(()),
            idle_time: config.idle_time(),
        });
        let cancel = CancellationToken::new();

        info!(
            "Idle monitor started (idle after {:?}, debounce {:?})",
            config.idle_time(),
            config.debounce()
        );

        tokio::spawn(run_timer(
            shared.clone(),
            source,
            on_idle,
            cancel.clone(),
        ));

        Self { shared, cancel }
    }

    /// Check if the user is currently idle.
    ///
    /// Once detection is disabled this can only become false: a running idle
    /// episode lasts until `reset`, and no new one starts.
    pub fn is_idle(&self) -> bool {
        self.shared.lock().idle
    }

    /// Whether idle detection is still running.
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Relaxed)
    }

    /// Watch the idle flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shared.idle_tx.subscribe()
    }

    /// Clear the idle flag and rearm the timeout window.
    pub fn reset(&self) {
        let now = Instant::now();
        {
            let mut state = self.shared.lock();
            let was_idle = state.idle;

            state.idle = false;
            state.last_active = now;
            state.deadline = now + self.shared.idle_time;
            state.generation += 1;
            state.debounce.record_rearm(now);
            self.shared.idle_tx.send_replace(false);

            if was_idle {
                info!("Idle state reset, user is active");
            } else {
                debug!("Idle timer rearmed");
            }
        }
        self.shared.rearmed.notify_one();
    }

    /// Time of the last activity or reset.
    pub fn last_active_time(&self) -> Instant {
        self.shared.lock().last_active
    }

    /// Time left before the user is considered idle.
    pub fn remaining_time(&self) -> Duration {
        let state = self.shared.lock();
        if state.idle {
            return Duration::ZERO;
        }
        (state.last_active + self.shared.idle_time).saturating_duration_since(Instant::now())
    }

    /// Number of times the timer was rearmed, by activity or reset.
    pub fn rearm_count(&self) -> u64 {
        self.shared.lock().debounce.rearms()
    }

    /// Stop monitoring.
    ///
    /// Waits for an `on_idle` call in progress on another thread, so no
    /// callback runs once this returns. Calling it from inside `on_idle`
    /// does not wait.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            debug!("Shutting down idle monitor");
            self.cancel.cancel();
        }
        if !IN_CALLBACK.with(Cell::get) {
            drop(
                self.shared
                    .callback
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
        }
    }
}

impl IdleTimer for IdleMonitor {
    fn is_idle(&self) -> bool {
        IdleMonitor::is_idle(self)
    }

    fn reset(&self) {
        IdleMonitor::reset(self);
    }

    fn last_active_time(&self) -> Instant {
        IdleMonitor::last_active_time(self)
    }

    fn remaining_time(&self) -> Duration {
        IdleMonitor::remaining_time(self)
    }
}

impl Drop for IdleMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Timer task: owns the activity source and the inactivity deadline.
async fn run_timer<S, F>(
    shared: Arc<Shared>,
    mut source: S,
    mut on_idle: F,
    cancel: CancellationToken,
) where
    S: ActivitySource,
    F: FnMut(),
{
    loop {
        let (deadline, idle) = {
            let state = shared.lock();
            (state.deadline, state.idle)
        };

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("Idle monitor stopped");
                return;
            }

            () = shared.rearmed.notified() => {
                trace!("Picked up reset");
            }

            event = source.next_event() => match event {
                Ok(event) => shared.record_activity(event),
                Err(e) => {
                    warn!("Activity source failed: {}. No new idle episodes will be reported.", e);
                    shared.disable();
                    return;
                }
            },

            () = sleep_until(deadline), if !idle => {
                let Some(generation) = shared.begin_idle() else {
                    continue;
                };

                {
                    let _gate = shared
                        .callback
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if cancel.is_cancelled() {
                        return;
                    }

                    let last_active = shared.lock().last_active;
                    info!("User is idle");
                    info!("Last active {:?} ago", last_active.elapsed());

                    let _scope = CallbackScope::enter();
                    on_idle();
                }
                shared.finish_idle(generation);
            }
        }
    }
}
