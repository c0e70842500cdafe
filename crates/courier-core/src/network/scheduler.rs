//! Timer scheduling for client-side timeouts.
//!
//! [`TokioScheduler`] uses the runtime clock and is the default.
//! [`VirtualScheduler`] keeps a manual clock so timeouts can be tested
//! deterministically: time only moves when [`VirtualScheduler::advance_to`]
//! or [`VirtualScheduler::advance_by`] is called.
//!
//! Timers are futures. Dropping a timer before it fires cancels it.

use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};
use std::time::Duration;
use tracing::debug;

/// Source of time and timers.
pub trait Scheduler: Send + Sync {
    /// Time elapsed on this scheduler's clock.
    fn now(&self) -> Duration;

    /// Timer that completes once `delay` has elapsed, measured from this call.
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

/// Shared scheduler handle.
pub type DynScheduler = Arc<dyn Scheduler>;

/// Wall-clock scheduler backed by `tokio::time`.
///
/// Honours a paused tokio clock, so it also works under
/// `#[tokio::test(start_paused = true)]`.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    epoch: tokio::time::Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            epoch: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

#[derive(Debug, Default)]
struct VirtualClock {
    now: Duration,
    next_id: u64,
    /// Pending timers keyed by (deadline, registration order).
    timers: BTreeMap<(Duration, u64), Option<Waker>>,
}

/// Manually driven scheduler for deterministic tests.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    clock: Arc<Mutex<VirtualClock>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VirtualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the clock forward to `instant` and wake every timer that is due.
    ///
    /// Moving backwards is ignored.
    pub fn advance_to(&self, instant: Duration) {
        let wakers: Vec<Waker> = {
            let mut clock = self.lock();
            if instant <= clock.now {
                return;
            }
            clock.now = instant;
            clock
                .timers
                .range_mut(..=(instant, u64::MAX))
                .filter_map(|(_, waker)| waker.take())
                .collect()
        };

        debug!("Virtual clock at {:?}, waking {} timer(s)", instant, wakers.len());
        for waker in wakers {
            waker.wake();
        }
    }

    /// Move the clock forward by `delta`, saturating at `Duration::MAX`.
    pub fn advance_by(&self, delta: Duration) {
        let target = self.now().saturating_add(delta);
        self.advance_to(target);
    }

    /// Number of timers that have been scheduled and neither fired nor
    /// been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.lock().timers.keys().next().map(|(deadline, _)| *deadline)
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Duration {
        self.lock().now
    }

    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        let key = {
            let mut clock = self.lock();
            let key = (clock.now.saturating_add(delay), clock.next_id);
            clock.next_id += 1;
            clock.timers.insert(key, None);
            key
        };
        Box::pin(VirtualTimer {
            clock: Arc::clone(&self.clock),
            key,
            done: false,
        })
    }
}

struct VirtualTimer {
    clock: Arc<Mutex<VirtualClock>>,
    key: (Duration, u64),
    done: bool,
}

impl Future for VirtualTimer {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.done {
            return Poll::Ready(());
        }

        let key = self.key;
        let fired = {
            let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
            if clock.now >= key.0 {
                clock.timers.remove(&key);
                true
            } else {
                clock.timers.insert(key, Some(cx.waker().clone()));
                false
            }
        };

        if fired {
            self.done = true;
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl Drop for VirtualTimer {
    fn drop(&mut self) {
        if !self.done {
            let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
            clock.timers.remove(&self.key);
        }
    }
}
