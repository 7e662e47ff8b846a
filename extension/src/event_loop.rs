// Event loop seam shared by the readiness poller and the mutation watcher
// Browser: gloo Timeout + spawn_local. Tests: manual loop with a virtual clock.

use futures::future::LocalBoxFuture;

/// Handle to a scheduled callback. Dropping or cancelling it must prevent
/// the callback from running.
pub trait TimerHandle {
    fn cancel(self);
}

/// Single-threaded scheduler: one-shot timers and local task spawning.
pub trait EventLoop: Clone + 'static {
    type Timer: TimerHandle + 'static;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Timer;

    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Event loop of the page or popup the wasm module runs in.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserEventLoop;

pub struct BrowserTimer(gloo_timers::callback::Timeout);

impl TimerHandle for BrowserTimer {
    fn cancel(self) {
        // clearTimeout runs here; the returned closure is dropped with it
        let _ = self.0.cancel();
    }
}

impl EventLoop for BrowserEventLoop {
    type Timer = BrowserTimer;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> BrowserTimer {
        BrowserTimer(gloo_timers::callback::Timeout::new(delay_ms, callback))
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

#[cfg(test)]
pub(crate) mod manual {
    //! Deterministic event loop for native tests.

    use super::{EventLoop, TimerHandle};
    use futures::executor::{LocalPool, LocalSpawner};
    use futures::future::LocalBoxFuture;
    use futures::task::LocalSpawnExt;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Scheduled {
        id: u64,
        due: u64,
        delay: u32,
        callback: Option<Box<dyn FnOnce()>>,
    }

    #[derive(Default)]
    struct State {
        now: u64,
        next_id: u64,
        timers: Vec<Scheduled>,
        fired_delays: Vec<u32>,
        scheduled_total: usize,
    }

    #[derive(Clone)]
    pub struct ManualLoop {
        state: Rc<RefCell<State>>,
        pool: Rc<RefCell<LocalPool>>,
        spawner: LocalSpawner,
    }

    pub struct ManualTimer {
        id: u64,
        state: Rc<RefCell<State>>,
    }

    impl TimerHandle for ManualTimer {
        fn cancel(self) {
            self.state.borrow_mut().timers.retain(|t| t.id != self.id);
        }
    }

    impl ManualLoop {
        pub fn new() -> Self {
            let pool = LocalPool::new();
            let spawner = pool.spawner();
            Self {
                state: Rc::new(RefCell::new(State::default())),
                pool: Rc::new(RefCell::new(pool)),
                spawner,
            }
        }

        pub fn now(&self) -> u64 {
            self.state.borrow().now
        }

        /// Timers currently waiting to fire.
        pub fn pending_timers(&self) -> usize {
            self.state.borrow().timers.len()
        }

        /// Timers ever scheduled, fired or not.
        pub fn scheduled_total(&self) -> usize {
            self.state.borrow().scheduled_total
        }

        /// Delays of the timers that actually fired, in firing order.
        pub fn fired_delays(&self) -> Vec<u32> {
            self.state.borrow().fired_delays.clone()
        }

        /// Drive spawned tasks until none can make progress.
        pub fn run_tasks(&self) {
            self.pool.borrow_mut().run_until_stalled();
        }

        /// Advance the clock to the next due timer and fire it.
        /// Returns false when no timer is pending.
        pub fn fire_next(&self) -> bool {
            self.run_tasks();
            let next = {
                let mut state = self.state.borrow_mut();
                let Some(index) = state
                    .timers
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i)
                else {
                    return false;
                };
                let mut timer = state.timers.remove(index);
                state.now = timer.due;
                state.fired_delays.push(timer.delay);
                timer.callback.take()
            };
            if let Some(callback) = next {
                callback();
            }
            self.run_tasks();
            true
        }

        /// Fire timers until none remain, up to `limit` firings.
        pub fn run_all(&self, limit: usize) -> usize {
            let mut fired = 0;
            while fired < limit && self.fire_next() {
                fired += 1;
            }
            fired
        }

        /// Fire every timer due within the next `ms` milliseconds.
        pub fn advance(&self, ms: u64) {
            let until = self.now() + ms;
            loop {
                let due = self.state.borrow().timers.iter().map(|t| t.due).min();
                match due {
                    Some(due) if due <= until => {
                        self.fire_next();
                    }
                    _ => break,
                }
            }
            self.state.borrow_mut().now = until;
            self.run_tasks();
        }
    }

    impl EventLoop for ManualLoop {
        type Timer = ManualTimer;

        fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> ManualTimer {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.scheduled_total += 1;
            let due = state.now + u64::from(delay_ms);
            state.timers.push(Scheduled {
                id,
                due,
                delay: delay_ms,
                callback: Some(callback),
            });
            ManualTimer {
                id,
                state: self.state.clone(),
            }
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            if let Err(e) = self.spawner.spawn_local(task) {
                panic!("manual loop spawn failed: {e:?}");
            }
        }
    }
}
