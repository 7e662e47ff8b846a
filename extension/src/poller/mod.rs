// Readiness poller
// Waits for the chain client to come up, then runs one query.
// Retries are bounded and at most one retry timer exists per poller.

mod cache;

pub use cache::ContextCache;

use crate::chain::ApiStatus;
use crate::config::PollerConfig;
use crate::error::ChainError;
use crate::event_loop::{EventLoop, TimerHandle};
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// What a view shows for a polled value.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Unresolved,
    Loaded(T),
    Failed(PollFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The chain client never became ready within the retry budget.
    Unavailable,
    /// The readiness check itself errored.
    Dependency(String),
    /// The client was ready but the query failed.
    Query(String),
}

impl std::fmt::Display for PollFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollFailure::Unavailable => f.write_str("not available"),
            PollFailure::Dependency(reason) => write!(f, "chain client error: {}", reason),
            PollFailure::Query(reason) => f.write_str(reason),
        }
    }
}

/// One unit of work to run once the dependency is ready. Called once per
/// readiness success, so refreshes re-run it.
pub type Query<T> = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<T, ChainError>>>;

pub type ReadinessCheck = Rc<dyn Fn() -> ApiStatus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No request yet
    Idle,
    /// A retry timer is pending
    Waiting,
    Querying,
    /// Last query succeeded
    Settled,
    /// Last query failed; not re-run until the next `poll`
    QueryFailed,
    Unavailable,
    DependencyFailed,
    TornDown,
}

struct PollState<H, T> {
    ready: bool,
    attempt: u32,
    pending: Option<H>,
    generation: u64,
    phase: Phase,
    query: Option<Query<T>>,
}

struct Shared<L: EventLoop, T> {
    event_loop: L,
    config: PollerConfig,
    readiness: ReadinessCheck,
    state: RefCell<PollState<L::Timer, T>>,
    on_update: RefCell<Box<dyn FnMut(Loadable<T>)>>,
}

enum Step<T> {
    Nothing,
    Run(Query<T>, u64),
    Show(Loadable<T>),
}

pub struct ReadinessPoller<L: EventLoop, T: 'static> {
    shared: Rc<Shared<L, T>>,
}

impl<L: EventLoop, T: 'static> ReadinessPoller<L, T> {
    pub fn new(
        event_loop: L,
        config: PollerConfig,
        readiness: ReadinessCheck,
        on_update: impl FnMut(Loadable<T>) + 'static,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                event_loop,
                config,
                readiness,
                state: RefCell::new(PollState {
                    ready: false,
                    attempt: 1,
                    pending: None,
                    generation: 0,
                    phase: Phase::Idle,
                    query: None,
                }),
                on_update: RefCell::new(Box::new(on_update)),
            }),
        }
    }

    /// Start polling for a new request. Any pending retry is cancelled, the
    /// attempt counter restarts at 1 and results of earlier requests are
    /// discarded when they arrive.
    pub fn poll(&self, query: Query<T>) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.phase == Phase::TornDown {
                log::debug!("poll after teardown ignored");
                return;
            }
            if let Some(timer) = state.pending.take() {
                timer.cancel();
            }
            state.attempt = 1;
            state.generation += 1;
            state.query = Some(query);
        }
        check(&self.shared);
    }

    /// Re-run the current request if its last query succeeded and nothing
    /// is pending. Returns whether a check was started.
    pub fn refresh(&self) -> bool {
        if self.shared.state.borrow().phase != Phase::Settled {
            return false;
        }
        check(&self.shared);
        true
    }

    /// Cancel any pending retry and ignore every later result.
    pub fn teardown(&self) {
        let mut state = self.shared.state.borrow_mut();
        if let Some(timer) = state.pending.take() {
            timer.cancel();
        }
        if state.phase != Phase::TornDown {
            log::debug!("poller torn down at attempt {}", state.attempt);
        }
        state.phase = Phase::TornDown;
        state.query = None;
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.borrow().phase
    }

    pub fn attempt(&self) -> u32 {
        self.shared.state.borrow().attempt
    }

    pub fn is_ready(&self) -> bool {
        self.shared.state.borrow().ready
    }

    pub fn has_pending_retry(&self) -> bool {
        self.shared.state.borrow().pending.is_some()
    }
}

impl<L: EventLoop, T: 'static> Drop for ReadinessPoller<L, T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn check<L: EventLoop, T: 'static>(shared: &Rc<Shared<L, T>>) {
    let status = (shared.readiness)();
    let step = {
        let mut state = shared.state.borrow_mut();
        if state.phase == Phase::TornDown {
            return;
        }
        match status {
            ApiStatus::Ready => {
                state.ready = true;
                state.attempt = 1;
                match state.query.clone() {
                    Some(query) => {
                        state.phase = Phase::Querying;
                        Step::Run(query, state.generation)
                    }
                    None => {
                        state.phase = Phase::Idle;
                        Step::Nothing
                    }
                }
            }
            ApiStatus::Failed(reason) => {
                log::warn!("chain client failed its readiness check: {}", reason);
                state.ready = false;
                state.phase = Phase::DependencyFailed;
                Step::Show(Loadable::Failed(PollFailure::Dependency(reason)))
            }
            ApiStatus::Connecting if state.attempt <= shared.config.max_attempts => {
                state.ready = false;
                if let Some(timer) = state.pending.take() {
                    timer.cancel();
                }
                let weak = Rc::downgrade(shared);
                let timer = shared.event_loop.set_timeout(
                    shared.config.retry_delay_ms,
                    Box::new(move || retry(weak)),
                );
                log::debug!(
                    "chain client not ready, retry {} of {} in {}ms",
                    state.attempt,
                    shared.config.max_attempts,
                    shared.config.retry_delay_ms
                );
                state.pending = Some(timer);
                state.attempt += 1;
                state.phase = Phase::Waiting;
                Step::Nothing
            }
            ApiStatus::Connecting => {
                log::warn!(
                    "chain client still not ready after {} retries, giving up",
                    shared.config.max_attempts
                );
                state.ready = false;
                state.phase = Phase::Unavailable;
                Step::Show(Loadable::Failed(PollFailure::Unavailable))
            }
        }
    };

    match step {
        Step::Nothing => {}
        Step::Show(display) => notify(shared, display),
        Step::Run(query, generation) => run_query(shared, query, generation),
    }
}

fn retry<L: EventLoop, T: 'static>(weak: Weak<Shared<L, T>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    // this timer has fired; drop its handle before rescheduling
    shared.state.borrow_mut().pending = None;
    check(&shared);
}

fn run_query<L: EventLoop, T: 'static>(shared: &Rc<Shared<L, T>>, query: Query<T>, generation: u64) {
    let weak = Rc::downgrade(shared);
    let request = query();
    shared.event_loop.spawn(Box::pin(async move {
        let result = request.await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        {
            let mut state = shared.state.borrow_mut();
            if state.phase == Phase::TornDown || state.generation != generation {
                log::debug!("discarding result of superseded request {}", generation);
                return;
            }
            state.phase = if result.is_ok() {
                Phase::Settled
            } else {
                Phase::QueryFailed
            };
        }
        let display = match result {
            Ok(value) => Loadable::Loaded(value),
            Err(e) => {
                log::error!("query failed: {}", e);
                Loadable::Failed(PollFailure::Query(e.to_string()))
            }
        };
        notify(&shared, display);
    }));
}

fn notify<L: EventLoop, T: 'static>(shared: &Shared<L, T>, display: Loadable<T>) {
    (shared.on_update.borrow_mut())(display);
}
