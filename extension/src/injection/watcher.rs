use super::directive::Directive;
use crate::config::WatcherConfig;
use crate::error::InjectionError;
use crate::event_loop::{EventLoop, TimerHandle};
use crate::messaging::NavigationSignal;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// The host document as the watcher sees it.
pub trait HostPage: 'static {
    type Element: Clone + 'static;
    /// Live structural observer; dropping it disconnects.
    type Observer: 'static;

    /// Elements that may carry a directive, in document order.
    fn content_elements(&self) -> Vec<Self::Element>;

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    fn text(&self, element: &Self::Element) -> String;

    /// The action-button row inside a content element.
    fn button_container(&self, element: &Self::Element) -> Option<Self::Element>;

    fn is_augmented(&self, container: &Self::Element) -> bool;

    fn mark_augmented(&self, container: &Self::Element);

    fn inject_control(
        &self,
        container: &Self::Element,
        directive: &Directive,
    ) -> Result<(), InjectionError>;

    /// Watch `target` for added or removed children only.
    fn observe_child_list(
        &self,
        target: &Self::Element,
        on_change: Box<dyn Fn()>,
    ) -> Result<Self::Observer, InjectionError>;
}

struct WatchState<H, O> {
    attempts: u32,
    observer: Option<O>,
    pending_attach: Option<H>,
    pending_rescan: Option<H>,
}

struct Shared<L: EventLoop, P: HostPage> {
    event_loop: L,
    config: WatcherConfig,
    page: P,
    state: RefCell<WatchState<L::Timer, P::Observer>>,
}

/// Watches the host page and adds one action button per post that carries
/// a directive.
pub struct MutationWatcher<L: EventLoop, P: HostPage> {
    shared: Rc<Shared<L, P>>,
}

impl<L: EventLoop, P: HostPage> Clone for MutationWatcher<L, P> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<L: EventLoop, P: HostPage> MutationWatcher<L, P> {
    pub fn new(event_loop: L, config: WatcherConfig, page: P) -> Self {
        Self {
            shared: Rc::new(Shared {
                event_loop,
                config,
                page,
                state: RefCell::new(WatchState {
                    attempts: 0,
                    observer: None,
                    pending_attach: None,
                    pending_rescan: None,
                }),
            }),
        }
    }

    /// Find the feed container and observe it. Retries on a timer until the
    /// attempt budget is spent, then stays silent.
    pub fn attach_observer(&self) {
        attach_observer(&self.shared);
    }

    /// Augment every matching element that has not been augmented yet.
    /// Returns the number of controls injected.
    pub fn rescan(&self) -> usize {
        rescan(&self.shared.page)
    }

    pub fn on_navigation(&self, signal: NavigationSignal) {
        log::info!("Navigation signal: {}", signal);
        match signal {
            NavigationSignal::UrlUpdate => {
                attach_observer(&self.shared);
                // supersedes the shorter initial rescan queued by the attach
                schedule_rescan(&self.shared, self.shared.config.url_update_rescan_delay_ms);
            }
            NavigationSignal::SoftReload => {
                self.shared.state.borrow_mut().attempts = 0;
                attach_observer(&self.shared);
            }
        }
    }

    pub fn attempts(&self) -> u32 {
        self.shared.state.borrow().attempts
    }

    pub fn installed(&self) -> bool {
        self.shared.state.borrow().observer.is_some()
    }
}

fn attach_observer<L: EventLoop, P: HostPage>(shared: &Rc<Shared<L, P>>) {
    let mut state = shared.state.borrow_mut();
    if state.attempts >= shared.config.max_attempts {
        log::debug!("feed container not found after {} attempts", state.attempts);
        return;
    }
    if let Some(timer) = state.pending_attach.take() {
        timer.cancel();
    }

    let page = &shared.page;
    let anchor = page
        .content_elements()
        .first()
        .and_then(|first| page.parent(first))
        .and_then(|parent| page.parent(&parent));

    let Some(target) = anchor else {
        state.attempts += 1;
        if state.attempts == shared.config.max_attempts {
            log::warn!("Feed container not found, this attempt is the last one");
        }
        let weak = Rc::downgrade(shared);
        state.pending_attach = Some(shared.event_loop.set_timeout(
            shared.config.retry_delay_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.state.borrow_mut().pending_attach = None;
                    attach_observer(&shared);
                }
            }),
        ));
        return;
    };

    let weak: Weak<Shared<L, P>> = Rc::downgrade(shared);
    let on_change = Box::new(move || {
        if let Some(shared) = weak.upgrade() {
            rescan(&shared.page);
        }
    });
    match page.observe_child_list(&target, on_change) {
        Ok(observer) => {
            // replacing the handle disconnects the previous observer
            state.observer = Some(observer);
            log::info!("Observing feed container");
        }
        Err(e) => {
            log::error!("Could not observe feed container: {}", e);
            return;
        }
    }
    drop(state);

    // catch posts rendered before the observer existed
    schedule_rescan(shared, shared.config.initial_rescan_delay_ms);
}

fn schedule_rescan<L: EventLoop, P: HostPage>(shared: &Rc<Shared<L, P>>, delay_ms: u32) {
    let weak = Rc::downgrade(shared);
    let timer = shared.event_loop.set_timeout(
        delay_ms,
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.state.borrow_mut().pending_rescan = None;
                rescan(&shared.page);
            }
        }),
    );
    let mut state = shared.state.borrow_mut();
    if let Some(previous) = state.pending_rescan.replace(timer) {
        previous.cancel();
    }
}

fn rescan<P: HostPage>(page: &P) -> usize {
    let mut injected = 0;
    for element in page.content_elements() {
        let Some(directive) = Directive::detect(&page.text(&element)) else {
            continue;
        };
        let Some(container) = page.button_container(&element) else {
            continue;
        };
        if page.is_augmented(&container) {
            continue;
        }
        page.mark_augmented(&container);
        match page.inject_control(&container, &directive) {
            Ok(()) => {
                log::debug!("Added {} button for {}", directive.action, directive.route());
                injected += 1;
            }
            Err(e) => log::error!("Could not add {} button: {}", directive.action, e),
        }
    }
    injected
}
