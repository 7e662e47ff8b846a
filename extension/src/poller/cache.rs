use crate::error::ChainError;
use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

type PendingFetch<T> = Shared<LocalBoxFuture<'static, Result<T, ChainError>>>;

enum Slot<T> {
    Empty,
    /// A fetch is in flight; later callers await the same one.
    Fetching(PendingFetch<T>),
    Ready(T),
}

/// Prerequisite context fetched at most once and then reused, e.g. the chain
/// properties needed to format a balance. Clones share the same slot.
///
/// The value is never invalidated. A failed fetch leaves the slot empty, so
/// the next caller fetches again.
pub struct ContextCache<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for ContextCache<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Default for ContextCache<T> {
    fn default() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Empty)),
        }
    }
}

impl<T: Clone + 'static> ContextCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<T> {
        match &*self.slot.borrow() {
            Slot::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, ChainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ChainError>> + 'static,
    {
        let pending = {
            let mut slot = self.slot.borrow_mut();
            match &*slot {
                Slot::Ready(value) => return Ok(value.clone()),
                Slot::Fetching(pending) => pending.clone(),
                Slot::Empty => {
                    let pending = fetch().boxed_local().shared();
                    *slot = Slot::Fetching(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut slot = self.slot.borrow_mut();
        let settles_slot = matches!(&*slot, Slot::Fetching(current) if current.ptr_eq(&pending));
        if settles_slot {
            *slot = match &result {
                Ok(value) => Slot::Ready(value.clone()),
                Err(_) => Slot::Empty,
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use std::cell::Cell;

    #[test]
    fn test_fetches_once() {
        let cache = ContextCache::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            let value = block_on(cache.get_or_fetch(move || {
                calls.set(calls.get() + 1);
                async { Ok(12) }
            }));
            assert_eq!(value, Ok(12));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let cache = ContextCache::<u32>::new();
        let first = block_on(cache.get_or_fetch(|| async { Err(ChainError::Rpc("down".into())) }));
        assert!(first.is_err());
        assert_eq!(cache.get(), None);

        let shared = cache.clone();
        let second = block_on(shared.get_or_fetch(|| async { Ok(5) }));
        assert_eq!(second, Ok(5));
        assert_eq!(cache.get(), Some(5));
    }

    #[test]
    fn test_concurrent_callers_share_one_fetch() {
        let cache = ContextCache::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let (tx, rx) = oneshot::channel::<u32>();
        let rx = Rc::new(RefCell::new(Some(rx)));
        let results = Rc::new(RefCell::new(Vec::new()));

        let mut pool = LocalPool::new();
        for _ in 0..2 {
            let cache = cache.clone();
            let calls = calls.clone();
            let rx = rx.clone();
            let results = results.clone();
            pool.spawner()
                .spawn_local(async move {
                    let value = cache
                        .get_or_fetch(move || {
                            calls.set(calls.get() + 1);
                            let rx = rx.borrow_mut().take();
                            async move {
                                match rx {
                                    Some(rx) => rx.await.map_err(|_| ChainError::Rpc("cancelled".into())),
                                    None => Err(ChainError::Rpc("fetched twice".into())),
                                }
                            }
                        })
                        .await;
                    results.borrow_mut().push(value);
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert_eq!(calls.get(), 1);
        assert!(results.borrow().is_empty());

        tx.send(7).unwrap();
        pool.run_until_stalled();
        assert_eq!(calls.get(), 1);
        assert_eq!(*results.borrow(), vec![Ok(7), Ok(7)]);
        assert_eq!(cache.get(), Some(7));
    }
}
