//! Exactly-once teardown of per-watch resources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Release = Box<dyn FnOnce() + Send>;

/// Ordered collection of release callbacks for one watch invocation.
///
/// Callbacks are registered as resources are acquired and invoked in
/// reverse order on [`release`](ResourceSet::release). Teardown is
/// idempotent: the second and later calls are no-ops, and a callback
/// registered after teardown runs immediately instead of leaking.
#[derive(Clone, Default)]
pub struct ResourceSet {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    releases: Mutex<Vec<Release>>,
    released: AtomicBool,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release callback for a freshly acquired resource.
    pub fn defer(&self, release: impl FnOnce() + Send + 'static) {
        if self.inner.released.load(Ordering::SeqCst) {
            // Teardown already happened; don't hold the resource.
            release();
            return;
        }
        self.lock().push(Box::new(release));
    }

    /// Run all registered callbacks, newest first. Safe to call repeatedly.
    pub fn release(&self) {
        if self.inner.released.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut releases = std::mem::take(&mut *self.lock());
        while let Some(release) = releases.pop() {
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(release)).is_err() {
                tracing::warn!("resource release callback panicked");
            }
        }
    }

    /// Whether teardown has already run (or started).
    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Release>> {
        // A poisoned lock must not leak resources; take the guard anyway.
        match self.inner.releases.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn release_runs_each_callback_exactly_once() {
        let set = ResourceSet::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = Arc::clone(&count);
            set.defer(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        set.release();
        set.release();
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(set.is_released());
    }

    #[test]
    fn release_order_is_newest_first() {
        let set = ResourceSet::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            set.defer(move || order.lock().unwrap().push(i));
        }

        set.release();
        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn defer_after_release_runs_immediately() {
        let set = ResourceSet::new();
        set.release();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        set.defer(move || flag.store(true, Ordering::SeqCst));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn panicking_callback_does_not_block_others() {
        let set = ResourceSet::new();
        let ran = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&ran);
        set.defer(move || flag.store(true, Ordering::SeqCst));
        set.defer(|| panic!("boom"));

        set.release();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn clones_share_state() {
        let set = ResourceSet::new();
        let other = set.clone();
        other.release();
        assert!(set.is_released());
    }
}
