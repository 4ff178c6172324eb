//! The instance registry itself.

use crate::host::HostId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// One key's entry. `init` is the per-key critical section for construction.
struct Slot<T> {
    instance: OnceLock<Arc<T>>,
    init: Mutex<()>,
}

impl<T> Slot<T> {
    fn empty() -> Arc<Self> {
        Arc::new(Self {
            instance: OnceLock::new(),
            init: Mutex::new(()),
        })
    }

    fn filled(instance: Arc<T>) -> Arc<Self> {
        Arc::new(Self {
            instance: OnceLock::from(instance),
            init: Mutex::new(()),
        })
    }
}

type HostEntries<T> = HashMap<String, Arc<Slot<T>>>;

/// Maps `(host, session key)` to a shared instance.
///
/// Every host has an independent key space: equal keys under different hosts
/// never collide. Entries live until [`teardown`](Self::teardown) is called
/// for their host; the owner of the build-tool instance is expected to call
/// it when the instance is discarded.
///
/// `get_or_create` constructs under a lock held for that key only, so at most
/// one instance is ever built per key while other keys and hosts proceed. The
/// factory must not call back into the cache for the same key.
pub struct InstanceCache<T> {
    hosts: Mutex<HashMap<HostId, HostEntries<T>>>,
}

impl<T> InstanceCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the instance cached for `key` under `host`, if any.
    ///
    /// An instance still under construction is not returned.
    pub fn get(&self, host: HostId, key: &str) -> Option<Arc<T>> {
        self.lock().get(&host)?.get(key)?.instance.get().cloned()
    }

    /// Stores `instance` for `key` under `host`, replacing any previous one.
    pub fn set(&self, host: HostId, key: impl Into<String>, instance: Arc<T>) {
        self.lock()
            .entry(host)
            .or_default()
            .insert(key.into(), Slot::filled(instance));
    }

    /// Returns the cached instance, constructing and storing one on a miss.
    pub fn get_or_create(&self, host: HostId, key: &str, create: impl FnOnce() -> T) -> Arc<T> {
        match self.get_or_try_create(host, key, || Ok::<T, std::convert::Infallible>(create())) {
            Ok(instance) => instance,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_create`](Self::get_or_create), for fallible construction.
    ///
    /// A failed construction stores nothing; the next call tries again.
    pub fn get_or_try_create<E>(
        &self,
        host: HostId,
        key: &str,
        create: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let slot = {
            let mut hosts = self.lock();
            let entries = hosts.entry(host).or_default();
            Arc::clone(entries.entry(key.to_string()).or_insert_with(Slot::empty))
        };

        if let Some(instance) = slot.instance.get() {
            tracing::debug!(%host, key, "instance cache hit");
            return Ok(Arc::clone(instance));
        }

        let _init = slot.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = slot.instance.get() {
            tracing::debug!(%host, key, "instance constructed concurrently");
            return Ok(Arc::clone(instance));
        }

        tracing::debug!(%host, key, "instance cache miss");
        let instance = Arc::new(create()?);
        Ok(Arc::clone(slot.instance.get_or_init(|| instance)))
    }

    /// Drops every entry of `host` and returns how many instances there were.
    pub fn teardown(&self, host: HostId) -> usize {
        let removed = self
            .lock()
            .remove(&host)
            .map_or(0, |entries| count_filled(&entries));
        tracing::debug!(%host, removed, "instance cache teardown");
        removed
    }

    /// Returns the number of instances cached under `host`.
    pub fn len(&self, host: HostId) -> usize {
        self.lock().get(&host).map_or(0, count_filled)
    }

    /// Returns `true` if nothing is cached under `host`.
    pub fn is_empty(&self, host: HostId) -> bool {
        self.len(host) == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HostId, HostEntries<T>>> {
        self.hosts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn count_filled<T>(entries: &HostEntries<T>) -> usize {
    entries.values().filter(|slot| slot.instance.get().is_some()).count()
}

impl<T> Default for InstanceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::cache_name;

    #[derive(Debug, PartialEq)]
    struct Instance(u32);

    #[test]
    fn returns_previously_cached_instance() {
        let cache = InstanceCache::new();
        let host = HostId::next();
        let key = cache_name(Some("a1b2"));
        let expected = Arc::new(Instance(1));

        cache.set(host, key.clone(), Arc::clone(&expected));

        let actual = cache.get(host, &key).unwrap();
        assert!(Arc::ptr_eq(&actual, &expected));
    }

    #[test]
    fn returns_none_without_cached_instance() {
        let cache: InstanceCache<Instance> = InstanceCache::new();
        assert!(cache.get(HostId::next(), &cache_name(Some("unknown"))).is_none());
    }

    #[test]
    fn sessions_on_one_host_do_not_collide() {
        let cache = InstanceCache::new();
        let host = HostId::next();
        cache.set(host, cache_name(Some("one")), Arc::new(Instance(1)));
        cache.set(host, cache_name(Some("two")), Arc::new(Instance(2)));

        assert_eq!(*cache.get(host, &cache_name(Some("one"))).unwrap(), Instance(1));
        assert_eq!(*cache.get(host, &cache_name(Some("two"))).unwrap(), Instance(2));
        assert_eq!(cache.len(host), 2);
    }

    #[test]
    fn hosts_have_independent_key_spaces() {
        let cache = InstanceCache::new();
        let first = HostId::next();
        let second = HostId::next();
        let key = cache_name(None);
        cache.set(first, key.clone(), Arc::new(Instance(1)));

        assert!(cache.get(second, &key).is_none());
        assert!(cache.is_empty(second));
    }

    #[test]
    fn get_or_create_constructs_once() {
        let cache = InstanceCache::new();
        let host = HostId::next();
        let mut constructed = 0;

        let first = cache.get_or_create(host, "k", || {
            constructed += 1;
            Instance(7)
        });
        let second = cache.get_or_create(host, "k", || {
            constructed += 1;
            Instance(8)
        });

        assert_eq!(constructed, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, Instance(7));
    }

    #[test]
    fn failed_construction_stores_nothing() {
        let cache: InstanceCache<Instance> = InstanceCache::new();
        let host = HostId::next();

        let err = cache
            .get_or_try_create(host, "k", || Err("no target"))
            .unwrap_err();
        assert_eq!(err, "no target");
        assert!(cache.get(host, "k").is_none());

        let ok = cache.get_or_try_create(host, "k", || Ok::<_, &str>(Instance(3)));
        assert_eq!(*ok.unwrap(), Instance(3));
    }

    #[test]
    fn teardown_drops_host_entries_only() {
        let cache = InstanceCache::new();
        let gone = HostId::next();
        let kept = HostId::next();
        cache.set(gone, "a", Arc::new(Instance(1)));
        cache.set(gone, "b", Arc::new(Instance(2)));
        cache.set(kept, "a", Arc::new(Instance(3)));

        assert_eq!(cache.teardown(gone), 2);
        assert!(cache.get(gone, "a").is_none());
        assert_eq!(*cache.get(kept, "a").unwrap(), Instance(3));
        assert_eq!(cache.teardown(gone), 0);
    }

    #[test]
    fn teardown_releases_cache_ownership() {
        let cache = InstanceCache::new();
        let host = HostId::next();
        let instance = Arc::new(Instance(1));
        cache.set(host, "k", Arc::clone(&instance));
        assert_eq!(Arc::strong_count(&instance), 2);

        cache.teardown(host);
        assert_eq!(Arc::strong_count(&instance), 1);
    }

    #[test]
    fn construction_does_not_block_other_keys() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let cache = Arc::new(InstanceCache::new());
        let host = HostId::next();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let slow = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_create(host, "slow", || {
                    started_tx.send(()).unwrap();
                    let released = release_rx.recv_timeout(Duration::from_secs(5)).is_ok();
                    Instance(u32::from(released))
                })
            })
        };

        started_rx.recv().unwrap();
        let other_host = cache.get_or_create(HostId::next(), "slow", || Instance(2));
        let other_key = cache.get_or_create(host, "fast", || Instance(3));
        assert_eq!(cache.len(host), 1);
        release_tx.send(()).unwrap();

        assert_eq!(*slow.join().unwrap(), Instance(1));
        assert_eq!(*other_host, Instance(2));
        assert_eq!(*other_key, Instance(3));
        assert_eq!(cache.len(host), 2);
    }

    #[test]
    fn failed_construction_is_not_counted() {
        let cache: InstanceCache<Instance> = InstanceCache::new();
        let host = HostId::next();
        let _ = cache.get_or_try_create(host, "k", || Err("boom"));
        assert!(cache.is_empty(host));
        assert_eq!(cache.teardown(host), 0);
    }

    #[test]
    fn concurrent_get_or_create_builds_one_instance() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::thread;

        let cache = Arc::new(InstanceCache::new());
        let built = Arc::new(AtomicU32::new(0));
        let host = HostId::next();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let built = Arc::clone(&built);
                thread::spawn(move || {
                    cache.get_or_create(host, "shared", || {
                        built.fetch_add(1, Ordering::SeqCst);
                        Instance(0)
                    })
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(host), 1);
    }
}
