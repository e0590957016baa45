use crate::config::Profile;
use crate::error::ProfileError;
use crate::storage::ProfileSource;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 16;

/// Parsed profiles keyed by name.
///
/// Append-only: entries are never evicted or reloaded. Once `capacity` names
/// are cached, further profiles are loaded on every request.
pub struct ProfileCache {
    source: Box<dyn ProfileSource>,
    entries: RwLock<HashMap<String, Arc<Profile>>>,
    capacity: usize,
}

impl ProfileCache {
    pub fn new(source: Box<dyn ProfileSource>) -> Self {
        Self::with_capacity(source, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(source: Box<dyn ProfileSource>, capacity: usize) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<Profile>, ProfileError> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(profile) = entries.get(name) {
                return Ok(Arc::clone(profile));
            }
        }

        let profile = Arc::new(self.source.load_profile(name)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = entries.get(name) {
            // Another caller loaded it first
            return Ok(Arc::clone(existing));
        }
        if entries.len() < self.capacity {
            debug!("Caching profile '{}'", name);
            entries.insert(name.to_string(), Arc::clone(&profile));
        }
        Ok(profile)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source(&self) -> &dyn ProfileSource {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        loads: Arc<AtomicUsize>,
    }

    impl ProfileSource for CountingSource {
        fn load_profile(&self, name: &str) -> Result<Profile, ProfileError> {
            if name == "missing" {
                return Err(ProfileError::NotFound(name.to_string()));
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Profile::empty(name))
        }

        fn available(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn cache(capacity: usize) -> (ProfileCache, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            loads: Arc::clone(&loads),
        };
        (ProfileCache::with_capacity(Box::new(source), capacity), loads)
    }

    #[test]
    fn second_lookup_is_served_from_cache() {
        let (cache, loads) = cache(4);
        let first = cache.get("a").unwrap();
        let second = cache.get("a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn full_cache_serves_uncached() {
        let (cache, loads) = cache(1);
        cache.get("a").unwrap();
        cache.get("b").unwrap();
        cache.get("b").unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn errors_are_not_cached() {
        let (cache, _) = cache(4);
        assert!(matches!(cache.get("missing"), Err(ProfileError::NotFound(_))));
        assert!(cache.is_empty());
    }
}
