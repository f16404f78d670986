//! In-process caching of resolved alternates

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::debug;

use crate::error::{Error, Result};
use crate::reference::DockerImageReference;

/// Memoized alternates, keyed by the requested image reference.
///
/// Each strategy owns one cache. The lock is held for the whole of
/// [`AlternatesCache::get_or_resolve`], so a reference is resolved at most
/// once even under concurrent callers.
#[derive(Debug, Default)]
pub struct AlternatesCache {
    entries: Mutex<HashMap<DockerImageReference, Vec<DockerImageReference>>>,
}

impl AlternatesCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<DockerImageReference, Vec<DockerImageReference>>>> {
        self.entries.lock().map_err(|_| Error::LockPoisoned {
            context: "alternates cache".to_string(),
        })
    }

    /// Get the cached alternates for `key`, or compute and cache them.
    ///
    /// Errors from `resolver` are returned as-is and nothing is stored.
    pub fn get_or_resolve<F>(
        &self,
        key: &DockerImageReference,
        resolver: F,
    ) -> Result<Vec<DockerImageReference>>
    where
        F: FnOnce() -> Result<Vec<DockerImageReference>>,
    {
        let mut entries = self.lock()?;
        if let Some(cached) = entries.get(key) {
            debug!("Using cached alternates for {}", key);
            return Ok(cached.clone());
        }

        let alternates = resolver()?;
        entries.insert(key.clone(), alternates.clone());
        Ok(alternates)
    }

    /// Manually insert a value into the cache
    pub fn insert(&self, key: DockerImageReference, alternates: Vec<DockerImageReference>) -> Result<()> {
        self.lock()?.insert(key, alternates);
        Ok(())
    }

    /// Get a value from cache without computing
    pub fn get(&self, key: &DockerImageReference) -> Result<Option<Vec<DockerImageReference>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    /// Check if a key exists in cache
    pub fn contains(&self, key: &DockerImageReference) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    /// Clear all cached entries
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    /// Get the number of cached entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}
