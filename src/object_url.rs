//! In-memory `blob:` URLs for finished artifacts.
//!
//! A URL stays resolvable until it is revoked; nothing is evicted
//! automatically.

use crate::output::BinaryArtifact;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Prefix of every URL handed out by [`ObjectUrlStore::create`].
pub const URL_PREFIX: &str = "blob:pdf2img/";

static GLOBAL: Lazy<Arc<ObjectUrlStore>> = Lazy::new(|| Arc::new(ObjectUrlStore::new()));

/// Maps object URLs to the artifacts they reference.
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    entries: Mutex<HashMap<String, BinaryArtifact>>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store used by [`crate::convert`].
    pub fn global() -> Arc<ObjectUrlStore> {
        Arc::clone(&GLOBAL)
    }

    /// Register `artifact` under a fresh URL.
    pub fn create(&self, artifact: BinaryArtifact) -> String {
        let url = format!("{URL_PREFIX}{}", Uuid::new_v4());
        self.lock().insert(url.clone(), artifact);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<BinaryArtifact> {
        self.lock().get(url).cloned()
    }

    /// Forget `url`. Returns whether it was registered.
    pub fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BinaryArtifact>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_unique_and_resolvable() {
        let store = ObjectUrlStore::new();
        let a = store.create(BinaryArtifact::new(vec![1]));
        let b = store.create(BinaryArtifact::new(vec![2]));

        assert_ne!(a, b);
        assert!(a.starts_with(URL_PREFIX));
        assert_eq!(store.resolve(&a).unwrap().bytes(), &[1]);
        assert_eq!(store.resolve(&b).unwrap().bytes(), &[2]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn revoked_urls_stop_resolving() {
        let store = ObjectUrlStore::new();
        let url = store.create(BinaryArtifact::new(vec![7]));

        assert!(store.revoke(&url));
        assert!(store.resolve(&url).is_none());
        assert!(!store.revoke(&url));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_url_does_not_resolve() {
        assert!(ObjectUrlStore::new().resolve("blob:pdf2img/nope").is_none());
    }
}
