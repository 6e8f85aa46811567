//! Transient preview resource handles
//!
//! Preview surfaces reference in-memory media bytes through opaque
//! handles, the way a browser references a blob through an object URL. The
//! registry owns the bytes; handles must be explicitly released when the
//! asset changes, the session closes, or the engine is torn down, so the
//! backing memory cannot accumulate across loads.

use std::collections::HashMap;

/// Opaque reference to registered media bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaHandle(u64);

impl std::fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// Owns the bytes behind every live [`MediaHandle`]
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    blobs: HashMap<MediaHandle, Vec<u8>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register media bytes and get a handle to them
    pub fn register(&mut self, bytes: Vec<u8>) -> MediaHandle {
        self.next_id += 1;
        let handle = MediaHandle(self.next_id);
        log::debug!("registered {} ({} bytes)", handle, bytes.len());
        self.blobs.insert(handle, bytes);
        handle
    }

    /// Get the bytes behind a live handle
    pub fn get(&self, handle: MediaHandle) -> Option<&[u8]> {
        self.blobs.get(&handle).map(Vec::as_slice)
    }

    /// Release one handle; returns false if it was not live
    pub fn release(&mut self, handle: MediaHandle) -> bool {
        match self.blobs.remove(&handle) {
            Some(bytes) => {
                log::debug!("released {} ({} bytes)", handle, bytes.len());
                true
            }
            None => {
                log::warn!("release of unknown {}", handle);
                false
            }
        }
    }

    /// Release every live handle (engine teardown)
    pub fn release_all(&mut self) {
        if !self.blobs.is_empty() {
            log::debug!("releasing {} live handle(s)", self.blobs.len());
        }
        self.blobs.clear();
    }

    /// Number of live handles
    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = HandleRegistry::new();
        let handle = registry.register(vec![1, 2, 3]);
        assert_eq!(registry.get(handle), Some(&[1u8, 2, 3][..]));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_release_frees_handle() {
        let mut registry = HandleRegistry::new();
        let handle = registry.register(vec![0; 16]);
        assert!(registry.release(handle));
        assert_eq!(registry.get(handle), None);
        assert_eq!(registry.live_count(), 0);

        // Double release is harmless
        assert!(!registry.release(handle));
    }

    #[test]
    fn test_handles_are_unique_across_releases() {
        let mut registry = HandleRegistry::new();
        let first = registry.register(vec![1]);
        registry.release(first);
        let second = registry.register(vec![2]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_release_all() {
        let mut registry = HandleRegistry::new();
        for _ in 0..4 {
            registry.register(vec![0; 8]);
        }
        assert_eq!(registry.live_count(), 4);
        registry.release_all();
        assert_eq!(registry.live_count(), 0);
    }
}
