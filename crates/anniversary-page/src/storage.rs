//! Key-value persistence backends.
//!
//! The page only ever needs one string value under one key, so the seam is a
//! tiny `get`/`set` trait. In the browser it is backed by `localStorage`;
//! tests (and browsers that refuse to hand out local storage) use
//! [`MemoryStore`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    /// Returns the raw value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value under `key`.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend rejects the write, e.g. when
    /// the quota is exceeded.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory backend. Clones share the same map, so a second store built on a
/// clone sees what the first one wrote, which is how a page reload looks from
/// the store's point of view.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose reads and writes always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failing {
            return Err(StorageError::Read {
                key: key.to_string(),
                reason: "backend offline".to_string(),
            });
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStore;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{KeyValueStore, StorageError};
    use wasm_bindgen::JsValue;

    fn js_reason(err: &JsValue) -> String {
        err.as_string().unwrap_or_else(|| format!("{err:?}"))
    }

    /// `window.localStorage`.
    pub struct BrowserStore {
        storage: web_sys::Storage,
    }

    impl BrowserStore {
        /// # Errors
        /// Returns [`StorageError::Unavailable`] when there is no window or the
        /// browser denies access to local storage (private mode, disabled
        /// cookies).
        pub fn open() -> Result<Self, StorageError> {
            let window = web_sys::window().ok_or(StorageError::Unavailable)?;
            let storage = window
                .local_storage()
                .map_err(|_| StorageError::Unavailable)?
                .ok_or(StorageError::Unavailable)?;
            Ok(Self { storage })
        }
    }

    impl KeyValueStore for BrowserStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage.get_item(key).map_err(|e| StorageError::Read {
                key: key.to_string(),
                reason: js_reason(&e),
            })
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| StorageError::Write {
                    key: key.to_string(),
                    reason: js_reason(&e),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(b.get("missing").unwrap(), None);
    }

    #[test]
    fn failing_store_reports_errors() {
        let mut s = MemoryStore::failing();
        assert!(matches!(s.get("k"), Err(StorageError::Read { .. })));
        let err = s.set("k", "v").unwrap_err();
        assert!(err.to_string().contains("quota"));
        assert_eq!(s.raw("k"), None);
    }
}
