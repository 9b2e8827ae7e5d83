//! Key-value persistence backends.
//!
//! The browser build writes through `window.localStorage`; tests and native
//! builds use [`MemoryStorage`]. Reads happen once at boot; writes happen after
//! every mutation.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The browser refused the write (quota exceeded, private mode, ...).
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. `fail_writes` simulates a full or locked storage area.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    pub fail_writes: bool,
    pub writes: usize,
}

impl MemoryStorage {
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut storage = Self::default();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteRejected("quota exceeded".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Lets a test keep a handle on the backend the store owns.
#[cfg(test)]
impl<S: Storage> Storage for std::rc::Rc<std::cell::RefCell<S>> {
    fn get_item(&self, key: &str) -> Option<String> {
        self.borrow().get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.borrow_mut().set_item(key, value)
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{Storage, StorageError};
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = localStorage, js_name = getItem, catch)]
        fn local_get_item(key: &str) -> Result<Option<String>, JsValue>;

        #[wasm_bindgen(js_namespace = localStorage, js_name = setItem, catch)]
        fn local_set_item(key: &str, value: &str) -> Result<(), JsValue>;
    }

    /// `window.localStorage`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStorage;

    impl Storage for LocalStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            local_get_item(key).ok().flatten()
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            local_set_item(key, value).map_err(|e| {
                let reason = e
                    .as_string()
                    .or_else(|| js_sys::Reflect::get(&e, &"name".into()).ok()?.as_string())
                    .unwrap_or_else(|| "unknown error".to_string());
                StorageError::WriteRejected(reason)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_roundtrip() {
        let mut storage = MemoryStorage::default();
        assert_eq!(storage.get_item("k"), None);
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));
        assert_eq!(storage.writes, 1);
    }

    #[test]
    fn shared_handle_sees_writes_through_the_owner() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let shared = Rc::new(RefCell::new(MemoryStorage::default()));
        let mut owned: Box<dyn Storage> = Box::new(shared.clone());
        owned.set_item("k", "v").unwrap();
        assert_eq!(shared.borrow().get_item("k").as_deref(), Some("v"));
        assert_eq!(shared.borrow().writes, 1);
    }

    #[test]
    fn failing_storage_keeps_previous_value() {
        let mut storage = MemoryStorage::with_item("k", "old");
        storage.fail_writes = true;
        let err = storage.set_item("k", "new").unwrap_err();
        assert!(err.to_string().contains("quota"));
        assert_eq!(storage.get_item("k").as_deref(), Some("old"));
        assert_eq!(storage.writes, 0);
    }
}
