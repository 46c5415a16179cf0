//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time
//! - Storage (LocalStorage on web)
//! - Touch capability detection

use crate::persistence::{KeyValueStore, StorageError};

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Whether the device reports touch input
#[cfg(target_arch = "wasm32")]
pub fn is_touch_device() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let has_ontouchstart = js_sys::Reflect::has(&window, &"ontouchstart".into()).unwrap_or(false);
    has_ontouchstart || window.navigator().max_touch_points() > 0
}

#[cfg(not(target_arch = "wasm32"))]
pub fn is_touch_device() -> bool {
    false
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable; progress will not be saved");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }
}

/// Native stand-in that keeps values for the lifetime of the process
#[cfg(not(target_arch = "wasm32"))]
pub type LocalStorage = NativeStorage;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct NativeStorage {
    inner: crate::persistence::MemoryStore,
}

#[cfg(not(target_arch = "wasm32"))]
impl NativeStorage {
    pub fn open() -> Self {
        Self::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for NativeStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }
}
