//! Key-value cache shared by all extension contexts.
//!
//! In the browser this is `chrome.storage.local`. Values cross the boundary as
//! JSON so the same typed helpers work against the in-memory store used by
//! tests.
//!
//! # Keys
//! See `config::KEY_*`. The dataset lives under `leetcodeProblems`; popup
//! responses and the last action survive popup reopenings.

use crate::chrome::{storage_local_get, storage_local_set, to_js};
use crate::config::KEY_PROBLEMS;
use crate::{js_error_message, ExtensionError, ProblemDataset};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use wasm_bindgen::JsValue;

#[allow(async_fn_in_trait)]
pub trait Storage {
    /// Raw value under `key`; `None` when unset.
    async fn get_raw(&self, key: &str) -> Result<Option<Value>, ExtensionError>;

    async fn set_raw(&self, key: &str, value: Value) -> Result<(), ExtensionError>;

    /// Typed read. Unset and `null` both read as `None`.
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ExtensionError> {
        match self.get_raw(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), ExtensionError> {
        self.set_raw(key, serde_json::to_value(value)?).await
    }
}

/// `chrome.storage.local`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChromeStorage;

fn storage_err(err: JsValue) -> ExtensionError {
    ExtensionError::Storage(js_error_message(&err))
}

impl Storage for ChromeStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<Value>, ExtensionError> {
        let js_key = JsValue::from_str(key);
        let items = storage_local_get(&js_key).await.map_err(storage_err)?;
        let value = js_sys::Reflect::get(&items, &js_key).map_err(storage_err)?;
        if value.is_undefined() {
            return Ok(None);
        }
        Ok(Some(serde_wasm_bindgen::from_value(value)?))
    }

    async fn set_raw(&self, key: &str, value: Value) -> Result<(), ExtensionError> {
        let items = js_sys::Object::new();
        js_sys::Reflect::set(&items, &JsValue::from_str(key), &to_js(&value)?).map_err(storage_err)?;
        storage_local_set(&items).await.map_err(storage_err)?;
        Ok(())
    }
}

/// In-process store with the same semantics, used off-browser.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<Value>, ExtensionError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: Value) -> Result<(), ExtensionError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store the dataset produced by `fetch` unless one is cached already.
/// Returns whether the cache was written.
pub async fn seed_dataset<S, F, Fut>(storage: &S, fetch: F) -> Result<bool, ExtensionError>
where
    S: Storage,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ProblemDataset, ExtensionError>>,
{
    if storage.get_raw(KEY_PROBLEMS).await?.is_some() {
        return Ok(false);
    }
    let dataset = fetch().await?;
    info!("Caching {} problems", dataset.questions.len());
    storage.set(KEY_PROBLEMS, &dataset).await?;
    Ok(true)
}
