//! JavaScript interop for the `chrome.*` extension APIs.
//! Promise-returning calls are exposed as `async` functions returning
//! `Result<_, ExtensionError>`.

use crate::{js_error_message, ExtensionError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
    pub(crate) async fn storage_local_get(keys: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
    pub(crate) async fn storage_local_set(items: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
    async fn runtime_send_message(message: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    fn runtime_get_url(path: &str) -> String;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn runtime_on_message(listener: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> bool>);

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = query, catch)]
    async fn tabs_query(query: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = sendMessage, catch)]
    async fn tabs_send_message(tab_id: i32, message: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = create, catch)]
    async fn tabs_create(properties: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs", "onUpdated"], js_name = addListener)]
    fn tabs_on_updated(listener: &Closure<dyn FnMut(i32, JsValue, JsValue)>);
}

/// The subset of `chrome.tabs.Tab` this extension reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tab {
    pub id: Option<i32>,
    pub url: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    active: bool,
    current_window: bool,
}

/// Serialize into plain JS objects (not `Map`s) so the browser can clone them.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, ExtensionError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, ExtensionError> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

fn messaging_err(err: JsValue) -> ExtensionError {
    ExtensionError::Messaging(js_error_message(&err))
}

/// The focused tab of the current window, if any.
pub async fn active_tab() -> Result<Option<Tab>, ExtensionError> {
    let query = to_js(&TabQuery {
        active: true,
        current_window: true,
    })?;
    let tabs: Vec<Tab> = from_js(tabs_query(&query).await.map_err(messaging_err)?)?;
    Ok(tabs.into_iter().next())
}

/// Send `message` to the content scripts of `tab_id` and decode the reply.
pub async fn send_to_tab<M, R>(tab_id: i32, message: &M) -> Result<R, ExtensionError>
where
    M: Serialize,
    R: DeserializeOwned,
{
    let reply = tabs_send_message(tab_id, &to_js(message)?)
        .await
        .map_err(messaging_err)?;
    if reply.is_undefined() {
        return Err(ExtensionError::Messaging("no response from tab".to_string()));
    }
    from_js(reply)
}

/// Broadcast `message` to the other extension contexts.
pub async fn send_runtime<M: Serialize>(message: &M) -> Result<(), ExtensionError> {
    runtime_send_message(&to_js(message)?)
        .await
        .map(|_| ())
        .map_err(messaging_err)
}

pub async fn open_tab(url: &str) -> Result<(), ExtensionError> {
    #[derive(Serialize)]
    struct CreateProperties<'a> {
        url: &'a str,
    }
    tabs_create(&to_js(&CreateProperties { url })?)
        .await
        .map(|_| ())
        .map_err(messaging_err)
}

/// Absolute URL of a file packaged with the extension.
pub fn extension_url(path: &str) -> String {
    runtime_get_url(path)
}

/// Register a `chrome.runtime.onMessage` listener for the lifetime of the
/// context. The handler returns `true` when it will answer asynchronously.
pub fn on_message(handler: impl FnMut(JsValue, JsValue, js_sys::Function) -> bool + 'static) {
    let listener = Closure::<dyn FnMut(JsValue, JsValue, js_sys::Function) -> bool>::new(handler);
    runtime_on_message(&listener);
    listener.forget();
}

/// Register a `chrome.tabs.onUpdated` listener for the lifetime of the context.
pub fn on_tab_updated(handler: impl FnMut(i32, JsValue, JsValue) + 'static) {
    let listener = Closure::<dyn FnMut(i32, JsValue, JsValue)>::new(handler);
    tabs_on_updated(&listener);
    listener.forget();
}
