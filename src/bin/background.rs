//! Background service worker: seeds the problem dataset, notifies problem
//! tabs once they load, and opens the provider login page on request.

use leetcode_assistant::{
    cache::{seed_dataset, ChromeStorage},
    chrome::{self, Tab},
    config::{DATASET_PATH, LOGIN_PAGE_URL},
    js_error_message,
    messages::{notices_for_tab_update, Incoming, Request},
    ExtensionError, ProblemDataset,
};
use log::{debug, error, info, warn};
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[derive(Deserialize)]
struct ChangeInfo {
    status: Option<String>,
}

fn fetch_err(err: JsValue) -> ExtensionError {
    ExtensionError::Data(format!("could not load {}: {}", DATASET_PATH, js_error_message(&err)))
}

/// The dataset packaged with the extension.
async fn fetch_packaged_dataset() -> Result<ProblemDataset, ExtensionError> {
    let scope: web_sys::WorkerGlobalScope = js_sys::global().unchecked_into();
    let response: web_sys::Response = JsFuture::from(scope.fetch_with_str(&chrome::extension_url(DATASET_PATH)))
        .await
        .map_err(fetch_err)?
        .unchecked_into();
    let json = JsFuture::from(response.json().map_err(fetch_err)?)
        .await
        .map_err(fetch_err)?;
    chrome::from_js(json)
}

fn on_tab_updated(tab_id: i32, change: JsValue, tab: JsValue) {
    let (Ok(change), Ok(tab)) = (chrome::from_js::<ChangeInfo>(change), chrome::from_js::<Tab>(tab)) else {
        return;
    };
    let (Some(url), Some(title)) = (tab.url, tab.title) else {
        return;
    };
    let Some((add_video, tab_info)) = notices_for_tab_update(change.status.as_deref(), &url, &title) else {
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = chrome::send_to_tab::<_, serde_json::Value>(tab_id, &add_video).await {
            debug!("Tab {} did not take addVideo: {}", tab_id, e);
        }
        // Fails whenever the popup is closed.
        if let Err(e) = chrome::send_runtime(&tab_info).await {
            debug!("setTabInfo not delivered: {}", e);
        }
    });
}

fn main() {
    leetcode_assistant::init_context();

    chrome::on_tab_updated(on_tab_updated);

    chrome::on_message(|message, _sender, _respond| {
        if let Some(Incoming::Request(Request::OpenLoginPage)) = Incoming::from_js(message) {
            wasm_bindgen_futures::spawn_local(async {
                if let Err(e) = chrome::open_tab(LOGIN_PAGE_URL).await {
                    warn!("Could not open login page: {}", e);
                }
            });
        }
        false
    });

    wasm_bindgen_futures::spawn_local(async {
        match seed_dataset(&ChromeStorage, fetch_packaged_dataset).await {
            Ok(true) => info!("Problem dataset cached"),
            Ok(false) => debug!("Problem dataset already cached"),
            Err(e) => error!("{}", e),
        }
    });
}
