//! Content script for problem pages: shows the solution video carousel and
//! answers the popup's requests for the editor contents.

use leetcode_assistant::{
    cache::{ChromeStorage, Storage},
    carousel::add_video,
    chrome,
    config::KEY_LANGUAGE,
    dom::{install_frame_pointer_guard, read_editor_code, read_editor_language, CarouselHandle, SolutionsTab},
    messages::{CodeReply, Incoming, Request, TabNotice},
    utils::{prism_language, problem_title_from_tab},
};
use log::{debug, warn};
use std::cell::RefCell;
use wasm_bindgen::JsValue;

thread_local! {
    /// The carousel on this page, kept alive so its button listeners stay attached.
    static ACTIVE_CAROUSEL: RefCell<Option<CarouselHandle>> = const { RefCell::new(None) };
}

fn show_videos(tab_title: String) {
    let title = problem_title_from_tab(&tab_title).to_string();
    let Some(host) = SolutionsTab::locate(&gloo_utils::document()) else {
        debug!("Solutions tab not found");
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        match add_video(&host, &ChromeStorage, &title).await {
            Ok(Some(handle)) => ACTIVE_CAROUSEL.with(|active| {
                // Replaces a handle whose container has left the page.
                *active.borrow_mut() = Some(handle);
            }),
            Ok(None) => {}
            Err(e) => warn!("Could not show videos for {}: {}", title, e),
        }
    });
}

fn reply_with_code(respond: &js_sys::Function) {
    let document = gloo_utils::document();
    let Some(code) = read_editor_code(&document) else {
        return;
    };

    if let Some(label) = read_editor_language(&document) {
        let language = prism_language(&label);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = ChromeStorage.set(KEY_LANGUAGE, &language).await {
                warn!("{}", e);
            }
        });
    }

    match chrome::to_js(&CodeReply { data: code }) {
        Ok(reply) => {
            if let Err(e) = respond.call1(&JsValue::NULL, &reply) {
                warn!("getCode reply failed: {:?}", e);
            }
        }
        Err(e) => warn!("{}", e),
    }
}

fn main() {
    leetcode_assistant::init_context();

    if let Err(e) = install_frame_pointer_guard() {
        warn!("{}", e);
    }

    chrome::on_message(|message, _sender, respond| {
        match Incoming::from_js(message) {
            Some(Incoming::Notice(TabNotice::AddVideo { title })) => show_videos(title),
            Some(Incoming::Request(Request::GetCode)) => reply_with_code(&respond),
            _ => {}
        }
        false
    });
}
