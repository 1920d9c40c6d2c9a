//! Extension popup: sends the code of the active problem tab to the chat
//! provider for a complexity analysis or a fix, streaming the answer.

use gloo_timers::callback::Timeout;
use leetcode_assistant::{
    cache::ChromeStorage,
    chat::ChatGptProvider,
    chrome,
    components::{PanelText, ResponsePanel},
    config::*,
    dispatcher::{clear_responses, progress_message, remember_problem_tab, restore_snapshot, Dispatcher},
    hooks::{use_info_message, InfoMessage},
    messages::{CodeReply, Incoming, Request, TabNotice},
    utils::{is_problem_url, prism_language, problem_title_from_tab},
    ActionKind, ExtensionError,
};
use log::{debug, error, info, warn};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use yew::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["navigator", "clipboard"], js_name = writeText, catch)]
    async fn clipboard_write_text(text: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = Prism, js_name = highlightAll, catch)]
    fn prism_highlight_all() -> Result<(), JsValue>;
}

const LOGIN_MESSAGE: &str = "Log into ChatGPT in your browser to get started";

type PopupDispatcher = Dispatcher<ChromeStorage, ChatGptProvider>;

/// Highlight after the next render has landed.
fn highlight_later() {
    Timeout::new(0, || {
        if prism_highlight_all().is_err() {
            debug!("Prism not available");
        }
    })
    .forget();
}

/// Ask the active tab's content script for the editor contents.
async fn fetch_code() -> Result<String, ExtensionError> {
    let tab_id = chrome::active_tab()
        .await?
        .and_then(|tab| tab.id)
        .ok_or(ExtensionError::CodeUnavailable)?;
    let reply: CodeReply = chrome::send_to_tab(tab_id, &Request::GetCode).await?;
    Ok(reply.data)
}

fn show_error(err: &ExtensionError, info: &InfoMessage, login_needed: &UseStateHandle<bool>) {
    if err.requires_login() {
        login_needed.set(true);
        info.set.emit(LOGIN_MESSAGE.to_string());
    } else {
        error!("Error: {}", err);
        info.set.emit(err.to_string());
    }
}

#[function_component(Popup)]
fn popup() -> Html {
    let info = use_info_message();
    let problem_title = use_state(String::new);
    let analyze_text = use_state(PanelText::default);
    let fix_text = use_state(PanelText::default);
    let shown_panel = use_state(|| None::<ActionKind>);
    let language = use_state(|| None::<String>);
    let busy = use_state(|| false);
    let login_needed = use_state(|| false);
    let dispatcher = use_state(|| None::<Rc<PopupDispatcher>>);

    // Restore the last session, identify the tab and connect to the provider.
    {
        let info = info.clone();
        let problem_title = problem_title.clone();
        let analyze_text = analyze_text.clone();
        let fix_text = fix_text.clone();
        let shown_panel = shown_panel.clone();
        let language = language.clone();
        let login_needed = login_needed.clone();
        let dispatcher = dispatcher.clone();
        use_effect_with((), move |_| {
            {
                let info = info.clone();
                let problem_title = problem_title.clone();
                chrome::on_message(move |message, _sender, _respond| {
                    if let Some(Incoming::Notice(TabNotice::SetTabInfo { url, title })) = Incoming::from_js(message) {
                        if is_problem_url(&url) {
                            let title = problem_title_from_tab(&title).to_string();
                            info.set.emit(title.clone());
                            problem_title.set(title);
                        }
                    }
                    false
                });
            }

            wasm_bindgen_futures::spawn_local(async move {
                match restore_snapshot(&ChromeStorage).await {
                    Ok(snapshot) => {
                        analyze_text.set(analyze_text.with_text(snapshot.analyze_response));
                        fix_text.set(fix_text.with_text(snapshot.fix_response));
                        shown_panel.set(snapshot.last_action);
                        language.set(snapshot.language.as_deref().map(prism_language));
                        highlight_later();
                    }
                    Err(e) => warn!("Could not restore popup state: {}", e),
                }

                match chrome::active_tab().await {
                    Ok(Some(tab)) => {
                        let url = tab.url.unwrap_or_default();
                        if url.contains(PROBLEM_URL_FRAGMENT) {
                            if let Some(tab_title) = tab.title {
                                let title = match remember_problem_tab(&ChromeStorage, &tab_title).await {
                                    Ok(title) => title,
                                    Err(e) => {
                                        warn!("{}", e);
                                        problem_title_from_tab(&tab_title).to_string()
                                    }
                                };
                                info.set.emit(title.clone());
                                problem_title.set(title);
                            }
                        }
                    }
                    Ok(None) => debug!("No active tab"),
                    Err(e) => warn!("{}", e),
                }

                match ChatGptProvider::connect().await {
                    Ok(Some(provider)) => {
                        info!("Provider session found");
                        dispatcher.set(Some(Rc::new(Dispatcher::new(ChromeStorage, provider))));
                    }
                    Ok(None) => {
                        login_needed.set(true);
                        info.set.emit(LOGIN_MESSAGE.to_string());
                    }
                    Err(e) => show_error(&e, &info, &login_needed),
                }
            });
            || ()
        });
    }

    let on_action = |action: ActionKind| {
        let info = info.clone();
        let problem_title = problem_title.clone();
        let analyze_text = analyze_text.clone();
        let fix_text = fix_text.clone();
        let shown_panel = shown_panel.clone();
        let busy = busy.clone();
        let login_needed = login_needed.clone();
        let dispatcher = dispatcher.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(dispatcher) = (*dispatcher).clone() else {
                return;
            };
            let info = info.clone();
            let title = (*problem_title).clone();
            let analyze_text = analyze_text.clone();
            let fix_text = fix_text.clone();
            let shown_panel = shown_panel.clone();
            let busy = busy.clone();
            let login_needed = login_needed.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let code = match fetch_code().await {
                    Ok(code) if !code.is_empty() => Some(code),
                    Ok(_) => None,
                    Err(e) => {
                        debug!("Code retrieval failed: {}", e);
                        None
                    }
                };

                let analyze_fresh = analyze_text.cleared();
                let fix_fresh = fix_text.cleared();
                if code.is_some() {
                    busy.set(true);
                    analyze_text.set(analyze_fresh.clone());
                    fix_text.set(fix_fresh.clone());
                    shown_panel.set(Some(action));
                    info.set.emit(progress_message(action).to_string());
                }

                let (target, fresh) = match action {
                    ActionKind::Analyze => (analyze_text, analyze_fresh),
                    ActionKind::Fix => (fix_text, fix_fresh),
                };
                let result = dispatcher
                    .dispatch(action, code, &title, |text| target.set(fresh.with_text(text)))
                    .await;
                busy.set(false);

                match result {
                    Ok(_) => {
                        info.set.emit(title);
                        highlight_later();
                    }
                    Err(ExtensionError::CodeUnavailable) => {
                        info.flash
                            .emit((ExtensionError::CodeUnavailable.to_string(), CODE_UNAVAILABLE_MSG_MS));
                    }
                    Err(e) => show_error(&e, &info, &login_needed),
                }
            });
        })
    };

    let on_copy = {
        let fix_text = fix_text.clone();
        Callback::from(move |_: MouseEvent| {
            let text = fix_text.text.clone();
            if text.is_empty() {
                return;
            }
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = clipboard_write_text(&text).await {
                    warn!("Clipboard write failed: {:?}", e);
                }
            });
        })
    };

    let on_clear = {
        let analyze_text = analyze_text.clone();
        let fix_text = fix_text.clone();
        let shown_panel = shown_panel.clone();
        Callback::from(move |_: MouseEvent| {
            analyze_text.set(analyze_text.cleared());
            fix_text.set(fix_text.cleared());
            shown_panel.set(None);
            wasm_bindgen_futures::spawn_local(async {
                if let Err(e) = clear_responses(&ChromeStorage).await {
                    warn!("{}", e);
                }
            });
        })
    };

    let on_settings = Callback::from(|_: MouseEvent| {
        if let Err(e) = gloo_utils::window().location().set_href(SETTINGS_PAGE) {
            warn!("Could not open settings: {:?}", e);
        }
    });

    let on_login = Callback::from(|_: MouseEvent| {
        wasm_bindgen_futures::spawn_local(async {
            if let Err(e) = chrome::send_runtime(&Request::OpenLoginPage).await {
                warn!("{}", e);
            }
        });
    });

    let signed_in = dispatcher.is_some();
    let disabled = *busy;

    html! {
        <div class="popup">
            <div id="info-message">{ &info.text }</div>
            <div id="code-btn-container">
                if signed_in {
                    <>
                        <button id="get-complexity-btn" disabled={disabled}
                            onclick={on_action(ActionKind::Analyze)}>
                            { "Get complexity" }
                        </button>
                        <button id="fix-code-btn" disabled={disabled}
                            onclick={on_action(ActionKind::Fix)}>
                            { "Fix code" }
                        </button>
                    </>
                }
                if *login_needed {
                    <button id="login-btn" disabled={disabled} onclick={on_login}>{ "Log in" }</button>
                }
                <button id="open-settings-btn" disabled={disabled} onclick={on_settings}>{ "Settings" }</button>
            </div>
            <ResponsePanel
                text={(*analyze_text).clone()}
                hidden={*shown_panel != Some(ActionKind::Analyze)}
            />
            <div id="fix-code-container" class={classes!((*shown_panel != Some(ActionKind::Fix)).then_some("hidden"))}>
                <ResponsePanel
                    text={(*fix_text).clone()}
                    language={(*language).clone()}
                    hidden={false}
                />
                if signed_in {
                    <>
                        <button id="copy-code-btn" title="Copy code to clipboard" disabled={disabled} onclick={on_copy}>
                            { "Copy" }
                        </button>
                        <button id="clear-code-btn" title="Clear code" disabled={disabled} onclick={on_clear}>
                            { "Clear" }
                        </button>
                    </>
                }
            </div>
        </div>
    }
}

fn main() {
    leetcode_assistant::init_context();
    yew::Renderer::<Popup>::new().render();
}
