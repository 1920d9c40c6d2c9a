//! Bridge to the chat-completion provider.
//!
//! The provider itself is a JS library loaded by the popup page; it exposes
//! `getChatGPTAccessToken()` and `new ChatGPTProvider(token).generateAnswer({prompt, onEvent})`.
//! Its callback events are forwarded into a `Stream`.

use crate::ExtensionError;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::stream::{self, LocalBoxStream};
use futures::{Stream, StreamExt};
use log::{debug, warn};
use serde::Deserialize;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use wasm_bindgen::prelude::*;

mod js {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = getChatGPTAccessToken, catch)]
        pub async fn get_access_token() -> Result<JsValue, JsValue>;

        pub type ChatGPTProvider;

        #[wasm_bindgen(constructor)]
        pub fn new(token: &str) -> ChatGPTProvider;

        #[wasm_bindgen(method, js_name = generateAnswer, catch)]
        pub async fn generate_answer(this: &ChatGPTProvider, params: &JsValue) -> Result<JsValue, JsValue>;
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerDelta {
    pub text: String,
}

/// One provider callback.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    /// Next increment of the answer.
    Answer { data: AnswerDelta },
    Done,
    #[serde(other)]
    Other,
}

pub type ChatStream = LocalBoxStream<'static, Result<ChatEvent, ExtensionError>>;

pub trait ChatProvider {
    /// Start generating an answer for `prompt`. The stream ends after
    /// [`ChatEvent::Done`], an error, or when the provider gives up.
    fn generate_answer(&self, prompt: &str) -> ChatStream;
}

/// The popup's provider, backed by the user's browser session.
#[derive(Clone)]
pub struct ChatGptProvider {
    inner: Rc<js::ChatGPTProvider>,
}

impl ChatGptProvider {
    /// `Ok(None)` when the user has no session.
    pub async fn connect() -> Result<Option<Self>, ExtensionError> {
        let token = js::get_access_token()
            .await
            .map_err(ExtensionError::from_provider_js)?;
        match token.as_string().filter(|t| !t.is_empty()) {
            Some(token) => Ok(Some(Self {
                inner: Rc::new(js::ChatGPTProvider::new(&token)),
            })),
            None => {
                debug!("No provider access token");
                Ok(None)
            }
        }
    }
}

/// Keeps the `onEvent` callback alive while the stream is polled.
struct AnswerStream {
    events: UnboundedReceiver<Result<ChatEvent, ExtensionError>>,
    _on_event: Closure<dyn FnMut(JsValue)>,
}

impl Stream for AnswerStream {
    type Item = Result<ChatEvent, ExtensionError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_next_unpin(cx)
    }
}

impl ChatProvider for ChatGptProvider {
    fn generate_answer(&self, prompt: &str) -> ChatStream {
        let (tx, rx) = mpsc::unbounded();

        let event_tx = tx.clone();
        let on_event = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let event = serde_wasm_bindgen::from_value::<ChatEvent>(event).map_err(ExtensionError::from);
            if event_tx.unbounded_send(event).is_err() {
                debug!("Answer event after stream was dropped");
            }
        });

        let params = js_sys::Object::new();
        let built = js_sys::Reflect::set(&params, &"prompt".into(), &JsValue::from_str(prompt))
            .and_then(|_| js_sys::Reflect::set(&params, &"onEvent".into(), on_event.as_ref()));
        if let Err(err) = built {
            return stream::once(async move { Err(ExtensionError::from_provider_js(err)) }).boxed_local();
        }

        let provider = self.inner.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match provider.generate_answer(&params).await {
                Ok(_) => tx.close_channel(),
                Err(err) => {
                    let err = ExtensionError::from_provider_js(err);
                    warn!("generateAnswer failed: {}", err);
                    let _ = tx.unbounded_send(Err(err));
                    tx.close_channel();
                }
            }
        });

        AnswerStream {
            events: rx,
            _on_event: on_event,
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_events_decode() {
        let answer: ChatEvent =
            serde_json::from_value(json!({"type": "answer", "data": {"text": "O(n)"}})).unwrap();
        assert_eq!(
            answer,
            ChatEvent::Answer {
                data: AnswerDelta { text: "O(n)".into() }
            }
        );
        assert_eq!(
            serde_json::from_value::<ChatEvent>(json!({"type": "done"})).unwrap(),
            ChatEvent::Done
        );
        assert_eq!(
            serde_json::from_value::<ChatEvent>(json!({"type": "heartbeat"})).unwrap(),
            ChatEvent::Other
        );
    }
}
