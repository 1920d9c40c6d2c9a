//! Popup action dispatcher: turns an "analyze" / "fix" button press into a
//! streamed chat request and persists the result.

use crate::cache::Storage;
use crate::chat::{ChatEvent, ChatProvider};
use crate::config::*;
use crate::utils::problem_title_from_tab;
use crate::{ActionKind, ExtensionError};
use futures::StreamExt;
use log::{debug, info, warn};
use std::cell::Cell;

const ANALYZE_INSTRUCTIONS: &str = "\nYour task is to analyze the code complexity.
State the time complexity followed by the space complexity, using Big O notation. Your response should be short and concise.";

const FIX_INSTRUCTIONS: &str = "\nDepending on the given code:
1. If the code is provided below, identify and rectify any bugs preventing the submission from being accepted.
2. If no code is provided below, create an optimal solution.
3. If the code is provided and the given solution is already optimal, confirm the same and return the original code.
Please return only the code in plain text and without using a code block. Do not return any additional comments or text.";

/// Prompt sent to the provider for `action` on `code`.
pub fn build_prompt(action: ActionKind, title: &str, code: &str) -> String {
    let instructions = match action {
        ActionKind::Analyze => ANALYZE_INSTRUCTIONS,
        ActionKind::Fix => FIX_INSTRUCTIONS,
    };
    format!(
        "As an expert software engineer, you are provided the following code for the Leetcode problem titled {}.\n{}\n Heres the code \n{}",
        title, instructions, code
    )
}

/// Info line shown while `action` streams.
pub fn progress_message(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Analyze => "Analyzing code complexity ...",
        ActionKind::Fix => "Creating the solution ...",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Busy(ActionKind),
}

/// Puts the dispatcher back to Idle however the dispatch ends.
struct BusyGuard<'a>(&'a Cell<DispatchState>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(DispatchState::Idle);
    }
}

pub struct Dispatcher<S, C> {
    storage: S,
    provider: C,
    state: Cell<DispatchState>,
}

impl<S: Storage, C: ChatProvider> Dispatcher<S, C> {
    pub fn new(storage: S, provider: C) -> Self {
        Self {
            storage,
            provider,
            state: Cell::new(DispatchState::Idle),
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state.get()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run `action` on `code` for problem `title`.
    ///
    /// `code` is `None` when the page did not answer; the service is then not
    /// contacted. `on_progress` receives the accumulated response after every
    /// increment. Returns the full response once the provider signals
    /// completion.
    pub async fn dispatch(
        &self,
        action: ActionKind,
        code: Option<String>,
        title: &str,
        mut on_progress: impl FnMut(&str),
    ) -> Result<String, ExtensionError> {
        if self.state.get() != DispatchState::Idle {
            return Err(ExtensionError::Busy);
        }
        let code = code.ok_or(ExtensionError::CodeUnavailable)?;

        self.state.set(DispatchState::Busy(action));
        let _guard = BusyGuard(&self.state);

        clear_responses(&self.storage).await?;

        info!("Dispatching '{}' for {}", action.as_str(), title);
        let mut events = self.provider.generate_answer(&build_prompt(action, title, &code));
        let mut response = String::new();
        let mut completed = false;
        while let Some(event) = events.next().await {
            match event? {
                ChatEvent::Answer { data } => {
                    response.push_str(&data.text);
                    on_progress(&response);
                }
                ChatEvent::Done => {
                    completed = true;
                    break;
                }
                ChatEvent::Other => {}
            }
        }
        if !completed {
            warn!("Provider closed the stream without a done event");
        }

        self.persist(action, title, &response).await?;
        debug!("'{}' finished with {} chars", action.as_str(), response.len());
        Ok(response)
    }

    async fn persist(&self, action: ActionKind, title: &str, response: &str) -> Result<(), ExtensionError> {
        for kind in [ActionKind::Analyze, ActionKind::Fix] {
            let text = if kind == action { response } else { "" };
            self.storage.set(kind.response_key(), text).await?;
        }
        self.storage.set(KEY_LAST_ACTION, action.as_str()).await?;
        self.storage.set(KEY_PROBLEM_TITLE, title).await
    }
}

/// Cache the problem shown in the tab titled `tab_title` and return its
/// display title. Dispatches store the same form.
pub async fn remember_problem_tab<S: Storage>(storage: &S, tab_title: &str) -> Result<String, ExtensionError> {
    let title = problem_title_from_tab(tab_title).to_string();
    storage.set(KEY_PROBLEM_TITLE, &title).await?;
    Ok(title)
}

/// Empty both cached responses.
pub async fn clear_responses<S: Storage>(storage: &S) -> Result<(), ExtensionError> {
    storage.set(KEY_FIX_RESPONSE, "").await?;
    storage.set(KEY_ANALYZE_RESPONSE, "").await
}

/// What the popup shows before any new request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopupSnapshot {
    pub analyze_response: String,
    pub fix_response: String,
    pub last_action: Option<ActionKind>,
    pub language: Option<String>,
}

pub async fn restore_snapshot<S: Storage>(storage: &S) -> Result<PopupSnapshot, ExtensionError> {
    let last_action = storage
        .get::<String>(KEY_LAST_ACTION)
        .await?
        .and_then(|a| a.parse().ok());
    Ok(PopupSnapshot {
        analyze_response: storage.get(KEY_ANALYZE_RESPONSE).await?.unwrap_or_default(),
        fix_response: storage.get(KEY_FIX_RESPONSE).await?.unwrap_or_default(),
        last_action,
        language: storage.get(KEY_LANGUAGE).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::chat::{AnswerDelta, ChatStream};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::stream;
    use std::cell::RefCell;

    fn answer(text: &str) -> Result<ChatEvent, ExtensionError> {
        Ok(ChatEvent::Answer {
            data: AnswerDelta { text: text.into() },
        })
    }

    #[derive(Default)]
    struct ScriptedProvider {
        events: Vec<Result<ChatEvent, ExtensionError>>,
        prompts: RefCell<Vec<String>>,
        release: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl ScriptedProvider {
        fn new(events: Vec<Result<ChatEvent, ExtensionError>>) -> Self {
            Self {
                events,
                ..Default::default()
            }
        }
    }

    impl ChatProvider for ScriptedProvider {
        fn generate_answer(&self, prompt: &str) -> ChatStream {
            self.prompts.borrow_mut().push(prompt.to_string());
            let scripted = stream::iter(self.events.clone());
            match self.release.borrow_mut().take() {
                // Hold the final done event until released.
                Some(release) => scripted
                    .chain(stream::once(async move {
                        let _ = release.await;
                        Ok(ChatEvent::Done)
                    }))
                    .boxed_local(),
                None => scripted.boxed_local(),
            }
        }
    }

    #[test]
    fn streams_increments_and_persists_on_done() {
        let provider = ScriptedProvider::new(vec![answer("O(n) time"), answer(", O(1) space"), Ok(ChatEvent::Done)]);
        let dispatcher = Dispatcher::new(MemoryStorage::new(), provider);
        let mut seen = Vec::new();

        let response = block_on(dispatcher.dispatch(
            ActionKind::Analyze,
            Some("return 1".into()),
            "Two Sum",
            |text| seen.push(text.to_string()),
        ))
        .unwrap();

        assert_eq!(response, "O(n) time, O(1) space");
        assert_eq!(seen, vec!["O(n) time", "O(n) time, O(1) space"]);
        assert_eq!(dispatcher.state(), DispatchState::Idle);

        let snapshot = block_on(restore_snapshot(dispatcher.storage())).unwrap();
        assert_eq!(snapshot.analyze_response, "O(n) time, O(1) space");
        assert_eq!(snapshot.fix_response, "");
        assert_eq!(snapshot.last_action, Some(ActionKind::Analyze));
        let title = block_on(dispatcher.storage().get::<String>(KEY_PROBLEM_TITLE)).unwrap();
        assert_eq!(title.as_deref(), Some("Two Sum"));
    }

    #[test]
    fn prompt_names_problem_and_carries_code() {
        let provider = ScriptedProvider::new(vec![Ok(ChatEvent::Done)]);
        let dispatcher = Dispatcher::new(MemoryStorage::new(), provider);
        block_on(dispatcher.dispatch(ActionKind::Fix, Some("def f(): pass".into()), "Two Sum", |_| {})).unwrap();

        let prompts = dispatcher.provider.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(
            "As an expert software engineer, you are provided the following code for the Leetcode problem titled Two Sum.\n"
        ));
        assert!(prompts[0].contains("identify and rectify any bugs"));
        assert!(prompts[0].ends_with("\n Heres the code \ndef f(): pass"));
    }

    #[test]
    fn both_instructions_start_on_their_own_line() {
        let preamble = "titled Two Sum.\n\n";
        assert!(build_prompt(ActionKind::Analyze, "Two Sum", "x").contains(&format!("{}Your task", preamble)));
        assert!(build_prompt(ActionKind::Fix, "Two Sum", "x").contains(&format!("{}Depending", preamble)));
    }

    #[test]
    fn problem_title_is_cached_in_display_form() {
        let storage = MemoryStorage::new();
        let title = block_on(remember_problem_tab(&storage, "Two Sum - LeetCode")).unwrap();
        assert_eq!(title, "Two Sum");

        let provider = ScriptedProvider::new(vec![Ok(ChatEvent::Done)]);
        let dispatcher = Dispatcher::new(storage, provider);
        let before = block_on(dispatcher.storage().get::<String>(KEY_PROBLEM_TITLE)).unwrap();
        block_on(dispatcher.dispatch(ActionKind::Analyze, Some("x".into()), &title, |_| {})).unwrap();
        let after = block_on(dispatcher.storage().get::<String>(KEY_PROBLEM_TITLE)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn missing_code_never_reaches_the_provider() {
        let provider = ScriptedProvider::new(vec![answer("unused"), Ok(ChatEvent::Done)]);
        let dispatcher = Dispatcher::new(MemoryStorage::new(), provider);

        let result = block_on(dispatcher.dispatch(ActionKind::Fix, None, "Two Sum", |_| {}));
        assert_eq!(result, Err(ExtensionError::CodeUnavailable));
        assert!(dispatcher.provider.prompts.borrow().is_empty());
        assert_eq!(dispatcher.state(), DispatchState::Idle);
        assert!(dispatcher.storage().is_empty());
    }

    #[test]
    fn second_dispatch_is_rejected_while_streaming() {
        let (release, held) = oneshot::channel();
        let provider = ScriptedProvider::new(vec![answer("partial")]);
        *provider.release.borrow_mut() = Some(held);
        let dispatcher = Dispatcher::new(MemoryStorage::new(), provider);

        let (first, second) = block_on(async {
            futures::join!(
                dispatcher.dispatch(ActionKind::Analyze, Some("x".into()), "Two Sum", |_| {}),
                async {
                    assert_eq!(dispatcher.state(), DispatchState::Busy(ActionKind::Analyze));
                    let rejected = dispatcher.dispatch(ActionKind::Fix, Some("y".into()), "Two Sum", |_| {}).await;
                    let _ = release.send(());
                    rejected
                }
            )
        });

        assert_eq!(first.unwrap(), "partial");
        assert_eq!(second, Err(ExtensionError::Busy));
        assert_eq!(dispatcher.state(), DispatchState::Idle);
    }

    #[test]
    fn provider_failure_returns_to_idle() {
        let provider = ScriptedProvider::new(vec![answer("half"), Err(ExtensionError::Unauthorized)]);
        let dispatcher = Dispatcher::new(MemoryStorage::new(), provider);

        let err = block_on(dispatcher.dispatch(ActionKind::Fix, Some("x".into()), "Two Sum", |_| {})).unwrap_err();
        assert!(err.requires_login());
        assert_eq!(dispatcher.state(), DispatchState::Idle);
        // Nothing recorded as the last action.
        let last = block_on(dispatcher.storage().get::<String>(KEY_LAST_ACTION)).unwrap();
        assert_eq!(last, None);
    }

    #[test]
    fn snapshot_ignores_unknown_last_action() {
        let storage = MemoryStorage::new();
        block_on(async {
            storage.set(KEY_LAST_ACTION, "explain").await.unwrap();
            storage.set(KEY_LANGUAGE, "python").await.unwrap();
        });
        let snapshot = block_on(restore_snapshot(&storage)).unwrap();
        assert_eq!(snapshot.last_action, None);
        assert_eq!(snapshot.language.as_deref(), Some("python"));
        assert_eq!(snapshot.analyze_response, "");
    }
}
