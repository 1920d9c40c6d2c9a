use serde::{Deserialize, Serialize};
use std::fmt;
use wasm_bindgen::prelude::*;

pub mod cache;
pub mod carousel;
pub mod chat;
pub mod chrome;
pub mod company;
pub mod components;
pub mod config;
pub mod dispatcher;
pub mod dom;
pub mod hooks;
pub mod messages;
pub mod utils;

/// One solution video attached to a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub embedded_url: String,
    pub channel: String,
}

/// Per-company frequency score attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyScore {
    pub name: String,
    pub score: f64,
}

/// A question as stored in the cached dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    #[serde(default)]
    pub frontend_id: u32,
    #[serde(default)]
    pub companies: Option<Vec<CompanyScore>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub videos: Vec<Video>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Contents of the `leetcodeProblems` cache entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemDataset {
    pub questions: Vec<Question>,
}

impl ProblemDataset {
    /// Exact title lookup.
    pub fn find(&self, title: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.title == title)
    }
}

/// Row of the company problem table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProblem {
    pub id: u32,
    pub title: String,
    pub score: f64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    ById,
    ByTitle,
    #[default]
    ByScore,
}

/// What the user asked the chat service to do with their code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Analyze,
    Fix,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Analyze => "analyze",
            ActionKind::Fix => "fix",
        }
    }

    /// Cache key holding the last response for this action.
    pub fn response_key(&self) -> &'static str {
        match self {
            ActionKind::Analyze => config::KEY_ANALYZE_RESPONSE,
            ActionKind::Fix => config::KEY_FIX_RESPONSE,
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analyze" => Ok(ActionKind::Analyze),
            "fix" => Ok(ActionKind::Fix),
            other => Err(ExtensionError::Data(format!("unknown action '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionError {
    /// Provider rejected the session token.
    Unauthorized,
    /// Provider sits behind a Cloudflare challenge; user must log in again.
    Cloudflare,
    /// The active tab did not answer a `getCode` request.
    CodeUnavailable,
    /// A dispatch is already streaming.
    Busy,
    Storage(String),
    Messaging(String),
    Dom(String),
    Chat(String),
    Data(String),
}

impl ExtensionError {
    /// Classify a raw provider error message.
    pub fn from_provider_message(message: &str) -> Self {
        match message {
            "UNAUTHORIZED" => ExtensionError::Unauthorized,
            "CLOUDFLARE" => ExtensionError::Cloudflare,
            other => ExtensionError::Chat(other.to_string()),
        }
    }

    pub fn from_provider_js(err: JsValue) -> Self {
        Self::from_provider_message(&js_error_message(&err))
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, ExtensionError::Unauthorized | ExtensionError::Cloudflare)
    }
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::Unauthorized => write!(f, "UNAUTHORIZED"),
            ExtensionError::Cloudflare => write!(f, "CLOUDFLARE"),
            ExtensionError::CodeUnavailable => write!(
                f,
                "Unable to retrieve code. Please navigate to a Leetcode problem page and refresh the page."
            ),
            ExtensionError::Busy => write!(f, "A request is already in progress"),
            ExtensionError::Storage(msg) => write!(f, "Storage error: {}", msg),
            ExtensionError::Messaging(msg) => write!(f, "Messaging error: {}", msg),
            ExtensionError::Dom(msg) => write!(f, "DOM error: {}", msg),
            ExtensionError::Chat(msg) => write!(f, "{}", msg),
            ExtensionError::Data(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for ExtensionError {}

impl From<serde_json::Error> for ExtensionError {
    fn from(e: serde_json::Error) -> Self {
        ExtensionError::Data(e.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Data(e.to_string())
    }
}

/// Best-effort text of a thrown JS value.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Install the panic hook and console logger. Called once per extension context.
pub fn init_context() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(config::LOG_LEVEL));
}
