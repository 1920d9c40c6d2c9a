//! Messages exchanged between the background worker, content script and popup.
//!
//! Tab notifications are discriminated by an `action` field, requests by a
//! `type` field; both shapes arrive on the same `onMessage` channel.

use crate::utils::is_problem_url;
use serde::{Deserialize, Serialize};

/// Notifications pushed to a problem tab or the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum TabNotice {
    /// Ask the content script to show videos for `title` (raw tab title).
    #[serde(rename = "addVideo")]
    AddVideo { title: String },
    /// Tell the popup which page is active.
    #[serde(rename = "setTabInfo")]
    SetTabInfo { url: String, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Popup → content script; answered with [`CodeReply`].
    #[serde(rename = "getCode")]
    GetCode,
    /// Popup → background; opens the chat provider login page.
    #[serde(rename = "OPEN_LOGIN_PAGE")]
    OpenLoginPage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeReply {
    pub data: String,
}

/// Anything a listener may receive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Incoming {
    Notice(TabNotice),
    Request(Request),
}

impl Incoming {
    /// Decode a listener payload; unknown messages yield `None`.
    pub fn from_js(value: wasm_bindgen::JsValue) -> Option<Self> {
        serde_wasm_bindgen::from_value(value).ok()
    }
}

/// Notices to send after a tab update: once a problem page has finished
/// loading, its content script shows videos and the popup learns the title.
pub fn notices_for_tab_update(status: Option<&str>, url: &str, title: &str) -> Option<(TabNotice, TabNotice)> {
    if status != Some("complete") || !is_problem_url(url) {
        return None;
    }
    Some((
        TabNotice::AddVideo {
            title: title.to_string(),
        },
        TabNotice::SetTabInfo {
            url: url.to_string(),
            title: title.to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shapes_match_the_extension_protocol() {
        assert_eq!(
            serde_json::to_value(TabNotice::AddVideo { title: "Two Sum - LeetCode".into() }).unwrap(),
            json!({"action": "addVideo", "title": "Two Sum - LeetCode"})
        );
        assert_eq!(serde_json::to_value(Request::GetCode).unwrap(), json!({"type": "getCode"}));
        assert_eq!(
            serde_json::to_value(Request::OpenLoginPage).unwrap(),
            json!({"type": "OPEN_LOGIN_PAGE"})
        );
    }

    #[test]
    fn incoming_dispatches_on_either_discriminator() {
        let notice: Incoming = serde_json::from_value(json!({
            "action": "setTabInfo",
            "url": "https://leetcode.com/problems/two-sum/",
            "title": "Two Sum - LeetCode"
        }))
        .unwrap();
        assert!(matches!(notice, Incoming::Notice(TabNotice::SetTabInfo { .. })));

        let request: Incoming = serde_json::from_value(json!({"type": "getCode"})).unwrap();
        assert_eq!(request, Incoming::Request(Request::GetCode));

        assert!(serde_json::from_value::<Incoming>(json!({"type": "ping"})).is_err());
    }

    #[test]
    fn code_reply_carries_text_in_data() {
        let reply: CodeReply = serde_json::from_value(json!({"data": "class Solution {}"})).unwrap();
        assert_eq!(reply.data, "class Solution {}");
    }

    #[test]
    fn only_finished_problem_pages_produce_notices() {
        let url = "https://leetcode.com/problems/two-sum/";
        let (add, info) = notices_for_tab_update(Some("complete"), url, "Two Sum - LeetCode").unwrap();
        assert_eq!(add, TabNotice::AddVideo { title: "Two Sum - LeetCode".into() });
        assert_eq!(
            info,
            TabNotice::SetTabInfo {
                url: url.into(),
                title: "Two Sum - LeetCode".into()
            }
        );

        assert!(notices_for_tab_update(Some("loading"), url, "Two Sum").is_none());
        assert!(notices_for_tab_update(None, url, "Two Sum").is_none());
        assert!(notices_for_tab_update(Some("complete"), "https://leetcode.com/", "LeetCode").is_none());
    }
}
