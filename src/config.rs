//! Application-level configuration constants.

// Cache keys (chrome.storage.local)
pub const KEY_PROBLEMS: &str = "leetcodeProblems";
pub const KEY_ANALYZE_RESPONSE: &str = "analyzeCodeResponse";
pub const KEY_FIX_RESPONSE: &str = "fixCodeResponse";
pub const KEY_LAST_ACTION: &str = "lastAction";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_PROBLEM_TITLE: &str = "currentLeetCodeProblemTitle";
pub const KEY_CLICKED_COMPANY: &str = "clickedCompany";

// Host page
pub const PROBLEMS_BASE_URL: &str = "https://leetcode.com/problems/";
pub const PROBLEM_URL_FRAGMENT: &str = "leetcode.com/problems";
pub const SOLUTIONS_TAB_SELECTOR: &str = "div.w-full.flex-col.overflow-auto";
pub const SOLUTIONS_TAB_INDEX: u32 = 1;
pub const EDITOR_LINE_SELECTOR: &str = ".view-lines .view-line";
pub const LANGUAGE_BUTTON_SELECTOR: &str = "button[id^='headlessui-listbox-button']";

// Carousel
pub const VIDEO_CONTAINER_CLASS: &str = "video-container";
pub const VIDEO_FRAME_CLASS: &str = "youtube-video";
pub const VIDEO_ASPECT_RATIO_PCT: f64 = 56.25; // 16:9
pub const VIDEO_FRAME_TOP: &str = "50px";

// Popup
pub const CODE_UNAVAILABLE_MSG_MS: u32 = 5_000;
pub const SETTINGS_PAGE: &str = "settings.html";
pub const LOGIN_PAGE_URL: &str = "https://chat.openai.com";

// Company page
pub const DEFAULT_COMPANY: &str = "Amazon";

// Background
pub const DATASET_PATH: &str = "data/leetcode_problems.json";

pub const LOG_LEVEL: log::Level = log::Level::Debug;
