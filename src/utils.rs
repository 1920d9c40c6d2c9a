use crate::config::PROBLEMS_BASE_URL;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

// ECMAScript `\s`: includes U+FEFF, excludes U+0085.
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\t\n\x{0B}\x{0C}\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]")
        .unwrap()
});
static PROBLEM_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://leetcode\.com/problems/.*/?").unwrap());

/// Link to a problem page derived from its title.
///
/// Every whitespace character is replaced by `-` individually, so runs of
/// spaces produce runs of dashes. Nothing else is escaped.
///
/// # Examples
/// ```
/// use leetcode_assistant::utils::problem_url;
/// assert_eq!(problem_url("Two Sum"), "https://leetcode.com/problems/Two-Sum/");
/// ```
pub fn problem_url(title: &str) -> String {
    format!("{}{}/", PROBLEMS_BASE_URL, WHITESPACE_REGEX.replace_all(title, "-"))
}

/// Problem title from a tab title such as `"Two Sum - LeetCode"`.
pub fn problem_title_from_tab(tab_title: &str) -> &str {
    tab_title.split('-').next().unwrap_or_default().trim()
}

/// Whether `url` points at a problem page (used for `setTabInfo`).
pub fn is_problem_url(url: &str) -> bool {
    PROBLEM_URL_REGEX.is_match(url)
}

/// Prism grammar name for an editor language label (`"Python3"` → `"python"`).
pub fn prism_language(label: &str) -> String {
    let label = label.trim().to_lowercase();
    match label.as_str() {
        "c++" => "cpp".to_string(),
        "c#" => "csharp".to_string(),
        "python" | "python3" => "python".to_string(),
        "golang" => "go".to_string(),
        _ => label.replace(char::is_whitespace, ""),
    }
}

/// Locale-aware title comparison.
#[cfg(target_arch = "wasm32")]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let ord = js_sys::JsString::from(a).locale_compare(b, &js_sys::Array::new(), &js_sys::Object::new());
    ord.cmp(&0)
}

/// Locale-aware title comparison.
///
/// Outside the browser there is no collator, so this approximates the default
/// one: letters compare case-insensitively first and lowercase sorts before
/// uppercase on ties.
#[cfg(not(target_arch = "wasm32"))]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_replaces_each_whitespace_character() {
        assert_eq!(problem_url("Two Sum"), "https://leetcode.com/problems/Two-Sum/");
        assert_eq!(
            problem_url("Add   Numbers"),
            "https://leetcode.com/problems/Add---Numbers/"
        );
        assert_eq!(problem_url("A\tB"), "https://leetcode.com/problems/A-B/");
        assert_eq!(problem_url("A\u{a0}B"), "https://leetcode.com/problems/A-B/");
        // Other characters pass through untouched.
        assert_eq!(
            problem_url("Pow(x, n)"),
            "https://leetcode.com/problems/Pow(x,-n)/"
        );
    }

    #[test]
    fn url_whitespace_follows_browser_regex_class() {
        assert_eq!(problem_url("A\u{feff}B"), "https://leetcode.com/problems/A-B/");
        assert_eq!(problem_url("A\u{3000}B"), "https://leetcode.com/problems/A-B/");
        assert_eq!(problem_url("A\u{85}B"), "https://leetcode.com/problems/A\u{85}B/");
        assert_eq!(problem_url("A\u{200b}B"), "https://leetcode.com/problems/A\u{200b}B/");
    }

    #[test]
    fn tab_title_is_cut_at_first_dash() {
        assert_eq!(problem_title_from_tab("Two Sum - LeetCode"), "Two Sum");
        assert_eq!(problem_title_from_tab("Two Sum"), "Two Sum");
        assert_eq!(problem_title_from_tab(""), "");
    }

    #[test]
    fn problem_url_pattern() {
        assert!(is_problem_url("https://leetcode.com/problems/two-sum/"));
        assert!(is_problem_url("https://leetcode.com/problems/"));
        assert!(!is_problem_url("http://leetcode.com/problems/two-sum/"));
        assert!(!is_problem_url("https://leetcode.com/contest/"));
    }

    #[test]
    fn editor_labels_map_to_prism_grammars() {
        assert_eq!(prism_language("Python3"), "python");
        assert_eq!(prism_language(" C++ "), "cpp");
        assert_eq!(prism_language("C#"), "csharp");
        assert_eq!(prism_language("JavaScript"), "javascript");
        assert_eq!(prism_language("Golang"), "go");
    }

    #[test]
    fn title_comparison_ignores_case_first() {
        assert_eq!(compare_titles("Add Two Numbers", "Two Sum"), Ordering::Less);
        assert_eq!(compare_titles("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_titles("a", "A"), Ordering::Less);
        assert_eq!(compare_titles("Same", "Same"), Ordering::Equal);
    }
}
