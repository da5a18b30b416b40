//! URL patterns for navigation confirmation.
//!
//! Globs follow the Playwright convention: `**` spans path separators,
//! `*` stays inside one segment, `?` matches a single character.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::result::{HarnessError, HarnessResult};

/// URL pattern for `url-matches` wait conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Glob pattern (e.g., "**/pim/viewPersonalDetails/**")
    Glob(String),
    /// Regex match
    Regex(String),
}

impl UrlPattern {
    /// Create a glob pattern
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Create a substring pattern
    #[must_use]
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self::Contains(pattern.into())
    }

    /// Check if a URL matches this pattern; a pattern that does not
    /// compile matches nothing
    ///
    /// Compiles on every call. Repeated checks should go through
    /// [`compile`](Self::compile).
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        self.compile().is_ok_and(|m| m.is_match(url))
    }

    /// Build a reusable matcher
    pub fn compile(&self) -> HarnessResult<UrlMatcher> {
        let source = match self {
            Self::Exact(p) => return Ok(UrlMatcher::Exact(p.clone())),
            Self::Prefix(p) => return Ok(UrlMatcher::Prefix(p.clone())),
            Self::Contains(p) => return Ok(UrlMatcher::Contains(p.clone())),
            Self::Glob(pattern) => glob_to_regex(pattern),
            Self::Regex(pattern) => pattern.clone(),
        };
        Regex::new(&source)
            .map(UrlMatcher::Regex)
            .map_err(|e| HarnessError::config(format!("invalid URL pattern {self}: {e}")))
    }

    /// Reject patterns that can never match because they do not compile
    pub fn validate(&self) -> HarnessResult<()> {
        self.compile().map(|_| ())
    }
}

/// A [`UrlPattern`] ready to test URLs without recompiling
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    /// Whole URL equality
    Exact(String),
    /// Leading text
    Prefix(String),
    /// Substring
    Contains(String),
    /// Compiled glob or regex
    Regex(Regex),
}

impl UrlMatcher {
    /// Test one URL
    #[must_use]
    pub fn is_match(&self, url: &str) -> bool {
        match self {
            Self::Exact(p) => url == p,
            Self::Prefix(p) => url.starts_with(p.as_str()),
            Self::Contains(p) => url.contains(p.as_str()),
            Self::Regex(re) => re.is_match(url),
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "'{p}'"),
            Self::Prefix(p) => write!(f, "'{p}*'"),
            Self::Contains(p) => write!(f, "'*{p}*'"),
            Self::Glob(p) => write!(f, "'{p}'"),
            Self::Regex(p) => write!(f, "/{p}/"),
        }
    }
}

/// Translate a URL glob into an anchored regex
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PERSONAL_DETAILS: &str =
        "https://opensource-demo.orangehrmlive.com/web/index.php/pim/viewPersonalDetails/empNumber/142";

    #[test]
    fn test_double_star_glob_spans_segments() {
        let pattern = UrlPattern::glob("**/pim/viewPersonalDetails/**");
        assert!(pattern.matches(PERSONAL_DETAILS));
        assert!(!pattern
            .matches("https://opensource-demo.orangehrmlive.com/web/index.php/pim/addEmployee"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let pattern = UrlPattern::glob("https://example.com/*/dashboard");
        assert!(pattern.matches("https://example.com/web/dashboard"));
        assert!(!pattern.matches("https://example.com/web/index.php/dashboard"));
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let pattern = UrlPattern::glob("**/index.php?x=1");
        assert!(pattern.matches("https://a/index.php?x=1"));
        assert!(!pattern.matches("https://a/indexXphp?x=1"));
    }

    #[test]
    fn test_simple_patterns() {
        assert!(UrlPattern::Exact("https://a/b".into()).matches("https://a/b"));
        assert!(!UrlPattern::Exact("https://a/b".into()).matches("https://a/b/"));
        assert!(UrlPattern::Prefix("https://a".into()).matches("https://a/b"));
        assert!(UrlPattern::contains("viewAdminModule").matches("https://a/viewAdminModule"));
        assert!(UrlPattern::Regex(r"empNumber/\d+$".into()).matches(PERSONAL_DETAILS));
    }

    #[test]
    fn test_invalid_regex_never_matches_and_fails_validation() {
        let pattern = UrlPattern::Regex("(unclosed".into());
        assert!(!pattern.matches("anything"));
        assert!(pattern.validate().is_err());
        assert!(UrlPattern::glob("**/ok/**").validate().is_ok());
    }

    #[test]
    fn test_yaml_form_inside_wait() {
        let wait: crate::wait::WaitCondition =
            serde_yaml_ng::from_str("url_matches: { glob: \"**/pim/viewPersonalDetails/**\" }")
                .unwrap();
        assert_eq!(
            wait.condition,
            crate::wait::Condition::UrlMatches(UrlPattern::glob("**/pim/viewPersonalDetails/**"))
        );
    }

    #[test]
    fn test_compiled_matcher_agrees_with_pattern() {
        let urls = [
            PERSONAL_DETAILS,
            "https://opensource-demo.orangehrmlive.com/web/index.php/pim/addEmployee",
        ];
        for pattern in [
            UrlPattern::glob("**/pim/viewPersonalDetails/**"),
            UrlPattern::Regex(r"empNumber/\d+$".into()),
            UrlPattern::Prefix("https://opensource-demo".into()),
            UrlPattern::contains("addEmployee"),
        ] {
            let matcher = pattern.compile().unwrap();
            for url in urls {
                assert_eq!(matcher.is_match(url), pattern.matches(url), "{pattern} vs {url}");
            }
        }
    }

    #[test]
    fn test_compile_rejects_bad_regex() {
        let err = UrlPattern::Regex("(unclosed".into()).compile().unwrap_err();
        assert!(err.to_string().contains("invalid URL pattern"));
    }

    proptest! {
        #[test]
        fn prop_literal_glob_matches_itself(s in "[a-zA-Z0-9/:._-]{0,40}") {
            prop_assert!(UrlPattern::glob(s.clone()).matches(&s));
        }

        #[test]
        fn prop_double_star_suffix_matches_any_tail(
            prefix in "[a-z/]{0,20}",
            tail in "[a-zA-Z0-9/?=&.]{0,30}",
        ) {
            let pattern = UrlPattern::glob(format!("{prefix}**"));
            let url = format!("{prefix}{tail}");
            prop_assert!(pattern.matches(&url));
        }
    }
}
