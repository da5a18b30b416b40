//! Locator Resolver: logical UI targets mapped to lookup strategies.
//!
//! A [`Locator`] names a target ("the username field") and says how to find
//! it: by attribute, by accessible role and label, by CSS class, or by a raw
//! CSS selector. Locators hold no element handles; every use renders a fresh
//! page-side query, so nothing survives a navigation or re-render.
//!
//! ```
//! use sendero::{Locator, Locators};
//!
//! let mut targets = Locators::new();
//! targets
//!     .insert(Locator::attribute("username", "input", "name", "username"))
//!     .insert(Locator::role("add", "button", "Add"));
//!
//! assert_eq!(targets.get("username").unwrap().to_string(), r#"input[name="username"]"#);
//! assert_eq!(targets.get("add").unwrap().to_string(), r#"role=button[name="Add"]"#);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::result::{HarnessError, HarnessResult};

/// How an attribute value is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrMatch {
    /// `[attr="value"]`
    #[default]
    Equals,
    /// `[attr*="value"]`
    Contains,
}

/// Resolution strategy for a locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Element identified by an attribute, e.g. `input[name="username"]`
    Attribute {
        /// Optional tag name restriction
        #[serde(default)]
        tag: Option<String>,
        /// Attribute name
        attribute: String,
        /// Attribute value
        value: String,
        /// Comparison mode
        #[serde(default)]
        matching: AttrMatch,
    },
    /// Element identified by accessible role and visible label
    Role {
        /// ARIA role (button, link, textbox, ...)
        role: String,
        /// Accessible name; case-insensitive substring unless `exact`
        #[serde(default)]
        name: Option<String>,
        /// Require the whole accessible name to match
        #[serde(default)]
        exact: bool,
    },
    /// Element identified by a CSS class
    Class {
        /// Optional tag name restriction
        #[serde(default)]
        tag: Option<String>,
        /// Class name without the leading dot
        class: String,
    },
    /// Raw CSS selector
    Css(String),
}

impl Strategy {
    /// CSS selector equivalent, if the strategy has one
    #[must_use]
    pub fn css_selector(&self) -> Option<String> {
        match self {
            Self::Attribute {
                tag,
                attribute,
                value,
                matching,
            } => {
                let op = match matching {
                    AttrMatch::Equals => "=",
                    AttrMatch::Contains => "*=",
                };
                Some(format!(
                    "{}[{attribute}{op}\"{}\"]",
                    tag.as_deref().unwrap_or(""),
                    escape_css_string(value)
                ))
            }
            Self::Class { tag, class } => {
                Some(format!("{}.{class}", tag.as_deref().unwrap_or("")))
            }
            Self::Css(selector) => Some(selector.clone()),
            Self::Role { .. } => None,
        }
    }

    /// Page-side expression that finds the first match below `root`
    fn lookup_js(&self, root: &str) -> String {
        if let Some(selector) = self.css_selector() {
            return format!("{root}.querySelector({})", js_string(&selector));
        }
        let Self::Role { role, name, exact } = self else {
            return "null".to_string();
        };
        let candidates = format!(
            "Array.from({root}.querySelectorAll({}))",
            js_string(&role_selector(role))
        );
        match name {
            None => format!("({candidates}[0] || null)"),
            Some(name) => {
                let test = if *exact {
                    format!("n === {}", js_string(name))
                } else {
                    format!("n.toLowerCase().includes({})", js_string(&name.to_lowercase()))
                };
                format!(
                    "({candidates}.find(el => {{ \
                     const n = (el.getAttribute('aria-label') || el.innerText || el.value || '').trim(); \
                     return {test}; }}) || null)"
                )
            }
        }
    }
}

/// Elements that carry an ARIA role implicitly or explicitly
fn role_selector(role: &str) -> String {
    let implicit = match role {
        "button" => {
            "button, input[type=\"button\"], input[type=\"submit\"], input[type=\"reset\"], "
        }
        "link" => "a[href], ",
        "textbox" => {
            "input:not([type]), input[type=\"text\"], input[type=\"email\"], \
             input[type=\"search\"], input[type=\"tel\"], input[type=\"url\"], textarea, "
        }
        "checkbox" => "input[type=\"checkbox\"], ",
        "heading" => "h1, h2, h3, h4, h5, h6, ",
        _ => "",
    };
    format!("{implicit}[role=\"{}\"]", escape_css_string(role))
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Encode a Rust string as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// A logical UI target and the strategy used to find it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    /// Logical name used in logs ("username field")
    #[serde(default)]
    pub name: String,
    /// How to find the element
    #[serde(flatten)]
    pub strategy: Strategy,
    /// Scoping parent; the lookup only searches inside its first match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<Box<Locator>>,
}

impl Locator {
    /// Create a locator from a strategy
    #[must_use]
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            strategy,
            within: None,
        }
    }

    /// `tag[attribute="value"]`
    #[must_use]
    pub fn attribute(
        name: impl Into<String>,
        tag: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            Strategy::Attribute {
                tag: Some(tag.into()),
                attribute: attribute.into(),
                value: value.into(),
                matching: AttrMatch::Equals,
            },
        )
    }

    /// `tag[attribute*="value"]`
    #[must_use]
    pub fn attribute_contains(
        name: impl Into<String>,
        tag: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            Strategy::Attribute {
                tag: Some(tag.into()),
                attribute: attribute.into(),
                value: value.into(),
                matching: AttrMatch::Contains,
            },
        )
    }

    /// Accessible role with a visible label
    #[must_use]
    pub fn role(name: impl Into<String>, role: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            Strategy::Role {
                role: role.into(),
                name: Some(label.into()),
                exact: false,
            },
        )
    }

    /// `.class`, optionally restricted to a tag
    #[must_use]
    pub fn class(name: impl Into<String>, tag: Option<&str>, class: impl Into<String>) -> Self {
        Self::new(
            name,
            Strategy::Class {
                tag: tag.map(str::to_string),
                class: class.into(),
            },
        )
    }

    /// Raw CSS selector
    #[must_use]
    pub fn css(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, Strategy::Css(selector.into()))
    }

    /// Scope the lookup to the inside of `parent`
    #[must_use]
    pub fn within(mut self, parent: Self) -> Self {
        self.within = Some(Box::new(parent));
        self
    }

    /// Require the accessible name to match exactly (role locators only)
    #[must_use]
    pub fn exact(mut self) -> Self {
        if let Strategy::Role { ref mut exact, .. } = self.strategy {
            *exact = true;
        }
        self
    }

    /// Human-readable label: the logical name, or the selector when unnamed
    #[must_use]
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.to_string()
        } else {
            self.name.clone()
        }
    }

    /// Page-side JavaScript expression evaluating to the element or `null`
    #[must_use]
    pub fn query_js(&self) -> String {
        match &self.within {
            None => self.strategy.lookup_js("document"),
            Some(parent) => format!(
                "(() => {{ const root = {}; return root ? {} : null; }})()",
                parent.query_js(),
                self.strategy.lookup_js("root")
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(parent) = &self.within {
            write!(f, "{parent} >> ")?;
        }
        match &self.strategy {
            Strategy::Role { role, name, exact } => match name {
                Some(name) if *exact => write!(f, "role={role}[name=\"{name}\" s]"),
                Some(name) => write!(f, "role={role}[name=\"{name}\"]"),
                None => write!(f, "role={role}"),
            },
            other => match other.css_selector() {
                Some(selector) => f.write_str(&selector),
                None => Ok(()),
            },
        }
    }
}

/// Registry mapping logical target names to locators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locators {
    targets: BTreeMap<String, Locator>,
}

impl Locators {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locator under its own name
    pub fn insert(&mut self, locator: Locator) -> &mut Self {
        self.targets.insert(locator.name.clone(), locator);
        self
    }

    /// Look up a target by logical name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Locator> {
        self.targets.get(name)
    }

    /// Look up a target, failing with a configuration error naming the known targets
    pub fn resolve(&self, name: &str) -> HarnessResult<Locator> {
        self.get(name).cloned().ok_or_else(|| {
            let known: Vec<&str> = self.targets.keys().map(String::as_str).collect();
            HarnessError::config(format!(
                "unknown target '{name}' (known: {})",
                known.join(", ")
            ))
        })
    }

    /// Names of all registered targets
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Number of registered targets
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Fill in each locator's name from its registry key
    pub(crate) fn name_from_keys(&mut self) {
        for (key, locator) in &mut self.targets {
            if locator.name.is_empty() {
                locator.name.clone_from(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod rendering_tests {
        use super::*;
        use crate::locator::Strategy;

        #[test]
        fn test_attribute_selector() {
            let loc = Locator::attribute("username", "input", "name", "username");
            assert_eq!(loc.to_string(), r#"input[name="username"]"#);
            assert_eq!(
                loc.query_js(),
                r#"document.querySelector("input[name=\"username\"]")"#
            );
        }

        #[test]
        fn test_attribute_contains_selector() {
            let loc = Locator::attribute_contains("admin", "a", "href", "viewAdminModule");
            assert_eq!(loc.to_string(), r#"a[href*="viewAdminModule"]"#);
        }

        #[test]
        fn test_class_selector() {
            let loc = Locator::class("profile", Some("span"), "oxd-userdropdown-tab");
            assert_eq!(loc.to_string(), "span.oxd-userdropdown-tab");
            assert_eq!(Locator::class("t", None, "oxd-table-header").to_string(), ".oxd-table-header");
        }

        #[test]
        fn test_role_query_filters_by_accessible_name() {
            let loc = Locator::role("save", "button", "Save");
            let js = loc.query_js();
            assert!(js.contains("input[type=\\\"submit\\\"]"));
            assert!(js.contains("aria-label"));
            assert!(js.contains(r#"n.toLowerCase().includes("save")"#));
        }

        #[test]
        fn test_exact_role_uses_strict_equality() {
            let loc = Locator::role("save", "button", "Save").exact();
            assert!(loc.query_js().contains(r#"n === "Save""#));
            assert_eq!(loc.to_string(), r#"role=button[name="Save" s]"#);
        }

        #[test]
        fn test_unknown_role_uses_explicit_role_attribute() {
            let loc = Locator::new(
                "tabs",
                Strategy::Role {
                    role: "tablist".into(),
                    name: None,
                    exact: false,
                },
            );
            assert!(loc.query_js().contains(r#"[role=\"tablist\"]"#));
            assert_eq!(loc.to_string(), "role=tablist");
        }

        #[test]
        fn test_scoped_locator_searches_inside_parent() {
            let form = Locator::class("form", Some("form"), "oxd-form");
            let loc = Locator::attribute("first", "input", "name", "firstName").within(form);
            assert_eq!(loc.to_string(), r#"form.oxd-form >> input[name="firstName"]"#);
            let js = loc.query_js();
            assert!(js.starts_with("(() => { const root = document.querySelector("));
            assert!(js.contains("root.querySelector("));
        }

        #[test]
        fn test_quotes_are_escaped() {
            let loc = Locator::attribute("odd", "input", "placeholder", "say \"hi\"");
            assert_eq!(loc.to_string(), r#"input[placeholder="say \"hi\""]"#);
        }

        #[test]
        fn test_label_falls_back_to_selector() {
            assert_eq!(Locator::css("", "#x").label(), "#x");
            assert_eq!(Locator::css("thing", "#x").label(), "thing");
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_resolve_known_and_unknown() {
            let mut targets = Locators::new();
            targets.insert(Locator::css("side panel", ".oxd-sidepanel"));
            assert_eq!(targets.len(), 1);
            assert!(targets.resolve("side panel").is_ok());

            let err = targets.resolve("missing").unwrap_err();
            assert!(err.to_string().contains("side panel"));
        }

        #[test]
        fn test_yaml_registry_names_from_keys() {
            let yaml = r#"
username:
  attribute: { tag: input, attribute: name, value: username }
add:
  role: { role: button, name: Add }
profile:
  class: { tag: span, class: oxd-userdropdown-tab }
first_name:
  css: "input[name=firstName]"
  within:
    class: { class: orangehrm-card-container }
"#;
            let mut targets: Locators = serde_yaml_ng::from_str(yaml).unwrap();
            targets.name_from_keys();
            assert_eq!(targets.len(), 4);
            assert_eq!(targets.get("add").unwrap().name, "add");
            assert_eq!(
                targets.get("first_name").unwrap().to_string(),
                ".orangehrm-card-container >> input[name=firstName]"
            );
            let names: Vec<&str> = targets.names().collect();
            assert_eq!(names, vec!["add", "first_name", "profile", "username"]);
        }
    }

    proptest! {
        #[test]
        fn prop_css_strategies_render_single_query(value in "[ -~]{0,24}") {
            let loc = Locator::attribute("t", "input", "name", value);
            let js = loc.query_js();
            prop_assert!(js.starts_with("document.querySelector(\""));
            prop_assert!(js.ends_with("\")"));
        }
    }
}
