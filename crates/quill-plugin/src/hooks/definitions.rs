//! Hook names and the argument bag passed to every handler.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque hook identifier, namespaced by domain with a dot (`markup.text`).
///
/// The associated constants name the hook points the content pipeline and
/// the registries fire; plugins are free to define their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HookName(Cow<'static, str>);

impl HookName {
    // ── Markup ──
    /// Filter applied to a post body before it is rendered.
    pub const MARKUP_TEXT: Self = Self::from_static("markup.text");
    /// Filter applied to the excerpt shown on index pages.
    pub const MARKUP_EXCERPT: Self = Self::from_static("markup.excerpt");

    // ── Posts ──
    /// Action fired after a post is published.
    pub const POST_PUBLISHED: Self = Self::from_static("post.published");

    // ── Comments ──
    /// Filter applied to a comment body before it is stored.
    pub const COMMENT_BEFORE_SAVE: Self = Self::from_static("comment.before_save");
    /// Action fired after a comment is stored.
    pub const COMMENT_SAVED: Self = Self::from_static("comment.saved");

    // ── Registry lifecycle ──
    /// Action fired after a plugin or feather is activated.
    pub const PLUGIN_ACTIVATED: Self = Self::from_static("plugin.activated");
    /// Action fired after a plugin or feather is deactivated.
    pub const PLUGIN_DEACTIVATED: Self = Self::from_static("plugin.deactivated");

    // ── Runtime ──
    /// Action fired once every enabled plugin has been activated.
    pub const RUNTIME_STARTED: Self = Self::from_static("runtime.started");
    /// Action fired before plugins are deactivated at shutdown.
    pub const RUNTIME_SHUTDOWN: Self = Self::from_static("runtime.shutdown");

    /// Build a hook name from a string literal without allocating.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HookName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HookName {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_string()))
    }
}

impl From<String> for HookName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&HookName> for HookName {
    fn from(name: &HookName) -> Self {
        name.clone()
    }
}

/// Context passed alongside every action and filter invocation.
///
/// A flexible key/value bag so hook points can carry whatever context they
/// need (post id, author, feather slug) without a type per hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookArgs {
    /// Named context values.
    pub data: HashMap<String, Value>,
    /// Identifier of the user who triggered the hook, if any.
    pub actor: Option<String>,
    /// When the hook was fired.
    pub timestamp: Option<DateTime<Utc>>,
}

impl HookArgs {
    /// Create an empty argument bag stamped with the current time.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            actor: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Insert an arbitrary JSON value.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Insert a string value.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_data(key, Value::from(value))
    }

    /// Insert an integer value.
    pub fn with_int(self, key: &str, value: i64) -> Self {
        self.with_data(key, Value::from(value))
    }

    /// Insert a boolean value.
    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.with_data(key, Value::from(value))
    }

    /// Raw value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// String value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Integer value by key.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(|v| v.as_i64())
    }

    /// Boolean value by key.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(|v| v.as_bool())
    }
}
