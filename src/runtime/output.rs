//! Output value filters
//!
//! Templates pass attribute values through [`OutputFilters`] before using them.
//! A filter is looked up by the field's control type; control types without a
//! registered resolver pass their value through unchanged. The `user` control
//! stores a login name and resolves it to a user record or display name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Control type resolved through a [`UserDirectory`]
pub const USER_CONTROL: &str = "user";

/// Text shown for an echoed `true`
pub const ECHO_TRUE: &str = "Yes";

/// Text shown for an echoed `false`
pub const ECHO_FALSE: &str = "No";

/// A resolved output value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// A plain JSON value; `false` doubles as the "not found" sentinel
    Value(JsonValue),
    /// A user record resolved from a `user` control
    User(UserRecord),
}

impl OutputValue {
    /// The "not found" sentinel
    pub fn absent() -> Self {
        OutputValue::Value(JsonValue::Bool(false))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, OutputValue::Value(JsonValue::Bool(false)))
    }

    /// The plain value, if this is not a user record
    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            OutputValue::Value(value) => Some(value),
            OutputValue::User(_) => None,
        }
    }

    /// The user record, if this is one
    pub fn as_user(&self) -> Option<&UserRecord> {
        match self {
            OutputValue::User(user) => Some(user),
            OutputValue::Value(_) => None,
        }
    }

    /// Text form used when the value is echoed into markup
    pub fn to_echo_string(&self) -> String {
        match self {
            OutputValue::Value(value) => echo_text(value),
            OutputValue::User(user) => user.display_name.clone(),
        }
    }
}

impl From<JsonValue> for OutputValue {
    fn from(value: JsonValue) -> Self {
        OutputValue::Value(value)
    }
}

/// Text form of a JSON value: arrays joined with `", "`, booleans as Yes/No
pub fn echo_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(true) => ECHO_TRUE.to_string(),
        JsonValue::Bool(false) => ECHO_FALSE.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Array(items) => items.iter().map(echo_text).collect::<Vec<_>>().join(", "),
        JsonValue::Object(_) => value.to_string(),
    }
}

/// Resolver for one control type
pub trait ControlResolver: Send + Sync {
    /// Resolve `value`; `echo` is true when the result will be printed
    fn resolve(&self, value: JsonValue, echo: bool) -> OutputValue;
}

impl<F> ControlResolver for F
where
    F: Fn(JsonValue, bool) -> OutputValue + Send + Sync,
{
    fn resolve(&self, value: JsonValue, echo: bool) -> OutputValue {
        self(value, echo)
    }
}

/// Registry of control type to resolver
#[derive(Clone, Default)]
pub struct OutputFilters {
    resolvers: HashMap<String, Arc<dyn ControlResolver>>,
}

impl OutputFilters {
    /// Create an empty registry; every value passes through
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `user` control backed by `directory`
    pub fn with_users<D>(directory: D) -> Self
    where
        D: UserDirectory + 'static,
    {
        Self::new().with_resolver(USER_CONTROL, UserResolver::new(directory))
    }

    /// Register a resolver, replacing any resolver for the same control type
    pub fn with_resolver<R>(mut self, control: impl Into<String>, resolver: R) -> Self
    where
        R: ControlResolver + 'static,
    {
        self.register(control, Arc::new(resolver));
        self
    }

    /// Register a shared resolver, returning the one it replaced
    pub fn register(
        &mut self,
        control: impl Into<String>,
        resolver: Arc<dyn ControlResolver>,
    ) -> Option<Arc<dyn ControlResolver>> {
        self.resolvers.insert(control.into(), resolver)
    }

    /// Whether a resolver exists for `control`
    pub fn handles(&self, control: &str) -> bool {
        self.resolvers.contains_key(control)
    }

    /// Registered control types
    pub fn controls(&self) -> impl Iterator<Item = &str> {
        self.resolvers.keys().map(String::as_str)
    }

    /// Resolve a value for the given control type.
    ///
    /// Unknown control types, and values without a control type, pass through.
    pub fn resolve(&self, value: JsonValue, control: Option<&str>, echo: bool) -> OutputValue {
        match control.and_then(|c| self.resolvers.get(c)) {
            Some(resolver) => resolver.resolve(value, echo),
            None => OutputValue::Value(value),
        }
    }

    /// Resolve a value for a named control type
    pub fn resolve_output_value(&self, value: JsonValue, control: &str, echo: bool) -> OutputValue {
        self.resolve(value, Some(control), echo)
    }
}

impl fmt::Debug for OutputFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controls: Vec<&str> = self.controls().collect();
        controls.sort_unstable();
        f.debug_struct("OutputFilters")
            .field("controls", &controls)
            .finish()
    }
}

/// A user known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

impl UserRecord {
    pub fn new(id: u64, login: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            display_name: display_name.into(),
            email: String::new(),
        }
    }
}

/// Lookup of users by login name
pub trait UserDirectory: Send + Sync {
    fn user_by_login(&self, login: &str) -> Option<UserRecord>;
}

impl UserDirectory for HashMap<String, UserRecord> {
    fn user_by_login(&self, login: &str) -> Option<UserRecord> {
        self.get(login).cloned()
    }
}

impl<D: UserDirectory + ?Sized> UserDirectory for Arc<D> {
    fn user_by_login(&self, login: &str) -> Option<UserRecord> {
        (**self).user_by_login(login)
    }
}

/// Resolver for the `user` control
pub struct UserResolver<D> {
    directory: D,
}

impl<D: UserDirectory> UserResolver<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }
}

impl<D: UserDirectory> ControlResolver for UserResolver<D> {
    fn resolve(&self, value: JsonValue, echo: bool) -> OutputValue {
        let user = match &value {
            JsonValue::String(login) => self.directory.user_by_login(login),
            JsonValue::Number(n) => self.directory.user_by_login(&n.to_string()),
            _ => None,
        };

        match (user, echo) {
            (Some(user), true) => OutputValue::Value(JsonValue::String(user.display_name)),
            (None, true) => OutputValue::Value(JsonValue::String(String::new())),
            (Some(user), false) => OutputValue::User(user),
            (None, false) => OutputValue::absent(),
        }
    }
}
