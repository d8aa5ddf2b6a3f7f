//! Session configuration from the environment

use crate::controller::{ControllerConfig, DEFAULT_GREETING, DEFAULT_WIDGET_CAPACITY};
use crate::history::DEFAULT_CONTEXT_LIMIT;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a chat session needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub base_url: String,
    pub csrf_token: Option<String>,
    /// Directory for the history file; `None` keeps history in memory only
    pub history_dir: Option<PathBuf>,
    pub history_capacity: NonZeroUsize,
    pub context_turns: usize,
    pub request_timeout: Duration,
    pub greeting: Option<String>,
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    ///
    /// Unparseable values fall back to their defaults with a warning. An
    /// empty `JANE_HISTORY_DIR` disables on-disk history and an empty
    /// `JANE_GREETING` disables the greeting.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let history_dir = match lookup("JANE_HISTORY_DIR") {
            Some(dir) if dir.is_empty() => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                Some(PathBuf::from(home).join(".jane-chat"))
            }
        };

        let history_capacity = parsed::<usize>(&lookup, "JANE_HISTORY_CAPACITY")
            .and_then(|capacity| {
                let capacity = NonZeroUsize::new(capacity);
                if capacity.is_none() {
                    tracing::warn!("JANE_HISTORY_CAPACITY must be positive, using default");
                }
                capacity
            })
            .unwrap_or(DEFAULT_WIDGET_CAPACITY);

        Self {
            base_url: lookup("JANE_BASE_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            csrf_token: lookup("JANE_CSRF_TOKEN").filter(|token| !token.is_empty()),
            history_dir,
            history_capacity,
            context_turns: parsed(&lookup, "JANE_CONTEXT_TURNS").unwrap_or(DEFAULT_CONTEXT_LIMIT),
            request_timeout: parsed(&lookup, "JANE_REQUEST_TIMEOUT_SECS")
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
            greeting: match lookup("JANE_GREETING") {
                Some(greeting) if greeting.is_empty() => None,
                Some(greeting) => Some(greeting),
                None => Some(DEFAULT_GREETING.to_string()),
            },
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            capacity: self.history_capacity,
            context_limit: self.context_turns,
            greeting: self.greeting.clone(),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}
