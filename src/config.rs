//! Declarative widget options.
//!
//! Renderer overrides are code and arrive through
//! [`crate::slots::SlotOverrides`]; everything an embedding application can
//! express as plain data lives here. Options are layered: built-in defaults,
//! then an optional YAML file, then `CHAT_WIDGET__`-prefixed environment
//! variables (e.g. `CHAT_WIDGET__LABELS__TITLE`).

use std::env;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::slots::RendererErrorPolicy;

/// Config file picked up from the working directory when no explicit path is
/// given.
const DEFAULT_CONFIG_FILE: &str = "chat-widget.yaml";

/// All declarative options for one widget instance.
#[derive(Debug, Deserialize, Clone)]
pub struct WidgetOptions {
    /// User-visible strings.
    pub labels: LabelOptions,
    /// Behavioral switches.
    pub behavior: BehaviorOptions,
}

/// User-visible strings.
#[derive(Debug, Deserialize, Clone)]
pub struct LabelOptions {
    /// Header title.
    pub title: String,
    /// Input placeholder.
    pub placeholder: String,
    /// Label of the stop control.
    pub stop: String,
    /// Label of the regenerate control.
    pub regenerate: String,
}

/// Behavioral switches.
#[derive(Debug, Deserialize, Clone)]
pub struct BehaviorOptions {
    /// Whether the widget starts open.
    pub initially_open: bool,
    /// Whether the stop/regenerate control is rendered at all.
    pub show_response_button: bool,
    /// What happens when a renderer faults.
    pub error_policy: RendererErrorPolicy,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            labels: LabelOptions {
                title: "Chat".to_string(),
                placeholder: "Type your message...".to_string(),
                stop: "Stop".to_string(),
                regenerate: "Regenerate".to_string(),
            },
            behavior: BehaviorOptions {
                initially_open: false,
                show_response_button: true,
                error_policy: RendererErrorPolicy::default(),
            },
        }
    }
}

impl WidgetOptions {
    /// Load options from defaults, an optional config file, and the
    /// environment.
    ///
    /// The file is taken from the `CHAT_WIDGET_CONFIG_FILE` environment
    /// variable if set, else `chat-widget.yaml` in the working directory if
    /// present. Environment variables use the `CHAT_WIDGET__` prefix with
    /// `__` as the section separator and win over file values.
    pub fn load() -> Result<Self, config::ConfigError> {
        let explicit = env::var("CHAT_WIDGET_CONFIG_FILE").ok();
        Self::load_from(explicit.as_deref())
    }

    /// Load options with an explicit config file path (or none).
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("labels.title", "Chat")?
            .set_default("labels.placeholder", "Type your message...")?
            .set_default("labels.stop", "Stop")?
            .set_default("labels.regenerate", "Regenerate")?
            .set_default("behavior.initially_open", false)?
            .set_default("behavior.show_response_button", true)?
            .set_default("behavior.error_policy", "propagate")?;

        match path {
            Some(path) => builder = builder.add_source(File::with_name(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("CHAT_WIDGET")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            env::remove_var("CHAT_WIDGET_CONFIG_FILE");
            env::remove_var("CHAT_WIDGET__LABELS__TITLE");
            env::remove_var("CHAT_WIDGET__BEHAVIOR__INITIALLY_OPEN");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let options = WidgetOptions::load_from(None).unwrap();
        assert_eq!(options.labels.title, "Chat");
        assert!(!options.behavior.initially_open);
        assert_eq!(
            options.behavior.error_policy,
            RendererErrorPolicy::Propagate
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("CHAT_WIDGET__LABELS__TITLE", "Support");
            env::set_var("CHAT_WIDGET__BEHAVIOR__INITIALLY_OPEN", "true");
        }

        let options = WidgetOptions::load_from(None).unwrap();
        assert_eq!(options.labels.title, "Support");
        assert!(options.behavior.initially_open);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_default_matches_loaded_defaults() {
        clear_env();
        let loaded = WidgetOptions::load_from(None).unwrap();
        let constructed = WidgetOptions::default();
        assert_eq!(loaded.labels.title, constructed.labels.title);
        assert_eq!(loaded.labels.placeholder, constructed.labels.placeholder);
        assert_eq!(
            loaded.behavior.show_response_button,
            constructed.behavior.show_response_button
        );
    }
}
