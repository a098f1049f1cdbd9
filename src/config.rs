//! Analysis configuration.
//!
//! Settings arrive through LSP initialization options as JSON; programmed
//! defaults are the lowest-precedence layer and the override value wins
//! field by field (it deserializes the whole struct, with serde defaults
//! filling what the client omits).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workspace settings for the stitched analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Allow analysis of loosely-typed script modules (.js/.jsx). When false,
    /// a module whose synthetic file is js-flavored is not analyzable.
    pub allow_loose_script: bool,

    /// File extension of companion markup files, without the dot.
    pub markup_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_loose_script: false,
            markup_extension: "tpl".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

/// A human-readable message produced while loading settings, for the
/// transport layer to forward to the client log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct SettingsLoadOutcome {
    pub settings: Settings,
    pub events: Vec<SettingsEvent>,
}

/// Load settings from optional LSP initialization options.
///
/// Malformed options are reported as a warning event and the defaults are
/// kept; loading never fails.
pub fn load_settings(initialization_options: Option<Value>) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    let settings = match initialization_options {
        None | Some(Value::Null) => Settings::default(),
        Some(value) => match serde_json::from_value::<Settings>(value) {
            Ok(settings) => {
                events.push(SettingsEvent::info(
                    "Loaded settings from initialization options",
                ));
                settings
            }
            Err(err) => {
                events.push(SettingsEvent::warning(format!(
                    "Ignoring malformed initialization options: {err}"
                )));
                Settings::default()
            }
        },
    };

    SettingsLoadOutcome { settings, events }
}
