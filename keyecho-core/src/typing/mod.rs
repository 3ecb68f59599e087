//! Typed-character echo: keystrokes in, speech requests out.
//!
//! The state machine only decides *what* to say. Rate resolution and the
//! speech sink live in [`crate::rates`] and [`crate::speech`].

pub mod classify;
pub mod state;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use classify::{classify, KeyClass};
pub use state::TypedCharacterStateMachine;

/// Placeholder spoken (and buffered) instead of protected characters.
pub const PROTECTED_CHAR: char = '*';

/// Host echo setting for typed characters or typed words.
///
/// Reads either the persisted name (`"editControls"`) or the host's numeric
/// value (`0`, `1`, `2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EchoMode {
    Off,
    /// Only while an editable control has focus.
    #[default]
    EditControls,
    Always,
}

impl EchoMode {
    /// Map the host's numeric setting (`0`, `1`, `2`).
    pub fn from_host_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::EditControls),
            2 => Some(Self::Always),
            _ => None,
        }
    }

    /// Parse a name (`off`, `edit`, `editControls`, `always`) or a numeric
    /// host value, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" => Some(Self::Off),
            "edit" | "edit-controls" | "editcontrols" => Some(Self::EditControls),
            "always" => Some(Self::Always),
            other => other.parse::<i64>().ok().and_then(Self::from_host_value),
        }
    }

    /// Whether echo should happen given the current focus.
    pub fn permits(self, focus_editable: bool) -> bool {
        match self {
            Self::Off => false,
            Self::EditControls => focus_editable,
            Self::Always => true,
        }
    }
}

impl<'de> Deserialize<'de> for EchoMode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;
        let mode = match &value {
            Value::Number(n) => n.as_i64().and_then(Self::from_host_value),
            Value::String(s) => Self::parse(s),
            _ => None,
        };
        mode.ok_or_else(|| de::Error::custom(format!("unknown echo mode: {value}")))
    }
}

/// What to say for a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechRequest {
    /// A single (possibly masked) character, spoken via the spelling builder.
    Character(char),
    /// A completed word, spoken as text at the typing rate.
    Word(String),
}

/// Host signals sampled for one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingContext {
    pub protected: bool,
    pub focus_editable: bool,
    pub word_mode: EchoMode,
    pub char_mode: EchoMode,
    /// Route completed words through the typing rate.
    pub apply_to_words: bool,
}

/// Output of one keystroke.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedEcho {
    /// Rate-wrapped requests, word before character.
    pub requests: Vec<SpeechRequest>,
    /// A completed word the host would echo on its own path (word routing
    /// off). Spoken without any rate override.
    pub deferred_word: Option<String>,
}

impl TypedEcho {
    pub fn is_silent(&self) -> bool {
        self.requests.is_empty() && self.deferred_word.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_mode_gating() {
        assert!(!EchoMode::Off.permits(true));
        assert!(EchoMode::EditControls.permits(true));
        assert!(!EchoMode::EditControls.permits(false));
        assert!(EchoMode::Always.permits(false));
    }

    #[test]
    fn host_values_map_in_order() {
        assert_eq!(EchoMode::from_host_value(0), Some(EchoMode::Off));
        assert_eq!(EchoMode::from_host_value(1), Some(EchoMode::EditControls));
        assert_eq!(EchoMode::from_host_value(2), Some(EchoMode::Always));
        assert_eq!(EchoMode::from_host_value(3), None);
    }

    #[test]
    fn echo_mode_reads_names_and_host_numbers() {
        let modes: Vec<EchoMode> =
            serde_json::from_str(r#"[2, "off", "editControls", "1", "ALWAYS"]"#).expect("modes");
        assert_eq!(
            modes,
            vec![
                EchoMode::Always,
                EchoMode::Off,
                EchoMode::EditControls,
                EchoMode::EditControls,
                EchoMode::Always,
            ]
        );
        assert!(serde_json::from_str::<EchoMode>("7").is_err());
        assert!(serde_json::from_str::<EchoMode>("true").is_err());
        assert_eq!(
            serde_json::to_string(&EchoMode::EditControls).expect("serialize"),
            r#""editControls""#
        );
    }
}
