//! Speech sequences and the host capabilities that consume and build them.
//!
//! A sequence is an ordered list of commands handed to the host's speech
//! sink in one call. This crate only ever adds `Rate` commands around
//! sequences built elsewhere.

pub mod dispatch;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::typing::EchoMode;

pub use dispatch::{speak_request, speak_with_offset, with_rate_offset};

/// One element of a speech sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum SpeechCommand {
    /// Text to speak.
    Text(String),
    /// Relative rate change. `None` restores the synthesizer default.
    Rate(Option<i32>),
    /// Toggle character-by-character pronunciation.
    CharacterMode(bool),
    /// Marks the end of an utterance.
    EndUtterance,
}

pub type SpeechSequence = Vec<SpeechCommand>;

/// Extra arguments a spelling request may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellOptions {
    /// Language used to pick character names.
    pub locale: Option<String>,
    /// Speak descriptions ("alpha", "bravo") instead of bare letters.
    pub use_character_descriptions: bool,
}

/// Host-side spelling helper: turns text into a letter-by-letter sequence.
pub trait SpellingBuilder {
    fn spelling_sequence(&self, text: &str, options: &SpellOptions) -> Result<SpeechSequence>;
}

/// Everything the handlers read from, or hand to, the host.
///
/// All reads happen on the input thread for every keystroke; implementors
/// must answer from in-memory state.
pub trait SpeechHost: SpellingBuilder {
    /// Name of the active synthesizer, empty when unknown.
    fn active_synthesizer(&self) -> String;

    /// Active synthesizer's configured rate (`0..=100`), if it can be read.
    fn default_rate(&self) -> Option<i32>;

    /// Whether the focused object accepts text input.
    fn is_focus_editable(&self) -> bool;

    /// Whether typed input is currently protected (password fields).
    fn is_typing_protected(&self) -> bool;

    /// Host echo setting for typed characters.
    fn character_echo_mode(&self) -> EchoMode;

    /// Host echo setting for typed words.
    fn word_echo_mode(&self) -> EchoMode;

    /// Queue a sequence on the speech sink.
    fn speak(&self, sequence: SpeechSequence) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialise_with_type_tags() {
        let json = serde_json::to_value(SpeechCommand::Rate(Some(-12))).expect("serialize rate");
        assert_eq!(json["type"], "rate");
        assert_eq!(json["value"], -12);

        let json = serde_json::to_value(SpeechCommand::Rate(None)).expect("serialize reset");
        assert!(json["value"].is_null());

        let json = serde_json::to_value(SpeechCommand::EndUtterance).expect("serialize end");
        assert_eq!(json["type"], "endUtterance");
    }
}
