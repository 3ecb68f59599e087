//! Console stand-in for the screen reader: prints speech sequences instead of
//! synthesizing them.

use std::fmt::Write as _;
use std::sync::Arc;

use keyecho_core::{
    error::Result, EchoMode, SpeechCommand, SpeechHost, SpeechSequence, SpellOptions,
    SpellingBuilder,
};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::settings::HostSettings;

const NATO: [&str; 26] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliett",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    "uniform", "victor", "whiskey", "x-ray", "yankee", "zulu",
];

#[derive(Clone)]
pub struct ConsoleHost {
    settings: Arc<RwLock<HostSettings>>,
}

impl ConsoleHost {
    pub fn new(settings: Arc<RwLock<HostSettings>>) -> Self {
        Self { settings }
    }

    /// The host's own typed-character echo: no rate handling, no words.
    pub fn host_typed_character(&self, ch: char) {
        let settings = self.settings.read().clone();
        if ch < ' ' || !settings.speak_typed_characters.permits(settings.focus_editable) {
            return;
        }
        let spoken = if settings.typing_protected { '*' } else { ch };
        if let Err(e) = self.speak_spelled(&spoken.to_string(), &SpellOptions::default()) {
            warn!(error = %e, "host character echo failed");
        }
    }

    /// The host's own spelling: default rate.
    pub fn host_spelling(&self, text: &str, options: &SpellOptions) {
        if let Err(e) = self.speak_spelled(text, options) {
            warn!(error = %e, "host spelling failed");
        }
    }

    fn speak_spelled(&self, text: &str, options: &SpellOptions) -> Result<()> {
        let seq = self.spelling_sequence(text, options)?;
        self.speak(seq)
    }
}

impl SpellingBuilder for ConsoleHost {
    fn spelling_sequence(&self, text: &str, options: &SpellOptions) -> Result<SpeechSequence> {
        if let Some(locale) = options.locale.as_deref() {
            debug!(locale, "console speller ignores locale");
        }
        let mut seq = vec![SpeechCommand::CharacterMode(true)];
        for ch in text.chars() {
            seq.push(SpeechCommand::Text(character_name(ch, options)));
        }
        seq.push(SpeechCommand::CharacterMode(false));
        seq.push(SpeechCommand::EndUtterance);
        Ok(seq)
    }
}

impl SpeechHost for ConsoleHost {
    fn active_synthesizer(&self) -> String {
        self.settings.read().synthesizer.clone()
    }

    fn default_rate(&self) -> Option<i32> {
        self.settings.read().default_rate
    }

    fn is_focus_editable(&self) -> bool {
        self.settings.read().focus_editable
    }

    fn is_typing_protected(&self) -> bool {
        self.settings.read().typing_protected
    }

    fn character_echo_mode(&self) -> EchoMode {
        self.settings.read().speak_typed_characters
    }

    fn word_echo_mode(&self) -> EchoMode {
        self.settings.read().speak_typed_words
    }

    fn speak(&self, sequence: SpeechSequence) -> Result<()> {
        println!("{}", render(&sequence));
        Ok(())
    }
}

fn character_name(ch: char, options: &SpellOptions) -> String {
    match ch {
        ' ' => "space".into(),
        '\t' => "tab".into(),
        c if options.use_character_descriptions && c.is_ascii_alphabetic() => {
            let idx = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            NATO[idx].into()
        }
        c => c.to_string(),
    }
}

/// One-line rendering: `[rate +30] a [end] [rate reset]`.
pub fn render(sequence: &[SpeechCommand]) -> String {
    let mut out = String::new();
    for cmd in sequence {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = match cmd {
            SpeechCommand::Text(t) => write!(out, "{t:?}"),
            SpeechCommand::Rate(Some(offset)) => write!(out, "[rate {offset:+}]"),
            SpeechCommand::Rate(None) => write!(out, "[rate reset]"),
            SpeechCommand::CharacterMode(true) => write!(out, "[chars]"),
            SpeechCommand::CharacterMode(false) => write!(out, "[/chars]"),
            SpeechCommand::EndUtterance => write!(out, "[end]"),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ConsoleHost {
        ConsoleHost::new(Arc::new(RwLock::new(HostSettings::default())))
    }

    #[test]
    fn spelling_wraps_characters_in_character_mode() {
        let seq = host()
            .spelling_sequence("a b", &SpellOptions::default())
            .expect("spell");
        assert_eq!(
            seq,
            vec![
                SpeechCommand::CharacterMode(true),
                SpeechCommand::Text("a".into()),
                SpeechCommand::Text("space".into()),
                SpeechCommand::Text("b".into()),
                SpeechCommand::CharacterMode(false),
                SpeechCommand::EndUtterance,
            ]
        );
    }

    #[test]
    fn descriptions_use_phonetic_alphabet() {
        let options = SpellOptions {
            locale: None,
            use_character_descriptions: true,
        };
        let seq = host().spelling_sequence("Qz", &options).expect("spell");
        assert_eq!(seq[1], SpeechCommand::Text("quebec".into()));
        assert_eq!(seq[2], SpeechCommand::Text("zulu".into()));
    }

    #[test]
    fn render_marks_rate_scope() {
        let line = render(&[
            SpeechCommand::Rate(Some(12)),
            SpeechCommand::Text("hi".into()),
            SpeechCommand::Rate(Some(-3)),
            SpeechCommand::Rate(None),
        ]);
        assert_eq!(line, r#"[rate +12] "hi" [rate -3] [rate reset]"#);
    }

    #[test]
    fn host_spelling_path_propagates_sink_result() {
        let host = host();
        host.speak_spelled("ok", &SpellOptions::default())
            .expect("console sink accepts sequences");
        host.host_spelling("ok", &SpellOptions::default());
        host.host_typed_character('k');
    }
}
