//! Drop-in replacements for the host's typed-character and spelling handlers.
//!
//! Both entry points are infallible from the host's point of view: errors
//! and panics are logged and the caller-supplied original handler runs
//! instead, so a fault here degrades to the host's own behaviour.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{error, warn};

use crate::{
    config::EchoRateConfig,
    error::{EchoError, Result},
    rates::{preview_offset, resolve_offset, Purpose, RateDraft, DEFAULT_SPEECH_RATE},
    speech::{speak_request, speak_with_offset, SpeechCommand, SpeechHost, SpellOptions},
    typing::{TypedCharacterStateMachine, TypingContext},
};

/// Text spelled by [`EchoRateHandlers::preview`] before the sample words.
pub const PREVIEW_SPELLED: &str = "abc";
/// Words spoken by [`EchoRateHandlers::preview`] after the spelled sample.
pub const PREVIEW_WORDS: &str = "hello world";

/// Typing echo and spelling handlers bound to one host.
///
/// `Send + Sync` when the host is: share it with the host adapter through
/// `Arc<EchoRateHandlers<H>>`.
pub struct EchoRateHandlers<H> {
    host: H,
    config: Arc<RwLock<EchoRateConfig>>,
    typing: Mutex<TypedCharacterStateMachine>,
}

impl<H: SpeechHost> EchoRateHandlers<H> {
    pub fn new(host: H, config: Arc<RwLock<EchoRateConfig>>) -> Self {
        Self {
            host,
            config,
            typing: Mutex::new(TypedCharacterStateMachine::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Shared configuration. Writes are visible on the next keystroke.
    pub fn config(&self) -> Arc<RwLock<EchoRateConfig>> {
        Arc::clone(&self.config)
    }

    /// Handle one typed character with no fallback.
    pub fn on_typed_character(&self, ch: char) {
        self.on_typed_character_or(ch, |_| {});
    }

    /// Handle one typed character; `original` runs if handling fails.
    pub fn on_typed_character_or<F>(&self, ch: char, original: F)
    where
        F: FnOnce(char),
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.echo_typed_character(ch)));
        if let Err(e) = flatten(outcome) {
            error!(error = %e, "typed character handler failed; using original handler");
            run_fallback(|| original(ch));
        }
    }

    /// Spell `text` at the spelling rate with no fallback.
    pub fn on_spell_request(&self, text: &str, options: &SpellOptions) {
        self.on_spell_request_or(text, options, |_, _| {});
    }

    /// Spell `text` at the spelling rate; `original` runs if spelling fails.
    pub fn on_spell_request_or<F>(&self, text: &str, options: &SpellOptions, original: F)
    where
        F: FnOnce(&str, &SpellOptions),
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.spell(text, options)));
        if let Err(e) = flatten(outcome) {
            error!(error = %e, "spelling handler failed; using original handler");
            run_fallback(|| original(text, options));
        }
    }

    /// Drop the word being typed. Call on focus change.
    pub fn clear_typed_word_buffer(&self) {
        self.typing.lock().clear();
    }

    /// Current typed-word buffer (already masked for protected input).
    pub fn typed_word_buffer(&self) -> String {
        self.typing.lock().buffer().iter().collect()
    }

    /// Offset `purpose` would use right now.
    pub fn current_offset(&self, purpose: Purpose) -> i32 {
        let synth = self.host.active_synthesizer();
        let default_rate = self.default_rate();
        resolve_offset(&*self.config.read(), purpose, &synth, default_rate)
    }

    /// Speak the sample (spelled `abc`, then `hello world`) at a draft rate.
    pub fn preview(&self, draft: &RateDraft) -> Result<()> {
        let synth = self.host.active_synthesizer();
        let offset = preview_offset(draft, &synth, self.default_rate());
        let mut sequence = self
            .host
            .spelling_sequence(PREVIEW_SPELLED, &SpellOptions::default())?;
        sequence.push(SpeechCommand::Text(", ".into()));
        sequence.push(SpeechCommand::Text(PREVIEW_WORDS.into()));
        speak_with_offset(&self.host, sequence, offset)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn default_rate(&self) -> i32 {
        self.host.default_rate().unwrap_or(DEFAULT_SPEECH_RATE)
    }

    fn echo_typed_character(&self, ch: char) -> Result<()> {
        let ctx = TypingContext {
            protected: self.host.is_typing_protected(),
            focus_editable: self.host.is_focus_editable(),
            word_mode: self.host.word_echo_mode(),
            char_mode: self.host.character_echo_mode(),
            apply_to_words: self.config.read().apply_to_words,
        };
        let echo = self.typing.lock().on_typed_character(ch, &ctx);

        if let Some(word) = echo.deferred_word {
            self.host.speak(vec![SpeechCommand::Text(word)])?;
        }
        if echo.requests.is_empty() {
            return Ok(());
        }

        let offset = self.current_offset(Purpose::Typing);
        for request in &echo.requests {
            speak_request(&self.host, request, offset)?;
        }
        Ok(())
    }

    fn spell(&self, text: &str, options: &SpellOptions) -> Result<()> {
        let offset = self.current_offset(Purpose::Spelling);
        let sequence = match self.host.spelling_sequence(text, options) {
            Ok(sequence) => sequence,
            Err(e) if *options != SpellOptions::default() => {
                warn!(error = %e, "spelling builder rejected options; retrying without");
                self.host.spelling_sequence(text, &SpellOptions::default())?
            }
            Err(e) => return Err(e),
        };
        speak_with_offset(&self.host, sequence, offset)
    }
}

fn flatten(outcome: std::thread::Result<Result<()>>) -> Result<()> {
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(EchoError::HandlerPanic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".into()
    }
}

fn run_fallback<F: FnOnce()>(fallback: F) {
    if catch_unwind(AssertUnwindSafe(fallback)).is_err() {
        error!("original handler panicked during fallback");
    }
}
