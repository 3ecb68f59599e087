//! Typed-word accumulation.
//!
//! ## Transitions
//!
//! ```text
//! word-constituent → push (masked if protected)
//! backspace        → pop
//! delete (0x7f)    → nothing, no echo
//! other            → flush buffer as a word (if non-empty)
//! then, for everything but delete → character echo if the mode permits
//! ```
//!
//! The machine is *accumulating* while the buffer is non-empty and *idle*
//! otherwise. Protected characters are buffered as [`PROTECTED_CHAR`] so
//! boundary detection keeps working without ever holding real input.

use tracing::trace;

use super::{
    classify::{classify, is_control, KeyClass},
    SpeechRequest, TypedEcho, TypingContext, PROTECTED_CHAR,
};

#[derive(Debug, Clone, Default)]
pub struct TypedCharacterStateMachine {
    buffer: Vec<char>,
}

impl TypedCharacterStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one keystroke.
    pub fn on_typed_character(&mut self, ch: char, ctx: &TypingContext) -> TypedEcho {
        let spoken = if ctx.protected { PROTECTED_CHAR } else { ch };
        let mut echo = TypedEcho::default();

        match classify(ch) {
            KeyClass::WordConstituent => self.buffer.push(spoken),
            KeyClass::DeleteLast => {
                self.buffer.pop();
            }
            KeyClass::Discard => return echo,
            KeyClass::Boundary => self.flush_word(ctx, &mut echo),
        }

        if !is_control(ch) && ctx.char_mode.permits(ctx.focus_editable) {
            echo.requests.push(SpeechRequest::Character(spoken));
        }
        echo
    }

    /// Drop the current word (focus change, delete-word).
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Characters buffered since the last boundary.
    pub fn buffer(&self) -> &[char] {
        &self.buffer
    }

    pub fn is_accumulating(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn flush_word(&mut self, ctx: &TypingContext, echo: &mut TypedEcho) {
        if self.buffer.is_empty() {
            return;
        }
        let word: String = self.buffer.drain(..).collect();
        trace!(word = %word, "typed word");

        if ctx.protected || !ctx.word_mode.permits(ctx.focus_editable) {
            return;
        }
        if ctx.apply_to_words {
            echo.requests.push(SpeechRequest::Word(word));
        } else {
            echo.deferred_word = Some(word);
        }
    }
}
