//! Host handler table and the install/uninstall of the echo-rate handlers.
//!
//! The host calls whatever sits in its slots. Installing saves the current
//! occupants and swaps in wrappers around [`EchoRateHandlers`]; uninstalling
//! puts the saved ones back. Both are idempotent, and uninstall before
//! install is a no-op.

use std::sync::Arc;

use keyecho_core::{EchoRateHandlers, SpeechHost, SpellOptions};
use parking_lot::{Mutex, RwLock};
use tracing::info;

pub type TypedCharacterHandler = Arc<dyn Fn(char) + Send + Sync>;
pub type SpellHandler = Arc<dyn Fn(&str, &SpellOptions) + Send + Sync>;

/// The host's replaceable speech entry points.
pub struct HandlerTable {
    typed_character: RwLock<TypedCharacterHandler>,
    spelling: RwLock<SpellHandler>,
}

impl HandlerTable {
    pub fn new(typed_character: TypedCharacterHandler, spelling: SpellHandler) -> Self {
        Self {
            typed_character: RwLock::new(typed_character),
            spelling: RwLock::new(spelling),
        }
    }

    /// Host entry point for keystroke echo.
    pub fn speak_typed_character(&self, ch: char) {
        let handler = Arc::clone(&*self.typed_character.read());
        handler(ch);
    }

    /// Host entry point for spelling.
    pub fn speak_spelling(&self, text: &str, options: &SpellOptions) {
        let handler = Arc::clone(&*self.spelling.read());
        handler(text, options);
    }

    fn swap(
        &self,
        typed_character: TypedCharacterHandler,
        spelling: SpellHandler,
    ) -> (TypedCharacterHandler, SpellHandler) {
        let old_typed = std::mem::replace(&mut *self.typed_character.write(), typed_character);
        let old_spelling = std::mem::replace(&mut *self.spelling.write(), spelling);
        (old_typed, old_spelling)
    }
}

struct Originals {
    typed_character: TypedCharacterHandler,
    spelling: SpellHandler,
}

/// Installs one set of handlers into one table.
pub struct EchoRateHooks<H> {
    handlers: Arc<EchoRateHandlers<H>>,
    originals: Mutex<Option<Originals>>,
}

impl<H> EchoRateHooks<H>
where
    H: SpeechHost + Send + Sync + 'static,
{
    pub fn new(handlers: Arc<EchoRateHandlers<H>>) -> Self {
        Self {
            handlers,
            originals: Mutex::new(None),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.originals.lock().is_some()
    }

    /// Returns `false` if already installed.
    pub fn install(&self, table: &HandlerTable) -> bool {
        let mut originals = self.originals.lock();
        if originals.is_some() {
            return false;
        }

        let saved_typed = Arc::clone(&*table.typed_character.read());
        let saved_spelling = Arc::clone(&*table.spelling.read());

        let typed_handlers = Arc::clone(&self.handlers);
        let typed_fallback = Arc::clone(&saved_typed);
        let typed: TypedCharacterHandler = Arc::new(move |ch: char| {
            typed_handlers.on_typed_character_or(ch, |c| typed_fallback(c));
        });

        let spell_handlers = Arc::clone(&self.handlers);
        let spell_fallback = Arc::clone(&saved_spelling);
        let spelling: SpellHandler = Arc::new(move |text: &str, options: &SpellOptions| {
            spell_handlers.on_spell_request_or(text, options, |t, o| spell_fallback(t, o));
        });

        table.swap(typed, spelling);
        *originals = Some(Originals {
            typed_character: saved_typed,
            spelling: saved_spelling,
        });
        info!("echo rate handlers installed");
        true
    }

    /// Returns `false` if nothing was installed.
    pub fn uninstall(&self, table: &HandlerTable) -> bool {
        let Some(saved) = self.originals.lock().take() else {
            return false;
        };
        table.swap(saved.typed_character, saved.spelling);
        self.handlers.clear_typed_word_buffer();
        info!("echo rate handlers removed");
        true
    }
}
