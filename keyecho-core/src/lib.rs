//! # keyecho-core
//!
//! Separate speech rates for keystroke echo and spelling, per synthesizer.
//!
//! ## Architecture
//!
//! ```text
//! keystroke → TypedCharacterStateMachine ─► SpeechRequest (word, then char)
//!                                                 │
//!                 EchoRateConfig (RateStore) ─► resolve_offset(Typing)
//!                                                 │
//!                                   speech::dispatch (rate-scoped)
//!                                                 │
//!                                        SpeechHost::speak
//! ```
//!
//! Spelling requests skip the state machine and resolve with
//! `Purpose::Spelling`. The host adapter owns installation of
//! [`EchoRateHandlers`] into its handler slots.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod rates;
pub mod speech;
pub mod typing;

// Convenience re-exports for downstream crates
pub use config::EchoRateConfig;
pub use error::EchoError;
pub use handlers::EchoRateHandlers;
pub use rates::{resolve_offset, Purpose, RateDraft, RateKind, RateSettings, RateStore, RateTable};
pub use speech::{SpeechCommand, SpeechHost, SpeechSequence, SpellOptions, SpellingBuilder};
pub use typing::{EchoMode, SpeechRequest, TypedCharacterStateMachine, TypingContext};
