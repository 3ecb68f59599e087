//! Per-synthesizer rate settings and the offset resolution built on them.
//!
//! ## Layout
//!
//! Four independent tables, each a per-synth map plus a scalar fallback:
//!
//! | Purpose | Kind | Map key | Fallback key |
//! |---------|------|---------|--------------|
//! | typing | rate | `typingRatesJson` | `typingRate` |
//! | typing | boost | `oneCoreBoostJson` | `oneCoreBoost` |
//! | spelling | rate | `spellingRatesJson` | `spellingRate` |
//! | spelling | boost | `oneCoreSpellBoostJson` | `oneCoreSpellBoost` |
//!
//! Values are clamped on every read. Stored values are never trusted.

pub mod resolver;
pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use resolver::{preview_offset, resolve_offset, RateDraft};
pub use store::RateStore;

/// Lowest rate any synthesizer accepts.
pub const MIN_RATE: i32 = 0;
/// Highest rate any synthesizer accepts (host rates are normalised to 0..100).
pub const MAX_RATE: i32 = 100;
/// Stored fallback rate meaning "follow the synthesizer's default rate".
pub const FOLLOW_DEFAULT_RATE: i32 = -1;
/// Used when the host cannot report the active default rate.
pub const DEFAULT_SPEECH_RATE: i32 = 50;
/// Substring (lowercase) identifying the boost-eligible synthesizer family.
pub const BOOST_FAMILY_MARKER: &str = "onecore";

/// Which kind of speech a rate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Typed character (and optionally typed word) echo.
    Typing,
    /// Letter-by-letter spelling requested through the host.
    Spelling,
}

/// Which of the two tables of a purpose is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    /// Absolute rate, `-1` or `0..=100`.
    Rate,
    /// Extra offset for the boost family, `0..=100`.
    Boost,
}

/// One per-synth map plus its scalar fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    pub per_synth: BTreeMap<String, i32>,
    pub fallback: i32,
}

impl RateTable {
    /// Raw stored value for `synth`, or the fallback. An empty identity
    /// always reads the fallback.
    pub fn lookup(&self, synth: &str) -> i32 {
        if synth.is_empty() {
            return self.fallback;
        }
        self.per_synth.get(synth).copied().unwrap_or(self.fallback)
    }

    pub fn contains(&self, synth: &str) -> bool {
        !synth.is_empty() && self.per_synth.contains_key(synth)
    }
}

/// Both tables for one purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSettings {
    pub rate: RateTable,
    pub boost: RateTable,
}

/// Clamp an absolute rate into `MIN_RATE..=MAX_RATE`.
pub fn clamp_rate(rate: i32) -> i32 {
    rate.clamp(MIN_RATE, MAX_RATE)
}

/// Clamp a boost into `0..=100`.
pub fn clamp_boost(boost: i32) -> i32 {
    boost.clamp(0, 100)
}

/// Normalise a rate before it is written: negatives collapse to
/// `FOLLOW_DEFAULT_RATE`, the rest is capped at `MAX_RATE`.
pub fn normalize_stored_rate(rate: i32) -> i32 {
    if rate < 0 {
        FOLLOW_DEFAULT_RATE
    } else {
        rate.min(MAX_RATE)
    }
}

/// Whether `synth` belongs to the boost-eligible family (case-insensitive).
pub fn is_boost_family(synth: &str) -> bool {
    synth.to_lowercase().contains(BOOST_FAMILY_MARKER)
}
