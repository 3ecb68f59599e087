//! Persisted echo-rate configuration record.
//!
//! Every field is defaulted and read leniently: a wrong-typed value falls back
//! to its documented default instead of failing the whole record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::rates::{
    store::lenient_int, Purpose, RateKind, RateStore, DEFAULT_SPEECH_RATE, FOLLOW_DEFAULT_RATE,
    MAX_RATE,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct EchoRateConfig {
    /// General toggle. Gates the spelling rate, and the typing rate until
    /// `enabled_spelling` has been saved.
    #[serde(deserialize_with = "bool_or_true")]
    pub enabled: bool,
    /// Typing-rate toggle. `None` until first saved.
    #[serde(
        deserialize_with = "optional_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled_spelling: Option<bool>,
    /// Route completed typed words through the typing rate.
    #[serde(deserialize_with = "bool_or_false")]
    pub apply_to_words: bool,
    #[serde(deserialize_with = "map_string")]
    pub typing_rates_json: String,
    #[serde(deserialize_with = "rate_or_follow")]
    pub typing_rate: i32,
    #[serde(deserialize_with = "map_string")]
    pub one_core_boost_json: String,
    #[serde(deserialize_with = "boost_or_zero")]
    pub one_core_boost: i32,
    #[serde(deserialize_with = "map_string")]
    pub spelling_rates_json: String,
    #[serde(deserialize_with = "rate_or_follow")]
    pub spelling_rate: i32,
    #[serde(deserialize_with = "map_string")]
    pub one_core_spell_boost_json: String,
    #[serde(deserialize_with = "boost_or_zero")]
    pub one_core_spell_boost: i32,
    /// Relative offset written by the first release. Migrated away on load.
    #[serde(
        deserialize_with = "optional_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub rate_offset: Option<i32>,
}

impl Default for EchoRateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_spelling: None,
            apply_to_words: false,
            typing_rates_json: String::new(),
            typing_rate: FOLLOW_DEFAULT_RATE,
            one_core_boost_json: String::new(),
            one_core_boost: 0,
            spelling_rates_json: String::new(),
            spelling_rate: FOLLOW_DEFAULT_RATE,
            one_core_spell_boost_json: String::new(),
            one_core_spell_boost: 0,
            rate_offset: None,
        }
    }
}

impl EchoRateConfig {
    /// Parse a persisted record. Invalid JSON yields the defaults.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Self>(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "echo rate config unreadable; using defaults");
                Self::default()
            }
        }
    }

    /// Carry settings from older layouts into per-synth storage.
    ///
    /// 1. A relative `rateOffset` becomes an absolute typing rate for `synth`
    ///    (`default_rate + offset`, clamped) and is dropped.
    /// 2. A scalar `typingRate >= 0` is copied into `synth`'s entry if it has
    ///    none yet.
    ///
    /// Returns whether anything changed. An empty `synth` migrates nothing.
    pub fn migrate_legacy(&mut self, synth: &str, default_rate: Option<i32>) -> bool {
        if synth.is_empty() {
            return false;
        }
        let mut changed = false;
        let mut rates = self.get(Purpose::Typing, RateKind::Rate);

        if let Some(offset) = self.rate_offset {
            if !rates.contains(synth) {
                let default_rate = default_rate.unwrap_or(DEFAULT_SPEECH_RATE);
                let absolute = default_rate.saturating_add(offset).clamp(0, MAX_RATE);
                rates.per_synth.insert(synth.to_string(), absolute);
                self.set(Purpose::Typing, RateKind::Rate, &rates);
                self.rate_offset = None;
                info!(synth, offset, absolute, "migrated relative typing offset");
                changed = true;
            }
        }

        if !rates.contains(synth) && self.typing_rate >= 0 {
            let absolute = self.typing_rate.min(MAX_RATE);
            rates.per_synth.insert(synth.to_string(), absolute);
            self.set(Purpose::Typing, RateKind::Rate, &rates);
            info!(synth, absolute, "copied global typing rate into synth entry");
            changed = true;
        }

        changed
    }
}

// ── Lenient field readers ────────────────────────────────────────────────────

fn bool_or_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(lenient_bool(&Value::deserialize(d)?).unwrap_or(true))
}

fn bool_or_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(lenient_bool(&Value::deserialize(d)?).unwrap_or(false))
}

fn optional_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(lenient_bool(&Value::deserialize(d)?))
}

fn rate_or_follow<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    Ok(lenient_int(&Value::deserialize(d)?).unwrap_or(FOLLOW_DEFAULT_RATE))
}

fn boost_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    Ok(lenient_int(&Value::deserialize(d)?).unwrap_or(0))
}

fn optional_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    Ok(lenient_int(&Value::deserialize(d)?))
}

/// Per-synth maps are stored as strings; an inline object is accepted and
/// re-encoded, anything else reads as an empty map.
fn map_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        object @ Value::Object(_) => object.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
