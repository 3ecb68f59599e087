//! `RateStore`: read/write access to the four rate tables.
//!
//! Per-synth maps are persisted as compact JSON objects inside string
//! settings (`{"espeak":72,"oneCore":65}`). A map that is not a JSON object is
//! read as empty; entries that are not integer-convertible are skipped.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::{
    clamp_boost, normalize_stored_rate, Purpose, RateKind, RateSettings, RateTable,
};
use crate::config::EchoRateConfig;

/// Mapping abstraction over the typing/spelling × rate/boost tables.
///
/// Pure data access: no clamping on write beyond what `set_for_synth`
/// documents, no resolution policy.
pub trait RateStore {
    /// Read one table. Never fails; malformed data reads as empty.
    fn get(&self, purpose: Purpose, kind: RateKind) -> RateTable;

    /// Replace one table. Out-of-range values are accepted as-is.
    fn set(&mut self, purpose: Purpose, kind: RateKind, table: &RateTable);

    /// Whether a rate override is active for `purpose`.
    fn is_enabled(&self, purpose: Purpose) -> bool;

    /// Both tables for `purpose`.
    fn settings(&self, purpose: Purpose) -> RateSettings {
        RateSettings {
            rate: self.get(purpose, RateKind::Rate),
            boost: self.get(purpose, RateKind::Boost),
        }
    }

    /// Store one value for `synth`, or the scalar fallback when `synth` is
    /// empty. Rates are written as `-1` or `0..=100`, boosts as `0..=100`.
    fn set_for_synth(&mut self, purpose: Purpose, kind: RateKind, synth: &str, value: i32) {
        let value = match kind {
            RateKind::Rate => normalize_stored_rate(value),
            RateKind::Boost => clamp_boost(value),
        };
        let mut table = self.get(purpose, kind);
        if synth.is_empty() {
            table.fallback = value;
        } else {
            table.per_synth.insert(synth.to_string(), value);
        }
        self.set(purpose, kind, &table);
    }
}

impl RateStore for EchoRateConfig {
    fn get(&self, purpose: Purpose, kind: RateKind) -> RateTable {
        let (raw, fallback) = match (purpose, kind) {
            (Purpose::Typing, RateKind::Rate) => (&self.typing_rates_json, self.typing_rate),
            (Purpose::Typing, RateKind::Boost) => (&self.one_core_boost_json, self.one_core_boost),
            (Purpose::Spelling, RateKind::Rate) => {
                (&self.spelling_rates_json, self.spelling_rate)
            }
            (Purpose::Spelling, RateKind::Boost) => {
                (&self.one_core_spell_boost_json, self.one_core_spell_boost)
            }
        };
        RateTable {
            per_synth: parse_rate_map(raw),
            fallback,
        }
    }

    fn set(&mut self, purpose: Purpose, kind: RateKind, table: &RateTable) {
        let raw = serialize_rate_map(&table.per_synth);
        let (map_slot, fallback_slot) = match (purpose, kind) {
            (Purpose::Typing, RateKind::Rate) => {
                (&mut self.typing_rates_json, &mut self.typing_rate)
            }
            (Purpose::Typing, RateKind::Boost) => {
                (&mut self.one_core_boost_json, &mut self.one_core_boost)
            }
            (Purpose::Spelling, RateKind::Rate) => {
                (&mut self.spelling_rates_json, &mut self.spelling_rate)
            }
            (Purpose::Spelling, RateKind::Boost) => (
                &mut self.one_core_spell_boost_json,
                &mut self.one_core_spell_boost,
            ),
        };
        *map_slot = raw;
        *fallback_slot = table.fallback;
    }

    fn is_enabled(&self, purpose: Purpose) -> bool {
        match purpose {
            // Typing inherits the general toggle until its own flag is saved once.
            Purpose::Typing => self.enabled_spelling.unwrap_or(self.enabled),
            Purpose::Spelling => self.enabled,
        }
    }
}

/// Parse a persisted per-synth map. Anything that is not a JSON object of
/// string → integer-like values degrades to an empty (or partial) map.
pub fn parse_rate_map(raw: &str) -> BTreeMap<String, i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return BTreeMap::new();
    }
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            warn!(kind = value_kind(&other), "rate map is not a JSON object; ignoring");
            return BTreeMap::new();
        }
        Err(e) => {
            warn!(error = %e, "rate map is not valid JSON; ignoring");
            return BTreeMap::new();
        }
    };

    object
        .into_iter()
        .filter_map(|(synth, value)| lenient_int(&value).map(|v| (synth, v)))
        .collect()
}

/// Compact JSON for a per-synth map. Falls back to an empty string, which
/// reads back as an empty map.
pub fn serialize_rate_map(map: &BTreeMap<String, i32>) -> String {
    serde_json::to_string(map).unwrap_or_default()
}

/// Integer view of a JSON value: integers, floats (truncated) and numeric
/// strings. Everything else is `None`.
pub(crate) fn lenient_int(value: &Value) -> Option<i32> {
    let wide = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
