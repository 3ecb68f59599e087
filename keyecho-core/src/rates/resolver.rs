//! Offset resolution.
//!
//! ## Algorithm
//!
//! 1. Purpose disabled → `0`.
//! 2. `rate` = per-synth entry, else the scalar fallback.
//! 3. `rate < 0` (follow default) → `rate = default_rate`.
//! 4. Clamp `rate` into `0..=100`.
//! 5. `offset = rate - default_rate`.
//! 6. Boost family → `offset += clamp(boost, 0, 100)`.
//!
//! Nothing is cached: the active synthesizer can change between keystrokes.

use tracing::debug;

use super::{clamp_boost, clamp_rate, is_boost_family, Purpose, RateKind, RateStore};

/// Resolve the rate offset for one utterance of `purpose`.
pub fn resolve_offset<S>(store: &S, purpose: Purpose, synth: &str, default_rate: i32) -> i32
where
    S: RateStore + ?Sized,
{
    if !store.is_enabled(purpose) {
        return 0;
    }

    let mut rate = store.get(purpose, RateKind::Rate).lookup(synth);
    if rate < 0 {
        rate = default_rate;
    }
    let rate = clamp_rate(rate);
    let mut offset = rate - default_rate;

    if is_boost_family(synth) {
        let boost = clamp_boost(store.get(purpose, RateKind::Boost).lookup(synth));
        offset += boost;
        debug!(?purpose, synth, rate, default_rate, boost, offset, "resolved rate offset");
    } else {
        debug!(?purpose, synth, rate, default_rate, offset, "resolved rate offset");
    }

    offset
}

/// Unsaved slider values, used to audition a rate before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDraft {
    pub enabled: bool,
    pub rate: i32,
    pub boost: i32,
}

/// Offset for a draft against the current synth. The rate is taken as
/// absolute; the boost applies only to the boost family.
pub fn preview_offset(draft: &RateDraft, synth: &str, default_rate: i32) -> i32 {
    if !draft.enabled {
        return 0;
    }
    let mut offset = clamp_rate(draft.rate) - default_rate;
    if is_boost_family(synth) {
        offset += clamp_boost(draft.boost);
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EchoRateConfig;

    fn config_with_rate(purpose: Purpose, synth: &str, rate: i32) -> EchoRateConfig {
        let mut config = EchoRateConfig::default();
        let mut table = config.get(purpose, RateKind::Rate);
        table.per_synth.insert(synth.to_string(), rate);
        config.set(purpose, RateKind::Rate, &table);
        config
    }

    #[test]
    fn offset_is_rate_minus_default_without_boost() {
        for rate in (0..=100).step_by(5) {
            for default_rate in (0..=100).step_by(10) {
                let config = config_with_rate(Purpose::Typing, "espeak", rate);
                assert_eq!(
                    resolve_offset(&config, Purpose::Typing, "espeak", default_rate),
                    rate - default_rate,
                    "rate={rate} default={default_rate}"
                );
            }
        }
    }

    #[test]
    fn disabled_purpose_yields_zero() {
        let mut config = config_with_rate(Purpose::Spelling, "oneCore", 100);
        config.set_for_synth(Purpose::Spelling, RateKind::Boost, "oneCore", 100);
        config.enabled = false;
        assert_eq!(resolve_offset(&config, Purpose::Spelling, "oneCore", 0), 0);
    }

    #[test]
    fn typing_uses_its_own_flag_once_set() {
        let mut config = config_with_rate(Purpose::Typing, "espeak", 80);
        config.enabled = false;
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 50), 0);

        config.enabled_spelling = Some(true);
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 50), 30);

        config.enabled = true;
        config.enabled_spelling = Some(false);
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 50), 0);
    }

    #[test]
    fn follow_default_matches_explicit_default_rate() {
        let follow = EchoRateConfig::default();
        for default_rate in [0, 37, 50, 100] {
            let explicit = config_with_rate(Purpose::Typing, "espeak", default_rate);
            assert_eq!(resolve_offset(&follow, Purpose::Typing, "espeak", default_rate), 0);
            assert_eq!(
                resolve_offset(&follow, Purpose::Typing, "espeak", default_rate),
                resolve_offset(&explicit, Purpose::Typing, "espeak", default_rate)
            );
        }
    }

    #[test]
    fn unknown_synth_uses_scalar_fallback() {
        let mut config = config_with_rate(Purpose::Spelling, "espeak", 90);
        config.spelling_rate = 20;
        assert_eq!(resolve_offset(&config, Purpose::Spelling, "sapi5", 50), -30);
        assert_eq!(resolve_offset(&config, Purpose::Spelling, "", 50), -30);
    }

    #[test]
    fn stored_rates_are_clamped_on_read() {
        let config = config_with_rate(Purpose::Typing, "espeak", 250);
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 40), 60);

        let config = config_with_rate(Purpose::Typing, "espeak", -5);
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 40), 0);
    }

    #[test]
    fn boost_applies_only_to_boost_family() {
        let mut config = config_with_rate(Purpose::Typing, "espeak", 60);
        config.one_core_boost = 25;
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 50), 10);

        let mut config = config_with_rate(Purpose::Typing, "OneCore", 60);
        config.one_core_boost = 25;
        assert_eq!(resolve_offset(&config, Purpose::Typing, "OneCore", 50), 35);
    }

    #[test]
    fn per_synth_boost_wins_and_is_clamped() {
        let mut config = config_with_rate(Purpose::Spelling, "oneCore", 100);
        config.one_core_spell_boost = 5;
        let mut boosts = config.get(Purpose::Spelling, RateKind::Boost);
        boosts.per_synth.insert("oneCore".into(), 500);
        config.set(Purpose::Spelling, RateKind::Boost, &boosts);

        assert_eq!(resolve_offset(&config, Purpose::Spelling, "oneCore", 0), 200);
    }

    #[test]
    fn typing_and_spelling_resolve_independently() {
        let mut config = config_with_rate(Purpose::Typing, "espeak", 90);
        config.set_for_synth(Purpose::Spelling, RateKind::Rate, "espeak", 30);
        assert_eq!(resolve_offset(&config, Purpose::Typing, "espeak", 50), 40);
        assert_eq!(resolve_offset(&config, Purpose::Spelling, "espeak", 50), -20);
    }

    #[test]
    fn preview_uses_draft_values() {
        let draft = RateDraft {
            enabled: true,
            rate: 70,
            boost: 150,
        };
        assert_eq!(preview_offset(&draft, "espeak", 50), 20);
        assert_eq!(preview_offset(&draft, "oneCore", 50), 120);
        assert_eq!(
            preview_offset(&RateDraft { enabled: false, ..draft }, "oneCore", 50),
            0
        );
    }
}
