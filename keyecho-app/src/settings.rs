//! Persistent application settings (JSON file in app data directory).
//!
//! The file holds the echo-rate record under `typingEchoRate` and the
//! simulated host's own settings under `host`.

use std::fs;
use std::path::{Path, PathBuf};

use keyecho_core::{error::Result, EchoMode, EchoRateConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

const ECHO_RATE_SECTION: &str = "typingEchoRate";
const HOST_SECTION: &str = "host";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub typing_echo_rate: EchoRateConfig,
    pub host: HostSettings,
}

/// Settings the real screen reader would own. Read-only to the handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSettings {
    pub synthesizer: String,
    pub default_rate: Option<i32>,
    pub speak_typed_characters: EchoMode,
    pub speak_typed_words: EchoMode,
    pub focus_editable: bool,
    pub typing_protected: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            synthesizer: "espeak".into(),
            default_rate: Some(50),
            speak_typed_characters: EchoMode::EditControls,
            speak_typed_words: EchoMode::Off,
            focus_editable: true,
            typing_protected: false,
        }
    }
}

impl HostSettings {
    /// Read the `host` section. Each field that is missing or wrong-typed
    /// keeps its default.
    fn from_section(section: &Map<String, Value>) -> Self {
        let mut host = Self::default();
        read_field(section, "synthesizer", &mut host.synthesizer);
        read_field(section, "defaultRate", &mut host.default_rate);
        read_field(section, "speakTypedCharacters", &mut host.speak_typed_characters);
        read_field(section, "speakTypedWords", &mut host.speak_typed_words);
        read_field(section, "focusEditable", &mut host.focus_editable);
        read_field(section, "typingProtected", &mut host.typing_protected);
        host
    }
}

fn read_field<T: DeserializeOwned>(section: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(raw) = section.get(key) else {
        return;
    };
    match T::deserialize(raw) {
        Ok(value) => *slot = value,
        Err(e) => warn!(field = key, error = %e, "host setting unreadable; keeping default"),
    }
}

impl AppSettings {
    /// Parse the settings file. Each section recovers on its own, so a bad
    /// host value never costs the stored echo rates.
    pub fn from_json_str(raw: &str) -> Self {
        let root = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(root)) => root,
            Ok(_) => {
                warn!("settings file is not an object; using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(error = %e, "settings unreadable; using defaults");
                return Self::default();
            }
        };

        let typing_echo_rate = match root.get(ECHO_RATE_SECTION) {
            None => EchoRateConfig::default(),
            Some(section) => EchoRateConfig::deserialize(section).unwrap_or_else(|e| {
                warn!(error = %e, "echo rate section unreadable; using defaults");
                EchoRateConfig::default()
            }),
        };
        let host = match root.get(HOST_SECTION) {
            None => HostSettings::default(),
            Some(Value::Object(section)) => HostSettings::from_section(section),
            Some(_) => {
                warn!("host section is not an object; using defaults");
                HostSettings::default()
            }
        };

        Self {
            typing_echo_rate,
            host,
        }
    }

    pub fn normalize(&mut self) {
        self.host.synthesizer = self.host.synthesizer.trim().to_string();
        self.host.default_rate = self.host.default_rate.map(|r| r.clamp(0, 100));
    }
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyecho")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("keyecho")
            .join("settings.json")
    }
}

/// Missing or unreadable files yield defaults; wrong-typed fields fall back
/// one by one.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => AppSettings::from_json_str(&raw),
        Err(_) => AppSettings::default(),
    };
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyecho_core::{resolve_offset, EchoError, Purpose, RateKind, RateStore};
    use serde_json::json;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(&dir.path().join("absent.json"));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn garbage_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").expect("write");
        assert_eq!(load_settings(&path), AppSettings::default());
    }

    #[test]
    fn save_then_load_preserves_offsets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.host.synthesizer = "oneCore".into();
        settings.typing_echo_rate.apply_to_words = true;
        settings
            .typing_echo_rate
            .set_for_synth(Purpose::Typing, RateKind::Rate, "oneCore", 85);
        settings
            .typing_echo_rate
            .set_for_synth(Purpose::Typing, RateKind::Boost, "oneCore", 20);
        let before = resolve_offset(&settings.typing_echo_rate, Purpose::Typing, "oneCore", 45);

        save_settings(&path, &settings).expect("save");
        let loaded = load_settings(&path);

        assert_eq!(loaded, settings);
        assert_eq!(
            resolve_offset(&loaded.typing_echo_rate, Purpose::Typing, "oneCore", 45),
            before
        );
        assert_eq!(before, 60);
    }

    #[test]
    fn malformed_rate_map_in_file_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"typingEchoRate":{"typingRatesJson":"[oops","typingRate":70}}"#,
        )
        .expect("write");

        let loaded = load_settings(&path);
        let table = loaded.typing_echo_rate.get(Purpose::Typing, RateKind::Rate);
        assert!(table.per_synth.is_empty());
        assert_eq!(table.fallback, 70);
    }

    #[test]
    fn normalize_trims_and_clamps_host_values() {
        let mut settings = AppSettings::default();
        settings.host.synthesizer = "  sapi5 ".into();
        settings.host.default_rate = Some(180);
        settings.normalize();
        assert_eq!(settings.host.synthesizer, "sapi5");
        assert_eq!(settings.host.default_rate, Some(100));
    }

    #[test]
    fn bad_host_value_keeps_stored_rates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let raw = json!({
            "typingEchoRate": {
                "typingRatesJson": r#"{"espeak":90,"sapi5":20}"#,
                "spellingRate": 30
            },
            "host": {"speakTypedWords": 2, "focusEditable": "maybe", "synthesizer": "sapi5"}
        });
        fs::write(&path, raw.to_string()).expect("write");

        let mut loaded = load_settings(&path);
        let typing = loaded.typing_echo_rate.get(Purpose::Typing, RateKind::Rate);
        assert_eq!(typing.lookup("espeak"), 90);
        assert_eq!(typing.lookup("sapi5"), 20);
        assert_eq!(loaded.typing_echo_rate.spelling_rate, 30);
        assert_eq!(loaded.host.speak_typed_words, EchoMode::Always);
        assert!(loaded.host.focus_editable);
        assert_eq!(loaded.host.synthesizer, "sapi5");

        loaded
            .typing_echo_rate
            .set_for_synth(Purpose::Typing, RateKind::Rate, "oneCore", 40);
        save_settings(&path, &loaded).expect("save");

        let reloaded = load_settings(&path);
        let typing = reloaded.typing_echo_rate.get(Purpose::Typing, RateKind::Rate);
        assert_eq!(typing.lookup("espeak"), 90);
        assert_eq!(typing.lookup("oneCore"), 40);
        assert_eq!(reloaded.typing_echo_rate.spelling_rate, 30);
    }

    #[test]
    fn non_object_sections_fall_back_separately() {
        let loaded = AppSettings::from_json_str(
            r#"{"typingEchoRate":{"applyToWords":true},"host":[1,2]}"#,
        );
        assert!(loaded.typing_echo_rate.apply_to_words);
        assert_eq!(loaded.host, HostSettings::default());

        let loaded = AppSettings::from_json_str(
            r#"{"typingEchoRate":"broken","host":{"defaultRate":null}}"#,
        );
        assert_eq!(loaded.typing_echo_rate, EchoRateConfig::default());
        assert_eq!(loaded.host.default_rate, None);
    }

    #[test]
    fn save_reports_io_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write");

        let err = save_settings(&blocker.join("settings.json"), &AppSettings::default())
            .expect_err("parent is a file");
        assert!(matches!(err, EchoError::Io(_)));
    }
}
