//! Application state: settings, the console host, and the installed handlers.

use std::path::PathBuf;
use std::sync::Arc;

use keyecho_core::{error::Result, EchoRateConfig, EchoRateHandlers, SpeechHost, SpellOptions};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::hooks::{EchoRateHooks, HandlerTable};
use crate::host::ConsoleHost;
use crate::settings::{load_settings, save_settings, AppSettings, HostSettings};

pub struct AppState {
    /// Absolute path to `settings.json`.
    pub settings_path: PathBuf,
    /// Echo-rate record shared with the handlers.
    pub config: Arc<RwLock<EchoRateConfig>>,
    /// Simulated host settings shared with the console host.
    pub host_settings: Arc<RwLock<HostSettings>>,
    pub handlers: Arc<EchoRateHandlers<ConsoleHost>>,
    /// The host's speech entry points.
    pub table: HandlerTable,
    hooks: EchoRateHooks<ConsoleHost>,
}

impl AppState {
    /// Load settings, apply host overrides, migrate legacy values and install
    /// the handlers.
    pub fn start<F>(settings_path: PathBuf, override_host: F) -> Self
    where
        F: FnOnce(&mut HostSettings),
    {
        let settings = load_settings(&settings_path);
        let mut host_settings = settings.host.clone();
        override_host(&mut host_settings);

        let host_settings = Arc::new(RwLock::new(host_settings));
        let host = ConsoleHost::new(Arc::clone(&host_settings));

        let mut config = settings.typing_echo_rate.clone();
        let synth = host.active_synthesizer();
        let migrated = config.migrate_legacy(&synth, host.default_rate());

        let config = Arc::new(RwLock::new(config));
        let handlers = Arc::new(EchoRateHandlers::new(host.clone(), Arc::clone(&config)));

        let typed_host = host.clone();
        let spell_host = host;
        let table = HandlerTable::new(
            Arc::new(move |ch: char| typed_host.host_typed_character(ch)),
            Arc::new(move |text: &str, options: &SpellOptions| {
                spell_host.host_spelling(text, options)
            }),
        );
        let hooks = EchoRateHooks::new(Arc::clone(&handlers));
        hooks.install(&table);

        let state = Self {
            settings_path,
            config,
            host_settings,
            handlers,
            table,
            hooks,
        };
        if migrated {
            if let Err(e) = state.persist() {
                warn!(error = %e, "failed to save migrated settings");
            }
        }
        state
    }

    /// Write the echo-rate record back. Host settings are saved as loaded,
    /// without command-line overrides.
    pub fn persist(&self) -> Result<()> {
        let mut settings: AppSettings = load_settings(&self.settings_path);
        settings.typing_echo_rate = self.config.read().clone();
        save_settings(&self.settings_path, &settings)?;
        info!(path = %self.settings_path.display(), "settings saved");
        Ok(())
    }

    pub fn handlers_installed(&self) -> bool {
        self.hooks.is_installed()
    }

    pub fn shutdown(&self) {
        self.hooks.uninstall(&self.table);
    }
}
