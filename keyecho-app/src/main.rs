//! keyecho host adapter entry point.
//!
//! Stands in for the screen reader: loads settings, installs the echo-rate
//! handlers into a console host, and drives them from the command line.

mod hooks;
mod host;
mod settings;
mod state;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use keyecho_core::{
    rates::{clamp_boost, clamp_rate, is_boost_family, DEFAULT_SPEECH_RATE},
    EchoMode, Purpose, RateDraft, RateKind, RateStore, SpeechHost, SpellOptions,
};
use settings::default_settings_path;
use state::AppState;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "keyecho", about = "Separate speech rates for typing echo and spelling")]
struct Cli {
    /// Settings file (defaults to the per-user data directory).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Pretend this synthesizer is active.
    #[arg(long, global = true)]
    synth: Option<String>,

    /// Pretend the active synthesizer's rate is this value.
    #[arg(long, global = true)]
    default_rate: Option<i32>,

    /// Typed character echo: off, edit, always (or 0, 1, 2).
    #[arg(long, global = true, value_parser = parse_echo_mode)]
    char_echo: Option<EchoMode>,

    /// Typed word echo: off, edit, always (or 0, 1, 2).
    #[arg(long, global = true, value_parser = parse_echo_mode)]
    word_echo: Option<EchoMode>,

    /// Treat input as protected (password field).
    #[arg(long, global = true)]
    protected: bool,

    /// Treat the focused control as read-only.
    #[arg(long, global = true)]
    read_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Echo stdin through the typing handler, one line at a time.
    Simulate,
    /// Spell text through the spelling handler.
    Spell {
        text: String,
        #[arg(long)]
        locale: Option<String>,
        /// Use phonetic descriptions instead of bare letters.
        #[arg(long)]
        descriptions: bool,
    },
    /// Speak the sample at the typing rate (or a draft rate).
    TestTyping(DraftArgs),
    /// Speak the sample at the spelling rate (or a draft rate).
    TestSpelling(DraftArgs),
    /// Store an absolute rate (-1 follows the synthesizer default).
    SetRate {
        purpose: PurposeArg,
        #[arg(allow_negative_numbers = true)]
        value: i32,
        /// Store for this synth instead of the active one; "" sets the fallback.
        #[arg(long = "for")]
        for_synth: Option<String>,
    },
    /// Store a boost for the boost-eligible family.
    SetBoost {
        purpose: PurposeArg,
        value: i32,
        #[arg(long = "for")]
        for_synth: Option<String>,
    },
    /// Switch a toggle on or off.
    Toggle { flag: FlagArg, state: OnOff },
    /// Print the stored settings and the offsets in effect.
    Show,
}

#[derive(Debug, clap::Args)]
struct DraftArgs {
    /// Draft absolute rate; defaults to the stored one.
    #[arg(long)]
    rate: Option<i32>,
    /// Draft boost; defaults to the stored one.
    #[arg(long)]
    boost: Option<i32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PurposeArg {
    Typing,
    Spelling,
}

impl From<PurposeArg> for Purpose {
    fn from(arg: PurposeArg) -> Self {
        match arg {
            PurposeArg::Typing => Purpose::Typing,
            PurposeArg::Spelling => Purpose::Spelling,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlagArg {
    /// General toggle (spelling, and typing until its own flag is set).
    Enabled,
    /// Typing-rate toggle.
    Typing,
    /// Route typed words through the typing rate.
    Words,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnOff {
    On,
    Off,
}

fn parse_echo_mode(raw: &str) -> Result<EchoMode, String> {
    EchoMode::parse(raw).ok_or_else(|| format!("unknown echo mode: {raw}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keyecho=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    info!(path = %settings_path.display(), "keyecho starting");

    let state = AppState::start(settings_path, |host| {
        if let Some(synth) = &cli.synth {
            host.synthesizer = synth.trim().to_string();
        }
        if let Some(rate) = cli.default_rate {
            host.default_rate = Some(rate.clamp(0, 100));
        }
        if let Some(mode) = cli.char_echo {
            host.speak_typed_characters = mode;
        }
        if let Some(mode) = cli.word_echo {
            host.speak_typed_words = mode;
        }
        if cli.protected {
            host.typing_protected = true;
        }
        if cli.read_only {
            host.focus_editable = false;
        }
    });

    let result = run(&state, cli.command);
    state.shutdown();
    result
}

fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Simulate => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("reading stdin")?;
                for ch in line.chars() {
                    state.table.speak_typed_character(ch);
                }
                state.table.speak_typed_character('\n');
            }
            Ok(())
        }
        Command::Spell {
            text,
            locale,
            descriptions,
        } => {
            let options = SpellOptions {
                locale,
                use_character_descriptions: descriptions,
            };
            state.table.speak_spelling(&text, &options);
            Ok(())
        }
        Command::TestTyping(args) => preview(state, Purpose::Typing, &args),
        Command::TestSpelling(args) => preview(state, Purpose::Spelling, &args),
        Command::SetRate {
            purpose,
            value,
            for_synth,
        } => store_value(state, purpose.into(), RateKind::Rate, value, for_synth),
        Command::SetBoost {
            purpose,
            value,
            for_synth,
        } => store_value(state, purpose.into(), RateKind::Boost, value, for_synth),
        Command::Toggle { flag, state: on_off } => {
            let on = matches!(on_off, OnOff::On);
            {
                let mut config = state.config.write();
                match flag {
                    FlagArg::Enabled => config.enabled = on,
                    FlagArg::Typing => config.enabled_spelling = Some(on),
                    FlagArg::Words => config.apply_to_words = on,
                }
            }
            state.persist().context("saving settings")
        }
        Command::Show => {
            let config = state.config.read().clone();
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("rendering settings")?
            );
            println!("host={:?}", *state.host_settings.read());
            println!("handlers installed={}", state.handlers_installed());
            println!(
                "typing offset={} spelling offset={}",
                state.handlers.current_offset(Purpose::Typing),
                state.handlers.current_offset(Purpose::Spelling)
            );
            Ok(())
        }
    }
}

/// Audition a rate. Unset draft values come from the stored settings, the
/// way a settings panel opens pre-filled.
fn preview(state: &AppState, purpose: Purpose, args: &DraftArgs) -> anyhow::Result<()> {
    let host = state.handlers.host();
    let synth = host.active_synthesizer();
    let default_rate = host.default_rate().unwrap_or(DEFAULT_SPEECH_RATE);

    let draft = {
        let config = state.config.read();
        let stored = config.settings(purpose);
        let mut stored_rate = stored.rate.lookup(&synth);
        if stored_rate < 0 {
            stored_rate = default_rate;
        }
        RateDraft {
            enabled: config.enabled,
            rate: clamp_rate(args.rate.unwrap_or(stored_rate)),
            boost: clamp_boost(args.boost.unwrap_or_else(|| stored.boost.lookup(&synth))),
        }
    };
    state
        .handlers
        .preview(&draft)
        .context("speaking preview sample")
}

fn store_value(
    state: &AppState,
    purpose: Purpose,
    kind: RateKind,
    value: i32,
    for_synth: Option<String>,
) -> anyhow::Result<()> {
    let synth = for_synth.unwrap_or_else(|| state.handlers.host().active_synthesizer());
    if kind == RateKind::Boost && !synth.is_empty() && !is_boost_family(&synth) {
        warn!(synth = %synth, "boost is only applied to the boost-eligible family");
    }
    state
        .config
        .write()
        .set_for_synth(purpose, kind, &synth, value);
    info!(?purpose, ?kind, synth = %synth, value, "stored");
    state.persist().context("saving settings")
}
