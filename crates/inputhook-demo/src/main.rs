//! inputhook demo: print captured input, post synthetic input, and show the
//! system input settings.
//!
//! # Usage
//!
//! ```text
//! inputhook-demo [OPTIONS] <COMMAND>
//!
//! Commands:
//!   listen      Print every captured event until the stop key is pressed
//!   properties  Print keyboard, pointer and screen settings
//!   post        Synthesize a key tap, click, motion or wheel scroll
//!
//! Options:
//!   --config <PATH>             Config file [env: INPUTHOOK_CONFIG]
//!   --multi-click-time <MS>     Fixed multi-click threshold [env: INPUTHOOK_MULTI_CLICK_MS]
//!   --epoch-time                Stamp events with Unix epoch milliseconds
//! ```
//!
//! CLI options take precedence over the config file. The log filter comes
//! from `RUST_LOG`, falling back to `hook.log_level` in the config.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use inputhook_capture::{
    native_backend, native_key_lookup, native_properties, HookSession, StopSignal,
};
use inputhook_core::{EventKind, KeyCode, MouseButton};
use inputhook_demo::application::commands;
use inputhook_demo::application::relay::{start_relay, ConsumePolicy};
use inputhook_demo::application::report::format_event;
use inputhook_demo::domain::config::{load_config, load_config_from};
use inputhook_demo::domain::{AppConfig, ConfigError};
use inputhook_post::{native_geometry, native_injector, EventPoster};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard and mouse hook demo.
#[derive(Debug, Parser)]
#[command(
    name = "inputhook-demo",
    about = "Capture and synthesize global keyboard and mouse input",
    version
)]
struct Cli {
    /// Path to the TOML config file. Defaults to the platform config dir.
    #[arg(long, env = "INPUTHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Multi-click threshold in milliseconds, overriding the system setting.
    #[arg(long, env = "INPUTHOOK_MULTI_CLICK_MS")]
    multi_click_time: Option<u64>,

    /// Stamp events with Unix epoch milliseconds instead of the hook clock.
    #[arg(long)]
    epoch_time: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every captured event until the stop key is pressed.
    Listen {
        /// Deliver events through an async channel instead of printing from
        /// the hook callback.
        #[arg(long = "async")]
        async_mode: bool,

        /// Suppress presses and releases of this key. Repeatable.
        #[arg(long = "consume", value_name = "KEY")]
        consume: Vec<KeyCode>,

        /// Key whose press ends the session.
        #[arg(long, default_value = "Escape")]
        stop_key: KeyCode,
    },
    /// Print keyboard, pointer and screen settings.
    Properties,
    /// Synthesize input.
    Post {
        #[command(subcommand)]
        action: PostAction,
    },
}

#[derive(Debug, Subcommand)]
enum PostAction {
    /// Tap a key, optionally holding modifiers.
    Key {
        key: KeyCode,
        /// Modifier held during the tap, e.g. `ShiftLeft`. Repeatable.
        #[arg(long = "with", value_name = "KEY")]
        modifiers: Vec<KeyCode>,
    },
    /// Press and release a button at a position.
    Click {
        #[arg(allow_negative_numbers = true)]
        x: i16,
        #[arg(allow_negative_numbers = true)]
        y: i16,
        /// 1-based button number.
        #[arg(long, default_value_t = 1)]
        button: u16,
        /// Click wherever the pointer currently is.
        #[arg(long)]
        no_move: bool,
    },
    /// Move the pointer to an absolute position.
    Move {
        #[arg(allow_negative_numbers = true)]
        x: i16,
        #[arg(allow_negative_numbers = true)]
        y: i16,
    },
    /// Scroll the wheel. Positive notches scroll down (or right).
    Scroll {
        #[arg(allow_negative_numbers = true)]
        notches: i16,
        #[arg(long)]
        horizontal: bool,
    },
}

impl Cli {
    /// Loads the config file and applies the CLI overrides to it.
    fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)?,
            None => match load_config() {
                Err(ConfigError::NoPlatformConfigDir) => AppConfig::default(),
                other => other?,
            },
        };

        if self.multi_click_time.is_some() {
            config.hook.multi_click_time_ms = self.multi_click_time;
        }
        config.hook.epoch_time |= self.epoch_time;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.hook.log_level)),
        )
        .init();

    match cli.command {
        Command::Listen {
            async_mode,
            consume,
            stop_key,
        } => {
            let policy = ConsumePolicy::new(consume);
            if async_mode {
                listen_async(&config, policy, stop_key).await
            } else {
                listen(&config, policy, stop_key).await
            }
        }
        Command::Properties => print_properties(),
        Command::Post { action } => post(&config, action),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn new_session(config: &AppConfig) -> anyhow::Result<HookSession> {
    Ok(HookSession::new(
        native_key_lookup(),
        native_properties()?,
        config.session_options(),
    ))
}

/// Prints from inside the hook callback; the backend runs on a blocking
/// thread so Ctrl+C can still stop it.
async fn listen(config: &AppConfig, policy: ConsumePolicy, stop_key: KeyCode) -> anyhow::Result<()> {
    let mut backend = native_backend()?;
    let mut session = new_session(config)?;
    let stop = backend.stop_signal();

    let callback_stop = Arc::clone(&stop);
    session.set_dispatcher(move |event| {
        println!("{}", format_event(&event));
        if matches!(event.kind, EventKind::KeyPressed(key) if key.keycode == stop_key) {
            if let Err(e) = callback_stop.request_stop() {
                error!("failed to stop hook: {e}");
            }
        }
        policy.verdict(&event)
    });

    spawn_ctrl_c_handler(Arc::clone(&stop));

    info!(%stop_key, "listening; press the stop key or Ctrl+C to exit");
    tokio::task::spawn_blocking(move || backend.run(session))
        .await
        .context("hook thread panicked")??;
    info!("listener stopped");
    Ok(())
}

/// Prints from the async side of a [`start_relay`] channel.
async fn listen_async(
    config: &AppConfig,
    policy: ConsumePolicy,
    stop_key: KeyCode,
) -> anyhow::Result<()> {
    let backend = native_backend()?;
    let session = new_session(config)?;
    let (relay, mut events) = start_relay(backend, session, policy, Some(stop_key), 1024)?;

    spawn_ctrl_c_handler(relay.stop_signal());

    info!(%stop_key, "listening (async); press the stop key or Ctrl+C to exit");
    while let Some(event) = events.recv().await {
        println!("{}", format_event(&event));
    }

    tokio::task::spawn_blocking(move || relay.join())
        .await
        .context("join task panicked")??;
    info!("listener stopped");
    Ok(())
}

fn spawn_ctrl_c_handler(stop: Arc<dyn StopSignal>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, stopping hook");
                if let Err(e) = stop.request_stop() {
                    error!("failed to stop hook: {e}");
                }
            }
            Err(e) => warn!("failed to listen for Ctrl+C signal: {e}"),
        }
    });
}

fn print_properties() -> anyhow::Result<()> {
    let properties = native_properties()?;
    let geometry = native_geometry();

    let show = |value: Option<i64>| value.map_or_else(|| "unavailable".to_string(), |v| v.to_string());

    println!("multi_click_time_ms={}", properties.multi_click_time());
    println!("wheel_scroll_lines={}", properties.wheel_scroll_lines());
    println!("auto_repeat_rate={}", show(properties.auto_repeat_rate()));
    println!("auto_repeat_delay={}", show(properties.auto_repeat_delay()));
    println!(
        "pointer_acceleration_multiplier={}",
        show(properties.pointer_acceleration_multiplier())
    );
    println!(
        "pointer_acceleration_threshold={}",
        show(properties.pointer_acceleration_threshold())
    );
    println!(
        "pointer_sensitivity={}",
        show(properties.pointer_sensitivity())
    );

    let screen = geometry.virtual_screen();
    let origin = geometry.largest_negative_coordinates();
    println!("virtual_screen={}x{}", screen.width, screen.height);
    println!("negative_origin={},{}", origin.left, origin.top);
    Ok(())
}

fn post(config: &AppConfig, action: PostAction) -> anyhow::Result<()> {
    let poster = EventPoster::new(native_injector()?, native_key_lookup(), native_geometry())
        .with_extended_keys(config.post.extended_keys.clone());

    match action {
        PostAction::Key { key, modifiers } => {
            for event in commands::key_chord(&modifiers, key) {
                poster.post_event(&event)?;
            }
        }
        PostAction::Click {
            x,
            y,
            button,
            no_move,
        } => {
            let button = MouseButton::from_number(button).context("button 0 is not a button")?;
            for event in commands::click(button, x, y) {
                if no_move {
                    poster.post_event_dont_move_mouse(&event)?;
                } else {
                    poster.post_event(&event)?;
                }
            }
        }
        PostAction::Move { x, y } => poster.post_event(&commands::move_to(x, y))?,
        PostAction::Scroll {
            notches,
            horizontal,
        } => poster.post_event(&commands::scroll(notches, horizontal))?,
    }

    info!("posted");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
