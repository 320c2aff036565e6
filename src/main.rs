use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use quicktranslate::app::{self, Analytics, AppAction, AppState, AppStore, Environment, Timing};
use quicktranslate::cli::{pair_label, Cli, Command, HELP};
use quicktranslate::config::Config;
use quicktranslate::logging::init_tracing;
use quicktranslate::services::{
    FilePreferences, FixedDurationPlayer, HttpTranslationClient, SystemClipboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    cli.apply(&mut config);
    config.validate()?;

    init_tracing(&config.logging.level);

    let preferences = Arc::new(FilePreferences::open(config.preferences_path())?);
    let initial = AppState::from_preferences(preferences.as_ref())?;
    tracing::info!(
        preferences = %preferences.path().display(),
        pair = %initial.language_pair(),
        "Starting"
    );

    let env = Environment {
        translator: Arc::new(HttpTranslationClient::new(&config.translation)?),
        preferences,
        audio: Arc::new(FixedDurationPlayer::new(config.timing.audio_fallback())),
        clipboard: Arc::new(SystemClipboard),
        timing: Timing::from(&config.timing),
    };
    let analytics = Arc::new(Analytics::new());
    let store = app::build_store(env, initial, Arc::clone(&analytics));

    store.dispatch(AppAction::AppDidBecomeActive);
    store.settled().await;
    for action in cli.startup_actions() {
        store.dispatch(action);
    }

    let printer = tokio::spawn(print_updates(store.watch()));
    println!("{} (:help for commands)", pair_label(store.state().language_pair()));

    run_session(&store).await?;

    store.dispatch(AppAction::AppWillResignActive);
    store.settled().await;
    store.shutdown();
    printer.abort();

    let counters = analytics.counters();
    tracing::info!(
        requested = counters.translations_requested,
        succeeded = counters.translations_succeeded,
        failed = counters.translations_failed,
        transient = counters.transient_failures,
        swaps = counters.swaps,
        "Session finished"
    );
    Ok(())
}

/// Read stdin until EOF, `:quit` or Ctrl-C.
async fn run_session(store: &AppStore) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            return Ok(());
        };

        match Command::parse(&line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(command @ (Command::Source(_) | Command::Target(_) | Command::Swap)) => {
                if let Some(action) = command.into_action() {
                    store.dispatch(action);
                }
                store.settled().await;
                println!("{}", pair_label(store.state().language_pair()));
            }
            Ok(command) => {
                if let Some(action) = command.into_action() {
                    store.dispatch(action);
                }
            }
            Err(err) => eprintln!("{}", err),
        }
    }
}

/// Print the output area whenever it settles on a new value.
async fn print_updates(mut states: watch::Receiver<AppState>) {
    let mut last = String::new();
    while states.changed().await.is_ok() {
        let (output, loading) = {
            let state = states.borrow_and_update();
            (state.displayed_output(), state.is_loading)
        };
        if !loading && !output.is_empty() && output != last {
            println!("{}", output);
            last = output;
        }
    }
}
