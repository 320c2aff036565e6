//! Command-line flags and the interactive line commands.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::app::AppAction;
use crate::config::Config;
use crate::language::{Language, LanguagePair};

/// Translate text from the terminal.
#[derive(Debug, Parser)]
#[command(name = "quicktranslate", version, about)]
pub struct Cli {
    /// Config file (default: ~/.config/quicktranslate/config.toml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Override the translation API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,

    /// Source language code or name, e.g. "en" or "english"
    #[arg(long, short = 's')]
    pub source: Option<Language>,

    /// Target language code or name
    #[arg(long, short = 't')]
    pub target: Option<Language>,

    /// Only translate on `:translate`
    #[arg(long)]
    pub no_auto_translate: bool,
}

impl Cli {
    /// Apply config overrides from flags.
    pub fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.translation.base_url = base_url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }

    /// Actions that seed the session from flags, dispatched after preferences load.
    pub fn startup_actions(&self) -> Vec<AppAction> {
        let mut actions = Vec::new();
        if let Some(source) = self.source {
            actions.push(AppAction::SelectSourceLanguage(source));
        }
        if let Some(target) = self.target {
            actions.push(AppAction::SelectTargetLanguage(target));
        }
        if self.no_auto_translate {
            actions.push(AppAction::SetAutoTranslate(false));
        }
        actions
    }
}

/// Pair shown to the user, e.g. `🇬🇧 English → 🇪🇸 Spanish`.
pub fn pair_label(pair: LanguagePair) -> String {
    format!(
        "{} {} → {} {}",
        pair.source.flag(),
        pair.source,
        pair.target.flag(),
        pair.target
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command ':{0}'. Type :help for a list")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown language '{0}'")]
    Language(String),
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to translate.
    Text(String),
    Swap,
    Source(Language),
    Target(Language),
    Translate,
    Copy,
    Speak,
    Stop,
    Favorite(Language),
    Auto(bool),
    Clear,
    Help,
    Quit,
}

pub const HELP: &str = "\
:swap            swap source and target
:source <lang>   set source language
:target <lang>   set target language
:translate       translate now
:copy            copy translation to clipboard
:speak           speak the translation
:stop            stop speaking
:fav <lang>      toggle a favorite language
:auto on|off     toggle auto-translate
:clear           clear text
:quit            exit";

fn language(arg: Option<&str>, usage: &'static str) -> Result<Language, CommandError> {
    let arg = arg.ok_or(CommandError::Usage(usage))?;
    arg.parse().map_err(|_| CommandError::Language(arg.to_string()))
}

impl Command {
    /// Lines starting with `:` are commands; anything else is text.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Ok(Self::Text(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match name {
            "swap" => Ok(Self::Swap),
            "source" | "from" => language(arg, ":source <lang>").map(Self::Source),
            "target" | "to" => language(arg, ":target <lang>").map(Self::Target),
            "translate" | "t" => Ok(Self::Translate),
            "copy" => Ok(Self::Copy),
            "speak" => Ok(Self::Speak),
            "stop" => Ok(Self::Stop),
            "fav" => language(arg, ":fav <lang>").map(Self::Favorite),
            "auto" => match arg {
                Some("on") => Ok(Self::Auto(true)),
                Some("off") => Ok(Self::Auto(false)),
                _ => Err(CommandError::Usage(":auto on|off")),
            },
            "clear" => Ok(Self::Clear),
            "help" | "h" => Ok(Self::Help),
            "quit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// The action this command dispatches. `Help` and `Quit` are handled by
    /// the session itself.
    pub fn into_action(self) -> Option<AppAction> {
        match self {
            Self::Text(text) => Some(AppAction::UpdateSourceText(text)),
            Self::Swap => Some(AppAction::SwapLanguages),
            Self::Source(lang) => Some(AppAction::SelectSourceLanguage(lang)),
            Self::Target(lang) => Some(AppAction::SelectTargetLanguage(lang)),
            Self::Translate => Some(AppAction::Translate),
            Self::Copy => Some(AppAction::CopyTranslation),
            Self::Speak => Some(AppAction::PlayTranslatedAudio),
            Self::Stop => Some(AppAction::StopAudio),
            Self::Favorite(lang) => Some(AppAction::ToggleFavoriteLanguage(lang)),
            Self::Auto(on) => Some(AppAction::SetAutoTranslate(on)),
            Self::Clear => Some(AppAction::ClearText),
            Self::Help | Self::Quit => None,
        }
    }
}
