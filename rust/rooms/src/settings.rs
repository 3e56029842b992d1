use holdem_engine::player::STARTING_CHIPS;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Seats per room can never exceed this: 8 × 2 hole cards + 5 board cards
/// must fit in one 52-card deck.
pub const MAX_SEATS: usize = 8;

/// Table rules applied to every room a manager creates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoomSettings {
    pub starting_chips: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub max_players: usize,
    pub min_players: usize,
    /// Finished hands kept per room
    pub history_limit: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            starting_chips: STARTING_CHIPS,
            small_blind: 10,
            big_blind: 20,
            max_players: MAX_SEATS,
            min_players: 2,
            history_limit: 20,
        }
    }
}

impl RoomSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.starting_chips == 0 {
            return Err(SettingsError::Invalid("starting_chips must be greater than 0".to_string()));
        }
        if self.small_blind == 0 {
            return Err(SettingsError::Invalid("small_blind must be greater than 0".to_string()));
        }
        if self.big_blind < self.small_blind {
            return Err(SettingsError::Invalid(
                "big_blind must be at least small_blind".to_string(),
            ));
        }
        if self.min_players < 2 || self.min_players > self.max_players {
            return Err(SettingsError::Invalid(
                "min_players must be between 2 and max_players".to_string(),
            ));
        }
        if self.max_players > MAX_SEATS {
            return Err(SettingsError::Invalid(format!("max_players must be at most {MAX_SEATS}")));
        }
        // every chip at a full table has to fit in one pot
        let table_chips = u64::from(self.starting_chips) * self.max_players as u64;
        if table_chips > u64::from(u32::MAX) {
            return Err(SettingsError::Invalid(format!(
                "starting_chips × max_players must not exceed {}",
                u32::MAX
            )));
        }
        if self.history_limit == 0 {
            return Err(SettingsError::Invalid("history_limit must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSources {
    pub starting_chips: ValueSource,
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub max_players: ValueSource,
    pub min_players: ValueSource,
    pub history_limit: ValueSource,
}

impl Default for SettingsSources {
    fn default() -> Self {
        Self {
            starting_chips: ValueSource::Default,
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            max_players: ValueSource::Default,
            min_players: ValueSource::Default,
            history_limit: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsResolved {
    pub settings: RoomSettings,
    pub sources: SettingsSources,
}

#[derive(Debug, Deserialize)]
struct FileSettings {
    #[serde(default)]
    starting_chips: Option<u32>,
    #[serde(default)]
    small_blind: Option<u32>,
    #[serde(default)]
    big_blind: Option<u32>,
    #[serde(default)]
    max_players: Option<usize>,
    #[serde(default)]
    min_players: Option<usize>,
    #[serde(default)]
    history_limit: Option<usize>,
}

pub fn load_settings() -> Result<RoomSettings, SettingsError> {
    load_with_sources().map(|resolved| resolved.settings)
}

/// Defaults, then the TOML file named by `HOLDEM_CONFIG`, then
/// `HOLDEM_*` environment overrides.
pub fn load_with_sources() -> Result<SettingsResolved, SettingsError> {
    let mut cfg = RoomSettings::default();
    let mut sources = SettingsSources::default();

    if let Ok(path) = std::env::var("HOLDEM_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileSettings = toml::from_str(&s)?;
        if let Some(v) = f.starting_chips {
            cfg.starting_chips = v;
            sources.starting_chips = ValueSource::File;
        }
        if let Some(v) = f.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = f.big_blind {
            cfg.big_blind = v;
            sources.big_blind = ValueSource::File;
        }
        if let Some(v) = f.max_players {
            cfg.max_players = v;
            sources.max_players = ValueSource::File;
        }
        if let Some(v) = f.min_players {
            cfg.min_players = v;
            sources.min_players = ValueSource::File;
        }
        if let Some(v) = f.history_limit {
            cfg.history_limit = v;
            sources.history_limit = ValueSource::File;
        }
    }

    if let Some(v) = env_number("HOLDEM_STARTING_CHIPS")? {
        cfg.starting_chips = v;
        sources.starting_chips = ValueSource::Env;
    }
    if let Some(v) = env_number("HOLDEM_SMALL_BLIND")? {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(v) = env_number("HOLDEM_BIG_BLIND")? {
        cfg.big_blind = v;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(v) = env_number("HOLDEM_MAX_PLAYERS")? {
        cfg.max_players = v;
        sources.max_players = ValueSource::Env;
    }

    cfg.validate()?;
    Ok(SettingsResolved {
        settings: cfg,
        sources,
    })
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>, SettingsError> {
    match std::env::var(name) {
        Ok(raw) if !raw.is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::Invalid(format!("Invalid {name}: {raw}"))),
        _ => Ok(None),
    }
}
