//! Optional JSON configuration with per-deck defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::formats::ContentKind;
use crate::mapping::StrategyKind;

pub const CONFIG_FILE_NAME: &str = "scout-decks.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decks: BTreeMap<ContentKind, DeckConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Settings for one build after CLI flags, config file and defaults are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSettings {
    pub out: PathBuf,
    pub deck_name: String,
    pub model_name: String,
    pub strategy: StrategyKind,
}

impl DeckSettings {
    pub fn defaults(kind: ContentKind) -> Self {
        match kind {
            ContentKind::MeritBadges => Self {
                out: PathBuf::from("merit_badges_image_trainer.zip"),
                deck_name: "Merit Badges Visual Trainer".to_owned(),
                model_name: "Merit Badge Image → Text".to_owned(),
                strategy: StrategyKind::Exact,
            },
            ContentKind::CubAdventures => Self {
                out: PathBuf::from("cub_scout_adventure_image_trainer.zip"),
                deck_name: "Cub Scout Adventure Image Trainer".to_owned(),
                model_name: "Cub Scout Adventure Quiz".to_owned(),
                strategy: StrategyKind::Exact,
            },
        }
    }
}

/// Values given on the command line; `None` falls through to config and defaults.
#[derive(Debug, Clone, Default)]
pub struct DeckOverrides {
    pub out: Option<PathBuf>,
    pub deck_name: Option<String>,
    pub model_name: Option<String>,
    pub strategy: Option<StrategyKind>,
}

impl Config {
    pub fn deck(&self, kind: ContentKind) -> Option<&DeckConfig> {
        self.decks.get(&kind)
    }

    pub fn resolve(&self, kind: ContentKind, overrides: DeckOverrides) -> DeckSettings {
        let defaults = DeckSettings::defaults(kind);
        let deck = self.deck(kind).cloned().unwrap_or_default();

        DeckSettings {
            out: overrides
                .out
                .or_else(|| deck.out.map(PathBuf::from))
                .unwrap_or(defaults.out),
            deck_name: overrides
                .deck_name
                .or(deck.deck_name)
                .unwrap_or(defaults.deck_name),
            model_name: overrides
                .model_name
                .or(deck.model_name)
                .unwrap_or(defaults.model_name),
            strategy: overrides
                .strategy
                .or(deck.strategy)
                .unwrap_or(defaults.strategy),
        }
    }

    pub fn sample() -> Self {
        let decks = [
            (
                ContentKind::MeritBadges,
                DeckConfig {
                    out: Some("my_merit_badges.zip".to_owned()),
                    deck_name: Some("My Merit Badge Collection".to_owned()),
                    model_name: Some("Merit Badge Quiz".to_owned()),
                    strategy: Some(StrategyKind::Exact),
                },
            ),
            (
                ContentKind::CubAdventures,
                DeckConfig {
                    out: Some("my_cub_adventures.zip".to_owned()),
                    deck_name: Some("My Cub Scout Adventures".to_owned()),
                    model_name: Some("Adventure Quiz".to_owned()),
                    strategy: Some(StrategyKind::Exact),
                },
            ),
        ]
        .into_iter()
        .collect();

        Self {
            decks,
            logging: LoggingConfig {
                level: Some("info".to_owned()),
            },
        }
    }
}

pub fn sample_json() -> anyhow::Result<String> {
    serde_json::to_string_pretty(&Config::sample()).context("serialize sample config")
}

pub fn save_sample(path: &Path) -> anyhow::Result<()> {
    let json = sample_json()?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write sample config: {}", path.display()))
}

/// Where a config is looked for when `--config` is not given, in priority order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{CONFIG_FILE_NAME}")));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("scout-decks").join("config.json"));
    }
    paths
}

#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
    /// Discovered files that could not be used; reported once logging is up.
    pub warnings: Vec<String>,
}

pub fn load(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = read_config(path)?;
        return Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
            warnings: Vec::new(),
        });
    }
    Ok(load_first_of(&search_paths()))
}

pub fn load_first_of(paths: &[PathBuf]) -> LoadedConfig {
    let mut loaded = LoadedConfig::default();
    for path in paths {
        if !path.is_file() {
            continue;
        }
        match read_config(path) {
            Ok(config) => {
                loaded.config = config;
                loaded.source = Some(path.clone());
                break;
            }
            Err(err) => loaded.warnings.push(format!("{err:#}")),
        }
    }
    loaded
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse config: {}", path.display()))
}
