//! Configuration loading for the Tail demo server.
//! Reads tail.toml from the current directory or the path in TAIL_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tail_common::{Floorplan, MergeMode};

pub const CONFIG_ENV: &str = "TAIL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "tail.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub tags: TagsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_bind()       -> String  { "127.0.0.1:8080".to_string() }
fn default_static_dir() -> PathBuf { PathBuf::from("static") }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Positioning server client.
    Rtls,
    /// Built-in tag emulator.
    #[default]
    Emulator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub kind: FeedKind,
    #[serde(default = "default_feed_host")]
    pub host: String,
    #[serde(default = "default_feed_port")]
    pub port: u16,
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: f64,
    #[serde(default = "default_filter_len")]
    pub filter_len: usize,
    /// JSON roster with tag names and colours.
    pub roster: Option<PathBuf>,
    #[serde(default = "bool_true")]
    pub include_unknown: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    #[serde(default = "default_emulated_tags")]
    pub emulated_tags: usize,
}

fn default_feed_host()      -> String { "localhost".to_string() }
fn default_feed_port()      -> u16    { 9475 }
fn default_reconnect_secs() -> f64    { 1.0 }
fn default_filter_len()     -> usize  { 1 }
fn default_interval_secs()  -> f64    { 1.0 }
fn default_emulated_tags()  -> usize  { 3 }
fn bool_true()              -> bool   { true }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            kind: FeedKind::default(),
            host: default_feed_host(),
            port: default_feed_port(),
            reconnect_secs: default_reconnect_secs(),
            filter_len: default_filter_len(),
            roster: None,
            include_unknown: bool_true(),
            interval_secs: default_interval_secs(),
            emulated_tags: default_emulated_tags(),
        }
    }
}

impl FeedConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs_f64(self.reconnect_secs.max(0.0))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs.max(0.01))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_width")]
    pub width: f64,
    #[serde(default = "default_map_height")]
    pub height: f64,
    /// URL of the floorplan image drawn under the markers.
    #[serde(default = "default_floorplan")]
    pub floorplan: String,
    #[serde(default = "default_radius")]
    pub default_radius: f64,
    #[serde(default = "default_color")]
    pub default_color: String,
}

fn default_map_width()  -> f64    { 10.0 }
fn default_map_height() -> f64    { 5.35 }
fn default_floorplan()  -> String { "/static/img/floorplan.svg".to_string() }
fn default_radius()     -> f64    { 0.15 }
fn default_color()      -> String { "#d9534f".to_string() }

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
            floorplan: default_floorplan(),
            default_radius: default_radius(),
            default_color: default_color(),
        }
    }
}

impl MapConfig {
    pub fn floorplan(&self) -> Floorplan {
        Floorplan::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsConfig {
    #[serde(default)]
    pub merge: MergeMode,
}

mod tests;

impl Config {
    /// Load configuration from an explicit path, TAIL_CONFIG, or tail.toml.
    /// Only the implicit default file may be absent.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match std::env::var(CONFIG_ENV) {
                Ok(path) => (PathBuf::from(path), true),
                Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
            },
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            tracing::info!("No {} found, using built-in defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.map.width.is_finite() && self.map.width > 0.0)
            || !(self.map.height.is_finite() && self.map.height > 0.0)
        {
            anyhow::bail!(
                "map.width and map.height must be positive (got {} x {})",
                self.map.width,
                self.map.height
            );
        }
        positive("map.default_radius", self.map.default_radius)?;
        positive("feed.interval_secs", self.feed.interval_secs)?;
        if !(self.feed.reconnect_secs.is_finite() && self.feed.reconnect_secs >= 0.0) {
            anyhow::bail!("feed.reconnect_secs must be zero or more (got {})", self.feed.reconnect_secs);
        }
        if self.feed.kind == FeedKind::Emulator && self.feed.emulated_tags == 0 {
            anyhow::bail!("feed.emulated_tags must be at least 1");
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> anyhow::Result<()> {
    if !(value.is_finite() && value > 0.0) {
        anyhow::bail!("{} must be a positive number (got {})", name, value);
    }
    Ok(())
}
