pub mod paths;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::patch::CssSettings;
use crate::patch::flags::{FeatureFlag, FeatureFlagSet};

pub use paths::Paths;

const CONFIG_DIR_NAME: &str = ".apolo";
pub const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_THEME: &str = "ApoloDefault";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config directory not found: could not determine home directory")]
    HomeDirNotFound,
    #[error("failed to read config file: {0}")]
    ReadFailed(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseFailed(#[from] serde_json::Error),
    #[error("spotify_path {0} is not a directory; set it in the config file")]
    SpotifyPathNotFound(PathBuf),
    #[error("current_theme is empty; set it in the config file")]
    ThemeNotSet,
    #[error("theme folder {0} does not exist")]
    ThemeNotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub setting: Setting,

    #[serde(default)]
    pub additional_options: AdditionalOptions,

    #[serde(default)]
    pub backup: BackupRecord,
}

/// The `[setting]` section: where Spotify lives and how themes are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Spotify installation directory (the one containing `Apps`).
    #[serde(default = "default_spotify_path")]
    pub spotify_path: PathBuf,

    /// Overrides the OS-specific location of Spotify's `prefs` file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefs_path: Option<PathBuf>,

    /// Name of the folder under `Themes/` to apply.
    #[serde(default = "default_theme")]
    pub current_theme: String,

    /// Section of `color.ini` to use. Empty picks the first one.
    #[serde(default)]
    pub color_scheme: String,

    #[serde(default = "default_true")]
    pub inject_css: bool,

    #[serde(default = "default_true")]
    pub replace_colors: bool,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            spotify_path: default_spotify_path(),
            prefs_path: None,
            current_theme: default_theme(),
            color_scheme: String::new(),
            inject_css: true,
            replace_colors: true,
        }
    }
}

/// The `[additional_options]` section: one switch per feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalOptions {
    pub experimental_features: bool,
    #[serde(alias = "fastUser_switching")]
    pub fast_user_switching: bool,
    pub home: bool,
    pub lyric_always_show: bool,
    pub lyric_force_no_sync: bool,
    pub made_for_you_hub: bool,
    pub radio: bool,
    pub song_page: bool,
    pub visualization_high_framerate: bool,
}

/// Version of Spotify the backup was taken from. Empty means no backup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(default)]
    pub version: String,
}

fn default_spotify_path() -> PathBuf {
    if cfg!(windows) {
        dirs::config_dir()
            .map(|dir| dir.join("Spotify"))
            .unwrap_or_else(|| PathBuf::from("C:\\Spotify"))
    } else if cfg!(target_os = "macos") {
        PathBuf::from("/Applications/Spotify.app/Contents/Resources")
    } else {
        PathBuf::from("/usr/share/spotify")
    }
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

fn default_true() -> bool {
    true
}

/// Return the config directory path: `~/.apolo/`
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Path of the config file inside `config_dir`.
pub fn config_file(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

impl Config {
    /// Load configuration from the given config directory.
    /// Returns defaults if the file does not exist.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_file(config_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the given config directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir)?;
        let path = config_file(config_dir);
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// The Spotify installation directory, checked to exist.
    pub fn spotify_path(&self) -> Result<&Path, ConfigError> {
        let path = self.setting.spotify_path.as_path();
        if path.is_dir() {
            Ok(path)
        } else {
            Err(ConfigError::SpotifyPathNotFound(path.to_path_buf()))
        }
    }

    /// Resolve the active theme folder under `paths.themes`.
    pub fn theme_folder(&self, paths: &Paths) -> Result<PathBuf, ConfigError> {
        let name = self.setting.current_theme.trim();
        if name.is_empty() {
            return Err(ConfigError::ThemeNotSet);
        }
        let folder = paths.themes.join(name);
        if !folder.is_dir() {
            return Err(ConfigError::ThemeNotFound(folder));
        }
        Ok(folder)
    }

    pub fn css_settings(&self) -> CssSettings {
        CssSettings {
            inject_css: self.setting.inject_css,
            replace_colors: self.setting.replace_colors,
        }
    }

    /// Snapshot of the feature flags for one invocation.
    pub fn feature_flags(&self) -> FeatureFlagSet {
        let opts = &self.additional_options;
        FeatureFlagSet::from_pairs([
            (FeatureFlag::ExperimentalFeatures, opts.experimental_features),
            (FeatureFlag::FastUserSwitching, opts.fast_user_switching),
            (FeatureFlag::Home, opts.home),
            (FeatureFlag::LyricAlwaysShow, opts.lyric_always_show),
            (FeatureFlag::LyricForceNoSync, opts.lyric_force_no_sync),
            (FeatureFlag::MadeForYouHub, opts.made_for_you_hub),
            (FeatureFlag::Radio, opts.radio),
            (FeatureFlag::SongPage, opts.song_page),
            (
                FeatureFlag::VisualizationHighFramerate,
                opts.visualization_high_framerate,
            ),
        ])
    }
}
