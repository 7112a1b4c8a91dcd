use std::path::{Path, PathBuf};

const BACKUP_DIR: &str = "Backup";
const EXTRACTED_DIR: &str = "Extracted";
const RAW_DIR: &str = "Raw";
const THEMED_DIR: &str = "Themed";
const THEMES_DIR: &str = "Themes";
const APPS_DIR: &str = "Apps";

/// Folders apolo owns under its config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub backup: PathBuf,
    pub extracted: PathBuf,
    pub raw: PathBuf,
    pub themed: PathBuf,
    pub themes: PathBuf,
}

impl Paths {
    pub fn new(config_dir: &Path) -> Self {
        let extracted = config_dir.join(EXTRACTED_DIR);
        Self {
            config_dir: config_dir.to_path_buf(),
            backup: config_dir.join(BACKUP_DIR),
            raw: extracted.join(RAW_DIR),
            themed: extracted.join(THEMED_DIR),
            extracted,
            themes: config_dir.join(THEMES_DIR),
        }
    }
}

/// The live asset folder inside a Spotify installation.
pub fn app_folder(spotify_path: &Path) -> PathBuf {
    spotify_path.join(APPS_DIR)
}
