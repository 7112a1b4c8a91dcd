use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const LAST_VERSION_KEY: &str = "app.last-launched-version";
pub const DEVTOOLS_KEY: &str = "app.enable-developer-mode";
const PREFS_FILE: &str = "prefs";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("could not locate Spotify's prefs file on this system")]
    Unlocated,
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reports which Spotify version is installed.
#[cfg_attr(test, mockall::automock)]
pub trait VersionProbe: Send + Sync {
    /// The installed version, or an empty string when it cannot be read.
    fn installed_version(&self, spotify_path: &Path) -> String;
}

/// Reads the version from Spotify's own `prefs` file.
pub struct PrefsProbe {
    override_path: Option<PathBuf>,
}

impl PrefsProbe {
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self { override_path }
    }

    pub fn prefs_path(&self, spotify_path: &Path) -> Option<PathBuf> {
        self.override_path
            .clone()
            .or_else(|| default_prefs_path(spotify_path))
    }
}

impl VersionProbe for PrefsProbe {
    fn installed_version(&self, spotify_path: &Path) -> String {
        let Some(path) = self.prefs_path(spotify_path) else {
            tracing::warn!("no prefs location for this platform");
            return String::new();
        };
        match Prefs::load(&path) {
            Ok(prefs) => prefs.get(LAST_VERSION_KEY).unwrap_or_default(),
            Err(err) => {
                tracing::warn!("{}", err);
                String::new()
            }
        }
    }
}

/// Platform location of the prefs file.
pub fn default_prefs_path(spotify_path: &Path) -> Option<PathBuf> {
    if cfg!(windows) {
        Some(spotify_path.join(PREFS_FILE))
    } else if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| {
            home.join("Library")
                .join("Application Support")
                .join("Spotify")
                .join(PREFS_FILE)
        })
    } else if cfg!(target_os = "linux") {
        dirs::home_dir().map(|home| home.join(".config").join("spotify").join(PREFS_FILE))
    } else {
        None
    }
}

/// Spotify's `key=value` prefs file. Lines that are not touched keep their
/// original text and order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefs {
    lines: Vec<String>,
}

impl Prefs {
    /// Load from `path`. A missing file loads as empty prefs.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(PrefsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    /// Value of `key` with surrounding quotes removed.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lines.iter().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
        })
    }

    /// Set `key` to the raw `value`, replacing an existing line or appending.
    pub fn set(&mut self, key: &str, value: &str) {
        let entry = format!("{key}={value}");
        let existing = self.lines.iter_mut().find(|line| {
            line.split_once('=')
                .is_some_and(|(k, _)| k.trim() == key)
        });
        match existing {
            Some(line) => *line = entry,
            None => self.lines.push(entry),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut content = self.lines.join("\n");
        content.push('\n');
        std::fs::write(path, content).map_err(io_err)
    }
}

/// Turn Spotify's developer tools on or off in the prefs file.
pub fn set_devtools(prefs_path: &Path, enabled: bool) -> Result<(), PrefsError> {
    let mut prefs = Prefs::load(prefs_path)?;
    prefs.set(DEVTOOLS_KEY, if enabled { "true" } else { "false" });
    prefs.save(prefs_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
autologin.username=\"someone\"
app.last-launched-version=\"1.1.10.546.ge08ef575\"
core.clock_delta=0
";

    #[test]
    fn test_get_strips_quotes() {
        let prefs = Prefs::parse(SAMPLE);
        assert_eq!(
            prefs.get(LAST_VERSION_KEY).as_deref(),
            Some("1.1.10.546.ge08ef575")
        );
        assert_eq!(prefs.get("core.clock_delta").as_deref(), Some("0"));
        assert_eq!(prefs.get("missing"), None);
    }

    #[test]
    fn test_set_replaces_in_place_and_appends() {
        let mut prefs = Prefs::parse(SAMPLE);
        prefs.set("core.clock_delta", "5");
        prefs.set(DEVTOOLS_KEY, "true");

        assert_eq!(prefs.lines[2], "core.clock_delta=5");
        assert_eq!(prefs.lines.last().unwrap(), "app.enable-developer-mode=true");
        assert_eq!(prefs.lines.len(), 4);
    }

    #[test]
    fn test_probe_reads_override_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs");
        std::fs::write(&path, SAMPLE).unwrap();

        let probe = PrefsProbe::new(Some(path));
        assert_eq!(probe.installed_version(tmp.path()), "1.1.10.546.ge08ef575");
    }

    #[test]
    fn test_probe_missing_file_is_empty_version() {
        let tmp = TempDir::new().unwrap();
        let probe = PrefsProbe::new(Some(tmp.path().join("nope")));
        assert_eq!(probe.installed_version(tmp.path()), "");
    }

    #[test]
    fn test_set_devtools_toggles() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spotify").join("prefs");

        set_devtools(&path, true).unwrap();
        assert_eq!(Prefs::load(&path).unwrap().get(DEVTOOLS_KEY).as_deref(), Some("true"));

        set_devtools(&path, false).unwrap();
        let prefs = Prefs::load(&path).unwrap();
        assert_eq!(prefs.get(DEVTOOLS_KEY).as_deref(), Some("false"));
        assert_eq!(prefs.lines.len(), 1);
    }
}
