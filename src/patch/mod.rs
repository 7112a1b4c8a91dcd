pub mod colors;
pub mod css;
pub mod flags;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("theme file {} is missing", .0.display())]
    ThemeFileMissing(PathBuf),
    #[error("no {stylesheet} found under {}; run \"apolo apply\" first", folder.display())]
    NoStylesheet {
        folder: PathBuf,
        stylesheet: &'static str,
    },
    #[error("invalid pattern for {flag}: {source}")]
    Pattern {
        flag: &'static str,
        #[source]
        source: regex_lite::Error,
    },
}

/// How the theme's CSS is merged into the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssSettings {
    pub inject_css: bool,
    pub replace_colors: bool,
}

fn read_text(path: &Path) -> Result<String, PatchError> {
    std::fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` to `path` unless the file already holds exactly that.
/// Returns whether anything was written.
fn write_if_changed(path: &Path, old: &str, content: &str) -> Result<bool, PatchError> {
    if old == content {
        return Ok(false);
    }
    std::fs::write(path, content).map_err(|source| PatchError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
