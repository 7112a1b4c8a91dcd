use std::path::Path;

use walkdir::WalkDir;

use crate::patch::css::{MARKER_BEGIN, TARGET_STYLESHEET};

/// Stamp file the pipeline leaves in `Apps` after a successful apply.
pub const APPLIED_STAMP: &str = ".apolo";

/// Whether the live `Apps` folder currently carries apolo's patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    NotApplied,
    Applied,
}

impl ApplyStatus {
    /// Inspect `app_folder` on disk. Never cached.
    pub fn of(app_folder: &Path) -> Self {
        if app_folder.join(APPLIED_STAMP).is_file() || has_injected_marker(app_folder) {
            ApplyStatus::Applied
        } else {
            ApplyStatus::NotApplied
        }
    }
}

impl std::fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyStatus::NotApplied => write!(f, "not applied"),
            ApplyStatus::Applied => write!(f, "applied"),
        }
    }
}

fn has_injected_marker(app_folder: &Path) -> bool {
    WalkDir::new(app_folder)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == TARGET_STYLESHEET)
        .any(|entry| {
            std::fs::read_to_string(entry.path())
                .map(|content| content.contains(MARKER_BEGIN))
                .unwrap_or(false)
        })
}
