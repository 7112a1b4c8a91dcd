//! Feature flag toggling by text substitution.
//!
//! Each row of [`FLAG_PATCHES`] names a bundled file, a pattern that matches
//! the flag's token in either state, and the replacement for each state. The
//! patterns never assume pristine input, so running the table twice gives
//! the same bytes as running it once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex_lite::Regex;

use super::{PatchError, read_text, write_if_changed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureFlag {
    ExperimentalFeatures,
    FastUserSwitching,
    Home,
    LyricAlwaysShow,
    LyricForceNoSync,
    MadeForYouHub,
    Radio,
    SongPage,
    VisualizationHighFramerate,
}

impl FeatureFlag {
    #[cfg(test)]
    pub const ALL: [FeatureFlag; 9] = [
        FeatureFlag::ExperimentalFeatures,
        FeatureFlag::FastUserSwitching,
        FeatureFlag::Home,
        FeatureFlag::LyricAlwaysShow,
        FeatureFlag::LyricForceNoSync,
        FeatureFlag::MadeForYouHub,
        FeatureFlag::Radio,
        FeatureFlag::SongPage,
        FeatureFlag::VisualizationHighFramerate,
    ];

    /// Config key of the flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::ExperimentalFeatures => "experimental_features",
            FeatureFlag::FastUserSwitching => "fast_user_switching",
            FeatureFlag::Home => "home",
            FeatureFlag::LyricAlwaysShow => "lyric_always_show",
            FeatureFlag::LyricForceNoSync => "lyric_force_no_sync",
            FeatureFlag::MadeForYouHub => "made_for_you_hub",
            FeatureFlag::Radio => "radio",
            FeatureFlag::SongPage => "song_page",
            FeatureFlag::VisualizationHighFramerate => "visualization_high_framerate",
        }
    }
}

impl std::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable flag values for one run. Flags never set read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlagSet {
    values: BTreeMap<FeatureFlag, bool>,
}

impl FeatureFlagSet {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (FeatureFlag, bool)>) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, flag: FeatureFlag) -> bool {
        self.values.get(&flag).copied().unwrap_or(false)
    }
}

/// One table row: how to flip `flag` inside `target` (relative to `Apps`).
#[derive(Debug, Clone, Copy)]
pub struct FlagPatch {
    pub flag: FeatureFlag,
    pub target: &'static str,
    pub pattern: &'static str,
    pub enabled: &'static str,
    pub disabled: &'static str,
}

const ZLINK_BUNDLE: &str = "zlink/main.bundle.js";
const ZLINK_INDEX: &str = "zlink/index.html";
const LYRICS_BUNDLE: &str = "lyrics/main.bundle.js";
const SETTINGS_BUNDLE: &str = "settings/bundle.js";

pub const FLAG_PATCHES: &[FlagPatch] = &[
    FlagPatch {
        flag: FeatureFlag::ExperimentalFeatures,
        target: SETTINGS_BUNDLE,
        pattern: r"(showExperimentalFeatures\s*:\s*)(?:true|false|!0|!1)",
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::FastUserSwitching,
        target: ZLINK_BUNDLE,
        pattern: r#"("ab-fast-user-switching"\s*,\s*)(?:true|false|!0|!1)"#,
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::Home,
        target: ZLINK_BUNDLE,
        pattern: r"(isHomeEnabled\s*:\s*)(?:true|false|!0|!1)",
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::LyricAlwaysShow,
        target: ZLINK_INDEX,
        pattern: r#"(class="button-lyrics)(?: hidden)*(")"#,
        enabled: "${1}${2}",
        disabled: "${1} hidden${2}",
    },
    FlagPatch {
        flag: FeatureFlag::LyricForceNoSync,
        target: LYRICS_BUNDLE,
        pattern: r"(forceNoSync\s*:\s*)(?:true|false|!0|!1)",
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::MadeForYouHub,
        target: ZLINK_BUNDLE,
        pattern: r"(isMadeForYouHubEnabled\s*:\s*)(?:true|false|!0|!1)",
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::Radio,
        target: ZLINK_BUNDLE,
        pattern: r"(isRadioEnabled\s*:\s*)(?:true|false|!0|!1)",
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::SongPage,
        target: ZLINK_BUNDLE,
        pattern: r"(isSongPageEnabled\s*:\s*)(?:true|false|!0|!1)",
        enabled: "${1}true",
        disabled: "${1}false",
    },
    FlagPatch {
        flag: FeatureFlag::VisualizationHighFramerate,
        target: LYRICS_BUNDLE,
        pattern: r"(visualizationFramerate\s*:\s*)\d+",
        enabled: "${1}60",
        disabled: "${1}30",
    },
];

/// A flag whose target file is absent from the `Apps` folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTargetMissing {
    pub flag: FeatureFlag,
    pub path: PathBuf,
}

impl std::fmt::Display for PatchTargetMissing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} not found", self.flag, self.path.display())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlagReport {
    /// Flags whose token was found (whether or not the bytes changed).
    pub patched: Vec<FeatureFlag>,
    /// Flags whose target exists but holds no matching token.
    pub unmatched: Vec<FeatureFlag>,
    pub missing: Vec<PatchTargetMissing>,
    pub files_changed: usize,
}

/// Apply the built-in table to `app_folder`.
pub fn apply(app_folder: &Path, flags: &FeatureFlagSet) -> Result<FlagReport, PatchError> {
    apply_table(app_folder, flags, FLAG_PATCHES)
}

/// Apply `table` to `app_folder`, reading and writing each target once.
pub fn apply_table(
    app_folder: &Path,
    flags: &FeatureFlagSet,
    table: &[FlagPatch],
) -> Result<FlagReport, PatchError> {
    let mut by_target: BTreeMap<&'static str, Vec<&FlagPatch>> = BTreeMap::new();
    for patch in table {
        by_target.entry(patch.target).or_default().push(patch);
    }

    let mut report = FlagReport::default();
    for (target, patches) in by_target {
        let path = app_folder.join(target);
        if !path.is_file() {
            for patch in patches {
                tracing::warn!("{}: target {} missing", patch.flag, path.display());
                report.missing.push(PatchTargetMissing {
                    flag: patch.flag,
                    path: path.clone(),
                });
            }
            continue;
        }

        let old = read_text(&path)?;
        let mut content = old.clone();
        for patch in patches {
            let re = Regex::new(patch.pattern).map_err(|source| PatchError::Pattern {
                flag: patch.flag.as_str(),
                source,
            })?;
            if !re.is_match(&content) {
                tracing::debug!("{}: no match in {}", patch.flag, path.display());
                report.unmatched.push(patch.flag);
                continue;
            }
            let replacement = if flags.get(patch.flag) {
                patch.enabled
            } else {
                patch.disabled
            };
            content = re.replace_all(&content, replacement).into_owned();
            report.patched.push(patch.flag);
        }

        if write_if_changed(&path, &old, &content)? {
            report.files_changed += 1;
        }
    }
    Ok(report)
}
