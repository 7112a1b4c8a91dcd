//! The operations behind each CLI command.
//!
//! A [`Pipeline`] owns the configuration for one run together with its
//! collaborators (version probe, process control, prompt). It gates every
//! operation on the backup and apply state read fresh from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assets::{self, AssetError};
use crate::cmd::SystemCmdExec;
use crate::config::paths::app_folder;
use crate::config::{Config, ConfigError, Paths};
use crate::patch::PatchError;
use crate::patch::css::{self, CssReport};
use crate::patch::flags::{self, FlagReport};
use crate::spotify::prefs::{self, PrefsError};
use crate::spotify::{PrefsProbe, ProcessControl, SpotifyProcess, VersionProbe};
use crate::status::apply::APPLIED_STAMP;
use crate::status::{ApplyStatus, BackupStatus};
use crate::ui::{Confirm, Printer, StdinConfirm};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Prefs(#[from] PrefsError),
    #[error("you have not backed up; run \"apolo backup\" first")]
    NoBackup,
    #[error("aborted: the backup does not match the installed Spotify version")]
    Declined,
    #[error("spotify is currently patched; run \"apolo restore\" before taking a new backup")]
    AlreadyApplied,
    #[error("could not read the installed Spotify version; launch Spotify once and retry")]
    UnknownVersion,
}

impl PipelineError {
    /// Whether the process should exit non-zero. A missing backup, a refused
    /// prompt and configuration errors are fatal; anything else is reported
    /// and the run ends normally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::NoBackup | PipelineError::Declined | PipelineError::Config(_)
        )
    }
}

/// What `apply` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub backup_status: BackupStatus,
    pub css: CssReport,
    pub flags: FlagReport,
}

pub struct Pipeline {
    config: Config,
    paths: Paths,
    printer: Printer,
    probe: Box<dyn VersionProbe>,
    process: Box<dyn ProcessControl>,
    prompt: Box<dyn Confirm>,
}

impl Pipeline {
    /// A pipeline wired to the real prefs file, processes and stdin.
    pub fn new(config: Config, paths: Paths, printer: Printer) -> Self {
        let probe = PrefsProbe::new(config.setting.prefs_path.clone());
        Self::with_collaborators(
            config,
            paths,
            printer,
            Box::new(probe),
            Box::new(SpotifyProcess::new(Box::new(SystemCmdExec))),
            Box::new(StdinConfirm),
        )
    }

    pub fn with_collaborators(
        config: Config,
        paths: Paths,
        printer: Printer,
        probe: Box<dyn VersionProbe>,
        process: Box<dyn ProcessControl>,
        prompt: Box<dyn Confirm>,
    ) -> Self {
        Self {
            config,
            paths,
            printer,
            probe,
            process,
            prompt,
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn printer(&self) -> Printer {
        self.printer
    }

    pub fn backup_status(&self) -> Result<BackupStatus, PipelineError> {
        let spotify = self.config.spotify_path()?;
        let installed = self.probe.installed_version(spotify);
        Ok(BackupStatus::of(&installed, &self.config.backup.version))
    }

    /// Copy the live `Apps` folder into the backup and seed the raw and
    /// themed variants from it. Returns `false` when the user kept the
    /// existing backup.
    pub fn backup(&mut self) -> Result<bool, PipelineError> {
        let spotify = self.config.spotify_path()?.to_path_buf();
        let app = app_folder(&spotify);
        let installed = self.probe.installed_version(&spotify);
        if installed.is_empty() {
            return Err(PipelineError::UnknownVersion);
        }
        if ApplyStatus::of(&app) == ApplyStatus::Applied {
            return Err(PipelineError::AlreadyApplied);
        }

        match BackupStatus::of(&installed, &self.config.backup.version) {
            BackupStatus::Current => {
                if !self.ask("a backup of this version already exists. replace it? [y/n] ", false) {
                    self.printer.info("keeping the existing backup");
                    return Ok(false);
                }
            }
            BackupStatus::Outdated => self.printer.info(&format!(
                "replacing backup of version {} with {}",
                self.config.backup.version, installed
            )),
            BackupStatus::Empty => {}
        }

        self.forget_backup()?;
        self.printer.info("backing up app files");
        assets::copy(&app, &self.paths.backup, true, &[])?;
        self.printer.info("preparing raw and themed assets");
        assets::copy(&self.paths.backup, &self.paths.raw, true, &[])?;
        assets::copy(&self.paths.backup, &self.paths.themed, true, &[])?;

        self.config.backup.version = installed;
        self.config.save(&self.paths.config_dir)?;
        tracing::info!("backup taken for version {}", self.config.backup.version);
        self.printer.success("everything is ready, you can start applying now");
        Ok(true)
    }

    /// Reseed the live folder, inject the theme, toggle feature flags and
    /// restart Spotify.
    pub fn apply(&self) -> Result<ApplyOutcome, PipelineError> {
        let spotify = self.config.spotify_path()?;
        let backup_status = self.require_backup("applying")?;
        let theme = self.config.theme_folder(&self.paths)?;
        let app = app_folder(spotify);

        if ApplyStatus::of(&app) == ApplyStatus::Applied {
            tracing::info!("clearing previously applied {}", app.display());
            assets::remove(&app)?;
        }
        self.seed(&app)?;

        let css = css::apply(
            &app,
            &theme,
            self.config.css_settings(),
            &self.config.setting.color_scheme,
        )?;
        let flags = flags::apply(&app, &self.config.feature_flags())?;
        for missing in &flags.missing {
            self.printer.warning(&missing.to_string());
        }
        write_stamp(&app)?;

        self.printer.success("spotify is spiced up!");
        self.process.restart(spotify);
        Ok(ApplyOutcome {
            backup_status,
            css,
            flags,
        })
    }

    /// Re-inject the theme CSS only. Assumes `apply` already seeded the
    /// live folder.
    pub fn update(&self) -> Result<CssReport, PipelineError> {
        let spotify = self.config.spotify_path()?;
        let theme = self.config.theme_folder(&self.paths)?;
        let report = css::apply(
            &app_folder(spotify),
            &theme,
            self.config.css_settings(),
            &self.config.setting.color_scheme,
        )?;
        let now = chrono::Local::now();
        self.printer
            .success(&format!("user.css updated at {}", now.format("%H:%M:%S")));
        Ok(report)
    }

    /// Put the backed-up files back in place of the live folder.
    pub fn restore(&self) -> Result<(), PipelineError> {
        let spotify = self.config.spotify_path()?;
        self.require_backup("restoring")?;
        let app = app_folder(spotify);

        assets::remove(&app)?;
        assets::copy(&self.paths.backup, &app, true, &[])?;

        self.printer.success("spotify is restored to its original state");
        self.process.restart(spotify);
        Ok(())
    }

    /// Delete the backup and extracted assets. Returns `false` when the user
    /// declined.
    pub fn clear(&mut self) -> Result<bool, PipelineError> {
        if !self.ask("this deletes the current backup. continue? [y/n] ", false) {
            self.printer.info("nothing was cleared");
            return Ok(false);
        }
        self.forget_backup()?;
        self.printer.success("backup cleared");
        Ok(true)
    }

    /// Toggle Spotify's developer tools and restart it.
    pub fn set_devtools(&self, enabled: bool) -> Result<(), PipelineError> {
        let spotify = self.config.spotify_path()?;
        let path = PrefsProbe::new(self.config.setting.prefs_path.clone())
            .prefs_path(spotify)
            .ok_or(PrefsError::Unlocated)?;
        prefs::set_devtools(&path, enabled)?;

        if enabled {
            self.printer
                .success("devtools enabled; press ctrl + shift + i in the client to open them");
        } else {
            self.printer.success("devtools disabled");
        }
        self.process.restart(spotify);
        Ok(())
    }

    /// Files the watcher should follow for the active theme.
    pub fn watched_files(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let theme = self.config.theme_folder(&self.paths)?;
        Ok(vec![
            theme.join(css::USER_CSS),
            theme.join(crate::patch::colors::COLOR_FILE),
        ])
    }

    fn require_backup(&self, action: &str) -> Result<BackupStatus, PipelineError> {
        let status = self.backup_status()?;
        match status {
            BackupStatus::Empty => Err(PipelineError::NoBackup),
            BackupStatus::Outdated => {
                tracing::warn!("backup version {} is outdated", self.config.backup.version);
                if !self.printer.is_quiet() {
                    self.printer
                        .warning("the Spotify version and the backup version do not match");
                    if !self
                        .prompt
                        .confirm(&format!("continue {action} anyway? [y/n] "), false)
                    {
                        return Err(PipelineError::Declined);
                    }
                }
                Ok(status)
            }
            BackupStatus::Current => Ok(status),
        }
    }

    /// Quiet mode always takes the proceed path.
    fn ask(&self, prompt: &str, default: bool) -> bool {
        self.printer.is_quiet() || self.prompt.confirm(prompt, default)
    }

    fn seed(&self, app: &Path) -> Result<(), PipelineError> {
        assets::copy(&self.paths.raw, app, true, &[])?;
        if self.config.setting.replace_colors {
            assets::copy(&self.paths.themed, app, true, &[])?;
        }
        Ok(())
    }

    /// Drop the version record first, then the trees it describes.
    fn forget_backup(&mut self) -> Result<(), PipelineError> {
        if !self.config.backup.version.is_empty() {
            self.config.backup.version.clear();
            self.config.save(&self.paths.config_dir)?;
        }
        assets::remove(&self.paths.backup)?;
        assets::remove(&self.paths.extracted)?;
        Ok(())
    }
}

fn write_stamp(app: &Path) -> Result<(), AssetError> {
    let path = app.join(APPLIED_STAMP);
    let stamp = format!("applied by apolo {}\n", env!("CARGO_PKG_VERSION"));
    std::fs::write(&path, stamp).map_err(|source| AssetError::Write { path, source })
}
