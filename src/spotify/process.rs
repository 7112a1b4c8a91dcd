use std::path::{Path, PathBuf};

use crate::cmd::{CmdExec, args};

/// Stops and relaunches the Spotify client.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessControl: Send + Sync {
    /// Fire-and-forget: failures are logged, never returned.
    fn restart(&self, spotify_path: &Path);
}

pub struct SpotifyProcess {
    cmd: Box<dyn CmdExec>,
}

impl SpotifyProcess {
    pub fn new(cmd: Box<dyn CmdExec>) -> Self {
        Self { cmd }
    }
}

/// The kill command and the launch command for the current platform.
struct RestartPlan {
    kill: (&'static str, Vec<String>),
    launch: (PathBuf, Vec<String>),
}

fn restart_plan(spotify_path: &Path) -> RestartPlan {
    if cfg!(windows) {
        RestartPlan {
            kill: ("taskkill", args(&["/F", "/IM", "spotify.exe"])),
            launch: (spotify_path.join("spotify.exe"), Vec::new()),
        }
    } else if cfg!(target_os = "macos") {
        RestartPlan {
            kill: ("pkill", args(&["Spotify"])),
            launch: (PathBuf::from("open"), args(&["/Applications/Spotify.app"])),
        }
    } else {
        RestartPlan {
            kill: ("pkill", args(&["spotify"])),
            launch: (spotify_path.join("spotify"), Vec::new()),
        }
    }
}

impl ProcessControl for SpotifyProcess {
    fn restart(&self, spotify_path: &Path) {
        let plan = restart_plan(spotify_path);
        let (kill, kill_args) = &plan.kill;
        // pkill exits non-zero when nothing was running.
        if let Err(err) = self.cmd.run(kill, kill_args) {
            tracing::debug!("{} did not stop spotify: {}", kill, err);
        }
        let (program, launch_args) = &plan.launch;
        match self.cmd.spawn(program, launch_args) {
            Ok(()) => tracing::info!("relaunched {}", program.display()),
            Err(err) => tracing::warn!("could not relaunch {}: {}", program.display(), err),
        }
    }
}
